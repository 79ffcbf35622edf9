use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn fixture(root: &Path) {
    let data = root.join("data");
    let tasks = root.join("tasks");
    let truth = root.join("truth");
    for dir in [&data, &tasks, &truth] {
        fs::create_dir_all(dir).expect("mkdir");
    }

    fs::write(data.join("user.json"), "{\"user_id\":\"u1\",\"name\":\"Ann\"}\n").expect("users");
    fs::write(
        data.join("item.json"),
        concat!(
            "{\"item_id\":\"a\",\"stars\":4.0,\"review_count\":50}\n",
            "{\"item_id\":\"b\",\"stars\":2.5,\"review_count\":5}\n",
        ),
    )
    .expect("items");
    fs::write(
        data.join("review.jsonl"),
        concat!(
            "{\"review_id\":\"r1\",\"user_id\":\"u1\",\"item_id\":\"a\",\"stars\":5,\"text\":\"yes\"}\n",
            "{\"review_id\":\"r2\",\"user_id\":\"u1\",\"item_id\":\"b\",\"stars\":3,\"text\":\"ok\"}\n",
        ),
    )
    .expect("reviews");

    fs::write(
        tasks.join("0.json"),
        r#"{"type":"recommendation","user_id":"u1","candidate_category":"x","candidate_id_list":["b","a"],"loc":null}"#,
    )
    .expect("task");
    fs::write(truth.join("0.json"), r#"{"ground truth":"a"}"#).expect("truth");
}

fn revsim() -> Command {
    Command::cargo_bin("revsim").expect("binary built")
}

#[test]
fn run_prints_report_to_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    fixture(dir.path());

    revsim()
        .args(["run", "--agent", "popularity", "--no-threading"])
        .arg("--data-dir")
        .arg(dir.path().join("data"))
        .arg("--tasks")
        .arg(dir.path().join("tasks"))
        .arg("--groundtruth")
        .arg(dir.path().join("truth"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"recommendation\""))
        .stdout(predicate::str::contains("\"hr_at_1\": 1.0"))
        .stdout(predicate::str::contains("\"evaluated_count\": 1"));
}

#[test]
fn run_from_config_writes_report_and_outputs() {
    let dir = tempfile::tempdir().expect("tempdir");
    fixture(dir.path());
    let config = dir.path().join("run.json");
    let body = serde_json::json!({
        "data_dir": dir.path().join("data"),
        "task_dir": dir.path().join("tasks"),
        "groundtruth_dir": dir.path().join("truth"),
        "gateway": "in_memory",
        "agent": "epsilon-greedy",
        "agent_params": {"epsilon": 0.0, "seed": 1}
    });
    fs::write(&config, body.to_string()).expect("config");
    let report = dir.path().join("out/report.json");
    let outputs = dir.path().join("out/outputs.json");

    revsim()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&report)
        .arg("--outputs")
        .arg(&outputs)
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(report["metrics"]["hr_at_1"], 1.0);

    let outputs: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&outputs).expect("outputs")).expect("json");
    assert_eq!(outputs[0]["output"], serde_json::json!(["a", "b"]));
    assert_eq!(outputs[0]["task"]["user_id"], "u1");
}

#[test]
fn run_without_agent_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    fixture(dir.path());

    revsim()
        .arg("run")
        .arg("--data-dir")
        .arg(dir.path().join("data"))
        .arg("--tasks")
        .arg(dir.path().join("tasks"))
        .arg("--groundtruth")
        .arg(dir.path().join("truth"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--agent is required"));
}

#[test]
fn unknown_agent_is_rejected_by_the_parser() {
    revsim()
        .args(["run", "--agent", "oracle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn lookup_user_and_reviews() {
    let dir = tempfile::tempdir().expect("tempdir");
    fixture(dir.path());
    let data = dir.path().join("data");

    revsim()
        .args(["lookup", "--data-dir"])
        .arg(&data)
        .args(["user", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Ann\""));

    revsim()
        .args(["lookup", "--data-dir"])
        .arg(&data)
        .args(["item", "missing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("null"));

    revsim()
        .args(["lookup", "--in-memory", "--data-dir"])
        .arg(&data)
        .args(["reviews", "--user", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("r1").and(predicate::str::contains("r2")));
}

#[test]
fn missing_collection_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");

    revsim()
        .args(["lookup", "--data-dir"])
        .arg(dir.path())
        .args(["user", "u1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open dataset"));
}
