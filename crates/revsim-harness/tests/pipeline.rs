//! End-to-end runs over a small on-disk dataset.

use revsim_agents::{baseline_factory, BaselineParams};
use revsim_core::{Agent, AgentError, AgentOutput, FnAgentFactory, TaskContext, TaskFamily};
use revsim_harness::{HarnessError, RunOptions, Simulator};
use revsim_store::{GatewayConfig, GatewayMode};
use std::fs;
use std::path::Path;
use std::sync::Arc;

struct Dataset {
    _dir: tempfile::TempDir,
    data: std::path::PathBuf,
    tasks: std::path::PathBuf,
    groundtruth: std::path::PathBuf,
}

fn write_lines(path: &Path, lines: &[&str]) {
    fs::write(path, lines.join("\n")).expect("write collection");
}

fn dataset() -> Dataset {
    let dir = tempfile::tempdir().expect("tempdir");
    let data = dir.path().join("data");
    let tasks = dir.path().join("tasks");
    let groundtruth = dir.path().join("groundtruth");
    for d in [&data, &tasks, &groundtruth] {
        fs::create_dir_all(d).expect("mkdir");
    }

    write_lines(&data.join("user.json"), &[r#"{"user_id":"u1"}"#, r#"{"user_id":"u2"}"#]);
    write_lines(
        &data.join("item.json"),
        &[
            r#"{"item_id":"a","stars":4.5,"review_count":120}"#,
            r#"{"item_id":"b","stars":3.0,"review_count":10}"#,
            r#"{"item_id":"c","stars":5.0,"review_count":2}"#,
        ],
    );
    write_lines(
        &data.join("review.json"),
        &[
            r#"{"review_id":"r1","user_id":"u1","item_id":"a","stars":4,"text":"good","date":"2020-01-01"}"#,
            r#"{"review_id":"r2","user_id":"u1","item_id":"b","stars":5,"text":"great","date":"2021-01-01"}"#,
        ],
    );

    for (name, body) in [
        ("task_1.json", r#"{"type":"recommendation","user_id":"u1","candidate_category":"x","candidate_id_list":["b","a","c"],"loc":[0,0]}"#),
        ("task_2.json", r#"{"type":"recommendation","user_id":"u2","candidate_category":"x","candidate_id_list":["a","b","c"],"loc":null}"#),
    ] {
        fs::write(tasks.join(name), body).expect("task");
    }
    for (name, body) in [
        ("task_1.json", r#"{"ground truth":"c"}"#),
        ("task_2.json", r#"{"ground truth":"b"}"#),
    ] {
        fs::write(groundtruth.join(name), body).expect("groundtruth");
    }

    Dataset {
        _dir: dir,
        data,
        tasks,
        groundtruth,
    }
}

fn simulator(ds: &Dataset, mode: GatewayMode) -> Simulator {
    let mut sim = Simulator::open(&ds.data, mode, &GatewayConfig::default()).expect("open");
    sim.set_task_and_groundtruth(&ds.tasks, &ds.groundtruth)
        .expect("load tasks");
    sim
}

#[test]
fn popularity_baseline_end_to_end() {
    let ds = dataset();
    for mode in [GatewayMode::Cached, GatewayMode::InMemory] {
        let mut sim = simulator(&ds, mode);
        let factory = baseline_factory("popularity", &BaselineParams::default()).expect("factory");
        sim.set_agent(factory);

        let outputs = sim.run(&RunOptions::default()).expect("run");
        assert_eq!(
            outputs[0].outcome,
            Ok(AgentOutput::Ranking(vec!["c".into(), "a".into(), "b".into()]))
        );

        let report = sim.evaluate().expect("evaluate");
        // task 1 hits at rank 1, task 2 at rank 3
        assert!((report.metrics["hr_at_1"] - 0.5).abs() < 1e-12);
        assert!((report.metrics["hr_at_3"] - 1.0).abs() < 1e-12);
        assert_eq!(report.data_info.evaluated_count, 2);
    }
}

struct Flaky;

impl Agent for Flaky {
    fn decide(&mut self, ctx: &TaskContext<'_>) -> Result<AgentOutput, AgentError> {
        if ctx.user_id() == "u1" {
            panic!("flaky agent");
        }
        Ok(AgentOutput::Ranking(ctx.candidates().to_vec()))
    }
}

#[test]
fn failing_task_is_excluded_without_blocking_others() {
    let ds = dataset();
    let mut sim = simulator(&ds, GatewayMode::Cached);
    sim.set_agent(Arc::new(FnAgentFactory::new(
        "flaky",
        TaskFamily::Recommendation,
        || Box::new(Flaky) as Box<dyn Agent>,
    )));

    let outputs = sim.run(&RunOptions::default()).expect("run");
    assert!(outputs[0].outcome.is_err());
    assert!(outputs[1].outcome.is_ok());

    let report = sim.evaluate().expect("evaluate");
    assert_eq!(report.data_info.failed_count, 1);
    assert_eq!(report.metrics["total"], 1.0);
    // task 2 ranks [a, b, c] with b correct
    assert!((report.metrics["hr_at_1"]).abs() < 1e-12);
    assert!((report.metrics["hr_at_3"] - 1.0).abs() < 1e-12);

    let json = serde_json::to_value(sim.outputs().expect("outputs")).expect("serialize");
    assert!(json[0]["error"]
        .as_str()
        .is_some_and(|e| e.contains("flaky agent")));
    assert!(json[1].get("output").is_some());
}

#[test]
fn preconditions_are_enforced() {
    let ds = dataset();
    let mut sim = simulator(&ds, GatewayMode::Cached);
    assert!(matches!(
        sim.run(&RunOptions::default()),
        Err(HarnessError::AgentNotSet)
    ));
    assert!(matches!(sim.evaluate(), Err(HarnessError::AgentNotSet)));

    sim.set_agent(baseline_factory("popularity", &BaselineParams::default()).expect("factory"));
    assert!(matches!(sim.evaluate(), Err(HarnessError::NotExecuted)));

    let mut detached = Simulator::default();
    detached.set_agent(baseline_factory("popularity", &BaselineParams::default()).expect("factory"));
    assert!(matches!(
        detached.run(&RunOptions::default()),
        Err(HarnessError::GatewayNotSet)
    ));
}

#[test]
fn task_limit_reports_mismatch_and_history_accumulates() {
    let ds = dataset();
    let mut sim = simulator(&ds, GatewayMode::Cached);
    sim.set_agent(baseline_factory("popularity", &BaselineParams::default()).expect("factory"));

    let options = RunOptions {
        task_limit: Some(1),
        threading: false,
        ..RunOptions::default()
    };
    sim.run(&options).expect("run");
    let first = sim.evaluate().expect("evaluate");
    assert_eq!(first.data_info.evaluated_count, 1);
    assert_eq!(first.data_info.original_simulation_count, 1);
    assert_eq!(first.data_info.original_ground_truth_count, 2);

    sim.run(&RunOptions::default()).expect("rerun");
    sim.evaluate().expect("evaluate again");
    assert_eq!(sim.evaluation_history().len(), 2);
    assert_eq!(sim.evaluator().recommendation().metrics_history().len(), 2);
}

#[test]
fn simulation_family_with_history_mean() {
    let ds = dataset();
    let tasks = ds.tasks.parent().expect("root").join("sim_tasks");
    let truth = ds.tasks.parent().expect("root").join("sim_truth");
    fs::create_dir_all(&tasks).expect("mkdir");
    fs::create_dir_all(&truth).expect("mkdir");
    fs::write(
        tasks.join("1.json"),
        r#"{"type":"user_behavior_simulation","user_id":"u1","business_id":"c"}"#,
    )
    .expect("task");
    fs::write(
        truth.join("1.json"),
        r#"{"stars":4.5,"review":"lovely","useful":0,"funny":0,"cool":0}"#,
    )
    .expect("truth");

    let mut sim = Simulator::open(&ds.data, GatewayMode::Cached, &GatewayConfig::default())
        .expect("open");
    sim.set_task_and_groundtruth(&tasks, &truth).expect("load");
    sim.set_agent(baseline_factory("history-mean", &BaselineParams::default()).expect("factory"));
    sim.run(&RunOptions::default()).expect("run");

    let report = sim.evaluate().expect("evaluate");
    assert_eq!(report.family, TaskFamily::Simulation);
    // u1 averages 4.5 stars; the neutral scorer adds no text error
    assert!(report.metrics["star_error"].abs() < 1e-12);
    assert!(report.metrics["overall_error"].abs() < 1e-12);
    assert_eq!(report.detailed_metrics.map(|d| d.len()), Some(1));
}
