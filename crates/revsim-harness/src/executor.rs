//! Running agents over a batch of tasks.
//!
//! Every task gets its own [`AgentSession`], which walks
//! `Created -> Bound -> Executed | Failed` exactly once. A failing or
//! panicking agent only fails its own slot.

use crate::error::{HarnessError, Result};
use rayon::prelude::*;
use revsim_core::{Agent, AgentError, AgentFactory, AgentOutput, EntityAccess, Task, TaskContext};
use serde::{Deserialize, Serialize, Serializer};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

/// Worker count used when none is configured.
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// How a batch is executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Run only the first N tasks.
    pub task_limit: Option<usize>,
    /// Dispatch tasks over a worker pool instead of the calling thread.
    pub threading: bool,
    /// Pool size when `threading` is on; 0 lets the pool pick.
    pub max_workers: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            task_limit: None,
            threading: true,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

/// Why a task produced no output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{reason}")]
pub struct TaskFailure {
    pub reason: String,
}

impl TaskFailure {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn from_agent(err: &AgentError) -> Self {
        match err {
            AgentError::NotImplemented => Self::new("decide not implemented by the agent"),
            other => Self::new(other.to_string()),
        }
    }

    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::new(format!("agent panicked: {message}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Created,
    Bound,
    Executed(AgentOutput),
    Failed(TaskFailure),
}

/// One agent instance bound to one task.
pub struct AgentSession {
    agent: Box<dyn Agent>,
    gateway: Option<Arc<dyn EntityAccess>>,
    task: Option<Task>,
    state: SessionState,
}

impl AgentSession {
    #[must_use]
    pub fn new(agent: Box<dyn Agent>) -> Self {
        Self {
            agent,
            gateway: None,
            task: None,
            state: SessionState::Created,
        }
    }

    pub fn bind_gateway(&mut self, gateway: Arc<dyn EntityAccess>) -> &mut Self {
        self.gateway = Some(gateway);
        self.refresh_binding();
        self
    }

    pub fn bind_task(&mut self, task: Task) -> &mut Self {
        self.task = Some(task);
        self.refresh_binding();
        self
    }

    fn refresh_binding(&mut self) {
        if self.state == SessionState::Created && self.gateway.is_some() && self.task.is_some() {
            self.state = SessionState::Bound;
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Invokes the agent once.
    ///
    /// # Errors
    /// [`HarnessError::NotBound`] unless both gateway and task are bound and
    /// the session has not run yet. Agent errors and panics are not errors
    /// here; they end the session in [`SessionState::Failed`].
    pub fn run(&mut self) -> Result<&SessionState> {
        let (Some(gateway), Some(task)) = (&self.gateway, &self.task) else {
            return Err(HarnessError::NotBound);
        };
        if self.state != SessionState::Bound {
            return Err(HarnessError::NotBound);
        }

        let ctx = TaskContext::new(task, gateway.as_ref());
        let agent = &mut self.agent;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| agent.decide(&ctx)));

        self.state = match outcome {
            Ok(Ok(output)) => SessionState::Executed(output),
            Ok(Err(err)) => {
                tracing::warn!(user = task.user_id(), error = %err, "agent failed");
                SessionState::Failed(TaskFailure::from_agent(&err))
            }
            Err(payload) => {
                let failure = TaskFailure::from_panic(payload.as_ref());
                tracing::warn!(user = task.user_id(), reason = %failure, "agent panicked");
                SessionState::Failed(failure)
            }
        };
        Ok(&self.state)
    }

    /// The bound task and its outcome, once the session has run.
    #[must_use]
    pub fn into_outcome(self) -> Option<(Task, std::result::Result<AgentOutput, TaskFailure>)> {
        let task = self.task?;
        match self.state {
            SessionState::Executed(output) => Some((task, Ok(output))),
            SessionState::Failed(failure) => Some((task, Err(failure))),
            SessionState::Created | SessionState::Bound => None,
        }
    }
}

/// Outcome of one task, at the task's position in the batch.
///
/// Serializes as `{"task": .., "output": ..}` or `{"task": .., "error": ..}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRecord {
    pub index: usize,
    pub task: Task,
    pub outcome: std::result::Result<AgentOutput, TaskFailure>,
}

impl ExecutionRecord {
    /// The output, or the failure reason, as the evaluator takes it.
    #[must_use]
    pub fn as_evaluated(&self) -> std::result::Result<&AgentOutput, &str> {
        self.outcome.as_ref().map_err(|failure| failure.reason.as_str())
    }
}

impl Serialize for ExecutionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            task: &'a Task,
            #[serde(skip_serializing_if = "Option::is_none")]
            output: Option<&'a AgentOutput>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<&'a str>,
        }

        Wire {
            task: &self.task,
            output: self.outcome.as_ref().ok(),
            error: self.outcome.as_ref().err().map(|f| f.reason.as_str()),
        }
        .serialize(serializer)
    }
}

/// Runs `factory`'s agents over `tasks`; results come back in task order.
///
/// # Errors
/// Only a failed worker pool build. Agent failures land in the records.
pub fn execute(
    tasks: &[Task],
    factory: &dyn AgentFactory,
    gateway: &Arc<dyn EntityAccess>,
    options: &RunOptions,
) -> Result<Vec<ExecutionRecord>> {
    let tasks = match options.task_limit {
        Some(limit) => &tasks[..limit.min(tasks.len())],
        None => tasks,
    };
    let mismatched = tasks.iter().filter(|t| t.family() != factory.family()).count();
    if mismatched > 0 {
        tracing::warn!(
            agent = factory.name(),
            family = %factory.family(),
            mismatched,
            "some tasks belong to the other family"
        );
    }
    tracing::info!(
        agent = factory.name(),
        tasks = tasks.len(),
        threading = options.threading,
        "running tasks"
    );

    let run_one = |(index, task): (usize, &Task)| run_task(index, task, factory, gateway);
    let records = if options.threading {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.max_workers)
            .thread_name(|i| format!("revsim-worker-{i}"))
            .build()?;
        pool.install(|| tasks.par_iter().enumerate().map(run_one).collect::<Vec<_>>())
    } else {
        tasks.iter().enumerate().map(run_one).collect()
    };

    let failed = records.iter().filter(|r| r.outcome.is_err()).count();
    tracing::info!(completed = records.len() - failed, failed, "tasks finished");
    Ok(records)
}

fn run_task(
    index: usize,
    task: &Task,
    factory: &dyn AgentFactory,
    gateway: &Arc<dyn EntityAccess>,
) -> ExecutionRecord {
    let mut session = AgentSession::new(factory.create());
    session.bind_gateway(Arc::clone(gateway)).bind_task(task.clone());

    let ran = session.run().map(|_| ());
    let outcome = match ran {
        Ok(()) => session.into_outcome(),
        Err(err) => Some((task.clone(), Err(TaskFailure::new(err.to_string())))),
    };
    let (task, outcome) =
        outcome.unwrap_or_else(|| (task.clone(), Err(TaskFailure::new("session did not run"))));
    ExecutionRecord {
        index,
        task,
        outcome,
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use revsim_core::{AccessError, FnAgentFactory, Record, ReviewQuery, Reviews, SimulationTask, TaskFamily};
    use serde_json::json;

    struct NoData;

    impl EntityAccess for NoData {
        fn get_user(&self, _: &str) -> std::result::Result<Option<Arc<Record>>, AccessError> {
            Ok(None)
        }

        fn get_item(&self, _: &str) -> std::result::Result<Option<Arc<Record>>, AccessError> {
            Ok(None)
        }

        fn get_reviews(&self, _: &ReviewQuery<'_>) -> std::result::Result<Reviews, AccessError> {
            Ok(Arc::default())
        }
    }

    struct Echo;

    impl Agent for Echo {
        fn decide(&mut self, ctx: &TaskContext<'_>) -> std::result::Result<AgentOutput, AgentError> {
            if ctx.user_id() == "boom" {
                panic!("bad user");
            }
            Ok(AgentOutput::Ranking(vec![ctx.user_id().to_string()]))
        }
    }

    struct Silent;

    impl Agent for Silent {}

    fn task(user: &str) -> Task {
        Task::Simulation(SimulationTask {
            user_id: user.into(),
            item_id: "i1".into(),
        })
    }

    fn gateway() -> Arc<dyn EntityAccess> {
        Arc::new(NoData)
    }

    #[test]
    fn session_requires_both_bindings() {
        let mut session = AgentSession::new(Box::new(Echo));
        assert!(matches!(session.run(), Err(HarnessError::NotBound)));

        session.bind_task(task("u1"));
        assert_eq!(session.state(), &SessionState::Created);
        assert!(matches!(session.run(), Err(HarnessError::NotBound)));

        session.bind_gateway(gateway());
        assert_eq!(session.state(), &SessionState::Bound);
        let state = session.run().expect("bound session runs");
        assert!(matches!(state, SessionState::Executed(_)));
    }

    #[test]
    fn session_runs_only_once() {
        let mut session = AgentSession::new(Box::new(Echo));
        session.bind_gateway(gateway()).bind_task(task("u1"));
        session.run().expect("first run");
        assert!(matches!(session.run(), Err(HarnessError::NotBound)));
    }

    #[test]
    fn default_decide_fails_the_slot() {
        let mut session = AgentSession::new(Box::new(Silent));
        session.bind_gateway(gateway()).bind_task(task("u1"));
        match session.run().expect("run") {
            SessionState::Failed(failure) => assert!(failure.reason.contains("not implemented")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn panics_are_isolated_and_order_is_kept() {
        let factory = FnAgentFactory::new("echo", TaskFamily::Recommendation, || {
            Box::new(Echo) as Box<dyn Agent>
        });
        let tasks: Vec<Task> = ["a", "boom", "c", "d"].iter().map(|u| task(u)).collect();
        let options = RunOptions {
            max_workers: 3,
            ..RunOptions::default()
        };

        let records = execute(&tasks, &factory, &gateway(), &options).expect("execute");

        assert_eq!(records.len(), 4);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.index, i);
            assert_eq!(record.task, tasks[i]);
        }
        assert!(records[1]
            .outcome
            .as_ref()
            .is_err_and(|f| f.reason.contains("bad user")));
        assert_eq!(
            records[3].outcome,
            Ok(AgentOutput::Ranking(vec!["d".to_string()]))
        );
    }

    #[test]
    fn task_limit_and_sequential_mode() {
        let factory = FnAgentFactory::new("echo", TaskFamily::Recommendation, || {
            Box::new(Echo) as Box<dyn Agent>
        });
        let tasks: Vec<Task> = ["a", "b", "c"].iter().map(|u| task(u)).collect();
        let options = RunOptions {
            task_limit: Some(2),
            threading: false,
            ..RunOptions::default()
        };

        let records = execute(&tasks, &factory, &gateway(), &options).expect("execute");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn records_serialize_as_output_or_error() {
        let ok = ExecutionRecord {
            index: 0,
            task: task("u1"),
            outcome: Ok(AgentOutput::Ranking(vec!["x".into()])),
        };
        let failed = ExecutionRecord {
            index: 1,
            task: task("u2"),
            outcome: Err(TaskFailure::new("nope")),
        };

        let ok = serde_json::to_value(&ok).expect("serialize");
        assert_eq!(ok["output"], json!(["x"]));
        assert_eq!(ok["task"]["type"], "user_behavior_simulation");
        assert!(ok.get("error").is_none());

        let failed = serde_json::to_value(&failed).expect("serialize");
        assert_eq!(failed["error"], "nope");
        assert!(failed.get("output").is_none());
    }
}
