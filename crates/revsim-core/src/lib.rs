//! Core types shared by the revsim crates: dataset records, tasks,
//! groundtruth, agent outputs and the [`Agent`] contract.

pub mod context;
pub mod error;
pub mod groundtruth;
pub mod output;
pub mod record;
pub mod task;

pub use context::{EntityAccess, ReviewQuery, Reviews, TaskContext};
pub use error::{AccessError, AgentError, TaskError};
pub use groundtruth::{Groundtruth, RecommendationTruth, SimulationTruth};
pub use output::{AgentOutput, SimulatedReview};
pub use record::{EntityKind, Record};
pub use task::{RecommendationTask, SimulationTask, Task, TaskFamily};

/// A participant-supplied decision maker.
///
/// The harness creates a fresh agent per task and calls [`Agent::decide`]
/// exactly once, with the task already bound into the context.
pub trait Agent: Send {
    fn decide(&mut self, _ctx: &TaskContext<'_>) -> Result<AgentOutput, AgentError> {
        Err(AgentError::NotImplemented)
    }
}

/// Creates agents of one task family.
pub trait AgentFactory: Send + Sync {
    fn name(&self) -> &str;
    fn family(&self) -> TaskFamily;
    fn create(&self) -> Box<dyn Agent>;
}

/// [`AgentFactory`] backed by a closure.
pub struct FnAgentFactory<F> {
    name: String,
    family: TaskFamily,
    make: F,
}

impl<F> FnAgentFactory<F>
where
    F: Fn() -> Box<dyn Agent> + Send + Sync,
{
    pub fn new(name: impl Into<String>, family: TaskFamily, make: F) -> Self {
        Self {
            name: name.into(),
            family,
            make,
        }
    }
}

impl<F> AgentFactory for FnAgentFactory<F>
where
    F: Fn() -> Box<dyn Agent> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> TaskFamily {
        self.family
    }

    fn create(&self) -> Box<dyn Agent> {
        (self.make)()
    }
}
