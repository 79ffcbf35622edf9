#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Task registry, executor and the [`Simulator`] facade.

pub mod config;
pub mod error;
pub mod executor;
pub mod registry;
pub mod simulator;

pub use config::RunConfig;
pub use error::{HarnessError, Result};
pub use executor::{
    execute, AgentSession, ExecutionRecord, RunOptions, SessionState, TaskFailure,
    DEFAULT_MAX_WORKERS,
};
pub use registry::{list_files, load_groundtruth, load_tasks, TaskSet};
pub use simulator::Simulator;
