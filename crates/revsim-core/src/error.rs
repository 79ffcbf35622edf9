use crate::record::EntityKind;
use thiserror::Error;

/// Errors raised while reading entities through an [`EntityAccess`](crate::EntityAccess).
///
/// Unknown ids are not errors; lookups return `None` or an empty list.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("failed to read {kind} collection: {source}")]
    Io {
        kind: EntityKind,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {kind} record on line {line}: {source}")]
    Malformed {
        kind: EntityKind,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Errors an agent can report from [`Agent::decide`](crate::Agent::decide).
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("decide is not implemented by this agent")]
    NotImplemented,
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("agent failed: {0}")]
    Failed(String),
}

/// Errors raised while turning a task file into a [`Task`](crate::Task).
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task has no `type` field")]
    MissingType,
    #[error("unsupported task type: {0}")]
    UnsupportedType(String),
    #[error("invalid {kind} task: {source}")]
    Invalid {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
