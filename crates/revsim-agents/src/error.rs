use thiserror::Error;

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("Unknown baseline agent: {0}")]
    UnknownAgent(String),
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, BaselineError>;
