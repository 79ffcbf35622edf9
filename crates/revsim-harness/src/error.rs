use revsim_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("unsupported task type `{kind}` in {path}")]
    UnsupportedTaskType { path: PathBuf, kind: String },
    #[error("directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("session needs both a gateway and a task before it can run")]
    NotBound,
    #[error("no agent set; call set_agent first")]
    AgentNotSet,
    #[error("no gateway set; open a dataset or call set_gateway first")]
    GatewayNotSet,
    #[error("nothing to evaluate; run the tasks first")]
    NotExecuted,
}

pub type Result<T> = std::result::Result<T, HarnessError>;
