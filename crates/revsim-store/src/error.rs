use revsim_core::{AccessError, EntityKind};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no {kind} collection (tried {kind}.json, {kind}.jsonl, {kind}.ndjson) in {root}")]
    MissingCollection { kind: EntityKind, root: PathBuf },
    #[error("cache `{cache}` needs a capacity of at least 1")]
    ZeroCapacity { cache: &'static str },
    #[error("failed to load dataset: {0}")]
    Load(#[from] AccessError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
