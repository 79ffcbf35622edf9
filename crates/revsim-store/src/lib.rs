//! Dataset access for revsim.
//!
//! Two [`EntityAccess`] implementations over the same dataset layout:
//! [`CachedGateway`] scans the line-delimited files lazily behind bounded
//! LRU caches, [`MemoryGateway`] loads everything up front.

pub mod cache;
pub mod collection;
pub mod error;
pub mod gateway;
pub mod memory;

pub use cache::{CacheStats, EntityCache};
pub use collection::JsonlCollection;
pub use error::StoreError;
pub use gateway::{CachedGateway, GatewayConfig, DEFAULT_CACHE_CAPACITY};
pub use memory::MemoryGateway;

use revsim_core::EntityAccess;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayMode {
    #[default]
    Cached,
    InMemory,
}

/// Opens a dataset root with the requested gateway.
///
/// # Errors
/// See [`CachedGateway::open`] and [`MemoryGateway::load`].
pub fn open_gateway(
    root: &Path,
    mode: GatewayMode,
    config: &GatewayConfig,
) -> error::Result<Arc<dyn EntityAccess>> {
    Ok(match mode {
        GatewayMode::Cached => Arc::new(CachedGateway::open(root, config)?),
        GatewayMode::InMemory => Arc::new(MemoryGateway::load(root)?),
    })
}
