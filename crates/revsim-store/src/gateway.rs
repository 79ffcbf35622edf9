//! Cached interaction gateway over the on-disk collections.
//!
//! Every lookup first consults an LRU cache and falls back to one linear
//! scan of the backing file. Filtered review lists are cached only once the
//! scan has finished, so a cached list is always the complete answer for
//! its key.

use crate::cache::{CacheStats, EntityCache};
use crate::collection::JsonlCollection;
use crate::error::Result;
use revsim_core::{AccessError, EntityAccess, EntityKind, Record, ReviewQuery, Reviews};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Entries each cache holds before evicting.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub cache_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug)]
pub struct CachedGateway {
    users: JsonlCollection,
    items: JsonlCollection,
    reviews: JsonlCollection,
    user_cache: EntityCache<Arc<Record>>,
    item_cache: EntityCache<Arc<Record>>,
    review_cache: EntityCache<Arc<Record>>,
    item_reviews_cache: EntityCache<Reviews>,
    user_reviews_cache: EntityCache<Reviews>,
}

impl CachedGateway {
    /// Opens the collections of a dataset root. Nothing is read until the
    /// first lookup.
    ///
    /// # Errors
    /// Missing collections and a zero cache capacity.
    pub fn open(root: &Path, config: &GatewayConfig) -> Result<Self> {
        let capacity = config.cache_capacity;
        let gateway = Self {
            users: JsonlCollection::locate(root, EntityKind::User)?,
            items: JsonlCollection::locate(root, EntityKind::Item)?,
            reviews: JsonlCollection::locate(root, EntityKind::Review)?,
            user_cache: EntityCache::new("user", capacity)?,
            item_cache: EntityCache::new("item", capacity)?,
            review_cache: EntityCache::new("review", capacity)?,
            item_reviews_cache: EntityCache::new("item_reviews", capacity)?,
            user_reviews_cache: EntityCache::new("user_reviews", capacity)?,
        };
        tracing::info!(root = %root.display(), capacity, "opened cached gateway");
        Ok(gateway)
    }

    /// Scans started so far over the collection of `kind`.
    #[must_use]
    pub fn scan_count(&self, kind: EntityKind) -> usize {
        self.collection(kind).scan_count()
    }

    #[must_use]
    pub fn cache_stats(&self) -> Vec<(&'static str, CacheStats)> {
        vec![
            (self.user_cache.name(), self.user_cache.stats()),
            (self.item_cache.name(), self.item_cache.stats()),
            (self.review_cache.name(), self.review_cache.stats()),
            (self.item_reviews_cache.name(), self.item_reviews_cache.stats()),
            (self.user_reviews_cache.name(), self.user_reviews_cache.stats()),
        ]
    }

    fn collection(&self, kind: EntityKind) -> &JsonlCollection {
        match kind {
            EntityKind::User => &self.users,
            EntityKind::Item => &self.items,
            EntityKind::Review => &self.reviews,
        }
    }

    fn point_lookup(
        &self,
        kind: EntityKind,
        cache: &EntityCache<Arc<Record>>,
        id: &str,
    ) -> std::result::Result<Option<Arc<Record>>, AccessError> {
        if id.is_empty() {
            return Ok(None);
        }
        if let Some(hit) = cache.get(id) {
            return Ok(Some(hit));
        }

        tracing::debug!(%kind, id, "cache miss, scanning");
        let found = self.collection(kind).find(kind.id_field(), id)?.map(Arc::new);
        if let Some(record) = &found {
            cache.put(id.to_string(), Arc::clone(record));
        }
        Ok(found)
    }

    fn filtered_reviews(
        &self,
        cache: &EntityCache<Reviews>,
        field: &'static str,
        id: &str,
    ) -> std::result::Result<Reviews, AccessError> {
        if let Some(hit) = cache.get(id) {
            return Ok(hit);
        }

        tracing::debug!(field, id, "cache miss, scanning reviews");
        // Cache only after the scan completed; `?` leaves the cache untouched.
        let reviews: Reviews = Arc::new(self.reviews.filter(field, id)?);
        cache.put(id.to_string(), Arc::clone(&reviews));
        Ok(reviews)
    }
}

impl EntityAccess for CachedGateway {
    fn get_user(&self, user_id: &str) -> std::result::Result<Option<Arc<Record>>, AccessError> {
        self.point_lookup(EntityKind::User, &self.user_cache, user_id)
    }

    fn get_item(&self, item_id: &str) -> std::result::Result<Option<Arc<Record>>, AccessError> {
        self.point_lookup(EntityKind::Item, &self.item_cache, item_id)
    }

    fn get_reviews(&self, query: &ReviewQuery<'_>) -> std::result::Result<Reviews, AccessError> {
        if let Some(review_id) = query.review_id.filter(|id| !id.is_empty()) {
            let review = self.point_lookup(EntityKind::Review, &self.review_cache, review_id)?;
            return Ok(Arc::new(review.map(|r| (*r).clone()).into_iter().collect()));
        }
        if let Some(item_id) = query.item_id.filter(|id| !id.is_empty()) {
            return self.filtered_reviews(&self.item_reviews_cache, "item_id", item_id);
        }
        if let Some(user_id) = query.user_id.filter(|id| !id.is_empty()) {
            return self.filtered_reviews(&self.user_reviews_cache, "user_id", user_id);
        }
        Ok(Arc::default())
    }
}
