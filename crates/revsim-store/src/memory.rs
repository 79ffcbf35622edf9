//! Eager gateway: reads every collection once and answers from indexes.
//!
//! Trades memory for zero scans after startup; suited to the smaller
//! datasets. When ids repeat, the first record in file order wins, matching
//! what a scanning lookup would return.

use crate::collection::JsonlCollection;
use crate::error::Result;
use revsim_core::{AccessError, EntityAccess, EntityKind, Record, ReviewQuery, Reviews};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct MemoryGateway {
    users: HashMap<String, Arc<Record>>,
    items: HashMap<String, Arc<Record>>,
    reviews: HashMap<String, Arc<Record>>,
    reviews_by_item: HashMap<String, Reviews>,
    reviews_by_user: HashMap<String, Reviews>,
}

impl MemoryGateway {
    /// # Errors
    /// Missing collections, I/O failures and malformed lines.
    pub fn load(root: &Path) -> Result<Self> {
        let users = JsonlCollection::locate(root, EntityKind::User)?.load_all()?;
        let items = JsonlCollection::locate(root, EntityKind::Item)?.load_all()?;
        let reviews = JsonlCollection::locate(root, EntityKind::Review)?.load_all()?;
        tracing::info!(
            root = %root.display(),
            users = users.len(),
            items = items.len(),
            reviews = reviews.len(),
            "loaded dataset into memory"
        );
        Ok(Self::from_records(users, items, reviews))
    }

    #[must_use]
    pub fn from_records(users: Vec<Record>, items: Vec<Record>, reviews: Vec<Record>) -> Self {
        let mut by_item: HashMap<String, Vec<Record>> = HashMap::new();
        let mut by_user: HashMap<String, Vec<Record>> = HashMap::new();
        for review in &reviews {
            if let Some(item_id) = review.item_id() {
                by_item.entry(item_id.to_string()).or_default().push(review.clone());
            }
            if let Some(user_id) = review.user_id() {
                by_user.entry(user_id.to_string()).or_default().push(review.clone());
            }
        }

        Self {
            users: index(users, EntityKind::User),
            items: index(items, EntityKind::Item),
            reviews: index(reviews, EntityKind::Review),
            reviews_by_item: by_item.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
            reviews_by_user: by_user.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
        }
    }
}

fn index(records: Vec<Record>, kind: EntityKind) -> HashMap<String, Arc<Record>> {
    let mut map = HashMap::with_capacity(records.len());
    for record in records {
        if let Some(id) = record.id(kind).map(str::to_owned) {
            map.entry(id).or_insert_with(|| Arc::new(record));
        }
    }
    map
}

impl EntityAccess for MemoryGateway {
    fn get_user(&self, user_id: &str) -> std::result::Result<Option<Arc<Record>>, AccessError> {
        Ok(self.users.get(user_id).cloned())
    }

    fn get_item(&self, item_id: &str) -> std::result::Result<Option<Arc<Record>>, AccessError> {
        Ok(self.items.get(item_id).cloned())
    }

    fn get_reviews(&self, query: &ReviewQuery<'_>) -> std::result::Result<Reviews, AccessError> {
        let found: Option<Reviews> = if let Some(review_id) = query.review_id.filter(|id| !id.is_empty()) {
            let single = self.reviews.get(review_id).map(|r| (**r).clone());
            Some(Arc::new(single.into_iter().collect()))
        } else if let Some(item_id) = query.item_id.filter(|id| !id.is_empty()) {
            self.reviews_by_item.get(item_id).cloned()
        } else if let Some(user_id) = query.user_id.filter(|id| !id.is_empty()) {
            self.reviews_by_user.get(user_id).cloned()
        } else {
            None
        };
        Ok(found.unwrap_or_default())
    }
}
