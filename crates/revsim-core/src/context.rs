//! Entity access as seen from inside an agent.

use crate::error::AccessError;
use crate::record::Record;
use crate::task::Task;
use std::sync::Arc;

/// Reviews in the order they appear in the backing collection.
pub type Reviews = Arc<Vec<Record>>;

/// Filter for [`EntityAccess::get_reviews`].
///
/// Precedence is `review_id`, then `item_id`, then `user_id`; an empty
/// query matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewQuery<'a> {
    pub item_id: Option<&'a str>,
    pub user_id: Option<&'a str>,
    pub review_id: Option<&'a str>,
}

impl<'a> ReviewQuery<'a> {
    #[must_use]
    pub fn by_item(item_id: &'a str) -> Self {
        Self {
            item_id: Some(item_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_user(user_id: &'a str) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_review(review_id: &'a str) -> Self {
        Self {
            review_id: Some(review_id),
            ..Self::default()
        }
    }
}

/// Read-only access to the users, items and reviews of a dataset.
///
/// Implementations are shared by concurrently running agents.
pub trait EntityAccess: Send + Sync {
    fn get_user(&self, user_id: &str) -> Result<Option<Arc<Record>>, AccessError>;
    fn get_item(&self, item_id: &str) -> Result<Option<Arc<Record>>, AccessError>;
    fn get_reviews(&self, query: &ReviewQuery<'_>) -> Result<Reviews, AccessError>;
}

/// A task bound to the gateway it may query.
#[derive(Clone, Copy)]
pub struct TaskContext<'a> {
    task: &'a Task,
    access: &'a dyn EntityAccess,
}

impl<'a> TaskContext<'a> {
    #[must_use]
    pub fn new(task: &'a Task, access: &'a dyn EntityAccess) -> Self {
        Self { task, access }
    }

    #[must_use]
    pub fn task(&self) -> &'a Task {
        self.task
    }

    #[must_use]
    pub fn user_id(&self) -> &'a str {
        self.task.user_id()
    }

    /// The item of a simulation task.
    ///
    /// # Errors
    /// Recommendation tasks have no single item; asking for one is misuse.
    pub fn item_id(&self) -> Result<&'a str, AccessError> {
        match self.task {
            Task::Simulation(t) => Ok(&t.item_id),
            Task::Recommendation(_) => Err(AccessError::InvalidArgument(
                "recommendation tasks carry candidates, not a single item".into(),
            )),
        }
    }

    /// Candidates of a recommendation task; empty for simulation tasks.
    #[must_use]
    pub fn candidates(&self) -> &'a [String] {
        match self.task {
            Task::Recommendation(t) => &t.candidate_list,
            Task::Simulation(_) => &[],
        }
    }

    pub fn user(&self) -> Result<Option<Arc<Record>>, AccessError> {
        self.access.get_user(self.user_id())
    }

    pub fn item(&self) -> Result<Option<Arc<Record>>, AccessError> {
        self.access.get_item(self.item_id()?)
    }

    pub fn user_reviews(&self) -> Result<Reviews, AccessError> {
        self.access.get_reviews(&ReviewQuery::by_user(self.user_id()))
    }

    pub fn item_reviews(&self) -> Result<Reviews, AccessError> {
        self.access.get_reviews(&ReviewQuery::by_item(self.item_id()?))
    }

    pub fn get_user(&self, user_id: &str) -> Result<Option<Arc<Record>>, AccessError> {
        self.access.get_user(user_id)
    }

    pub fn get_item(&self, item_id: &str) -> Result<Option<Arc<Record>>, AccessError> {
        self.access.get_item(item_id)
    }

    pub fn get_reviews(&self, query: &ReviewQuery<'_>) -> Result<Reviews, AccessError> {
        self.access.get_reviews(query)
    }
}
