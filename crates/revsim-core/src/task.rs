//! Task descriptors loaded from task files.
//!
//! Each task file holds one JSON object with a `type` discriminator. The
//! discriminator is resolved once, here, into the [`Task`] sum type; nothing
//! downstream compares type strings again.

use crate::error::TaskError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

pub const SIMULATION_TYPE: &str = "user_behavior_simulation";
pub const RECOMMENDATION_TYPE: &str = "recommendation";

/// The two task families an agent can be evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFamily {
    Recommendation,
    Simulation,
}

impl fmt::Display for TaskFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFamily::Recommendation => f.write_str("recommendation"),
            TaskFamily::Simulation => f.write_str("simulation"),
        }
    }
}

/// Simulate the rating and review `user_id` would leave for `item_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationTask {
    pub user_id: String,
    #[serde(alias = "business_id")]
    pub item_id: String,
}

/// Rank `candidate_list` for `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationTask {
    pub user_id: String,
    #[serde(default)]
    pub candidate_category: String,
    #[serde(alias = "candidate_id_list")]
    pub candidate_list: Vec<String>,
    /// `(latitude, longitude)` of the user, when the dataset has one.
    #[serde(default, deserialize_with = "deserialize_loc")]
    pub loc: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Task {
    #[serde(rename = "user_behavior_simulation")]
    Simulation(SimulationTask),
    #[serde(rename = "recommendation")]
    Recommendation(RecommendationTask),
}

impl Task {
    /// Builds a task from the JSON object of a task file.
    ///
    /// # Errors
    /// Fails on a missing or unsupported `type` and on missing task fields.
    pub fn from_json(value: Value) -> Result<Self, TaskError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(TaskError::MissingType)?
            .to_string();

        match kind.as_str() {
            SIMULATION_TYPE => serde_json::from_value(value)
                .map(Task::Simulation)
                .map_err(|source| TaskError::Invalid {
                    kind: SIMULATION_TYPE,
                    source,
                }),
            RECOMMENDATION_TYPE => serde_json::from_value(value)
                .map(Task::Recommendation)
                .map_err(|source| TaskError::Invalid {
                    kind: RECOMMENDATION_TYPE,
                    source,
                }),
            _ => Err(TaskError::UnsupportedType(kind)),
        }
    }

    #[must_use]
    pub fn family(&self) -> TaskFamily {
        match self {
            Task::Simulation(_) => TaskFamily::Simulation,
            Task::Recommendation(_) => TaskFamily::Recommendation,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        match self {
            Task::Simulation(t) => &t.user_id,
            Task::Recommendation(t) => &t.user_id,
        }
    }
}

// Datasets without coordinates ship `null` or `[]`.
fn deserialize_loc<'de, D>(deserializer: D) -> Result<Option<(f64, f64)>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<f64>> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some([]) => Ok(None),
        Some([lat, lon]) => Ok(Some((*lat, *lon))),
        Some(other) => Err(serde::de::Error::invalid_length(
            other.len(),
            &"a [latitude, longitude] pair",
        )),
    }
}
