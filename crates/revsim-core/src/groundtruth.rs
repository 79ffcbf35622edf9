//! Expected outcomes, one per groundtruth file.
//!
//! Groundtruth entries carry no task id. They are matched to tasks by
//! position, so both directories must be loaded in the same deterministic
//! order.

use crate::task::TaskFamily;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationTruth {
    #[serde(rename = "ground truth", alias = "ground_truth")]
    pub item_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationTruth {
    pub stars: f64,
    #[serde(alias = "text")]
    pub review: String,
    #[serde(default)]
    pub useful: u64,
    #[serde(default)]
    pub funny: u64,
    #[serde(default)]
    pub cool: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Groundtruth {
    Recommendation(RecommendationTruth),
    Simulation(SimulationTruth),
}

impl Groundtruth {
    #[must_use]
    pub fn family(&self) -> TaskFamily {
        match self {
            Groundtruth::Recommendation(_) => TaskFamily::Recommendation,
            Groundtruth::Simulation(_) => TaskFamily::Simulation,
        }
    }
}
