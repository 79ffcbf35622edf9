use crate::task::TaskFamily;
use serde::{Deserialize, Serialize};

/// A simulated rating and review for one user-item pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedReview {
    #[serde(alias = "star")]
    pub stars: f64,
    pub review: String,
    #[serde(default)]
    pub useful: u64,
    #[serde(default)]
    pub funny: u64,
    #[serde(default)]
    pub cool: u64,
}

/// What an agent returns from a single decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentOutput {
    /// Candidate item ids, best first.
    Ranking(Vec<String>),
    Review(SimulatedReview),
}

impl AgentOutput {
    #[must_use]
    pub fn family(&self) -> TaskFamily {
        match self {
            AgentOutput::Ranking(_) => TaskFamily::Recommendation,
            AgentOutput::Review(_) => TaskFamily::Simulation,
        }
    }
}
