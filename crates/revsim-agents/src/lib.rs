//! Baseline agents for both task families.
//!
//! These agents show how the [`Agent`](revsim_core::Agent) contract is
//! implemented and give a reference score to beat. They only read the
//! dataset through the bound [`TaskContext`](revsim_core::TaskContext).

pub mod error;
pub mod ranking;
pub mod simulation;

pub use error::{BaselineError, Result};
pub use ranking::{EpsilonGreedyRanker, PopularityRanker};
pub use simulation::{HistoryMeanSimulator, NEUTRAL_STARS};

use revsim_core::{Agent, AgentFactory, FnAgentFactory, TaskFamily};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Names accepted by [`baseline_factory`].
pub const BASELINE_NAMES: [&str; 3] = ["popularity", "epsilon-greedy", "history-mean"];

/// Tunables shared by the baselines; each agent reads what it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineParams {
    pub epsilon: f32,
    pub seed: u64,
}

impl Default for BaselineParams {
    fn default() -> Self {
        let ranker = EpsilonGreedyRanker::default();
        Self {
            epsilon: ranker.epsilon,
            seed: ranker.seed,
        }
    }
}

/// Builds the factory for the baseline called `name`.
pub fn baseline_factory(name: &str, params: &BaselineParams) -> Result<Arc<dyn AgentFactory>> {
    match name {
        "popularity" => Ok(Arc::new(FnAgentFactory::new(
            name,
            TaskFamily::Recommendation,
            || Box::new(PopularityRanker) as Box<dyn Agent>,
        ))),
        "epsilon-greedy" => {
            if !(0.0..=1.0).contains(&params.epsilon) {
                return Err(BaselineError::InvalidParameter {
                    name: "epsilon",
                    reason: format!("{} is outside 0.0..=1.0", params.epsilon),
                });
            }
            let ranker = EpsilonGreedyRanker::new(params.epsilon, params.seed);
            Ok(Arc::new(FnAgentFactory::new(
                name,
                TaskFamily::Recommendation,
                move || Box::new(ranker.clone()) as Box<dyn Agent>,
            )))
        }
        "history-mean" => Ok(Arc::new(FnAgentFactory::new(
            name,
            TaskFamily::Simulation,
            || Box::new(HistoryMeanSimulator) as Box<dyn Agent>,
        ))),
        other => Err(BaselineError::UnknownAgent(other.to_string())),
    }
}
