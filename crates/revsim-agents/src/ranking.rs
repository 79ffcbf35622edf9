//! Recommendation baselines.
//!
//! [`PopularityRanker`] orders candidates by their catalogue rating.
//! [`EpsilonGreedyRanker`] does the same but, with probability `epsilon`,
//! explores by returning a random permutation instead.

use rand::prelude::*;
use rand::rngs::StdRng;
use revsim_core::{Agent, AgentError, AgentOutput, Record, TaskContext};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Rating and popularity read from an item record. Datasets name these
/// fields differently, so each has a fallback.
fn popularity(item: &Record) -> (f64, f64) {
    let rating = item
        .stars()
        .or_else(|| item.f64_field("average_rating"))
        .unwrap_or(0.0);
    let count = item
        .f64_field("review_count")
        .or_else(|| item.f64_field("rating_number"))
        .or_else(|| item.f64_field("ratings_count"))
        .unwrap_or(0.0);
    (rating, count)
}

/// Candidates sorted best-first; unknown items keep their relative order
/// at the end.
fn rank_by_popularity(ctx: &TaskContext<'_>) -> Result<Vec<String>, AgentError> {
    let mut scored = Vec::with_capacity(ctx.candidates().len());
    for candidate in ctx.candidates() {
        let score = ctx.get_item(candidate)?.map(|item| popularity(&item));
        scored.push((candidate.clone(), score));
    }

    scored.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some((ra, ca)), Some((rb, cb))) => rb.total_cmp(ra).then_with(|| cb.total_cmp(ca)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    Ok(scored.into_iter().map(|(id, _)| id).collect())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PopularityRanker;

impl Agent for PopularityRanker {
    fn decide(&mut self, ctx: &TaskContext<'_>) -> Result<AgentOutput, AgentError> {
        rank_by_popularity(ctx).map(AgentOutput::Ranking)
    }
}

/// ε-greedy ranker: explores with a shuffled list, exploits popularity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpsilonGreedyRanker {
    /// Probability of an exploration step, between 0.0 and 1.0.
    pub epsilon: f32,
    /// Base seed; combined with the task so parallel runs stay reproducible.
    pub seed: u64,
}

impl Default for EpsilonGreedyRanker {
    fn default() -> Self {
        Self {
            epsilon: 0.2,
            seed: 0,
        }
    }
}

impl EpsilonGreedyRanker {
    #[must_use]
    pub fn new(epsilon: f32, seed: u64) -> Self {
        let epsilon = if epsilon.is_finite() {
            epsilon.clamp(0.0, 1.0)
        } else {
            Self::default().epsilon
        };
        Self { epsilon, seed }
    }

    fn rng_for(&self, ctx: &TaskContext<'_>) -> StdRng {
        let mut hasher = DefaultHasher::new();
        ctx.user_id().hash(&mut hasher);
        ctx.candidates().hash(&mut hasher);
        StdRng::seed_from_u64(self.seed ^ hasher.finish())
    }
}

impl Agent for EpsilonGreedyRanker {
    fn decide(&mut self, ctx: &TaskContext<'_>) -> Result<AgentOutput, AgentError> {
        let mut rng = self.rng_for(ctx);
        let explore = rng.gen::<f32>() < self.epsilon;
        let ranking = if explore {
            let mut shuffled = ctx.candidates().to_vec();
            shuffled.shuffle(&mut rng);
            shuffled
        } else {
            rank_by_popularity(ctx)?
        };
        #[cfg(feature = "telemetry")]
        tracing::debug!(
            user = ctx.user_id(),
            why = if explore { "explore ε" } else { "exploit popularity" },
            "ranked candidates"
        );
        Ok(AgentOutput::Ranking(ranking))
    }
}
