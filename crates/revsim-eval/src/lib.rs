#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Scoring of agent runs against groundtruth.
//!
//! Outputs and groundtruth are paired by position. When the two sides
//! differ in length both are cut to the shorter one, and the report says
//! how many entries each side originally had. Failed tasks and entries of
//! the wrong family are left out of the aggregates and listed separately.

pub mod recommendation;
pub mod simulation;

pub use recommendation::{RecommendationEvaluator, RecommendationMetrics, HIT_RATE_CUTOFFS};
pub use simulation::{
    NeutralScorer, RatingScale, ReviewScorer, SimulationEvaluator, SimulationMetrics,
    SimulationScore, SimulationWeights, TextErrors,
};

use revsim_core::{AgentOutput, Groundtruth, TaskFamily};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Fallback timestamp when formatting fails
const FALLBACK_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

/// How many entries were evaluated out of what each side supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataInfo {
    pub evaluated_count: usize,
    pub original_simulation_count: usize,
    pub original_ground_truth_count: usize,
    /// Evaluated slots left out of the metrics.
    pub failed_count: usize,
}

/// A slot excluded from the metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedTask {
    pub index: usize,
    pub reason: String,
}

/// Per-task simulation metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMetrics {
    pub index: usize,
    #[serde(flatten)]
    pub metrics: SimulationMetrics,
}

/// Result of one evaluation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    #[serde(rename = "type")]
    pub family: TaskFamily,
    pub metrics: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_metrics: Option<Vec<TaskMetrics>>,
    pub data_info: DataInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ExcludedTask>,
    pub generated_at: String,
}

/// Both scoring strategies behind one entry point.
#[derive(Debug)]
pub struct Evaluator {
    recommendation: RecommendationEvaluator,
    simulation: SimulationEvaluator,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Box::new(NeutralScorer))
    }
}

impl Evaluator {
    #[must_use]
    pub fn new(scorer: Box<dyn ReviewScorer>) -> Self {
        Self {
            recommendation: RecommendationEvaluator::new(),
            simulation: SimulationEvaluator::new(scorer),
        }
    }

    #[must_use]
    pub fn recommendation(&self) -> &RecommendationEvaluator {
        &self.recommendation
    }

    #[must_use]
    pub fn simulation(&self) -> &SimulationEvaluator {
        &self.simulation
    }

    /// Scores `outputs` against `groundtruth` for the given task family.
    ///
    /// Each output is either what the agent returned or the reason its task
    /// failed.
    pub fn evaluate(
        &mut self,
        family: TaskFamily,
        outputs: &[Result<&AgentOutput, &str>],
        groundtruth: &[Groundtruth],
    ) -> EvaluationReport {
        let (sim_count, gt_count) = (outputs.len(), groundtruth.len());
        let evaluated_count = sim_count.min(gt_count);
        if sim_count != gt_count {
            tracing::warn!(
                outputs = sim_count,
                groundtruth = gt_count,
                evaluated = evaluated_count,
                "output and groundtruth counts differ; evaluating the common prefix"
            );
        }

        let mut failures = Vec::new();
        let mut usable = Vec::with_capacity(evaluated_count);
        for (index, (output, truth)) in outputs.iter().zip(groundtruth).enumerate() {
            match pair_for(family, *output, truth) {
                Ok(pair) => usable.push((index, pair)),
                Err(reason) => failures.push(ExcludedTask { index, reason }),
            }
        }
        if !failures.is_empty() {
            tracing::warn!(
                failed = failures.len(),
                evaluated = evaluated_count,
                "excluding failed tasks from metrics"
            );
        }

        let (metrics, detailed_metrics) = match family {
            TaskFamily::Recommendation => {
                let (truths, rankings): (Vec<&str>, Vec<Vec<&str>>) = usable
                    .iter()
                    .filter_map(|(_, pair)| match pair {
                        Pair::Recommendation { truth, ranking } => {
                            Some((*truth, ranking.iter().map(String::as_str).collect()))
                        }
                        Pair::Simulation { .. } => None,
                    })
                    .unzip();
                let metrics = self
                    .recommendation
                    .calculate_hr_at_n(truths.as_slice(), rankings.as_slice());
                (to_map(metrics.named_values()), None)
            }
            TaskFamily::Simulation => {
                let (indexes, pairs): (Vec<usize>, Vec<_>) = usable
                    .iter()
                    .filter_map(|(index, pair)| match pair {
                        Pair::Simulation { review, truth } => Some((*index, (*review, *truth))),
                        Pair::Recommendation { .. } => None,
                    })
                    .unzip();
                let score = self.simulation.calculate_metrics(&pairs);
                let details = indexes
                    .into_iter()
                    .zip(score.details)
                    .map(|(index, metrics)| TaskMetrics { index, metrics })
                    .collect();
                (to_map(score.metrics.named_values()), Some(details))
            }
        };

        EvaluationReport {
            family,
            metrics,
            detailed_metrics,
            data_info: DataInfo {
                evaluated_count,
                original_simulation_count: sim_count,
                original_ground_truth_count: gt_count,
                failed_count: failures.len(),
            },
            failures,
            generated_at: iso8601_now(),
        }
    }
}

enum Pair<'a> {
    Recommendation {
        truth: &'a str,
        ranking: &'a [String],
    },
    Simulation {
        review: &'a revsim_core::SimulatedReview,
        truth: &'a revsim_core::SimulationTruth,
    },
}

fn pair_for<'a>(
    family: TaskFamily,
    output: Result<&'a AgentOutput, &str>,
    truth: &'a Groundtruth,
) -> Result<Pair<'a>, String> {
    let output = output.map_err(str::to_string)?;
    match (family, output, truth) {
        (
            TaskFamily::Recommendation,
            AgentOutput::Ranking(ranking),
            Groundtruth::Recommendation(gt),
        ) => Ok(Pair::Recommendation {
            truth: &gt.item_id,
            ranking,
        }),
        (TaskFamily::Simulation, AgentOutput::Review(review), Groundtruth::Simulation(gt)) => {
            Ok(Pair::Simulation { review, truth: gt })
        }
        _ if output.family() != family => {
            Err(format!("agent returned a {} output", output.family()))
        }
        _ => Err(format!("groundtruth entry is a {} entry", truth.family())),
    }
}

fn to_map(values: Vec<(&'static str, f64)>) -> BTreeMap<String, f64> {
    values
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

fn iso8601_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| FALLBACK_TIMESTAMP.to_string())
}
