//! Error of simulated reviews against the real ones.
//!
//! Star ratings are scored here. The text terms (sentiment, emotion, topic)
//! come from a [`ReviewScorer`] the caller injects; this module only clamps
//! and combines them.

use revsim_core::{SimulatedReview, SimulationTruth};
use serde::{Deserialize, Serialize};

/// Error terms a scorer reports for one (simulated, real) review pair, each
/// expected in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextErrors {
    pub sentiment: f64,
    pub emotion: f64,
    pub topic: f64,
}

/// Oracle comparing two review texts.
pub trait ReviewScorer: Send + Sync {
    fn score(&self, simulated: &str, real: &str) -> TextErrors;
}

/// Scorer that reports no text error at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralScorer;

impl ReviewScorer for NeutralScorer {
    fn score(&self, _simulated: &str, _real: &str) -> TextErrors {
        TextErrors::default()
    }
}

/// Valid rating range; simulated stars are clamped into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: f64,
    pub max: f64,
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 0.0, max: 5.0 }
    }
}

impl RatingScale {
    /// `|clamp(simulated) - real|` normalized by the scale width.
    #[must_use]
    pub fn star_error(&self, simulated: f64, real: f64) -> f64 {
        let width = self.max - self.min;
        if width <= 0.0 {
            return 0.0;
        }
        let simulated = if simulated.is_finite() {
            simulated.clamp(self.min, self.max)
        } else {
            self.min
        };
        let real = real.clamp(self.min, self.max);
        (simulated - real).abs() / width
    }
}

/// Fixed weights of the overall error.
///
/// `overall = star * star_share + (sentiment * sentiment + emotion * emotion
/// + topic * topic) * review_share`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationWeights {
    pub star_share: f64,
    pub review_share: f64,
    pub sentiment: f64,
    pub emotion: f64,
    pub topic: f64,
}

impl Default for SimulationWeights {
    fn default() -> Self {
        Self {
            star_share: 0.5,
            review_share: 0.5,
            sentiment: 0.25,
            emotion: 0.25,
            topic: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    pub star_error: f64,
    pub sentiment_error: f64,
    pub emotion_error: f64,
    pub topic_error: f64,
    pub overall_error: f64,
}

impl SimulationMetrics {
    #[must_use]
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("star_error", self.star_error),
            ("sentiment_error", self.sentiment_error),
            ("emotion_error", self.emotion_error),
            ("topic_error", self.topic_error),
            ("overall_error", self.overall_error),
        ]
    }

    fn mean(all: &[SimulationMetrics]) -> Self {
        if all.is_empty() {
            return Self::default();
        }
        #[allow(clippy::cast_precision_loss)]
        let n = all.len() as f64;
        let avg = |f: fn(&SimulationMetrics) -> f64| all.iter().map(f).sum::<f64>() / n;
        Self {
            star_error: avg(|m| m.star_error),
            sentiment_error: avg(|m| m.sentiment_error),
            emotion_error: avg(|m| m.emotion_error),
            topic_error: avg(|m| m.topic_error),
            overall_error: avg(|m| m.overall_error),
        }
    }
}

/// Batch mean plus the per-pair breakdown it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationScore {
    pub metrics: SimulationMetrics,
    pub details: Vec<SimulationMetrics>,
}

pub struct SimulationEvaluator {
    scorer: Box<dyn ReviewScorer>,
    scale: RatingScale,
    weights: SimulationWeights,
    history: Vec<SimulationMetrics>,
}

impl SimulationEvaluator {
    pub fn new(scorer: Box<dyn ReviewScorer>) -> Self {
        Self {
            scorer,
            scale: RatingScale::default(),
            weights: SimulationWeights::default(),
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: RatingScale) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn scale(&self) -> RatingScale {
        self.scale
    }

    /// Scores a single pair without touching the history.
    #[must_use]
    pub fn score_pair(&self, simulated: &SimulatedReview, real: &SimulationTruth) -> SimulationMetrics {
        let star_error = self.scale.star_error(simulated.stars, real.stars);
        let text = self.scorer.score(&simulated.review, &real.review);
        let (sentiment_error, emotion_error, topic_error) =
            (unit(text.sentiment), unit(text.emotion), unit(text.topic));

        let w = self.weights;
        let review_error =
            sentiment_error * w.sentiment + emotion_error * w.emotion + topic_error * w.topic;
        SimulationMetrics {
            star_error,
            sentiment_error,
            emotion_error,
            topic_error,
            overall_error: star_error * w.star_share + review_error * w.review_share,
        }
    }

    /// Scores every pair and appends the batch mean to the history.
    pub fn calculate_metrics(
        &mut self,
        pairs: &[(&SimulatedReview, &SimulationTruth)],
    ) -> SimulationScore {
        let details: Vec<_> = pairs
            .iter()
            .map(|(simulated, real)| self.score_pair(simulated, real))
            .collect();
        let metrics = SimulationMetrics::mean(&details);
        self.history.push(metrics);
        SimulationScore { metrics, details }
    }

    #[must_use]
    pub fn metrics_history(&self) -> &[SimulationMetrics] {
        &self.history
    }
}

impl std::fmt::Debug for SimulationEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationEvaluator")
            .field("scale", &self.scale)
            .field("weights", &self.weights)
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

// An oracle answering NaN is treated as maximally wrong.
fn unit(value: f64) -> f64 {
    if value.is_nan() {
        1.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    struct FixedScorer(TextErrors);

    impl ReviewScorer for FixedScorer {
        fn score(&self, _simulated: &str, _real: &str) -> TextErrors {
            self.0
        }
    }

    fn simulated(stars: f64) -> SimulatedReview {
        SimulatedReview {
            stars,
            review: "Loved it".into(),
            useful: 0,
            funny: 0,
            cool: 0,
        }
    }

    fn truth(stars: f64) -> SimulationTruth {
        SimulationTruth {
            stars,
            review: "Great".into(),
            useful: 1,
            funny: 0,
            cool: 0,
        }
    }

    #[test]
    fn star_error_clamps_before_differencing() {
        let scale = RatingScale::default();
        assert_eq!(scale.star_error(7.0, 5.0), 0.0);
        assert_eq!(scale.star_error(-3.0, 1.0), 0.2);
        assert_eq!(scale.star_error(1.0, 5.0), 0.8);
    }

    #[test]
    fn overall_error_uses_fixed_weights() {
        let evaluator = SimulationEvaluator::new(Box::new(FixedScorer(TextErrors {
            sentiment: 0.4,
            emotion: 0.2,
            topic: 0.1,
        })));
        let metrics = evaluator.score_pair(&simulated(4.0), &truth(5.0));

        // star 0.2; review 0.4*0.25 + 0.2*0.25 + 0.1*0.5 = 0.2
        assert!((metrics.star_error - 0.2).abs() < 1e-12);
        assert!((metrics.overall_error - 0.2).abs() < 1e-12);
    }

    #[test]
    fn oracle_values_are_clamped_to_unit_interval() {
        let evaluator = SimulationEvaluator::new(Box::new(FixedScorer(TextErrors {
            sentiment: 3.0,
            emotion: -1.0,
            topic: f64::NAN,
        })));
        let metrics = evaluator.score_pair(&simulated(5.0), &truth(5.0));

        assert_eq!(metrics.sentiment_error, 1.0);
        assert_eq!(metrics.emotion_error, 0.0);
        assert_eq!(metrics.topic_error, 1.0);
    }

    #[test]
    fn batch_mean_is_recorded_in_history() {
        let mut evaluator = SimulationEvaluator::new(Box::new(NeutralScorer));
        let (a, b) = (simulated(5.0), simulated(0.0));
        let (ta, tb) = (truth(5.0), truth(5.0));

        let score = evaluator.calculate_metrics(&[(&a, &ta), (&b, &tb)]);
        assert_eq!(score.details.len(), 2);
        assert_eq!(score.metrics.star_error, 0.5);
        assert_eq!(score.metrics.overall_error, 0.25);

        evaluator.calculate_metrics(&[]);
        assert_eq!(evaluator.metrics_history().len(), 2);
        assert_eq!(evaluator.metrics_history()[1], SimulationMetrics::default());
    }
}
