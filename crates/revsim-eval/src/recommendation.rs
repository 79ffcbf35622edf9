use serde::{Deserialize, Serialize};

/// Ranking cutoffs the hit rate is reported at.
pub const HIT_RATE_CUTOFFS: [usize; 3] = [1, 3, 5];

/// Hit rates of one evaluation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationMetrics {
    pub hr_at_1: f64,
    pub hr_at_3: f64,
    pub hr_at_5: f64,
    /// Mean of the three hit rates.
    pub average_hr: f64,
    /// Number of scored (groundtruth, ranking) pairs.
    pub total: usize,
    pub hits_at_1: usize,
    pub hits_at_3: usize,
    pub hits_at_5: usize,
}

impl RecommendationMetrics {
    #[must_use]
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        #[allow(clippy::cast_precision_loss)]
        {
            vec![
                ("hr_at_1", self.hr_at_1),
                ("hr_at_3", self.hr_at_3),
                ("hr_at_5", self.hr_at_5),
                ("average_hr", self.average_hr),
                ("total", self.total as f64),
                ("hits_at_1", self.hits_at_1 as f64),
                ("hits_at_3", self.hits_at_3 as f64),
                ("hits_at_5", self.hits_at_5 as f64),
            ]
        }
    }
}

/// Scores ranked candidate lists against the single correct item.
#[derive(Debug, Default)]
pub struct RecommendationEvaluator {
    history: Vec<RecommendationMetrics>,
}

impl RecommendationEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hit rate at 1, 3 and 5 over positionally paired inputs.
    ///
    /// A pair hits at `n` when the groundtruth id is among the first `n`
    /// predictions (exact match). Extra entries on either side are ignored.
    /// The result is appended to the metrics history.
    pub fn calculate_hr_at_n<G, P>(
        &mut self,
        ground_truth: &[G],
        predictions: &[Vec<P>],
    ) -> RecommendationMetrics
    where
        G: AsRef<str>,
        P: AsRef<str>,
    {
        let mut hits = [0usize; HIT_RATE_CUTOFFS.len()];
        let mut total = 0usize;

        for (gt, ranking) in ground_truth.iter().zip(predictions) {
            total += 1;
            let gt = gt.as_ref();
            let rank = ranking.iter().position(|candidate| candidate.as_ref() == gt);
            for (slot, n) in HIT_RATE_CUTOFFS.iter().enumerate() {
                if rank.is_some_and(|r| r < *n) {
                    hits[slot] += 1;
                }
            }
        }

        let rate = |hits: usize| {
            if total == 0 {
                return 0.0;
            }
            #[allow(clippy::cast_precision_loss)]
            {
                hits as f64 / total as f64
            }
        };

        let (hr_at_1, hr_at_3, hr_at_5) = (rate(hits[0]), rate(hits[1]), rate(hits[2]));
        let metrics = RecommendationMetrics {
            hr_at_1,
            hr_at_3,
            hr_at_5,
            average_hr: (hr_at_1 + hr_at_3 + hr_at_5) / 3.0,
            total,
            hits_at_1: hits[0],
            hits_at_3: hits[1],
            hits_at_5: hits[2],
        };
        self.history.push(metrics.clone());
        metrics
    }

    #[must_use]
    pub fn metrics_history(&self) -> &[RecommendationMetrics] {
        &self.history
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn hit_rates_follow_rank_position() {
        let mut evaluator = RecommendationEvaluator::new();
        let metrics = evaluator.calculate_hr_at_n(
            &["A", "B"],
            &[vec!["A", "X", "Y"], vec!["Z", "B", "W"]],
        );

        assert_eq!(metrics.hr_at_1, 0.5);
        assert_eq!(metrics.hr_at_3, 1.0);
        assert_eq!(metrics.hr_at_5, 1.0);
        assert_eq!(metrics.hits_at_1, 1);
        assert_eq!(metrics.total, 2);
        assert!((metrics.average_hr - 2.5 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn rank_beyond_five_is_a_miss() {
        let mut evaluator = RecommendationEvaluator::new();
        let ranking: Vec<String> = (0..10).map(|i| format!("c{i}")).collect();
        let metrics = evaluator.calculate_hr_at_n(&["c4", "c5"], &[ranking.clone(), ranking]);

        assert_eq!(metrics.hits_at_3, 0);
        assert_eq!(metrics.hits_at_5, 1);
        assert_eq!(metrics.hr_at_5, 0.5);
    }

    #[test]
    fn empty_input_yields_zero_rates() {
        let mut evaluator = RecommendationEvaluator::new();
        let metrics = evaluator.calculate_hr_at_n::<&str, &str>(&[], &[]);

        assert_eq!(metrics, RecommendationMetrics::default());
    }

    #[test]
    fn matching_is_exact() {
        let mut evaluator = RecommendationEvaluator::new();
        let metrics = evaluator.calculate_hr_at_n(&["abc"], &[vec!["ABC", "abc "]]);
        assert_eq!(metrics.hits_at_5, 0);
    }

    #[test]
    fn every_call_is_kept_in_history() {
        let mut evaluator = RecommendationEvaluator::new();
        evaluator.calculate_hr_at_n(&["A"], &[vec!["A"]]);
        evaluator.calculate_hr_at_n(&["A"], &[vec!["B"]]);

        let history = evaluator.metrics_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].hr_at_1, 1.0);
        assert_eq!(history[1].hr_at_1, 0.0);
    }
}
