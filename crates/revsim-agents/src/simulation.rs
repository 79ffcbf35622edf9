//! Review simulation baseline.

use revsim_core::{Agent, AgentError, AgentOutput, Record, SimulatedReview, TaskContext};

/// Rating used when neither the user nor the item carries one.
pub const NEUTRAL_STARS: f64 = 3.0;

/// Predicts the user's mean rating and reuses their latest review text.
///
/// Falls back to the item's rating, then [`NEUTRAL_STARS`]. The prediction
/// is rounded to the nearest half star within `1.0..=5.0`. Without any
/// review by the user the item's latest review text is used instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct HistoryMeanSimulator;

impl Agent for HistoryMeanSimulator {
    fn decide(&mut self, ctx: &TaskContext<'_>) -> Result<AgentOutput, AgentError> {
        let user_reviews = ctx.user_reviews()?;

        let stars = match mean_stars(&user_reviews) {
            Some(mean) => mean,
            None => ctx
                .item()?
                .and_then(|item| item.stars())
                .unwrap_or(NEUTRAL_STARS),
        };

        let review = match latest_text(&user_reviews) {
            Some(text) => text.to_string(),
            None => {
                let item_reviews = ctx.item_reviews()?;
                latest_text(&item_reviews).unwrap_or_default().to_string()
            }
        };

        Ok(AgentOutput::Review(SimulatedReview {
            stars: round_to_half(stars),
            review,
            useful: 0,
            funny: 0,
            cool: 0,
        }))
    }
}

fn mean_stars(reviews: &[Record]) -> Option<f64> {
    let stars: Vec<f64> = reviews
        .iter()
        .filter_map(Record::stars)
        .filter(|s| s.is_finite())
        .collect();
    if stars.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = stars.len() as f64;
    Some(stars.iter().sum::<f64>() / n)
}

// Dates compare lexically; undated reviews lose to dated ones.
fn latest_text(reviews: &[Record]) -> Option<&str> {
    reviews
        .iter()
        .filter(|r| r.text().is_some_and(|t| !t.trim().is_empty()))
        .max_by(|a, b| a.date().cmp(&b.date()))
        .and_then(Record::text)
}

fn round_to_half(stars: f64) -> f64 {
    ((stars * 2.0).round() / 2.0).clamp(1.0, 5.0)
}
