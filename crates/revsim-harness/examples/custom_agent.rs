//! Plugging a custom simulation agent and review scorer into the simulator.
//!
//! Usage: `cargo run -p revsim-harness --example custom_agent -- <data_dir> <task_dir> <groundtruth_dir>`

use revsim_core::{
    Agent, AgentError, AgentOutput, FnAgentFactory, SimulatedReview, TaskContext, TaskFamily,
};
use revsim_eval::{ReviewScorer, TextErrors};
use revsim_harness::{RunOptions, Simulator};
use revsim_store::{GatewayConfig, GatewayMode};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Echoes the item's rating and writes a review from its top category.
struct ItemEcho;

impl Agent for ItemEcho {
    fn decide(&mut self, ctx: &TaskContext<'_>) -> Result<AgentOutput, AgentError> {
        let item = ctx.item()?;
        let stars = item.as_ref().and_then(|i| i.stars()).unwrap_or(3.0);
        let category = item
            .as_ref()
            .and_then(|i| i.str_field("categories"))
            .and_then(|c| c.split(',').next())
            .unwrap_or("this place")
            .trim()
            .to_string();

        Ok(AgentOutput::Review(SimulatedReview {
            stars,
            review: format!("Solid {category}, would come back."),
            useful: 0,
            funny: 0,
            cool: 0,
        }))
    }
}

/// Word-overlap stand-in for a real sentiment/topic model.
struct OverlapScorer;

impl ReviewScorer for OverlapScorer {
    fn score(&self, simulated: &str, real: &str) -> TextErrors {
        let words = |s: &str| -> HashSet<String> {
            s.split_whitespace().map(str::to_lowercase).collect()
        };
        let (a, b) = (words(simulated), words(real));
        let union = a.union(&b).count();
        #[allow(clippy::cast_precision_loss)]
        let overlap = if union == 0 {
            1.0
        } else {
            a.intersection(&b).count() as f64 / union as f64
        };
        TextErrors {
            sentiment: 0.0,
            emotion: 0.0,
            topic: 1.0 - overlap,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1).map(PathBuf::from);
    let (Some(data), Some(tasks), Some(truth)) = (args.next(), args.next(), args.next()) else {
        return Err("usage: custom_agent <data_dir> <task_dir> <groundtruth_dir>".into());
    };

    let mut simulator = Simulator::open(&data, GatewayMode::Cached, &GatewayConfig::default())?
        .with_scorer(Box::new(OverlapScorer));
    simulator.set_task_and_groundtruth(&tasks, &truth)?;
    simulator.set_agent(Arc::new(FnAgentFactory::new(
        "item-echo",
        TaskFamily::Simulation,
        || Box::new(ItemEcho) as Box<dyn Agent>,
    )));

    simulator.run(&RunOptions::default())?;
    let report = simulator.evaluate()?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
