//! CLI for revsim.
//!
//! `run` evaluates a baseline agent over a task set; `lookup` queries a
//! dataset directly. Reports and records are printed as JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use revsim_agents::{baseline_factory, BaselineParams, BASELINE_NAMES};
use revsim_core::{ReviewQuery, TaskFamily};
use revsim_harness::{RunConfig, Simulator};
use revsim_store::{open_gateway, GatewayConfig, GatewayMode};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an agent over a task set and evaluate it
    Run(RunArgs),
    /// Look up users, items or reviews in a dataset
    Lookup {
        /// Dataset directory holding user, item and review collections
        #[arg(long)]
        data_dir: PathBuf,

        /// Load the whole dataset into memory instead of scanning lazily
        #[arg(long)]
        in_memory: bool,

        #[command(subcommand)]
        target: LookupTarget,
    },
}

#[derive(Subcommand)]
enum LookupTarget {
    /// A single user
    User { id: String },
    /// A single item
    Item { id: String },
    /// Reviews by review id, item or user (first given wins, in that order)
    Reviews {
        #[arg(long)]
        review: Option<String>,
        #[arg(long)]
        item: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// JSON config file; flags given here override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dataset directory holding user, item and review collections
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory of task files
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// Directory of groundtruth files
    #[arg(long)]
    groundtruth: Option<PathBuf>,

    /// Baseline agent to run
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(BASELINE_NAMES))]
    agent: Option<String>,

    /// Exploration probability of the epsilon-greedy ranker
    #[arg(long)]
    epsilon: Option<f32>,

    /// Seed for randomized agents
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (default: 10)
    #[arg(long)]
    workers: Option<usize>,

    /// Run tasks one after another on the main thread
    #[arg(long)]
    no_threading: bool,

    /// Run only the first N tasks
    #[arg(long)]
    limit: Option<usize>,

    /// Entries per LRU cache (default: 10000)
    #[arg(long)]
    cache_capacity: Option<usize>,

    /// Load the whole dataset into memory instead of scanning lazily
    #[arg(long)]
    in_memory: bool,

    /// Write the evaluation report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write the per-task outputs here
    #[arg(long)]
    outputs: Option<PathBuf>,
}

impl RunArgs {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.tasks {
            config.task_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.groundtruth {
            config.groundtruth_dir = Some(dir.clone());
        }
        if let Some(agent) = &self.agent {
            config.agent = Some(agent.clone());
        }
        if let Some(workers) = self.workers {
            config.run.max_workers = workers;
        }
        if self.no_threading {
            config.run.threading = false;
        }
        if self.limit.is_some() {
            config.run.task_limit = self.limit;
        }
        if let Some(capacity) = self.cache_capacity {
            config.cache.cache_capacity = capacity;
        }
        if self.in_memory {
            config.gateway = GatewayMode::InMemory;
        }
    }

    fn baseline_params(&self, config: &RunConfig) -> Result<BaselineParams> {
        let mut params: BaselineParams = if config.agent_params.is_null() {
            BaselineParams::default()
        } else {
            serde_json::from_value(config.agent_params.clone())
                .context("Invalid agent_params in config")?
        };
        if let Some(epsilon) = self.epsilon {
            params.epsilon = epsilon;
        }
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        Ok(params)
    }
}

fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(args: &RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RunConfig::default(),
    };
    args.apply(&mut config);

    let data_dir = config
        .data_dir
        .as_deref()
        .context("--data-dir is required (flag or config file)")?;
    let task_dir = config
        .task_dir
        .as_deref()
        .context("--tasks is required (flag or config file)")?;
    let groundtruth_dir = config
        .groundtruth_dir
        .as_deref()
        .context("--groundtruth is required (flag or config file)")?;
    let agent = config
        .agent
        .as_deref()
        .context("--agent is required (flag or config file)")?;

    let factory = baseline_factory(agent, &args.baseline_params(&config)?)?;
    if factory.family() == TaskFamily::Simulation {
        tracing::warn!("no review scorer configured; sentiment, emotion and topic errors are reported as 0");
    }

    let mut simulator = Simulator::open(data_dir, config.gateway, &config.cache)
        .with_context(|| format!("Failed to open dataset {}", data_dir.display()))?;
    simulator
        .set_task_and_groundtruth(task_dir, groundtruth_dir)
        .context("Failed to load tasks")?;
    simulator.set_agent(factory);

    let records = simulator.run(&config.run).context("Run failed")?;
    if let Some(path) = &args.outputs {
        save_json(path, records).context("Failed to save outputs")?;
    }

    let report = simulator.evaluate().context("Evaluation failed")?;
    match &args.output {
        Some(path) => save_json(path, &report).context("Failed to save report")?,
        None => print_json(&report)?,
    }
    Ok(())
}

fn lookup(data_dir: &Path, in_memory: bool, target: &LookupTarget) -> Result<()> {
    let mode = if in_memory {
        GatewayMode::InMemory
    } else {
        GatewayMode::Cached
    };
    let gateway = open_gateway(data_dir, mode, &GatewayConfig::default())
        .with_context(|| format!("Failed to open dataset {}", data_dir.display()))?;

    match target {
        LookupTarget::User { id } => print_json(&gateway.get_user(id)?.as_deref()),
        LookupTarget::Item { id } => print_json(&gateway.get_item(id)?.as_deref()),
        LookupTarget::Reviews { review, item, user } => {
            let query = ReviewQuery {
                review_id: review.as_deref(),
                item_id: item.as_deref(),
                user_id: user.as_deref(),
            };
            print_json(gateway.get_reviews(&query)?.as_slice())
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Run(args) => run(args),
        Commands::Lookup {
            data_dir,
            in_memory,
            target,
        } => lookup(data_dir, *in_memory, target),
    }
}
