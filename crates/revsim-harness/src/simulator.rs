//! The simulator ties dataset, tasks, agent and evaluator together.

use crate::error::{HarnessError, Result};
use crate::executor::{self, ExecutionRecord, RunOptions};
use crate::registry::TaskSet;
use revsim_core::{AgentFactory, EntityAccess, Groundtruth, Task};
use revsim_eval::{EvaluationReport, Evaluator, ReviewScorer};
use revsim_store::{GatewayConfig, GatewayMode};
use std::path::Path;
use std::sync::Arc;

/// A benchmark session: load tasks, set an agent, run, evaluate.
///
/// Each `evaluate` call appends its report to the evaluation history.
pub struct Simulator {
    gateway: Option<Arc<dyn EntityAccess>>,
    tasks: TaskSet,
    factory: Option<Arc<dyn AgentFactory>>,
    evaluator: Evaluator,
    outputs: Option<Vec<ExecutionRecord>>,
    history: Vec<EvaluationReport>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self {
            gateway: None,
            tasks: TaskSet::default(),
            factory: None,
            evaluator: Evaluator::default(),
            outputs: None,
            history: Vec::new(),
        }
    }
}

impl Simulator {
    #[must_use]
    pub fn new(gateway: Arc<dyn EntityAccess>) -> Self {
        Self {
            gateway: Some(gateway),
            ..Self::default()
        }
    }

    /// Opens `data_dir` with the requested gateway.
    pub fn open(data_dir: &Path, mode: GatewayMode, config: &GatewayConfig) -> Result<Self> {
        let gateway = revsim_store::open_gateway(data_dir, mode, config)?;
        tracing::info!(data_dir = %data_dir.display(), ?mode, "simulator initialized");
        Ok(Self::new(gateway))
    }

    /// Replaces the text oracle used for simulation scoring.
    #[must_use]
    pub fn with_scorer(mut self, scorer: Box<dyn ReviewScorer>) -> Self {
        self.evaluator = Evaluator::new(scorer);
        self
    }

    pub fn set_gateway(&mut self, gateway: Arc<dyn EntityAccess>) {
        self.gateway = Some(gateway);
    }

    /// Loads tasks and groundtruth, replacing any previous set and
    /// discarding outputs of an earlier run.
    pub fn set_task_and_groundtruth(&mut self, task_dir: &Path, groundtruth_dir: &Path) -> Result<()> {
        self.set_task_set(TaskSet::load(task_dir, groundtruth_dir)?);
        Ok(())
    }

    pub fn set_task_set(&mut self, tasks: TaskSet) {
        self.tasks = tasks;
        self.outputs = None;
    }

    pub fn set_agent(&mut self, factory: Arc<dyn AgentFactory>) {
        tracing::info!(agent = factory.name(), family = %factory.family(), "agent set");
        self.factory = Some(factory);
        self.outputs = None;
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks.tasks
    }

    #[must_use]
    pub fn groundtruth(&self) -> &[Groundtruth] {
        &self.tasks.groundtruth
    }

    /// Runs the agent over the loaded tasks.
    ///
    /// # Errors
    /// No agent or gateway set, or the worker pool could not be built.
    pub fn run(&mut self, options: &RunOptions) -> Result<&[ExecutionRecord]> {
        let factory = self.factory.as_ref().ok_or(HarnessError::AgentNotSet)?;
        let gateway = self.gateway.as_ref().ok_or(HarnessError::GatewayNotSet)?;
        let records = executor::execute(&self.tasks.tasks, &**factory, gateway, options)?;
        Ok(self.outputs.insert(records).as_slice())
    }

    /// Outputs of the last run, if any.
    #[must_use]
    pub fn outputs(&self) -> Option<&[ExecutionRecord]> {
        self.outputs.as_deref()
    }

    /// Scores the last run against the groundtruth.
    ///
    /// # Errors
    /// [`HarnessError::AgentNotSet`] or [`HarnessError::NotExecuted`].
    pub fn evaluate(&mut self) -> Result<EvaluationReport> {
        let family = self
            .factory
            .as_ref()
            .ok_or(HarnessError::AgentNotSet)?
            .family();
        let records = self.outputs.as_ref().ok_or(HarnessError::NotExecuted)?;

        let outputs: Vec<_> = records.iter().map(ExecutionRecord::as_evaluated).collect();
        let report = self
            .evaluator
            .evaluate(family, &outputs, &self.tasks.groundtruth);
        tracing::info!(
            family = %family,
            evaluated = report.data_info.evaluated_count,
            failed = report.data_info.failed_count,
            "evaluation finished"
        );
        self.history.push(report.clone());
        Ok(report)
    }

    /// Every report produced so far, oldest first.
    #[must_use]
    pub fn evaluation_history(&self) -> &[EvaluationReport] {
        &self.history
    }

    #[must_use]
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }
}
