//! Environment setup pipeline.
//!
//! An ordered list of named steps, each tried once. A step reports `Ok`,
//! `Warning`, or `Fatal`; the driver continues past warnings and halts at
//! the first fatal outcome.

mod steps;

use std::future::Future;
use std::pin::Pin;

use tracing::{info, warn};

use crate::config::DemoConfig;
use crate::context::ServiceContext;

pub use steps::{CommandStep, ConceptTasksStep, DashboardImportStep, ReadinessStep};

/// Boxed future returned by [`Step::run`].
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = StepOutcome> + Send + 'a>>;

/// Tri-state outcome of one step, with a one-line message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step did what it set out to do.
    Ok(String),
    /// The step fell short; the pipeline continues.
    Warning(String),
    /// The pipeline cannot continue.
    Fatal(String),
}

impl StepOutcome {
    /// Short label for reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok(_) => "ok",
            Self::Warning(_) => "warning",
            Self::Fatal(_) => "fatal",
        }
    }

    /// The step's message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Ok(m) | Self::Warning(m) | Self::Fatal(m) => m,
        }
    }
}

/// One named pipeline step.
pub trait Step: Send + Sync {
    /// Stable step name, e.g. `dashboard-import`.
    fn name(&self) -> &str;

    /// Runs the step once.
    fn run<'a>(&'a self, ctx: &'a ServiceContext) -> StepFuture<'a>;
}

/// Outcome of one executed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Step name.
    pub name: String,
    /// What happened.
    pub outcome: StepOutcome,
}

/// Outcome of a whole pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Executed steps in order; steps after a fatal one are absent.
    pub steps: Vec<StepReport>,
    /// Set when a step returned [`StepOutcome::Fatal`].
    pub halted: bool,
}

impl PipelineReport {
    /// Number of steps that returned a warning.
    #[must_use]
    pub fn warnings(&self) -> usize {
        self.steps.iter().filter(|s| matches!(s.outcome, StepOutcome::Warning(_))).count()
    }
}

/// Ordered sequence of steps.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Names of the steps, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// The full environment setup sequence.
    #[must_use]
    pub fn environment(config: &DemoConfig) -> Self {
        Self::new()
            .step(ReadinessStep::gate(config))
            .step(CommandStep::historical_data(config))
            .step(CommandStep::telemetry_load(config))
            .step(DashboardImportStep::new(config))
            .step(ConceptTasksStep::new(config.state_dir()))
            .step(ReadinessStep::verification(config))
    }

    /// Runs the steps in order, calling `on_step` after each one.
    pub async fn run(
        &self,
        ctx: &ServiceContext,
        mut on_step: impl FnMut(&StepReport),
    ) -> PipelineReport {
        let mut report = PipelineReport::default();
        for step in &self.steps {
            info!(step = step.name(), "starting");
            let outcome = step.run(ctx).await;
            let fatal = matches!(outcome, StepOutcome::Fatal(_));
            if !matches!(outcome, StepOutcome::Ok(_)) {
                warn!(step = step.name(), outcome = outcome.label(), message = outcome.message());
            }
            let step_report = StepReport { name: step.name().to_string(), outcome };
            on_step(&step_report);
            report.steps.push(step_report);
            if fatal {
                report.halted = true;
                break;
            }
        }
        report
    }
}
