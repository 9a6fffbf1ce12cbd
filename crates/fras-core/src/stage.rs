//! Checkpointed stage execution.
//!
//! The pipeline is a fixed sequence of named stages. A stage that creates a
//! dataset declares its output name; when existence checks are enabled and
//! the output is already in the workspace, the stage is skipped without
//! validating the existing content. That makes a re-run after a partial
//! failure resume from the first missing output, because every completed
//! stage's dataset persists.
//!
//! Field-computation steps declare no output and always execute; they are
//! idempotent by construction (see [`crate::normalize::ensure_field`]).
//!
//! Each stage moves `Pending -> Skipped` or `Pending -> Executed`; the
//! runner records the transition in a report consumed by callers for
//! summaries and tests.

use std::fmt;

use anyhow::{Context, Result};
use tracing::{debug, info};

use fras_engine::Geoprocessor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Skipped,
    Executed,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Skipped => "skipped",
            Self::Executed => "executed",
        };
        f.write_str(label)
    }
}

/// Outcome of one stage or step.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub name: String,
    pub output: Option<String>,
    pub status: StageStatus,
    pub records: Option<usize>,
}

/// Runs stages in declaration order against one workspace engine.
pub struct StageRunner<'e> {
    engine: &'e mut dyn Geoprocessor,
    skip_existing: bool,
    reports: Vec<StageReport>,
}

impl<'e> StageRunner<'e> {
    /// `skip_existing` enables the existence precondition on dataset-creating
    /// stages (the persistent variant); without it every stage runs
    /// unconditionally (the transient variant).
    pub fn new(engine: &'e mut dyn Geoprocessor, skip_existing: bool) -> Self {
        Self {
            engine,
            skip_existing,
            reports: Vec::new(),
        }
    }

    /// Runs a dataset-creating stage unless its output already exists.
    pub fn stage(
        &mut self,
        name: &str,
        output: &str,
        run: impl FnOnce(&mut dyn Geoprocessor) -> Result<()>,
    ) -> Result<()> {
        if self.skip_existing && self.engine.exists(output) {
            debug!(stage = name, output, "output exists; skipping");
            self.reports.push(StageReport {
                name: name.to_string(),
                output: Some(output.to_string()),
                status: StageStatus::Skipped,
                records: self.engine.count(output).ok(),
            });
            return Ok(());
        }
        run(&mut *self.engine).with_context(|| format!("stage {name} failed"))?;
        let records = self.engine.count(output).ok();
        info!(stage = name, output, records, "stage executed");
        self.reports.push(StageReport {
            name: name.to_string(),
            output: Some(output.to_string()),
            status: StageStatus::Executed,
            records,
        });
        Ok(())
    }

    /// Runs an in-place computation step. Steps have no output dataset and
    /// therefore no existence precondition.
    pub fn step(
        &mut self,
        name: &str,
        run: impl FnOnce(&mut dyn Geoprocessor) -> Result<()>,
    ) -> Result<()> {
        run(&mut *self.engine).with_context(|| format!("step {name} failed"))?;
        debug!(step = name, "step executed");
        self.reports.push(StageReport {
            name: name.to_string(),
            output: None,
            status: StageStatus::Executed,
            records: None,
        });
        Ok(())
    }

    pub fn reports(&self) -> &[StageReport] {
        &self.reports
    }

    pub fn into_reports(self) -> Vec<StageReport> {
        self.reports
    }
}
