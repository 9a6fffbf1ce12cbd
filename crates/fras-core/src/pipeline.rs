//! Orchestration of the full fire-history build.
//!
//! One parameterized sequence serves both builds. The persistent variant
//! checkpoints every dataset-creating stage on its output's existence, so an
//! interrupted run resumes from the first missing dataset; it finishes with
//! the BREPS pair. The transient variant runs every stage unconditionally
//! against a throwaway workspace and emits the single FRAS dataset.

use anyhow::Result;
use tracing::info;

use fras_engine::{Geoprocessor, SortKey, SpatialTiebreak};

use crate::BURN_DATE_FIELD;
use crate::adapters::{lastlog, nsw, south_australia, victoria};
use crate::dates::DateErrorPolicy;
use crate::finalize::prune_to_canonical;
use crate::stage::{StageReport, StageRunner};

/// Dataset names produced in the working storage location.
pub mod datasets {
    pub const NPWS_ERASED: &str = "NPWS_FH23_VG94_Er";
    pub const TREATED_SELECT: &str = "FIRE_HISTORY_TREATED_Select";
    pub const MINCOVER: &str = "FIRE_HISTORY_vg94_mincover";
    pub const BUSHFIRES: &str = "FIRE_HISTORY_vg94_Bushfires";
    pub const BURNS: &str = "FIRE_HISTORY_vg94_Burns";
    pub const BURNS_TREATABLE: &str = "FIRE_HISTORY_vg94_Burns_Treatable";
    pub const LASTLOG_FILTERED: &str = "LASTLOG25_filter";
    pub const LASTLOG_DATED: &str = "LASTLOG25_dates";
    pub const LASTLOG_PROJECTED: &str = "LASTLOG_vg94_DF";
    pub const VICTORIA_MERGED: &str = "FIRE_HISTORY_vg94_merge1";
    pub const VICTORIA_CLIPPED: &str = "FIRE_HISTORY_vg94_merge1_Cli";
    pub const SA_ERASED: &str = "SA_FH23_VG94_Er";
    pub const STATE_MERGED: &str = "FH_merge";
    pub const STATE_PROJECTED: &str = "FH_merge_vg94";
    pub const BREPS_FINAL: &str = "BREPS_FireHistory_2025";
    pub const BREPS_CLEAN: &str = "BREPS_FireHistory_2025_Clean";
    pub const FRAS_FINAL: &str = "FRAS_FireHistory_2025";
}

/// Names of the externally supplied input datasets.
#[derive(Debug, Clone)]
pub struct InputLayers {
    pub nsw: String,
    pub vic_boundary: String,
    pub deeca_treated: String,
    pub ecofire_exclusion: String,
    pub lastlog: String,
    pub sa: String,
}

impl Default for InputLayers {
    fn default() -> Self {
        Self {
            nsw: "NPWSFireHistory".to_string(),
            vic_boundary: "VicShape_vg94".to_string(),
            deeca_treated: "FIRE_HISTORY_TREATED".to_string(),
            ecofire_exclusion: "ECOFIRE_NotfeasibletotreatLow".to_string(),
            lastlog: "LASTLOG25".to_string(),
            sa: "FIREMGT_FireHistory_GDA94".to_string(),
        }
    }
}

/// Which build to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Checkpointed build over durable storage; emits the BREPS pair.
    #[default]
    Persistent,
    /// Unconditional build over throwaway storage; emits the FRAS dataset.
    Transient,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub variant: Variant,
    pub date_errors: DateErrorPolicy,
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct PipelineRun {
    pub reports: Vec<StageReport>,
    /// Name of the terminal dataset.
    pub output: String,
}

/// Runs the whole build against `engine`.
///
/// Missing input datasets surface as engine errors from the first stage
/// that needs them; nothing is pre-validated.
pub fn run(
    engine: &mut dyn Geoprocessor,
    inputs: &InputLayers,
    options: &PipelineOptions,
) -> Result<PipelineRun> {
    let skip_existing = matches!(options.variant, Variant::Persistent);
    let mut runner = StageRunner::new(engine, skip_existing);

    nsw::erase(&mut runner, inputs)?;
    victoria::run(&mut runner, inputs, options)?;
    lastlog::run(&mut runner, inputs, options)?;

    runner.stage("victoria_merge", datasets::VICTORIA_MERGED, |engine| {
        engine
            .merge(
                &[
                    datasets::BUSHFIRES,
                    datasets::BURNS_TREATABLE,
                    datasets::LASTLOG_PROJECTED,
                ],
                datasets::VICTORIA_MERGED,
            )
            .map_err(Into::into)
    })?;
    runner.stage("victoria_clip", datasets::VICTORIA_CLIPPED, |engine| {
        engine
            .clip(
                datasets::VICTORIA_MERGED,
                &inputs.vic_boundary,
                datasets::VICTORIA_CLIPPED,
            )
            .map_err(Into::into)
    })?;

    south_australia::run(&mut runner, inputs, options)?;
    nsw::normalize(&mut runner, options)?;

    runner.stage("state_merge", datasets::STATE_MERGED, |engine| {
        engine
            .merge(
                &[
                    datasets::NPWS_ERASED,
                    datasets::VICTORIA_CLIPPED,
                    datasets::SA_ERASED,
                ],
                datasets::STATE_MERGED,
            )
            .map_err(Into::into)
    })?;
    runner.stage("state_project", datasets::STATE_PROJECTED, |engine| {
        let vicgrid = engine.resolve_spatial_ref(3111)?;
        engine
            .project(datasets::STATE_MERGED, datasets::STATE_PROJECTED, vicgrid)
            .map_err(Into::into)
    })?;

    runner.step("final_prune", |engine| {
        prune_to_canonical(engine, datasets::STATE_PROJECTED)
    })?;

    let final_output = match options.variant {
        Variant::Persistent => datasets::BREPS_FINAL,
        Variant::Transient => datasets::FRAS_FINAL,
    };
    runner.stage("final_sort", final_output, |engine| {
        engine
            .sort(
                datasets::STATE_PROJECTED,
                final_output,
                &[SortKey::descending(BURN_DATE_FIELD)],
                SpatialTiebreak::UpperRight,
            )
            .map_err(Into::into)
    })?;
    if matches!(options.variant, Variant::Persistent) {
        runner.stage("final_copy", datasets::BREPS_CLEAN, |engine| {
            engine
                .copy(datasets::BREPS_FINAL, datasets::BREPS_CLEAN)
                .map_err(Into::into)
        })?;
    }

    info!(output = final_output, "fire history build complete");
    Ok(PipelineRun {
        reports: runner.into_reports(),
        output: final_output.to_string(),
    })
}
