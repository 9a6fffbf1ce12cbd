//! Logging history (LASTLOG).
//!
//! Harvested coupes count as fire history when the silvicultural system
//! implies a regeneration burn. Coupes without an end date cannot be placed
//! on the timeline and are excluded outright.

use anyhow::Result;

use fras_engine::Geoprocessor;
use fras_model::Record;

use crate::pipeline::{InputLayers, PipelineOptions, datasets};
use crate::stage::StageRunner;

use super::{drop_fields_if_present, populate_burn_date, tag_source};

/// Silvicultural systems admitted as burn-equivalent history.
pub const SILVICULTURE_SYSTEMS: [&str; 4] = ["CFE", "GSE", "RRH", "STR"];

const DROP_FIELDS: [&str; 23] = [
    "LOGHISTID",
    "FMA",
    "COUPEADD",
    "COMPART",
    "COUPENO",
    "BLOCK",
    "DECADE",
    "SEASON",
    "SILVSYS",
    "FORESTYPE",
    "STARTDATE",
    "MAPLOGSRC",
    "LH_ID",
    "COUPE_NAME",
    "ENDDATE",
    "HARV_ORG",
    "HECTARES",
    "X_FMA",
    "AREASQM",
    "X_SILVSYS",
    "X_BLOCK",
    "X_FORETYPE",
    "SECTION_SD",
];

pub fn run(
    runner: &mut StageRunner<'_>,
    inputs: &InputLayers,
    options: &PipelineOptions,
) -> Result<()> {
    let policy = options.date_errors;

    runner.stage("lastlog_system_select", datasets::LASTLOG_FILTERED, |engine| {
        engine
            .select(&inputs.lastlog, datasets::LASTLOG_FILTERED, &|record: &Record<'_>| {
                matches!(record.text("SILVSYS"), Some(system) if SILVICULTURE_SYSTEMS.contains(&system))
            })
            .map_err(Into::into)
    })?;

    runner.stage("lastlog_date_select", datasets::LASTLOG_DATED, |engine| {
        engine
            .select(
                datasets::LASTLOG_FILTERED,
                datasets::LASTLOG_DATED,
                &|record: &Record<'_>| !record.is_null("ENDDATE"),
            )
            .map_err(Into::into)
    })?;

    // Burn date before the field drop: ENDDATE itself is on the denylist.
    runner.step("lastlog_normalize", |engine| {
        populate_burn_date(engine, datasets::LASTLOG_DATED, "ENDDATE", policy)?;
        drop_fields_if_present(engine, datasets::LASTLOG_DATED, &DROP_FIELDS)?;
        tag_source(engine, datasets::LASTLOG_DATED, "LASTLOG25")
    })?;

    runner.stage("lastlog_project", datasets::LASTLOG_PROJECTED, |engine| {
        let vicgrid = engine.resolve_spatial_ref(3111)?;
        engine
            .project(datasets::LASTLOG_DATED, datasets::LASTLOG_PROJECTED, vicgrid)
            .map_err(Into::into)
    })?;

    Ok(())
}
