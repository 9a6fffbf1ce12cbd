//! South Australia fire history.
//!
//! Mirrors the NSW treatment: no attribute filter, just the Victoria
//! overlap removed. Unlike NSW, the SA layer's surplus fields are dropped
//! here rather than left for the final prune; the shape measures stay off
//! the denylist.

use anyhow::Result;

use fras_engine::Geoprocessor;

use crate::pipeline::{InputLayers, PipelineOptions, datasets};
use crate::stage::StageRunner;

use super::{drop_fields_if_present, populate_burn_date, tag_source};

const DROP_FIELDS: [&str; 14] = [
    "CAPTUREMET",
    "CAPTURESOU",
    "COMMENTS",
    "DATERELIAB",
    "FEATURESOU",
    "FINANCIALY",
    "FIREDATE",
    "FIREYEAR",
    "HECTARES",
    "IMAGEINFOR",
    "INCIDENTNA",
    "INCIDENTNU",
    "INCIDENTTY",
    "SEASON",
];

pub fn run(
    runner: &mut StageRunner<'_>,
    inputs: &InputLayers,
    options: &PipelineOptions,
) -> Result<()> {
    let policy = options.date_errors;

    runner.stage("sa_erase", datasets::SA_ERASED, |engine| {
        engine
            .erase(&inputs.sa, &inputs.vic_boundary, datasets::SA_ERASED)
            .map_err(Into::into)
    })?;

    // Burn date before the field drop: FIREDATE is on the denylist.
    runner.step("sa_normalize", |engine| {
        populate_burn_date(engine, datasets::SA_ERASED, "FIREDATE", policy)?;
        tag_source(engine, datasets::SA_ERASED, "SA")?;
        drop_fields_if_present(engine, datasets::SA_ERASED, &DROP_FIELDS)
    })?;

    Ok(())
}
