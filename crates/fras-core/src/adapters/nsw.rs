//! New South Wales fire history (NPWS).
//!
//! The NSW layer needs no attribute filter: everything is admitted except
//! the portion overlapping Victoria, which the Victoria layers cover with
//! better currency. Its surplus fields survive until the final pruning
//! pass.

use anyhow::Result;

use fras_engine::Geoprocessor;

use crate::pipeline::{InputLayers, PipelineOptions, Variant, datasets};
use crate::stage::StageRunner;

use super::{populate_burn_date, tag_source};

/// Removes the Victoria overlap from the NSW layer.
pub fn erase(runner: &mut StageRunner<'_>, inputs: &InputLayers) -> Result<()> {
    runner.stage("nsw_erase", datasets::NPWS_ERASED, |engine| {
        engine
            .erase(&inputs.nsw, &inputs.vic_boundary, datasets::NPWS_ERASED)
            .map_err(Into::into)
    })
}

/// Populates the canonical fields ahead of the state merge.
pub fn normalize(runner: &mut StageRunner<'_>, options: &PipelineOptions) -> Result<()> {
    let policy = options.date_errors;
    let field = date_field(options.variant);
    runner.step("nsw_normalize", |engine| {
        populate_burn_date(engine, datasets::NPWS_ERASED, field, policy)?;
        tag_source(engine, datasets::NPWS_ERASED, "NSW")
    })
}

/// The NSW export carries both endpoints of each fire; the persistent build
/// keys history on the ignition date, the transient build on containment.
pub(crate) fn date_field(variant: Variant) -> &'static str {
    match variant {
        Variant::Persistent => "StartDate",
        Variant::Transient => "EndDate",
    }
}
