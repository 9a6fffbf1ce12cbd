//! Canonical-schema pruning.
//!
//! After the state merge the combined schema is the union of every source's
//! leftovers. The terminal datasets carry exactly the source tag, the burn
//! date, and the geometry; everything else goes in one batch delete. The
//! system-maintained fields are excluded from the drop set rather than
//! relied on to survive a delete attempt — the engine rejects such attempts,
//! and this pass never makes one.

use anyhow::Result;
use tracing::info;

use fras_engine::Geoprocessor;
use fras_model::{FieldDef, is_reserved_field};

use crate::{BURN_DATE_FIELD, SOURCE_FIELD};

/// Reduces `dataset` to the canonical schema: the two output attributes plus
/// geometry and system-maintained fields.
pub fn prune_to_canonical(engine: &mut dyn Geoprocessor, dataset: &str) -> Result<()> {
    let fields = engine.list_fields(dataset)?;
    let drop: Vec<String> = fields
        .iter()
        .filter(|def| !keeps(def) && !is_reserved_field(&def.name))
        .map(|def| def.name.clone())
        .collect();
    if drop.is_empty() {
        return Ok(());
    }
    info!(dataset, dropped = drop.len(), "pruning to canonical schema");
    engine.delete_fields(dataset, &drop)?;
    Ok(())
}

fn keeps(def: &FieldDef) -> bool {
    def.name.eq_ignore_ascii_case(SOURCE_FIELD)
        || def.name.eq_ignore_ascii_case(BURN_DATE_FIELD)
        || def.field_type.is_geometry()
}
