//! Schema-safe field population.
//!
//! Source layers arrive with unpredictable schemas: the field a stage wants
//! to populate may be missing, may exist under a different case, or may
//! exist with a type the stage cannot write. [`ensure_field`] handles all
//! three without ever destructively retyping a column.

use anyhow::Result;
use tracing::warn;

use fras_engine::{ComputeExpr, Geoprocessor};
use fras_model::FieldType;

/// Ensures `field` exists on `dataset` with a compatible type and computes
/// `expr` for every record.
///
/// - Absent field: added with `field_type`, then computed.
/// - Present with a type `field_type` accepts: recomputed under the stored
///   spelling, whatever its case.
/// - Present with an incompatible type: the calculation is skipped with a
///   warning; this is deliberately not an error.
///
/// The operation is idempotent for pure expressions: a second invocation
/// with the same arguments recomputes the same values.
pub fn ensure_field(
    engine: &mut dyn Geoprocessor,
    dataset: &str,
    field: &str,
    field_type: FieldType,
    expr: &ComputeExpr<'_>,
) -> Result<()> {
    let existing = engine
        .list_fields(dataset)?
        .into_iter()
        .find(|def| def.name.eq_ignore_ascii_case(field));
    match existing {
        None => {
            engine.add_field(dataset, field, field_type)?;
            engine.compute_field(dataset, field, expr)?;
        }
        Some(def) if field_type.accepts(def.field_type) => {
            engine.compute_field(dataset, &def.name, expr)?;
        }
        Some(def) => {
            warn!(
                dataset,
                field,
                existing = ?def.field_type,
                requested = ?field_type,
                "field exists with an incompatible type; skipping calculation"
            );
        }
    }
    Ok(())
}
