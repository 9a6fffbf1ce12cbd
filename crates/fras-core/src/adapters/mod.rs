//! Per-source cleaning adapters.
//!
//! Each source layer gets the same treatment in its own dialect: a
//! source-specific filter, any exclusion erases, a canonical burn date, a
//! fixed source tag, and removal of fields with no downstream use. The
//! shared helpers here keep the dialects small.

pub mod lastlog;
pub mod nsw;
pub mod south_australia;
pub mod victoria;

use anyhow::{Result, bail};
use tracing::debug;

use fras_engine::{ComputeError, Geoprocessor};
use fras_model::{FieldType, Record, Value};

use crate::dates::{DateErrorPolicy, burn_date_expr};
use crate::normalize::ensure_field;
use crate::{BURN_DATE_FIELD, SOURCE_FIELD};

/// Compute expression producing a fixed text literal for every record.
pub(crate) fn constant_text(
    literal: &'static str,
) -> impl Fn(&Record<'_>) -> Result<Value, ComputeError> {
    move |_record| Ok(Value::from(literal))
}

/// Populates the source tag field with a fixed literal.
pub(crate) fn tag_source(
    engine: &mut dyn Geoprocessor,
    dataset: &str,
    tag: &'static str,
) -> Result<()> {
    ensure_field(engine, dataset, SOURCE_FIELD, FieldType::Text, &constant_text(tag))
}

/// Populates the canonical burn-date field from a source date field.
///
/// Cleanup passes consume the source date fields, so a resumed run can reach
/// this point with the burn date already computed and its source gone; the
/// existing values are kept in that case. A dataset carrying neither field
/// is a broken input.
pub(crate) fn populate_burn_date(
    engine: &mut dyn Geoprocessor,
    dataset: &str,
    date_field: &str,
    policy: DateErrorPolicy,
) -> Result<()> {
    let fields = engine.list_fields(dataset)?;
    let has_date_field = fields
        .iter()
        .any(|def| def.name.eq_ignore_ascii_case(date_field));
    if !has_date_field {
        let has_burn_date = fields
            .iter()
            .any(|def| def.name.eq_ignore_ascii_case(BURN_DATE_FIELD));
        if has_burn_date {
            debug!(dataset, date_field, "date field already consumed; keeping burn dates");
            return Ok(());
        }
        bail!("{dataset} has no {date_field} field to derive {BURN_DATE_FIELD} from");
    }
    ensure_field(
        engine,
        dataset,
        BURN_DATE_FIELD,
        FieldType::Long,
        &burn_date_expr(date_field, policy),
    )
}

/// Deletes the denylisted fields that are actually present on the dataset.
/// Absent entries are not an error.
pub(crate) fn drop_fields_if_present(
    engine: &mut dyn Geoprocessor,
    dataset: &str,
    denylist: &[&str],
) -> Result<()> {
    let present = engine.list_fields(dataset)?;
    let drop: Vec<String> = present
        .iter()
        .filter(|def| {
            denylist
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(&def.name))
        })
        .map(|def| def.name.clone())
        .collect();
    if drop.is_empty() {
        return Ok(());
    }
    debug!(dataset, count = drop.len(), "dropping source fields");
    engine.delete_fields(dataset, &drop)?;
    Ok(())
}
