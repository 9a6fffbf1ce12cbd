//! Victoria / DEECA fire history: treated bushfires and planned burns.
//!
//! The DEECA treated-fire layer is the richest and messiest input. It is
//! filtered in three passes (burnt severity, then season/cover admission,
//! then a bushfire/burn split), its start dates are repaired in place, and
//! the burn half is reduced to treatable burns by erasing the
//! not-feasible-to-treat layer.

use anyhow::Result;

use fras_engine::{ComputeError, Geoprocessor};
use fras_model::{FieldType, Record, Value};

use crate::dates::{DateParseError, NULL_START_DATE, repair_month};
use crate::normalize::ensure_field;
use crate::pipeline::{InputLayers, PipelineOptions, Variant, datasets};
use crate::stage::StageRunner;

use super::{drop_fields_if_present, populate_burn_date, tag_source};

/// Treatment classifications admitted into the burns output.
pub const TREATMENT_TYPES: [&str; 4] = [
    "FUEL REDUCTION",
    "ECOLOGICAL",
    "NOT DETERMINED",
    "OTHER",
];

/// Fire-cover classes admitted for seasons from 2012 onward.
pub const FIRE_COVER_CLASSES: [&str; 5] = ["30-49", "50-69", "70-89", "90-100", "UNKNOWN"];

const START_DATE_FIELD: &str = "START_DATE_INT";

/// DEECA export fields with no downstream use, including the shape-measure
/// duplicates accumulated by earlier overlay runs.
const BUSHFIRE_DROP_FIELDS: [&str; 28] = [
    "FIRETYPE",
    "SEASON",
    "FIRE_NO",
    "NAME",
    "START_DATE",
    "START_DATE_INT",
    "TREATMENT_TYPE",
    "FIRE_SEVERITY",
    "FIRE_COVER",
    "FIREKEY",
    "CREATE_DATE",
    "UPDATE_DATE",
    "AREA_HA",
    "METHOD",
    "METHOD_COMMENTS",
    "ACCURACY",
    "DSE_ID",
    "CFA_ID",
    "DISTRICT_ID",
    "Area_calc",
    "Centroid_x",
    "Centroid_y",
    "Shape_length_1",
    "Shape_area_1",
    "Shape_length_12",
    "Shape_area_12",
    "Shape_length_12_13",
    "Shape_area_12_13",
];

const BURNS_EXTRA_DROP_FIELDS: [&str; 2] = ["Shape_length_12_13_14", "Shape_area_12_13_14"];

pub fn run(
    runner: &mut StageRunner<'_>,
    inputs: &InputLayers,
    options: &PipelineOptions,
) -> Result<()> {
    let policy = options.date_errors;

    runner.stage("victoria_severity_select", datasets::TREATED_SELECT, |engine| {
        engine
            .select(&inputs.deeca_treated, datasets::TREATED_SELECT, &|record: &Record<'_>| {
                matches!(record.text("FIRE_SEVERITY"), Some(severity) if severity != "UNBURNT")
            })
            .map_err(Into::into)
    })?;

    runner.step("victoria_start_date_default", |engine| {
        ensure_field(
            engine,
            datasets::TREATED_SELECT,
            START_DATE_FIELD,
            FieldType::Text,
            &|record: &Record<'_>| {
                let value = record.value(START_DATE_FIELD);
                if value.is_null() {
                    Ok(Value::from(NULL_START_DATE))
                } else {
                    Ok(value)
                }
            },
        )
    })?;

    // The month repair runs against the stored field whatever its type, the
    // way the null default cannot.
    runner.step("victoria_month_repair", |engine| {
        engine
            .compute_field(datasets::TREATED_SELECT, START_DATE_FIELD, &repaired_start_date)
            .map_err(Into::into)
    })?;

    runner.step("victoria_burn_date", |engine| {
        populate_burn_date(engine, datasets::TREATED_SELECT, START_DATE_FIELD, policy)
    })?;

    let admit = mincover_predicate(options.variant);
    runner.stage("victoria_cover_select", datasets::MINCOVER, |engine| {
        engine
            .select(datasets::TREATED_SELECT, datasets::MINCOVER, &admit)
            .map_err(Into::into)
    })?;

    runner.stage("victoria_bushfire_select", datasets::BUSHFIRES, |engine| {
        engine
            .select(datasets::MINCOVER, datasets::BUSHFIRES, &|record: &Record<'_>| {
                matches!(record.text("FIRETYPE"), Some(firetype) if firetype != "BURN")
            })
            .map_err(Into::into)
    })?;

    let admit_burn = burns_predicate(options.variant);
    runner.stage("victoria_burns_select", datasets::BURNS, |engine| {
        engine
            .select(datasets::MINCOVER, datasets::BURNS, &admit_burn)
            .map_err(Into::into)
    })?;

    runner.stage("victoria_burns_erase", datasets::BURNS_TREATABLE, |engine| {
        engine
            .erase(
                datasets::BURNS,
                &inputs.ecofire_exclusion,
                datasets::BURNS_TREATABLE,
            )
            .map_err(Into::into)
    })?;

    runner.step("victoria_bushfires_cleanup", |engine| {
        drop_fields_if_present(engine, datasets::BUSHFIRES, &BUSHFIRE_DROP_FIELDS)?;
        tag_source(engine, datasets::BUSHFIRES, "BUSHFIRES")
    })?;

    runner.step("victoria_burns_cleanup", |engine| {
        let mut denylist: Vec<&str> = BUSHFIRE_DROP_FIELDS.to_vec();
        denylist.extend(BURNS_EXTRA_DROP_FIELDS);
        drop_fields_if_present(engine, datasets::BURNS_TREATABLE, &denylist)?;
        tag_source(engine, datasets::BURNS_TREATABLE, "Burns")
    })?;

    Ok(())
}

/// Rewrites the start-date field with its month component clamped to
/// December, preserving the stored type. Null stays null; the burn-date
/// population downstream decides what a missing date means.
fn repaired_start_date(record: &Record<'_>) -> Result<Value, ComputeError> {
    let value = record.value(START_DATE_FIELD);
    match value {
        Value::Null => Ok(Value::Null),
        Value::Long(date) => Ok(Value::Long(repair_month(date))),
        other => {
            let digits = other
                .as_long()
                .ok_or_else(|| DateParseError(format!("{other:?}")))?;
            Ok(Value::Text(repair_month(digits).to_string()))
        }
    }
}

/// Season/cover admission. A record from before 2012 is always admitted;
/// later seasons need a known-adequate (or unrecorded) fire cover. Records
/// without a season are not admitted.
fn season_cover_admitted(record: &Record<'_>) -> bool {
    let Some(season) = record.long("SEASON") else {
        return false;
    };
    if season < 2012 {
        return true;
    }
    match record.text("FIRE_COVER") {
        None => true,
        Some(cover) => FIRE_COVER_CLASSES.contains(&cover),
    }
}

fn mincover_predicate(variant: Variant) -> impl Fn(&Record<'_>) -> bool {
    move |record| match variant {
        Variant::Persistent => season_cover_admitted(record),
        // The transient build only holds burns to the cover rule.
        Variant::Transient => {
            !matches!(record.text("FIRETYPE"), Some("BURN")) || season_cover_admitted(record)
        }
    }
}

fn burns_predicate(variant: Variant) -> impl Fn(&Record<'_>) -> bool {
    move |record| {
        if record.text("FIRETYPE") != Some("BURN") {
            return false;
        }
        match record.text("TREATMENT_TYPE") {
            Some(treatment) => TREATMENT_TYPES.contains(&treatment),
            None => matches!(variant, Variant::Transient),
        }
    }
}
