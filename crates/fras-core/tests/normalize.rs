//! Field-normalizer behavior against a live workspace.

use fras_core::{DateErrorPolicy, burn_date_expr, ensure_field};
use fras_engine::{Geoprocessor, MemoryWorkspace};
use fras_model::{
    Feature, FeatureCollection, FieldDef, FieldType, Geometry, Schema, SpatialRef, Value,
};

fn workspace_with(schema: Schema, features: Vec<Feature>) -> MemoryWorkspace {
    let mut collection = FeatureCollection::new(schema, SpatialRef::GDA94);
    for feature in features {
        collection.push(feature);
    }
    let mut workspace = MemoryWorkspace::new();
    workspace.add_dataset("layer", collection);
    workspace
}

fn feature() -> Feature {
    Feature::new(Geometry::from_extent(0.0, 0.0, 1.0, 1.0).unwrap())
}

#[test]
fn normalization_is_idempotent() {
    let schema: Schema = [FieldDef::new("StartDate", FieldType::Text)]
        .into_iter()
        .collect();
    let mut workspace = workspace_with(
        schema,
        vec![
            feature().with("StartDate", "2023-04-05"),
            feature().with("StartDate", "2020/01/02"),
        ],
    );
    let expr = burn_date_expr("StartDate", DateErrorPolicy::Fail);

    ensure_field(&mut workspace, "layer", "Burn_Date", FieldType::Long, &expr).unwrap();
    let first: Vec<_> = workspace
        .dataset("layer")
        .unwrap()
        .records()
        .map(|r| r.long("Burn_Date"))
        .collect();
    assert_eq!(first, [Some(20230405), Some(20200102)]);

    ensure_field(&mut workspace, "layer", "Burn_Date", FieldType::Long, &expr).unwrap();
    let second: Vec<_> = workspace
        .dataset("layer")
        .unwrap()
        .records()
        .map(|r| r.long("Burn_Date"))
        .collect();
    assert_eq!(second, first);
    // The field was added once, not twice.
    assert_eq!(
        workspace
            .list_fields("layer")
            .unwrap()
            .iter()
            .filter(|def| def.name.eq_ignore_ascii_case("burn_date"))
            .count(),
        1
    );
}

#[test]
fn incompatible_type_skips_the_calculation() {
    let schema: Schema = [FieldDef::new("Burn_Date", FieldType::Text)]
        .into_iter()
        .collect();
    let mut workspace = workspace_with(schema, vec![feature().with("Burn_Date", "untouched")]);

    // Requesting a Long on an existing Text field must not error and must
    // not change anything.
    ensure_field(
        &mut workspace,
        "layer",
        "Burn_Date",
        FieldType::Long,
        &|_record| Ok(Value::Long(1)),
    )
    .unwrap();

    let layer = workspace.dataset("layer").unwrap();
    assert_eq!(layer.record(0).unwrap().text("Burn_Date"), Some("untouched"));
    assert_eq!(
        layer.schema.field("Burn_Date").unwrap().field_type,
        FieldType::Text
    );
}

#[test]
fn existing_field_is_reused_under_its_stored_spelling() {
    let schema: Schema = [FieldDef::new("BURN_DATE", FieldType::Long)]
        .into_iter()
        .collect();
    let mut workspace = workspace_with(schema, vec![feature()]);

    ensure_field(
        &mut workspace,
        "layer",
        "Burn_Date",
        FieldType::Long,
        &|_record| Ok(Value::Long(20230101)),
    )
    .unwrap();

    let layer = workspace.dataset("layer").unwrap();
    // No second field appeared; the stored spelling survived.
    assert_eq!(layer.schema.len(), 1);
    assert_eq!(layer.schema.fields()[0].name, "BURN_DATE");
    assert_eq!(layer.record(0).unwrap().long("Burn_Date"), Some(20230101));
}

#[test]
fn text_request_accepts_string_like_field() {
    let schema: Schema = [FieldDef::new("SOURCE", FieldType::Text)]
        .into_iter()
        .collect();
    let mut workspace = workspace_with(schema, vec![feature().with("SOURCE", "old")]);

    ensure_field(
        &mut workspace,
        "layer",
        "Source",
        FieldType::Text,
        &|_record| Ok(Value::from("NSW")),
    )
    .unwrap();

    let layer = workspace.dataset("layer").unwrap();
    assert_eq!(layer.schema.len(), 1);
    assert_eq!(layer.record(0).unwrap().text("Source"), Some("NSW"));
}

#[test]
fn lenient_policy_stores_null_for_bad_dates() {
    let schema: Schema = [FieldDef::new("FIREDATE", FieldType::Text)]
        .into_iter()
        .collect();
    let mut workspace = workspace_with(
        schema,
        vec![
            feature().with("FIREDATE", "2020-02-03"),
            feature().with("FIREDATE", "unknown"),
        ],
    );

    // Strict policy fails the whole computation.
    let strict = burn_date_expr("FIREDATE", DateErrorPolicy::Fail);
    assert!(
        ensure_field(&mut workspace, "layer", "Burn_Date", FieldType::Long, &strict).is_err()
    );

    // Lenient policy nulls the offending record and keeps the rest.
    let lenient = burn_date_expr("FIREDATE", DateErrorPolicy::NullAndWarn);
    ensure_field(&mut workspace, "layer", "Burn_Date", FieldType::Long, &lenient).unwrap();
    let values: Vec<_> = workspace
        .dataset("layer")
        .unwrap()
        .records()
        .map(|r| r.long("Burn_Date"))
        .collect();
    assert_eq!(values, [Some(20200203), None]);
}
