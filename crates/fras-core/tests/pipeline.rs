//! End-to-end pipeline runs over synthetic state layers.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use fras_core::{
    InputLayers, PipelineOptions, StageStatus, Variant, datasets, run,
};
use fras_engine::{Geoprocessor, MemoryWorkspace};
use fras_model::{
    Feature, FeatureCollection, FieldDef, FieldType, Geometry, Schema, SpatialRef, Value,
};

fn square(x: f64, y: f64) -> Geometry {
    Geometry::from_extent(x, y, x + 1.0, y + 1.0).unwrap()
}

fn date(year: i32, month: u32, day: u32) -> Value {
    Value::Date(
        NaiveDate::from_ymd_opt(year, month, day)
            .expect("valid date")
            .and_hms_opt(0, 0, 0)
            .expect("valid time"),
    )
}

fn boundary_layer(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> FeatureCollection {
    let mut layer = FeatureCollection::new(Schema::new(), SpatialRef::GDA94);
    layer.push(Feature::new(Geometry::from_extent(xmin, ymin, xmax, ymax).unwrap()));
    layer
}

fn nsw_layer() -> FeatureCollection {
    let schema: Schema = [
        FieldDef::new("StartDate", FieldType::Text),
        FieldDef::new("EndDate", FieldType::Date),
        FieldDef::new("FireName", FieldType::Text),
    ]
    .into_iter()
    .collect();
    let mut layer = FeatureCollection::new(schema, SpatialRef::GDA94);
    // Well clear of the Victoria boundary: survives the erase.
    layer.push(
        Feature::new(square(200.0, 200.0))
            .with("StartDate", "2023-04-05")
            .with("EndDate", date(2023, 6, 1))
            .with("FireName", "Border Trail"),
    );
    // Inside the Victoria boundary: removed by the erase.
    layer.push(
        Feature::new(square(50.0, 50.0))
            .with("StartDate", "2022-01-01")
            .with("EndDate", date(2022, 2, 2))
            .with("FireName", "Overlap"),
    );
    layer
}

fn deeca_layer() -> FeatureCollection {
    let schema: Schema = [
        FieldDef::new("FIRE_SEVERITY", FieldType::Text),
        FieldDef::new("FIRETYPE", FieldType::Text),
        FieldDef::new("SEASON", FieldType::Long),
        FieldDef::new("TREATMENT_TYPE", FieldType::Text),
        FieldDef::new("FIRE_COVER", FieldType::Text),
        FieldDef::new("START_DATE_INT", FieldType::Text),
        FieldDef::new("FIREKEY", FieldType::Text),
    ]
    .into_iter()
    .collect();
    let mut layer = FeatureCollection::new(schema, SpatialRef::VICGRID94);
    // Bushfire with a month-13 start date: repaired to December.
    layer.push(
        Feature::new(square(5.0, 5.0))
            .with("FIRE_SEVERITY", "BURNT")
            .with("FIRETYPE", "BUSHFIRE")
            .with("SEASON", 2005i64)
            .with("START_DATE_INT", "20051301")
            .with("FIREKEY", "A"),
    );
    // Bushfire with no start date: defaulted to the sentinel.
    layer.push(
        Feature::new(square(15.0, 15.0))
            .with("FIRE_SEVERITY", "BURNT")
            .with("FIRETYPE", "BUSHFIRE")
            .with("SEASON", 2015i64)
            .with("FIRE_COVER", "50-69")
            .with("FIREKEY", "B"),
    );
    // Unburnt: dropped by the severity select.
    layer.push(
        Feature::new(square(25.0, 5.0))
            .with("FIRE_SEVERITY", "UNBURNT")
            .with("FIRETYPE", "BUSHFIRE")
            .with("SEASON", 2018i64)
            .with("START_DATE_INT", "20180101")
            .with("FIREKEY", "C"),
    );
    // Admissible burn, clear of the exclusion layer.
    layer.push(
        Feature::new(square(10.0, 10.0))
            .with("FIRE_SEVERITY", "BURNT")
            .with("FIRETYPE", "BURN")
            .with("SEASON", 2010i64)
            .with("TREATMENT_TYPE", "FUEL REDUCTION")
            .with("START_DATE_INT", "20100715")
            .with("FIREKEY", "D"),
    );
    // Burn without a recorded treatment type: transient build only.
    layer.push(
        Feature::new(square(40.0, 40.0))
            .with("FIRE_SEVERITY", "BURNT")
            .with("FIRETYPE", "BURN")
            .with("SEASON", 2014i64)
            .with("FIRE_COVER", "30-49")
            .with("START_DATE_INT", "20140505")
            .with("FIREKEY", "E"),
    );
    // Burn with inadequate cover: excluded in both builds.
    layer.push(
        Feature::new(square(60.0, 60.0))
            .with("FIRE_SEVERITY", "BURNT")
            .with("FIRETYPE", "BURN")
            .with("SEASON", 2016i64)
            .with("TREATMENT_TYPE", "FUEL REDUCTION")
            .with("FIRE_COVER", "0-29")
            .with("START_DATE_INT", "20160606")
            .with("FIREKEY", "F"),
    );
    // Burn inside the not-feasible-to-treat area: erased from the burns output.
    layer.push(
        Feature::new(square(30.0, 30.0))
            .with("FIRE_SEVERITY", "BURNT")
            .with("FIRETYPE", "BURN")
            .with("SEASON", 2009i64)
            .with("TREATMENT_TYPE", "ECOLOGICAL")
            .with("START_DATE_INT", "20090301")
            .with("FIREKEY", "G"),
    );
    layer
}

fn lastlog_layer() -> FeatureCollection {
    let schema: Schema = [
        FieldDef::new("SILVSYS", FieldType::Text),
        FieldDef::new("ENDDATE", FieldType::Date),
        FieldDef::new("FMA", FieldType::Text),
    ]
    .into_iter()
    .collect();
    let mut layer = FeatureCollection::new(schema, SpatialRef::GDA94);
    layer.push(
        Feature::new(square(20.0, 20.0))
            .with("SILVSYS", "CFE")
            .with("ENDDATE", date(2019, 8, 17))
            .with("FMA", "Central"),
    );
    // Ineligible silvicultural system.
    layer.push(
        Feature::new(square(21.0, 21.0))
            .with("SILVSYS", "THN")
            .with("ENDDATE", date(2018, 3, 3))
            .with("FMA", "Central"),
    );
    // No end date: cannot be placed on the timeline.
    layer.push(
        Feature::new(square(22.0, 22.0))
            .with("SILVSYS", "STR")
            .with("FMA", "Central"),
    );
    layer
}

fn sa_layer() -> FeatureCollection {
    let schema: Schema = [
        FieldDef::new("FIREDATE", FieldType::Text),
        FieldDef::new("COMMENTS", FieldType::Text),
    ]
    .into_iter()
    .collect();
    let mut layer = FeatureCollection::new(schema, SpatialRef::GDA94);
    layer.push(
        Feature::new(square(-50.0, -50.0))
            .with("FIREDATE", "2020/02/03")
            .with("COMMENTS", "aerial capture"),
    );
    layer
}

fn seeded_workspace() -> (MemoryWorkspace, InputLayers) {
    let inputs = InputLayers::default();
    let mut workspace = MemoryWorkspace::new();
    workspace.add_dataset(inputs.nsw.clone(), nsw_layer());
    workspace.add_dataset(inputs.vic_boundary.clone(), boundary_layer(0.0, 0.0, 100.0, 100.0));
    workspace.add_dataset(inputs.deeca_treated.clone(), deeca_layer());
    workspace.add_dataset(
        inputs.ecofire_exclusion.clone(),
        boundary_layer(29.0, 29.0, 32.0, 32.0),
    );
    workspace.add_dataset(inputs.lastlog.clone(), lastlog_layer());
    workspace.add_dataset(inputs.sa.clone(), sa_layer());
    (workspace, inputs)
}

fn burn_dates(collection: &FeatureCollection) -> Vec<Option<i64>> {
    collection.records().map(|r| r.long("Burn_Date")).collect()
}

fn sources(collection: &FeatureCollection) -> BTreeSet<String> {
    collection
        .records()
        .filter_map(|r| r.text("Source").map(str::to_string))
        .collect()
}

#[test]
fn persistent_build_produces_the_canonical_dataset() {
    let (mut workspace, inputs) = seeded_workspace();
    let options = PipelineOptions::default();

    let result = run(&mut workspace, &inputs, &options).unwrap();
    assert_eq!(result.output, datasets::BREPS_FINAL);

    let clean = workspace.dataset(datasets::BREPS_CLEAN).unwrap();
    // Exactly the canonical schema, whatever the inputs carried.
    let names: BTreeSet<String> = clean
        .schema
        .field_names()
        .map(str::to_ascii_uppercase)
        .collect();
    let expected: BTreeSet<String> = [
        "SOURCE",
        "BURN_DATE",
        "OBJECTID",
        "SHAPE",
        "SHAPE_AREA",
        "SHAPE_LENGTH",
    ]
    .iter()
    .map(|name| (*name).to_string())
    .collect();
    assert_eq!(names, expected);

    // One record per admissible source feature.
    assert_eq!(clean.len(), 6);
    assert_eq!(
        sources(clean),
        ["NSW", "BUSHFIRES", "Burns", "LASTLOG25", "SA"]
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    );

    let dates: BTreeSet<i64> = burn_dates(clean).into_iter().flatten().collect();
    let expected_dates: BTreeSet<i64> = [
        20230405, // NSW start date (persistent build keys on ignition)
        20051201, // month-13 start date repaired to December
        20230101, // null start date defaulted to the sentinel
        20100715, // admissible burn
        20190817, // logging end date
        20200203, // SA fire date via separator stripping
    ]
    .into_iter()
    .collect();
    assert_eq!(dates, expected_dates);

    // Terminal datasets are ordered newest-first.
    let ordered = burn_dates(clean);
    for pair in ordered.windows(2) {
        match (pair[0], pair[1]) {
            (Some(a), Some(b)) => assert!(a >= b, "descending order violated: {a} < {b}"),
            (None, Some(_)) => panic!("null burn date sorted before a dated record"),
            _ => {}
        }
    }

    // The projected merge carries the common reference.
    assert_eq!(clean.spatial_ref, SpatialRef::VICGRID94);
    assert_eq!(
        workspace.count(datasets::BREPS_FINAL).unwrap(),
        workspace.count(datasets::BREPS_CLEAN).unwrap()
    );
}

#[test]
fn rerun_skips_every_completed_stage() {
    let (mut workspace, inputs) = seeded_workspace();
    let options = PipelineOptions::default();

    run(&mut workspace, &inputs, &options).unwrap();
    let first_count = workspace.count(datasets::BREPS_CLEAN).unwrap();

    let second = run(&mut workspace, &inputs, &options).unwrap();
    for report in &second.reports {
        if report.output.is_some() {
            assert_eq!(
                report.status,
                StageStatus::Skipped,
                "stage {} re-ran over an existing output",
                report.name
            );
        } else {
            // Field steps always re-execute; they are idempotent.
            assert_eq!(report.status, StageStatus::Executed);
        }
    }
    assert_eq!(workspace.count(datasets::BREPS_CLEAN).unwrap(), first_count);
}

#[test]
fn empty_south_australia_input_still_merges() {
    let (mut workspace, inputs) = seeded_workspace();
    workspace.add_dataset(
        inputs.sa.clone(),
        FeatureCollection::new(
            [FieldDef::new("FIREDATE", FieldType::Text)].into_iter().collect(),
            SpatialRef::GDA94,
        ),
    );

    let result = run(&mut workspace, &inputs, &PipelineOptions::default()).unwrap();

    // The SA adapter produced an empty but fully shaped dataset.
    let sa = workspace.dataset(datasets::SA_ERASED).unwrap();
    assert!(sa.is_empty());
    assert!(sa.schema.contains("Burn_Date"));
    assert!(sa.schema.contains("Source"));

    // The remaining sources are intact.
    let clean = workspace.dataset(datasets::BREPS_CLEAN).unwrap();
    assert_eq!(clean.len(), 5);
    assert!(!sources(clean).contains("SA"));
    assert_eq!(result.output, datasets::BREPS_FINAL);
}

#[test]
fn transient_build_emits_the_single_fras_dataset() {
    let (mut workspace, inputs) = seeded_workspace();
    let options = PipelineOptions {
        variant: Variant::Transient,
        ..PipelineOptions::default()
    };

    let result = run(&mut workspace, &inputs, &options).unwrap();
    assert_eq!(result.output, datasets::FRAS_FINAL);
    assert!(!workspace.exists(datasets::BREPS_FINAL));
    assert!(!workspace.exists(datasets::BREPS_CLEAN));

    let fras = workspace.dataset(datasets::FRAS_FINAL).unwrap();
    // The burn without a recorded treatment type is admitted here.
    assert_eq!(fras.len(), 7);
    let dates: BTreeSet<i64> = burn_dates(fras).into_iter().flatten().collect();
    // NSW is keyed on containment in the transient build.
    assert!(dates.contains(&20230601));
    assert!(!dates.contains(&20230405));
    assert!(dates.contains(&20140505));
}

#[test]
fn transient_rerun_rebuilds_every_stage() {
    let (mut workspace, inputs) = seeded_workspace();
    let options = PipelineOptions {
        variant: Variant::Transient,
        ..PipelineOptions::default()
    };

    run(&mut workspace, &inputs, &options).unwrap();
    let second = run(&mut workspace, &inputs, &options).unwrap();
    assert!(
        second
            .reports
            .iter()
            .all(|report| report.status == StageStatus::Executed)
    );
}

#[test]
fn missing_input_aborts_the_run() {
    let (mut workspace, mut inputs) = seeded_workspace();
    inputs.lastlog = "NoSuchLayer".to_string();

    let error = run(&mut workspace, &inputs, &PipelineOptions::default()).unwrap_err();
    assert!(error.to_string().contains("lastlog_system_select"));
}
