//! In-memory workspace engine.
//!
//! `MemoryWorkspace` keeps every dataset as a [`FeatureCollection`] in a
//! name-keyed map and implements the full [`Geoprocessor`] surface over it.
//! It stands in for a real geodatabase engine in tests, in the transient
//! pipeline variant, and for small datasets loaded from JSON workspaces.
//!
//! Geometric overlay is approximated at envelope granularity: `erase` drops
//! whole features whose extent intersects the erase layer, `clip` keeps
//! intersecting features, and `project` retags the spatial reference without
//! transforming coordinates. The pipeline's contracts never depend on
//! partial-polygon results, so the approximation is sound for the datasets
//! this engine is meant to hold.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::debug;

use fras_model::{
    FeatureCollection, FieldDef, FieldType, Record, Schema, SpatialRef, Value, is_reserved_field,
};

use crate::engine::{ComputeExpr, Geoprocessor, RowPredicate, SortKey, SortOrder, SpatialTiebreak};
use crate::error::EngineError;

/// Spatial reference codes the in-memory resolver recognises.
const KNOWN_WKIDS: [u32; 4] = [3111, 4283, 4326, 7844];

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct MemoryWorkspace {
    collections: BTreeMap<String, FeatureCollection>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an input dataset. Existing datasets are replaced.
    pub fn add_dataset(&mut self, name: impl Into<String>, collection: FeatureCollection) {
        self.collections.insert(name.into(), collection);
    }

    pub fn dataset(&self, name: &str) -> Option<&FeatureCollection> {
        self.collections.get(name)
    }

    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    fn get(&self, name: &str) -> Result<&FeatureCollection, EngineError> {
        self.collections
            .get(name)
            .ok_or_else(|| EngineError::MissingDataset(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut FeatureCollection, EngineError> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| EngineError::MissingDataset(name.to_string()))
    }

    /// Stores an operation output, stamping the system-maintained fields the
    /// way a geodatabase would.
    fn insert_output(&mut self, name: &str, mut collection: FeatureCollection) {
        stamp_system_fields(&mut collection);
        self.collections.insert(name.to_string(), collection);
    }
}

/// Ensures the system fields exist and refreshes their values: sequential
/// object ids, and shape measures derived from each feature's geometry.
fn stamp_system_fields(collection: &mut FeatureCollection) {
    for (name, field_type) in [
        ("OBJECTID", FieldType::ObjectId),
        ("Shape", FieldType::Geometry),
        ("Shape_Area", FieldType::Double),
        ("Shape_Length", FieldType::Double),
    ] {
        if !collection.schema.contains(name) {
            collection.schema.push(FieldDef::new(name, field_type));
        }
    }
    for (index, feature) in collection.features.iter_mut().enumerate() {
        let area = feature.geometry.area;
        let length = feature.geometry.length;
        feature.set("OBJECTID", Value::Long(index as i64 + 1));
        feature.set("Shape_Area", Value::Double(area));
        feature.set("Shape_Length", Value::Double(length));
    }
}

/// Orders two attribute values of the same nominal type. Mixed or
/// incomparable values compare equal, which keeps the sort stable.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Long(a), Value::Long(b)) => a.cmp(b),
        (Value::Double(a), Value::Double(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::Long(a), Value::Double(b)) => {
            (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        (Value::Double(a), Value::Long(b)) => {
            a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal)
        }
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Date(a), Value::Date(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

fn compare_records(a: &Record<'_>, b: &Record<'_>, keys: &[SortKey], tiebreak: SpatialTiebreak) -> Ordering {
    for key in keys {
        let va = a.value(&key.field);
        let vb = b.value(&key.field);
        // Missing values sort last in either direction.
        let ordering = match (va.is_null(), vb.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match key.order {
                SortOrder::Ascending => compare_values(&va, &vb),
                SortOrder::Descending => compare_values(&vb, &va),
            },
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    match tiebreak {
        SpatialTiebreak::None => Ordering::Equal,
        SpatialTiebreak::UpperRight => {
            let (ax, ay) = a.geometry().envelope.upper_right();
            let (bx, by) = b.geometry().envelope.upper_right();
            by.partial_cmp(&ay)
                .unwrap_or(Ordering::Equal)
                .then(bx.partial_cmp(&ax).unwrap_or(Ordering::Equal))
        }
    }
}

impl Geoprocessor for MemoryWorkspace {
    fn exists(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    fn count(&self, name: &str) -> Result<usize, EngineError> {
        Ok(self.get(name)?.len())
    }

    fn list_fields(&self, name: &str) -> Result<Vec<FieldDef>, EngineError> {
        Ok(self.get(name)?.schema.fields().to_vec())
    }

    fn add_field(
        &mut self,
        name: &str,
        field: &str,
        field_type: FieldType,
    ) -> Result<(), EngineError> {
        if matches!(field_type, FieldType::Geometry | FieldType::ObjectId) {
            return Err(EngineError::UnsupportedFieldType {
                dataset: name.to_string(),
                field_type,
            });
        }
        let collection = self.get_mut(name)?;
        if collection.schema.contains(field) {
            return Err(EngineError::FieldExists {
                dataset: name.to_string(),
                field: field.to_string(),
            });
        }
        collection.schema.push(FieldDef::new(field, field_type));
        debug!(dataset = name, field, ?field_type, "added field");
        Ok(())
    }

    fn delete_fields(&mut self, name: &str, fields: &[String]) -> Result<(), EngineError> {
        let collection = self.get(name)?;
        let mut stored = Vec::with_capacity(fields.len());
        for field in fields {
            let def = collection.schema.field(field).ok_or_else(|| {
                EngineError::MissingField {
                    dataset: name.to_string(),
                    field: field.clone(),
                }
            })?;
            if is_reserved_field(&def.name) || def.field_type.is_geometry() {
                return Err(EngineError::ProtectedField {
                    dataset: name.to_string(),
                    field: def.name.clone(),
                });
            }
            stored.push(def.name.clone());
        }
        let collection = self.get_mut(name)?;
        for field in &stored {
            collection.schema.remove(field);
            for feature in &mut collection.features {
                feature.remove(field);
            }
        }
        debug!(dataset = name, count = stored.len(), "deleted fields");
        Ok(())
    }

    fn compute_field(
        &mut self,
        name: &str,
        field: &str,
        expr: &ComputeExpr<'_>,
    ) -> Result<(), EngineError> {
        let collection = self.get(name)?;
        let stored = collection
            .schema
            .field(field)
            .ok_or_else(|| EngineError::MissingField {
                dataset: name.to_string(),
                field: field.to_string(),
            })?
            .name
            .clone();
        let mut values = Vec::with_capacity(collection.len());
        for record in collection.records() {
            let value = expr(&record).map_err(|source| EngineError::Compute {
                dataset: name.to_string(),
                field: stored.clone(),
                source,
            })?;
            values.push(value);
        }
        let collection = self.get_mut(name)?;
        for (feature, value) in collection.features.iter_mut().zip(values) {
            feature.set(&stored, value);
        }
        Ok(())
    }

    fn select(
        &mut self,
        input: &str,
        output: &str,
        predicate: &RowPredicate<'_>,
    ) -> Result<(), EngineError> {
        let source = self.get(input)?;
        let mut result = FeatureCollection::new(source.schema.clone(), source.spatial_ref);
        for (record, feature) in source.records().zip(&source.features) {
            if predicate(&record) {
                result.push(feature.clone());
            }
        }
        debug!(input, output, records = result.len(), "select");
        self.insert_output(output, result);
        Ok(())
    }

    fn erase(&mut self, input: &str, erase_layer: &str, output: &str) -> Result<(), EngineError> {
        let erase_extents: Vec<_> = self
            .get(erase_layer)?
            .features
            .iter()
            .map(|feature| feature.geometry.envelope)
            .collect();
        let source = self.get(input)?;
        let mut result = FeatureCollection::new(source.schema.clone(), source.spatial_ref);
        for feature in &source.features {
            let covered = erase_extents
                .iter()
                .any(|extent| feature.geometry.envelope.intersects(extent));
            if !covered {
                result.push(feature.clone());
            }
        }
        debug!(input, erase_layer, output, records = result.len(), "erase");
        self.insert_output(output, result);
        Ok(())
    }

    fn clip(&mut self, input: &str, clip_layer: &str, output: &str) -> Result<(), EngineError> {
        let clip_extents: Vec<_> = self
            .get(clip_layer)?
            .features
            .iter()
            .map(|feature| feature.geometry.envelope)
            .collect();
        let source = self.get(input)?;
        let mut result = FeatureCollection::new(source.schema.clone(), source.spatial_ref);
        for feature in &source.features {
            let covered = clip_extents
                .iter()
                .any(|extent| feature.geometry.envelope.intersects(extent));
            if covered {
                result.push(feature.clone());
            }
        }
        debug!(input, clip_layer, output, records = result.len(), "clip");
        self.insert_output(output, result);
        Ok(())
    }

    fn merge(&mut self, inputs: &[&str], output: &str) -> Result<(), EngineError> {
        let first = *inputs.first().ok_or(EngineError::EmptyMerge)?;
        let spatial_ref = self.get(first)?.spatial_ref;
        let mut schema = Schema::new();
        for input in inputs {
            for def in self.get(input)?.schema.fields() {
                if !schema.contains(&def.name) {
                    schema.push(def.clone());
                }
            }
        }
        let mut result = FeatureCollection::new(schema, spatial_ref);
        for input in inputs {
            for feature in &self.get(input)?.features {
                result.push(feature.clone());
            }
        }
        debug!(?inputs, output, records = result.len(), "merge");
        self.insert_output(output, result);
        Ok(())
    }

    fn project(
        &mut self,
        input: &str,
        output: &str,
        spatial_ref: SpatialRef,
    ) -> Result<(), EngineError> {
        // Coordinate transformation is a real engine's concern; the memory
        // store retags the reference and keeps extents as stored.
        let mut result = self.get(input)?.clone();
        result.spatial_ref = spatial_ref;
        debug!(input, output, %spatial_ref, "project");
        self.insert_output(output, result);
        Ok(())
    }

    fn sort(
        &mut self,
        input: &str,
        output: &str,
        keys: &[SortKey],
        tiebreak: SpatialTiebreak,
    ) -> Result<(), EngineError> {
        let source = self.get(input)?;
        let schema = source.schema.clone();
        let mut features = source.features.clone();
        features.sort_by(|a, b| {
            compare_records(
                &Record::new(&schema, a),
                &Record::new(&schema, b),
                keys,
                tiebreak,
            )
        });
        let mut result = FeatureCollection::new(schema, source.spatial_ref);
        result.features = features;
        debug!(input, output, records = result.len(), "sort");
        self.insert_output(output, result);
        Ok(())
    }

    fn copy(&mut self, input: &str, output: &str) -> Result<(), EngineError> {
        let result = self.get(input)?.clone();
        debug!(input, output, records = result.len(), "copy");
        self.insert_output(output, result);
        Ok(())
    }

    fn resolve_spatial_ref(&self, wkid: u32) -> Result<SpatialRef, EngineError> {
        if KNOWN_WKIDS.contains(&wkid) {
            Ok(SpatialRef(wkid))
        } else {
            Err(EngineError::UnknownSpatialRef(wkid))
        }
    }
}
