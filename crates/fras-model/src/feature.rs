//! Feature records and collections.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::geometry::{Geometry, SpatialRef};
use crate::schema::Schema;
use crate::value::Value;

/// One polygon record: a shape plus attribute values.
///
/// Attribute keys are normalized to upper case internally so that lookups
/// agree with the schema's case-insensitive field resolution; display names
/// live on the schema.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Feature {
    pub geometry: Geometry,
    attrs: BTreeMap<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            attrs: BTreeMap::new(),
        }
    }

    /// Builder-style attribute assignment for literals and tests.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set(field, value.into());
        self
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.attrs.insert(field.to_ascii_uppercase(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attrs.get(&field.to_ascii_uppercase())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.attrs.remove(&field.to_ascii_uppercase())
    }
}

/// An ordered set of features sharing one schema and spatial reference.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeatureCollection {
    pub schema: Schema,
    pub spatial_ref: SpatialRef,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(schema: Schema, spatial_ref: SpatialRef) -> Self {
        Self {
            schema,
            spatial_ref,
            features: Vec::new(),
        }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn record(&self, index: usize) -> Option<Record<'_>> {
        self.features.get(index).map(|feature| Record {
            schema: &self.schema,
            feature,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.features.iter().map(|feature| Record {
            schema: &self.schema,
            feature,
        })
    }
}

/// A read-only view of one feature, the shape handed to compute expressions
/// and selection predicates.
#[derive(Clone, Copy)]
pub struct Record<'a> {
    schema: &'a Schema,
    feature: &'a Feature,
}

impl<'a> Record<'a> {
    pub fn new(schema: &'a Schema, feature: &'a Feature) -> Self {
        Self { schema, feature }
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    pub fn geometry(&self) -> &Geometry {
        &self.feature.geometry
    }

    /// The value stored under `field`, or `Null` when absent.
    pub fn value(&self, field: &str) -> Value {
        self.feature.get(field).cloned().unwrap_or(Value::Null)
    }

    pub fn is_null(&self, field: &str) -> bool {
        self.feature.get(field).is_none_or(Value::is_null)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.feature.get(field).and_then(Value::as_text)
    }

    pub fn long(&self, field: &str) -> Option<i64> {
        self.feature.get(field).and_then(Value::as_long)
    }

    pub fn date(&self, field: &str) -> Option<NaiveDateTime> {
        self.feature.get(field).and_then(Value::as_date)
    }
}
