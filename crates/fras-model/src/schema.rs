//! Attribute schemas with case-insensitive, case-preserving field lookup.
//!
//! Field names compare case-insensitively everywhere in the pipeline, but the
//! spelling a field was created with is preserved and is the only spelling
//! used for storage and output.

use crate::value::FieldType;

/// System-maintained field names that must survive any field-pruning pass,
/// matched case-insensitively.
pub const RESERVED_FIELDS: [&str; 4] = ["OBJECTID", "Shape", "Shape_Area", "Shape_Length"];

/// Whether `name` is a system-maintained field (object id, geometry column,
/// or a derived shape measure).
pub fn is_reserved_field(name: &str) -> bool {
    RESERVED_FIELDS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// A named field and its declared storage type.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// An ordered set of field definitions shared by every record of a collection.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a field by name, ignoring case. The returned definition
    /// carries the stored spelling.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|def| def.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Appends a field definition. Callers are expected to check `contains`
    /// first; pushing a duplicate name is not detected here.
    pub fn push(&mut self, def: FieldDef) {
        self.fields.push(def);
    }

    /// Removes a field by name (case-insensitive), returning its definition.
    pub fn remove(&mut self, name: &str) -> Option<FieldDef> {
        let index = self
            .fields
            .iter()
            .position(|def| def.name.eq_ignore_ascii_case(name))?;
        Some(self.fields.remove(index))
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|def| def.name.as_str())
    }

    pub fn geometry_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields
            .iter()
            .filter(|def| def.field_type.is_geometry())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<FieldDef> for Schema {
    fn from_iter<I: IntoIterator<Item = FieldDef>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
