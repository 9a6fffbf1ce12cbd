//! The geoprocessing capability interface.
//!
//! Every spatial or schema operation the pipeline needs is a method on
//! [`Geoprocessor`]. The trait doubles as the workspace handle: an engine
//! value owns (or fronts) one working storage location, and dataset names
//! are resolved against it. There is no ambient "current workspace" state.
//!
//! Per-record expressions and selection predicates are typed callables over
//! [`Record`] views rather than interpreted source strings, so the compiler
//! checks what a geodatabase would otherwise only reject at run time.

use fras_model::{FieldDef, FieldType, Record, SpatialRef, Value};

use crate::error::{ComputeError, EngineError};

/// A per-record field expression. Returning an error aborts the enclosing
/// compute operation with [`EngineError::Compute`].
pub type ComputeExpr<'a> = dyn Fn(&Record<'_>) -> Result<Value, ComputeError> + 'a;

/// A per-record selection predicate.
pub type RowPredicate<'a> = dyn Fn(&Record<'_>) -> bool + 'a;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One attribute sort key.
#[derive(Debug, Clone)]
pub struct SortKey {
    pub field: String,
    pub order: SortOrder,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }
}

/// Spatial ordering applied to records that compare equal on every sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpatialTiebreak {
    /// Leave key-equal records in input order.
    #[default]
    None,
    /// Order key-equal records from the upper-right corner of their extents.
    UpperRight,
}

/// Blocking, synchronous geoprocessing operations over named datasets.
///
/// Implementations must guarantee:
/// - `delete_fields` rejects system-maintained and geometry fields.
/// - `merge` unions input schemas; attributes absent from an input are null
///   on its records in the output.
/// - operations that produce an output dataset replace any dataset already
///   stored under that name.
pub trait Geoprocessor {
    /// Whether a dataset exists in the workspace.
    fn exists(&self, name: &str) -> bool;

    /// Number of records in a dataset.
    fn count(&self, name: &str) -> Result<usize, EngineError>;

    /// The dataset's field definitions, in schema order.
    fn list_fields(&self, name: &str) -> Result<Vec<FieldDef>, EngineError>;

    /// Adds a field. Fails if the field already exists (any case) or the
    /// type is not addable.
    fn add_field(
        &mut self,
        name: &str,
        field: &str,
        field_type: FieldType,
    ) -> Result<(), EngineError>;

    /// Deletes the named fields in one batch. Every field must exist and
    /// none may be system-maintained.
    fn delete_fields(&mut self, name: &str, fields: &[String]) -> Result<(), EngineError>;

    /// Applies `expr` to every record, storing the result under `field`
    /// (which must already exist).
    fn compute_field(
        &mut self,
        name: &str,
        field: &str,
        expr: &ComputeExpr<'_>,
    ) -> Result<(), EngineError>;

    /// Copies records satisfying `predicate` into a new dataset.
    fn select(
        &mut self,
        input: &str,
        output: &str,
        predicate: &RowPredicate<'_>,
    ) -> Result<(), EngineError>;

    /// Removes the portion of `input` covered by `erase_layer`.
    fn erase(&mut self, input: &str, erase_layer: &str, output: &str) -> Result<(), EngineError>;

    /// Keeps the portion of `input` covered by `clip_layer`.
    fn clip(&mut self, input: &str, clip_layer: &str, output: &str) -> Result<(), EngineError>;

    /// Unions all inputs into one dataset with the combined schema.
    fn merge(&mut self, inputs: &[&str], output: &str) -> Result<(), EngineError>;

    /// Reprojects `input` into the given spatial reference.
    fn project(
        &mut self,
        input: &str,
        output: &str,
        spatial_ref: SpatialRef,
    ) -> Result<(), EngineError>;

    /// Writes a sorted copy of `input`. Records missing a key value sort
    /// after all records that carry one, regardless of direction.
    fn sort(
        &mut self,
        input: &str,
        output: &str,
        keys: &[SortKey],
        tiebreak: SpatialTiebreak,
    ) -> Result<(), EngineError>;

    /// Copies a dataset verbatim.
    fn copy(&mut self, input: &str, output: &str) -> Result<(), EngineError>;

    /// Resolves a well-known spatial reference code.
    fn resolve_spatial_ref(&self, wkid: u32) -> Result<SpatialRef, EngineError>;
}
