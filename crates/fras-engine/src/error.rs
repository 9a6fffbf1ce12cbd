use fras_model::FieldType;
use thiserror::Error;

/// Error produced by a compute expression; carried opaquely so callers can
/// surface domain-specific failures through the engine unchanged.
pub type ComputeError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("dataset not found: {0}")]
    MissingDataset(String),
    #[error("field {field} not found on {dataset}")]
    MissingField { dataset: String, field: String },
    #[error("field {field} already exists on {dataset}")]
    FieldExists { dataset: String, field: String },
    #[error("cannot add a {field_type:?} field to {dataset}")]
    UnsupportedFieldType {
        dataset: String,
        field_type: FieldType,
    },
    #[error("refusing to delete system-maintained field {field} on {dataset}")]
    ProtectedField { dataset: String, field: String },
    #[error("merge requires at least one input")]
    EmptyMerge,
    #[error("unknown spatial reference code: {0}")]
    UnknownSpatialRef(u32),
    #[error("computing {dataset}.{field} failed: {source}")]
    Compute {
        dataset: String,
        field: String,
        #[source]
        source: ComputeError,
    },
    #[error("workspace i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("workspace encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}
