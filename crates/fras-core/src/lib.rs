pub mod adapters;
pub mod dates;
pub mod finalize;
pub mod normalize;
pub mod pipeline;
pub mod stage;

/// Name of the source-tag attribute on the terminal datasets.
pub const SOURCE_FIELD: &str = "Source";
/// Name of the canonical burn-date attribute on the terminal datasets.
pub const BURN_DATE_FIELD: &str = "Burn_Date";

pub use dates::{
    DateErrorPolicy, DateParseError, NULL_START_DATE, burn_date_expr, repair_month, to_yyyymmdd,
};
pub use finalize::prune_to_canonical;
pub use normalize::ensure_field;
pub use pipeline::{InputLayers, PipelineOptions, PipelineRun, Variant, datasets, run};
pub use stage::{StageReport, StageRunner, StageStatus};
