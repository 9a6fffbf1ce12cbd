pub mod engine;
pub mod error;
pub mod io;
pub mod memory;

pub use engine::{
    ComputeExpr, Geoprocessor, RowPredicate, SortKey, SortOrder, SpatialTiebreak,
};
pub use error::{ComputeError, EngineError};
pub use io::{load_workspace, save_workspace};
pub use memory::MemoryWorkspace;
