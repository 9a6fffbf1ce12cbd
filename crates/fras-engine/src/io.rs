//! JSON workspace persistence.
//!
//! A workspace file is the serialized form of [`MemoryWorkspace`]: a map of
//! dataset name to feature collection. Loading and saving round-trip the
//! full schema, spatial reference, and attribute values.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::info;

use crate::error::EngineError;
use crate::memory::MemoryWorkspace;

pub fn load_workspace(path: &Path) -> Result<MemoryWorkspace, EngineError> {
    let reader = BufReader::new(File::open(path)?);
    let workspace: MemoryWorkspace = serde_json::from_reader(reader)?;
    info!(
        path = %path.display(),
        datasets = workspace.dataset_names().count(),
        "loaded workspace"
    );
    Ok(workspace)
}

pub fn save_workspace(workspace: &MemoryWorkspace, path: &Path) -> Result<(), EngineError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, workspace)?;
    info!(path = %path.display(), "saved workspace");
    Ok(())
}
