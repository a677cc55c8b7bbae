//! Mesh I/O.
//!
//! This module provides trait-based readers and writers for finished
//! [`Mesh`] values, plus the case-directory writers used by
//! [`crate::mesh_generation::run`]:
//!
//! - [`json`]: lossless serde JSON of the whole mesh (read and write)
//! - [`polymesh`]: ASCII polyMesh files (points, faces, owner, neighbour,
//!   boundary, cellZones) and per-zone cellSets
//! - [`obj`]: Wavefront OBJ dump of the block topology

pub mod json;
pub mod obj;
pub mod polymesh;

use crate::mesh_error::MeshError;
use crate::mesh_generation::Mesh;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Trait for readers that rebuild a [`Mesh`] from a byte stream.
pub trait MeshReader {
    /// Parse a mesh from a reader.
    fn read<R: Read>(&self, reader: R) -> Result<Mesh, MeshError>;
}

/// Trait for writers that serialize a [`Mesh`] to a byte stream.
pub trait MeshWriter {
    /// Write mesh data to a writer.
    fn write<W: Write>(&self, writer: W, mesh: &Mesh) -> Result<(), MeshError>;
}

/// Create `path` (and its parent directories) and hand a buffered writer to
/// `body`; any failure is reported against `path`.
pub(crate) fn write_file<F>(path: &Path, body: F) -> Result<(), MeshError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), MeshError>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| MeshError::writing(path, e))?;
    }
    let file = File::create(path).map_err(|e| MeshError::writing(path, e))?;
    let mut writer = BufWriter::new(file);
    body(&mut writer).map_err(|e| match e {
        MeshError::Io(msg) => MeshError::writing(path, msg),
        other => other,
    })?;
    writer.flush().map_err(|e| MeshError::writing(path, e))?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
