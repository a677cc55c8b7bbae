//! JSON serialization of a complete [`Mesh`].
//!
//! The reader re-checks index ranges and the patch table after parsing, so a
//! hand-edited file cannot produce a mesh with dangling references.

use crate::io::{MeshReader, MeshWriter, write_file};
use crate::mesh_error::MeshError;
use crate::mesh_generation::Mesh;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

#[derive(Debug, Default, Clone)]
pub struct JsonReader;

#[derive(Debug, Default, Clone)]
pub struct JsonWriter {
    /// Indented output.
    pub pretty: bool,
}

impl MeshReader for JsonReader {
    fn read<R: Read>(&self, reader: R) -> Result<Mesh, MeshError> {
        let mesh: Mesh = serde_json::from_reader(reader)?;
        mesh.check()?;
        Ok(mesh)
    }
}

impl MeshWriter for JsonWriter {
    fn write<W: Write>(&self, writer: W, mesh: &Mesh) -> Result<(), MeshError> {
        if self.pretty {
            serde_json::to_writer_pretty(writer, mesh)
        } else {
            serde_json::to_writer(writer, mesh)
        }
        .map_err(|e| MeshError::Io(e.to_string()))
    }
}

impl JsonReader {
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Mesh, MeshError> {
        let file = File::open(path.as_ref())?;
        self.read(BufReader::new(file))
    }
}

impl JsonWriter {
    pub fn write_file(&self, path: impl AsRef<Path>, mesh: &Mesh) -> Result<(), MeshError> {
        write_file(path.as_ref(), |w| self.write(w, mesh))
    }
}
