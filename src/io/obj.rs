//! Wavefront OBJ output of the block topology.
//!
//! `blockTopology.obj` lists every description vertex and one `l` record per
//! unique block edge; `blockCentres.obj` lists one vertex per block centre.
//! OBJ indices are 1-based.

use crate::config::MeshContext;
use crate::io::write_file;
use crate::mesh_error::MeshError;
use crate::mesh_generation::TopologyDump;
use std::io::Write;

pub const TOPOLOGY_FILE: &str = "blockTopology.obj";
pub const CENTRES_FILE: &str = "blockCentres.obj";

#[derive(Debug, Default, Clone, Copy)]
pub struct ObjWriter;

impl ObjWriter {
    pub fn write_edges<W: Write>(&self, mut writer: W, dump: &TopologyDump) -> Result<(), MeshError> {
        for v in &dump.vertices {
            writeln!(writer, "v {} {} {}", v[0], v[1], v[2])?;
        }
        for &(a, b) in &dump.edges {
            writeln!(writer, "l {} {}", a + 1, b + 1)?;
        }
        Ok(())
    }

    pub fn write_centres<W: Write>(&self, mut writer: W, dump: &TopologyDump) -> Result<(), MeshError> {
        for c in &dump.centres {
            writeln!(writer, "v {} {} {}", c[0], c[1], c[2])?;
        }
        Ok(())
    }

    /// Write both files into the case directory.
    pub fn write_case(&self, ctx: &MeshContext, dump: &TopologyDump) -> Result<(), MeshError> {
        let topology = ctx.case_path(TOPOLOGY_FILE);
        log::info!("Dumping block structure as Lightwave obj format to {}", topology.display());
        write_file(&topology, |w| self.write_edges(w, dump))?;

        let centres = ctx.case_path(CENTRES_FILE);
        log::info!("Dumping block centres as Lightwave obj format to {}", centres.display());
        write_file(&centres, |w| self.write_centres(w, dump))
    }
}
