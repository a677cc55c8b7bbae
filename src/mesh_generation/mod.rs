//! Multi-block hexahedral mesh assembly.
//!
//! [`generate`] drives the pipeline: description validation, block expansion,
//! point merging, quality assessment, face derivation, patch stitching and
//! zone tagging. The result is an immutable [`Mesh`] plus [`Diagnostics`].
//!
//! The stages are also available one by one through [`prepare`] and
//! [`PreparedMesh`], which is useful to inspect the face topology before merge
//! pairs are stitched or to plug in a different [`FaceCutter`].

use crate::block::HEX_EDGES;
use crate::block::expand::{block_corners, expand_blocks};
use crate::config::{BlockMeshDescription, MeshContext};
use crate::geometry::quality::{QualityReport, QualityWarning, evaluate_cells};
use crate::geometry::vector::{Vec3, centroid};
use crate::io::obj::ObjWriter;
use crate::io::polymesh::PolyMeshWriter;
use crate::merge::merge_lattices;
use crate::mesh_error::MeshError;
use crate::stitch::{FaceCutter, PolygonClipCutter, StitchSummary, stitch_pair};
use crate::topology::faces::{FaceTopology, build_face_topology, globalize};
use crate::topology::patch::BoundaryPatch;
use crate::topology::zones::{CellZone, tag_zones};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Final, write-once mesh.
///
/// Faces are stored internal first, sorted by `(owner, neighbour)`, then the
/// boundary faces patch by patch. `neighbour` covers internal faces only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    points: Vec<Vec3>,
    cells: Vec<[usize; 8]>,
    faces: Vec<Vec<usize>>,
    owner: Vec<usize>,
    neighbour: Vec<usize>,
    patches: Vec<BoundaryPatch>,
    zones: Vec<CellZone>,
}

impl Mesh {
    /// Flatten a face topology into the final face ordering.
    pub fn assemble(topo: FaceTopology, zones: Vec<CellZone>) -> Self {
        let FaceTopology {
            points,
            cells,
            mut internal,
            patches: patch_faces,
        } = topo;
        internal.sort_by_key(|f| (f.owner, f.neighbour));

        let n_boundary: usize = patch_faces.iter().map(|p| p.faces.len()).sum();
        let mut faces = Vec::with_capacity(internal.len() + n_boundary);
        let mut owner = Vec::with_capacity(internal.len() + n_boundary);
        let mut neighbour = Vec::with_capacity(internal.len());
        for f in internal {
            faces.push(f.points);
            owner.push(f.owner);
            neighbour.push(f.neighbour.unwrap_or(f.owner));
        }

        let mut patches = Vec::with_capacity(patch_faces.len());
        let mut start = 0;
        for p in patch_faces {
            patches.push(BoundaryPatch {
                name: p.name,
                kind: p.kind,
                start,
                size: p.faces.len(),
            });
            start += p.faces.len();
            for f in p.faces {
                faces.push(f.points);
                owner.push(f.owner);
            }
        }

        Self {
            points,
            cells,
            faces,
            owner,
            neighbour,
            patches,
            zones,
        }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn cells(&self) -> &[[usize; 8]] {
        &self.cells
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    pub fn owner(&self) -> &[usize] {
        &self.owner
    }

    pub fn neighbour(&self) -> &[usize] {
        &self.neighbour
    }

    pub fn patches(&self) -> &[BoundaryPatch] {
        &self.patches
    }

    pub fn zones(&self) -> &[CellZone] {
        &self.zones
    }

    pub fn n_internal_faces(&self) -> usize {
        self.neighbour.len()
    }

    pub fn patch(&self, name: &str) -> Option<&BoundaryPatch> {
        self.patches.iter().find(|p| p.name == name)
    }

    /// Faces of a patch, as point loops.
    pub fn patch_faces(&self, patch: &BoundaryPatch) -> &[Vec<usize>] {
        let base = self.n_internal_faces();
        &self.faces[base + patch.start..base + patch.start + patch.size]
    }

    /// Patch holding global face `face`; `None` for internal faces.
    pub fn boundary_patch_of(&self, face: usize) -> Option<&BoundaryPatch> {
        let offset = face.checked_sub(self.n_internal_faces())?;
        self.patches.iter().find(|p| p.range().contains(&offset))
    }

    /// Centre of each cell as the mean of its corners.
    pub fn cell_centres(&self) -> Vec<Vec3> {
        self.cells
            .iter()
            .map(|cell| centroid(&cell.map(|p| self.points[p])))
            .collect()
    }

    /// Index and patch-table consistency, used when a mesh is read back.
    pub fn check(&self) -> Result<(), MeshError> {
        let fail = |msg: String| Err(MeshError::MeshIoParse(msg));
        let (np, nc, nf) = (self.points.len(), self.cells.len(), self.faces.len());
        if self.owner.len() != nf || self.neighbour.len() > nf {
            return fail(format!(
                "{nf} faces but {} owners and {} neighbours",
                self.owner.len(),
                self.neighbour.len()
            ));
        }
        if let Some(c) = self.cells.iter().position(|c| c.iter().any(|&p| p >= np)) {
            return fail(format!("cell {c} references a missing point"));
        }
        if let Some(f) = self.faces.iter().position(|f| f.len() < 3 || f.iter().any(|&p| p >= np)) {
            return fail(format!("face {f} is malformed"));
        }
        if self.owner.iter().chain(&self.neighbour).any(|&c| c >= nc) {
            return fail("owner/neighbour references a missing cell".to_string());
        }
        let mut expected = 0;
        for p in &self.patches {
            if p.start != expected {
                return fail(format!("patch `{}` starts at {} not {expected}", p.name, p.start));
            }
            expected += p.size;
        }
        if expected != nf - self.neighbour.len() {
            return fail(format!(
                "patches cover {expected} of {} boundary faces",
                nf - self.neighbour.len()
            ));
        }
        if let Some(z) = self.zones.iter().find(|z| z.cells.iter().any(|&c| c >= nc)) {
            return fail(format!("zone `{}` references a missing cell", z.name));
        }
        Ok(())
    }

    pub fn summary(&self) -> MeshSummary {
        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        for p in &self.points {
            for d in 0..3 {
                lo[d] = lo[d].min(p[d]);
                hi[d] = hi[d].max(p[d]);
            }
        }
        if self.points.is_empty() {
            lo = [0.0; 3];
            hi = [0.0; 3];
        }
        MeshSummary {
            bounds: (lo, hi),
            n_points: self.points.len(),
            n_cells: self.cells.len(),
            n_faces: self.faces.len(),
            n_internal_faces: self.n_internal_faces(),
            patches: self.patches.clone(),
        }
    }
}

/// Counts and extents of a mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshSummary {
    pub bounds: (Vec3, Vec3),
    pub n_points: usize,
    pub n_cells: usize,
    pub n_faces: usize,
    pub n_internal_faces: usize,
    pub patches: Vec<BoundaryPatch>,
}

impl fmt::Display for MeshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = self.bounds;
        writeln!(f, "Mesh Information")?;
        writeln!(f, "  boundingBox: ({} {} {}) ({} {} {})", lo[0], lo[1], lo[2], hi[0], hi[1], hi[2])?;
        writeln!(f, "  nPoints: {}", self.n_points)?;
        writeln!(f, "  nCells: {}", self.n_cells)?;
        writeln!(f, "  nFaces: {}", self.n_faces)?;
        writeln!(f, "  nInternalFaces: {}", self.n_internal_faces)?;
        writeln!(f, "Patches")?;
        for (i, p) in self.patches.iter().enumerate() {
            writeln!(f, "  patch {i} (start: {} size: {}) name: {}", p.start, p.size, p.name)?;
        }
        Ok(())
    }
}

/// Non-fatal quality findings of a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagnostics {
    pub min_quality: f64,
    pub mean_quality: f64,
    pub warnings: Vec<QualityWarning>,
}

impl From<QualityReport> for Diagnostics {
    fn from(report: QualityReport) -> Self {
        Self {
            min_quality: report.min_quality,
            mean_quality: report.mean_quality,
            warnings: report.warnings,
        }
    }
}

/// Mesh and diagnostics of a successful run.
#[derive(Clone, Debug)]
pub struct GeneratedMesh {
    pub mesh: Mesh,
    pub diagnostics: Diagnostics,
}

/// Face topology before merge pairs are stitched.
#[derive(Clone, Debug)]
pub struct PreparedMesh {
    pub topology: FaceTopology,
    pub quality: QualityReport,
    pub zones: Vec<CellZone>,
    pub merge_pairs: Vec<(String, String)>,
    pub merge_tolerance: f64,
}

impl PreparedMesh {
    /// Stitch every merge pair in declaration order.
    pub fn stitch(&mut self, cutter: &dyn FaceCutter) -> Result<Vec<StitchSummary>, MeshError> {
        let pairs = std::mem::take(&mut self.merge_pairs);
        let mut out = Vec::with_capacity(pairs.len());
        for (master, slave) in &pairs {
            out.push(stitch_pair(
                &mut self.topology,
                master,
                slave,
                self.merge_tolerance,
                cutter,
            )?);
        }
        Ok(out)
    }

    pub fn finish(self) -> GeneratedMesh {
        let mesh = Mesh::assemble(self.topology, self.zones);
        for w in &self.quality.warnings {
            log::warn!(
                "cell {} has {} degenerate corner(s), quality {:.4}",
                w.cell,
                w.quality.degenerate_corners(),
                w.quality.mean
            );
        }
        log::info!("{}", mesh.summary());
        GeneratedMesh {
            mesh,
            diagnostics: self.quality.into(),
        }
    }
}

/// Run every stage up to (not including) stitching.
pub fn prepare(ctx: &MeshContext, desc: &BlockMeshDescription) -> Result<PreparedMesh, MeshError> {
    let patches = desc.validate()?;
    let vertices = desc.scaled_vertices();

    log::info!(
        "Creating block mesh from {} blocks ({} cells)",
        desc.blocks.len(),
        desc.n_cells()
    );
    let lattices = expand_blocks(&desc.blocks, &vertices)?;

    let merged = merge_lattices(&lattices, ctx.merge_tolerance)?;
    let blocks = globalize(lattices, &merged.local_to_global);
    let quality = evaluate_cells(&merged.points, &blocks.cells);
    log::info!(
        "Merged into {} points, {} cells; quality min {:.4} mean {:.4}",
        merged.points.len(),
        blocks.cells.len(),
        quality.min_quality,
        quality.mean_quality
    );

    let topology = build_face_topology(
        blocks,
        merged.points,
        &patches,
        &ctx.default_patch.name,
        ctx.default_patch.kind,
    )?;

    if desc.n_zoned_blocks() > 0 {
        log::info!("Adding cell zones from {} blocks", desc.n_zoned_blocks());
    }
    let zones = tag_zones(&desc.blocks);

    Ok(PreparedMesh {
        topology,
        quality,
        zones,
        merge_pairs: desc
            .merge_pairs
            .iter()
            .map(|p| (p.master.clone(), p.slave.clone()))
            .collect(),
        merge_tolerance: ctx.merge_tolerance,
    })
}

/// Generate with a caller-provided face cutter for non-matching merge pairs.
pub fn generate_with_cutter(
    ctx: &MeshContext,
    desc: &BlockMeshDescription,
    cutter: &dyn FaceCutter,
) -> Result<GeneratedMesh, MeshError> {
    let mut prepared = prepare(ctx, desc)?;
    prepared.stitch(cutter)?;
    Ok(prepared.finish())
}

/// Generate a mesh from a block description.
pub fn generate(ctx: &MeshContext, desc: &BlockMeshDescription) -> Result<GeneratedMesh, MeshError> {
    generate_with_cutter(ctx, desc, &PolygonClipCutter::default())
}

/// Block-level picture of a description: corner vertices, unique block edges
/// and one centre per block.
#[derive(Clone, Debug, PartialEq)]
pub struct TopologyDump {
    pub vertices: Vec<Vec3>,
    /// Vertex index pairs, `a < b`, ascending.
    pub edges: Vec<(usize, usize)>,
    pub centres: Vec<Vec3>,
}

/// Build the block topology of a validated description.
pub fn topology(desc: &BlockMeshDescription) -> Result<TopologyDump, MeshError> {
    desc.validate()?;
    let vertices = desc.scaled_vertices();
    let mut edges = BTreeSet::new();
    let mut centres = Vec::with_capacity(desc.blocks.len());
    for (b, block) in desc.blocks.iter().enumerate() {
        for (a, c) in HEX_EDGES {
            let (va, vc) = (block.vertices[a], block.vertices[c]);
            if va != vc {
                edges.insert((va.min(vc), va.max(vc)));
            }
        }
        centres.push(centroid(&block_corners(b, block, &vertices)?));
    }
    Ok(TopologyDump {
        vertices,
        edges: edges.into_iter().collect(),
        centres,
    })
}

/// What a run produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Block edges and centres only.
    Topology,
    #[default]
    Mesh,
}

/// Artifact of [`run`].
#[derive(Clone, Debug)]
pub enum RunOutput {
    Topology(TopologyDump),
    Mesh(GeneratedMesh),
}

/// Generate and write: OBJ files into the case directory for
/// [`RunMode::Topology`], a polyMesh into [`MeshContext::mesh_dir`] for
/// [`RunMode::Mesh`]. Nothing is written when generation fails.
pub fn run(
    ctx: &MeshContext,
    desc: &BlockMeshDescription,
    mode: RunMode,
) -> Result<RunOutput, MeshError> {
    match mode {
        RunMode::Topology => {
            let dump = topology(desc)?;
            ObjWriter.write_case(ctx, &dump)?;
            Ok(RunOutput::Topology(dump))
        }
        RunMode::Mesh => {
            let generated = generate(ctx, desc)?;
            PolyMeshWriter::write_case(ctx, &generated.mesh)?;
            Ok(RunOutput::Mesh(generated))
        }
    }
}
