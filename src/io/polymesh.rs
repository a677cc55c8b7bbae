//! ASCII polyMesh writer.
//!
//! Writes `points`, `faces`, `owner`, `neighbour`, `boundary` and
//! `cellZones` into [`MeshContext::mesh_dir`], plus one cellSet per zone under
//! `sets/`. Files left by an earlier run are removed first. Point coordinates
//! use [`MeshContext::effective_precision`] significant digits. Patch
//! `startFace` entries are global face indices.

use crate::config::MeshContext;
use crate::io::write_file;
use crate::mesh_error::MeshError;
use crate::mesh_generation::Mesh;
use crate::topology::zones::CellZone;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Mesh files owned by the writer; stale copies are removed before writing.
pub const MESH_FILES: [&str; 9] = [
    "points",
    "faces",
    "owner",
    "neighbour",
    "cells",
    "boundary",
    "pointZones",
    "faceZones",
    "cellZones",
];

/// Sub-directory of the polyMesh directory holding cell sets.
pub const SETS_DIR: &str = "sets";

#[derive(Debug, Clone)]
pub struct PolyMeshWriter {
    /// Significant digits for point coordinates.
    pub precision: usize,
    /// Directory recorded in file headers, relative to the case.
    pub location: String,
}

impl Default for PolyMeshWriter {
    fn default() -> Self {
        Self {
            precision: crate::config::MIN_WRITE_PRECISION,
            location: "constant/polyMesh".to_string(),
        }
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// `%g`-style formatting with `precision` significant digits.
pub fn format_general(x: f64, precision: usize) -> String {
    if x == 0.0 || !x.is_finite() {
        return format!("{x}");
    }
    let p = precision.max(1);
    let sci = format!("{:.*e}", p - 1, x);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if exp < -5 || exp >= p as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_zeros(mantissa), exp.abs())
    } else {
        let decimals = (p as i32 - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{x:.decimals$}")).to_string()
    }
}

fn header<W: Write>(
    w: &mut W,
    location: &str,
    class: &str,
    object: &str,
    note: Option<&str>,
) -> Result<(), MeshError> {
    writeln!(w, "FoamFile")?;
    writeln!(w, "{{")?;
    writeln!(w, "    version     2.0;")?;
    writeln!(w, "    format      ascii;")?;
    writeln!(w, "    class       {class};")?;
    if let Some(note) = note {
        writeln!(w, "    note        \"{note}\";")?;
    }
    writeln!(w, "    location    \"{location}\";")?;
    writeln!(w, "    object      {object};")?;
    writeln!(w, "}}")?;
    writeln!(w)?;
    Ok(())
}

fn label_list<W: Write>(w: &mut W, labels: &[usize]) -> Result<(), MeshError> {
    writeln!(w, "{}", labels.len())?;
    writeln!(w, "(")?;
    for l in labels {
        writeln!(w, "{l}")?;
    }
    writeln!(w, ")")?;
    Ok(())
}

impl PolyMeshWriter {
    pub fn new(precision: usize) -> Self {
        Self {
            precision,
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    fn stats(mesh: &Mesh) -> String {
        format!(
            "nPoints: {} nCells: {} nFaces: {} nInternalFaces: {}",
            mesh.points().len(),
            mesh.cells().len(),
            mesh.faces().len(),
            mesh.n_internal_faces()
        )
    }

    pub fn write_points<W: Write>(&self, mut w: W, mesh: &Mesh) -> Result<(), MeshError> {
        header(&mut w, &self.location, "vectorField", "points", None)?;
        writeln!(w, "{}", mesh.points().len())?;
        writeln!(w, "(")?;
        for p in mesh.points() {
            let [x, y, z] = p.map(|c| format_general(c, self.precision));
            writeln!(w, "({x} {y} {z})")?;
        }
        writeln!(w, ")")?;
        Ok(())
    }

    pub fn write_faces<W: Write>(&self, mut w: W, mesh: &Mesh) -> Result<(), MeshError> {
        header(&mut w, &self.location, "faceList", "faces", None)?;
        writeln!(w, "{}", mesh.faces().len())?;
        writeln!(w, "(")?;
        for face in mesh.faces() {
            let body: Vec<String> = face.iter().map(usize::to_string).collect();
            writeln!(w, "{}({})", face.len(), body.join(" "))?;
        }
        writeln!(w, ")")?;
        Ok(())
    }

    pub fn write_owner<W: Write>(&self, mut w: W, mesh: &Mesh) -> Result<(), MeshError> {
        header(&mut w, &self.location, "labelList", "owner", Some(&Self::stats(mesh)))?;
        label_list(&mut w, mesh.owner())
    }

    pub fn write_neighbour<W: Write>(&self, mut w: W, mesh: &Mesh) -> Result<(), MeshError> {
        header(&mut w, &self.location, "labelList", "neighbour", Some(&Self::stats(mesh)))?;
        label_list(&mut w, mesh.neighbour())
    }

    pub fn write_boundary<W: Write>(&self, mut w: W, mesh: &Mesh) -> Result<(), MeshError> {
        header(&mut w, &self.location, "polyBoundaryMesh", "boundary", None)?;
        let base = mesh.n_internal_faces();
        writeln!(w, "{}", mesh.patches().len())?;
        writeln!(w, "(")?;
        for p in mesh.patches() {
            writeln!(w, "    {}", p.name)?;
            writeln!(w, "    {{")?;
            writeln!(w, "        type            {};", p.kind.type_name())?;
            writeln!(w, "        nFaces          {};", p.size)?;
            writeln!(w, "        startFace       {};", base + p.start)?;
            writeln!(w, "    }}")?;
        }
        writeln!(w, ")")?;
        Ok(())
    }

    pub fn write_cell_zones<W: Write>(&self, mut w: W, mesh: &Mesh) -> Result<(), MeshError> {
        header(&mut w, &self.location, "regIOobject", "cellZones", None)?;
        writeln!(w, "{}", mesh.zones().len())?;
        writeln!(w, "(")?;
        for z in mesh.zones() {
            writeln!(w, "{}", z.name)?;
            writeln!(w, "{{")?;
            writeln!(w, "    type cellZone;")?;
            writeln!(w, "cellLabels      List<label> {}", z.cells.len())?;
            writeln!(w, "(")?;
            for c in &z.cells {
                writeln!(w, "{c}")?;
            }
            writeln!(w, ")")?;
            writeln!(w, ";")?;
            writeln!(w, "}}")?;
        }
        writeln!(w, ")")?;
        Ok(())
    }

    /// Write one zone as a cellSet.
    pub fn write_cell_set<W: Write>(&self, mut w: W, zone: &CellZone) -> Result<(), MeshError> {
        let location = format!("{}/{SETS_DIR}", self.location);
        header(&mut w, &location, "cellSet", &zone.name, None)?;
        label_list(&mut w, &zone.cells)
    }

    /// Write every polyMesh file into `dir`.
    pub fn write_dir(&self, dir: &Path, mesh: &Mesh) -> Result<(), MeshError> {
        remove_stale(dir)?;
        write_file(&dir.join("points"), |w| self.write_points(w, mesh))?;
        write_file(&dir.join("faces"), |w| self.write_faces(w, mesh))?;
        write_file(&dir.join("owner"), |w| self.write_owner(w, mesh))?;
        write_file(&dir.join("neighbour"), |w| self.write_neighbour(w, mesh))?;
        write_file(&dir.join("boundary"), |w| self.write_boundary(w, mesh))?;
        if mesh.zones().is_empty() {
            return Ok(());
        }
        write_file(&dir.join("cellZones"), |w| self.write_cell_zones(w, mesh))?;
        for zone in mesh.zones() {
            log::info!("Writing cellSet {} ({} cells)", zone.name, zone.cells.len());
            let path = dir.join(SETS_DIR).join(&zone.name);
            write_file(&path, |w| self.write_cell_set(w, zone))?;
        }
        Ok(())
    }

    /// Write the mesh into the case's polyMesh directory.
    pub fn write_case(ctx: &MeshContext, mesh: &Mesh) -> Result<(), MeshError> {
        let dir = ctx.mesh_dir();
        log::info!("Writing polyMesh to {}", dir.display());
        Self::new(ctx.effective_precision())
            .with_location(ctx.mesh_location())
            .write_dir(&dir, mesh)
    }
}

/// Remove mesh files and cell sets from an earlier run.
fn remove_stale(dir: &Path) -> Result<(), MeshError> {
    let missing_ok = |path: &Path, result: std::io::Result<()>| match result {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(MeshError::writing(path, e)),
        _ => Ok(()),
    };
    for name in MESH_FILES {
        let path = dir.join(name);
        missing_ok(&path, fs::remove_file(&path))?;
    }
    let sets = dir.join(SETS_DIR);
    missing_ok(&sets, fs::remove_dir_all(&sets))
}
