//! Run configuration.
//!
//! [`MeshContext`] carries every setting the pipeline needs (case location,
//! output precision, merge tolerance, default patch) and is passed explicitly
//! to [`crate::mesh_generation::generate`]. [`BlockMeshDescription`] is the
//! parsed block description itself.

pub mod description;

pub use description::{BlockMeshDescription, FaceRef, MergePair, PatchDefinition};

use crate::topology::patch::PatchKind;
use std::path::{Path, PathBuf};

/// Default merge tolerance, absolute, applied after vertex scaling.
pub const DEFAULT_MERGE_TOLERANCE: f64 = 1e-6;
/// Lower bound on the number of significant digits written for points.
pub const MIN_WRITE_PRECISION: usize = 10;
/// Name of the patch collecting unassigned boundary faces.
pub const DEFAULT_PATCH_NAME: &str = "defaultFaces";

/// Name and kind of the patch receiving unassigned boundary faces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaultPatch {
    pub name: String,
    pub kind: PatchKind,
}

impl Default for DefaultPatch {
    fn default() -> Self {
        Self {
            name: DEFAULT_PATCH_NAME.to_string(),
            kind: PatchKind::Empty,
        }
    }
}

/// Explicit settings threaded through mesh generation and writing.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshContext {
    /// Case root; writers place output below it.
    pub case_dir: PathBuf,
    /// Optional mesh region (sub-directory of `constant`).
    pub region: Option<String>,
    /// Significant digits for point coordinates (at least
    /// [`MIN_WRITE_PRECISION`] is used).
    pub write_precision: usize,
    /// Distance under which two points are the same point.
    pub merge_tolerance: f64,
    pub default_patch: DefaultPatch,
}

impl Default for MeshContext {
    fn default() -> Self {
        Self {
            case_dir: PathBuf::from("."),
            region: None,
            write_precision: MIN_WRITE_PRECISION,
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
            default_patch: DefaultPatch::default(),
        }
    }
}

impl MeshContext {
    pub fn new(case_dir: impl Into<PathBuf>) -> Self {
        Self {
            case_dir: case_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_write_precision(mut self, digits: usize) -> Self {
        self.write_precision = digits;
        self
    }

    pub fn with_merge_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_tolerance = tolerance;
        self
    }

    pub fn with_default_patch(mut self, name: impl Into<String>, kind: PatchKind) -> Self {
        self.default_patch = DefaultPatch {
            name: name.into(),
            kind,
        };
        self
    }

    /// Digits actually used when writing points.
    pub fn effective_precision(&self) -> usize {
        self.write_precision.max(MIN_WRITE_PRECISION)
    }

    /// `case_dir/constant[/region]/polyMesh`.
    pub fn mesh_dir(&self) -> PathBuf {
        let mut dir = self.case_dir.join("constant");
        if let Some(region) = &self.region {
            dir.push(region);
        }
        dir.join("polyMesh")
    }

    /// [`Self::mesh_dir`] relative to the case directory, as written in file
    /// headers.
    pub fn mesh_location(&self) -> String {
        match &self.region {
            Some(region) => format!("constant/{region}/polyMesh"),
            None => "constant/polyMesh".to_string(),
        }
    }

    /// Resolve a path relative to the case directory.
    pub fn case_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.case_dir.join(relative)
    }
}
