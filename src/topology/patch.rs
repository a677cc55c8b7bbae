//! Boundary patch kinds and patch tables.

use crate::block::BlockFace;
use serde::{Deserialize, Serialize};

/// Capability tag of a boundary patch.
///
/// Behavioural differences between kinds are validation rules, not dispatch:
/// a [`PatchKind::Merge`] patch must appear in exactly one merge pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchKind {
    /// Generic boundary.
    #[default]
    Patch,
    /// Solid wall.
    Wall,
    /// No-flux boundary, used for reduced-dimension cases.
    Empty,
    /// Symmetry plane.
    Symmetry,
    /// One side of a merge pair.
    Merge,
    /// Catch-all for unassigned boundary faces.
    Default,
}

impl PatchKind {
    /// Name used when writing boundary tables.
    pub fn type_name(self) -> &'static str {
        match self {
            PatchKind::Patch => "patch",
            PatchKind::Wall => "wall",
            PatchKind::Empty => "empty",
            PatchKind::Symmetry => "symmetry",
            PatchKind::Merge | PatchKind::Default => "patch",
        }
    }
}

/// A patch as resolved from the description: every member is a concrete
/// `(block, face)` pair.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedPatch {
    pub name: String,
    pub kind: PatchKind,
    pub members: Vec<(usize, BlockFace)>,
    /// Consumed by a merge pair.
    pub stitched: bool,
}

/// Entry of the final patch table.
///
/// `start` is an offset into the boundary-face sub-sequence, i.e. the first
/// face of the patch is `faces[n_internal_faces + start]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryPatch {
    pub name: String,
    pub kind: PatchKind,
    pub start: usize,
    pub size: usize,
}

impl BoundaryPatch {
    /// Boundary-face offsets covered by this patch.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.size
    }
}
