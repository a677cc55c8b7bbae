//! Block definitions and the hexahedron model shared by blocks and cells.
//!
//! # Hex model
//! Corners are numbered in block coordinates `(ξ, η, ζ)`:
//!
//! | corner | ξ | η | ζ |
//! |--------|---|---|---|
//! | 0      | 0 | 0 | 0 |
//! | 1      | 1 | 0 | 0 |
//! | 2      | 1 | 1 | 0 |
//! | 3      | 0 | 1 | 0 |
//! | 4      | 0 | 0 | 1 |
//! | 5      | 1 | 0 | 1 |
//! | 6      | 1 | 1 | 1 |
//! | 7      | 0 | 1 | 1 |
//!
//! Edges `0..4` run along ξ, `4..8` along η and `8..12` along ζ (see
//! [`HEX_EDGES`]). Faces are listed in [`HEX_FACES`] with outward normals by
//! the right-hand rule. The same numbering is used for every generated cell.

pub mod expand;

use crate::grading::EdgeGrading;
use crate::mesh_error::MeshError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Corner pairs of the twelve hex edges, each oriented along its axis.
pub const HEX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (3, 2),
    (7, 6),
    (4, 5),
    (0, 3),
    (1, 2),
    (5, 6),
    (4, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Corner loops of the six hex faces, outward-oriented.
pub const HEX_FACES: [[usize; 4]; 6] = [
    [0, 4, 7, 3],
    [1, 2, 6, 5],
    [0, 1, 5, 4],
    [3, 7, 6, 2],
    [0, 3, 2, 1],
    [4, 5, 6, 7],
];

/// One of the six faces of a block (or cell).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BlockFace {
    XMin,
    XMax,
    YMin,
    YMax,
    ZMin,
    ZMax,
}

impl BlockFace {
    /// All faces in local index order.
    pub const ALL: [BlockFace; 6] = [
        BlockFace::XMin,
        BlockFace::XMax,
        BlockFace::YMin,
        BlockFace::YMax,
        BlockFace::ZMin,
        BlockFace::ZMax,
    ];

    /// Local face index `0..6`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Axis normal to this face.
    pub fn axis(self) -> usize {
        self.index() / 2
    }

    /// True for the face at the upper end of its axis.
    pub fn is_max(self) -> bool {
        self.index() % 2 == 1
    }

    /// Corner loop of this face.
    pub fn corners(self) -> [usize; 4] {
        HEX_FACES[self.index()]
    }
}

/// One hexahedral block of the description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    /// Indices into the description's vertex list, in hex-model order.
    pub vertices: [usize; 8],
    /// Cell counts along ξ, η, ζ.
    pub divisions: [usize; 3],
    /// Empty (uniform), one entry for all edges, three (per axis) or twelve
    /// (per edge, in [`HEX_EDGES`] order).
    #[serde(default)]
    pub grading: Vec<EdgeGrading>,
    /// Cell zone receiving every cell of this block.
    #[serde(default)]
    pub zone: Option<String>,
    /// Patch assignment of individual faces.
    #[serde(default)]
    pub face_patches: BTreeMap<BlockFace, String>,
}

impl BlockDefinition {
    /// Block with uniform grading, no zone and no face patches.
    pub fn new(vertices: [usize; 8], divisions: [usize; 3]) -> Self {
        Self {
            vertices,
            divisions,
            grading: Vec::new(),
            zone: None,
            face_patches: BTreeMap::new(),
        }
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_grading(mut self, grading: Vec<EdgeGrading>) -> Self {
        self.grading = grading;
        self
    }

    pub fn with_face_patch(mut self, face: BlockFace, patch: impl Into<String>) -> Self {
        self.face_patches.insert(face, patch.into());
        self
    }

    /// Number of cells this block expands to.
    pub fn n_cells(&self) -> usize {
        self.divisions.iter().product()
    }

    /// Expand the grading list to one entry per edge.
    pub fn edge_gradings(&self, block: usize) -> Result<[EdgeGrading; 12], MeshError> {
        let per_edge: Vec<EdgeGrading> = match self.grading.len() {
            0 => vec![EdgeGrading::Uniform; 12],
            1 => vec![self.grading[0].clone(); 12],
            3 => (0..12).map(|e| self.grading[e / 4].clone()).collect(),
            12 => self.grading.clone(),
            n => {
                return Err(MeshError::InvalidBlock {
                    block,
                    reason: format!("expected 0, 1, 3 or 12 edge gradings, got {n}"),
                });
            }
        };
        per_edge.try_into().map_err(|_| MeshError::InvalidBlock {
            block,
            reason: "edge grading expansion failed".into(),
        })
    }

    /// Vertex indices of a block face, in outward order.
    pub fn face_vertices(&self, face: BlockFace) -> [usize; 4] {
        face.corners().map(|c| self.vertices[c])
    }

    /// Check divisions and gradings.
    pub fn validate(&self, block: usize) -> Result<(), MeshError> {
        for (axis, &n) in self.divisions.iter().enumerate() {
            if n < 1 {
                return Err(MeshError::InvalidBlock {
                    block,
                    reason: format!("axis {axis} has {n} divisions, expected at least 1"),
                });
            }
        }
        let gradings = self.edge_gradings(block)?;
        for (edge, grading) in gradings.iter().enumerate() {
            grading
                .validate(self.divisions[edge / 4])
                .map_err(|err| MeshError::InvalidBlock {
                    block,
                    reason: format!("edge {edge}: {err}"),
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_match_their_axes() {
        for face in BlockFace::ALL {
            let [a, b, c, d] = face.corners();
            let coord = |corner: usize| -> usize {
                let bits = [
                    [0, 0, 0],
                    [1, 0, 0],
                    [1, 1, 0],
                    [0, 1, 0],
                    [0, 0, 1],
                    [1, 0, 1],
                    [1, 1, 1],
                    [0, 1, 1],
                ];
                bits[corner][face.axis()]
            };
            let expected = usize::from(face.is_max());
            for corner in [a, b, c, d] {
                assert_eq!(coord(corner), expected, "{face:?}");
            }
        }
    }

    #[test]
    fn grading_list_lengths() {
        let block = BlockDefinition::new([0, 1, 2, 3, 4, 5, 6, 7], [2, 3, 4]).with_grading(vec![
            EdgeGrading::Simple(2.0),
            EdgeGrading::Uniform,
            EdgeGrading::Simple(0.5),
        ]);
        let g = block.edge_gradings(0).unwrap();
        assert_eq!(g[3], EdgeGrading::Simple(2.0));
        assert_eq!(g[4], EdgeGrading::Uniform);
        assert_eq!(g[11], EdgeGrading::Simple(0.5));

        let bad = block.clone().with_grading(vec![EdgeGrading::Uniform; 2]);
        assert!(matches!(
            bad.validate(7),
            Err(MeshError::InvalidBlock { block: 7, .. })
        ));
    }

    #[test]
    fn zero_divisions_rejected() {
        let block = BlockDefinition::new([0, 1, 2, 3, 4, 5, 6, 7], [2, 0, 1]);
        assert!(block.validate(0).is_err());
    }
}
