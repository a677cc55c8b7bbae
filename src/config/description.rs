//! The block description: vertices, blocks, patches and merge pairs.
//!
//! Descriptions are plain serde data; [`BlockMeshDescription::validate`]
//! performs every configuration check before anything is expanded and returns
//! the patches with all face references resolved to `(block, face)` pairs.
//!
//! ```json
//! {
//!   "vertices": [[0,0,0],[1,0,0],[1,1,0],[0,1,0],[0,0,1],[1,0,1],[1,1,1],[0,1,1]],
//!   "blocks": [{ "vertices": [0,1,2,3,4,5,6,7], "divisions": [2,2,2], "zone": "fluid" }],
//!   "patches": [{ "name": "walls", "kind": "wall",
//!                 "faces": [{ "block": 0, "face": "x_min" }, [1,2,6,5]] }]
//! }
//! ```

use crate::block::{BlockDefinition, BlockFace};
use crate::geometry::vector::{Vec3, scale};
use crate::mesh_error::MeshError;
use crate::topology::patch::{PatchKind, ResolvedPatch};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn unit_scale() -> f64 {
    1.0
}

/// Reference to one block face.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FaceRef {
    /// Explicit block and local face.
    Block { block: usize, face: BlockFace },
    /// Four vertex indices of a block face, in any order.
    Vertices([usize; 4]),
}

/// A named boundary patch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchDefinition {
    pub name: String,
    #[serde(default)]
    pub kind: PatchKind,
    #[serde(default)]
    pub faces: Vec<FaceRef>,
}

impl PatchDefinition {
    pub fn new(name: impl Into<String>, kind: PatchKind) -> Self {
        Self {
            name: name.into(),
            kind,
            faces: Vec::new(),
        }
    }

    pub fn with_face(mut self, block: usize, face: BlockFace) -> Self {
        self.faces.push(FaceRef::Block { block, face });
        self
    }
}

/// Two patches to be stitched into internal faces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePair {
    /// Owner side.
    pub master: String,
    /// Neighbour side.
    pub slave: String,
}

impl MergePair {
    pub fn new(master: impl Into<String>, slave: impl Into<String>) -> Self {
        Self {
            master: master.into(),
            slave: slave.into(),
        }
    }
}

/// Complete block description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockMeshDescription {
    /// Factor applied to every vertex coordinate.
    #[serde(default = "unit_scale")]
    pub scale: f64,
    pub vertices: Vec<Vec3>,
    pub blocks: Vec<BlockDefinition>,
    #[serde(default)]
    pub patches: Vec<PatchDefinition>,
    #[serde(default)]
    pub merge_pairs: Vec<MergePair>,
}

impl BlockMeshDescription {
    pub fn new(vertices: Vec<Vec3>, blocks: Vec<BlockDefinition>) -> Self {
        Self {
            scale: 1.0,
            vertices,
            blocks,
            patches: Vec::new(),
            merge_pairs: Vec::new(),
        }
    }

    pub fn with_patch(mut self, patch: PatchDefinition) -> Self {
        self.patches.push(patch);
        self
    }

    pub fn with_merge_pair(mut self, pair: MergePair) -> Self {
        self.merge_pairs.push(pair);
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self, MeshError> {
        serde_json::from_str(text).map_err(|e| MeshError::InvalidConfig(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| MeshError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Vertex coordinates multiplied by `scale`.
    pub fn scaled_vertices(&self) -> Vec<Vec3> {
        self.vertices.iter().map(|&v| scale(v, self.scale)).collect()
    }

    /// Total number of cells after expansion.
    pub fn n_cells(&self) -> usize {
        self.blocks.iter().map(BlockDefinition::n_cells).sum()
    }

    /// Number of blocks carrying a zone name.
    pub fn n_zoned_blocks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.zone.as_deref().is_some_and(|z| !z.is_empty()))
            .count()
    }

    fn resolve_face(&self, patch: &str, face: &FaceRef) -> Result<(usize, BlockFace), MeshError> {
        match face {
            FaceRef::Block { block, face } => {
                if *block >= self.blocks.len() {
                    return Err(MeshError::InvalidConfig(format!(
                        "patch `{patch}` references block {block} of {}",
                        self.blocks.len()
                    )));
                }
                Ok((*block, *face))
            }
            FaceRef::Vertices(verts) => {
                let mut wanted = *verts;
                wanted.sort_unstable();
                let mut found = Vec::new();
                for (b, block) in self.blocks.iter().enumerate() {
                    for f in BlockFace::ALL {
                        let mut have = block.face_vertices(f);
                        have.sort_unstable();
                        if have == wanted {
                            found.push((b, f));
                        }
                    }
                }
                match found.as_slice() {
                    [single] => Ok(*single),
                    [] => Err(MeshError::InvalidConfig(format!(
                        "patch `{patch}` face {verts:?} is not a block face"
                    ))),
                    _ => Err(MeshError::InvalidConfig(format!(
                        "patch `{patch}` face {verts:?} is shared by blocks {:?}",
                        found.iter().map(|(b, _)| *b).collect::<Vec<_>>()
                    ))),
                }
            }
        }
    }

    /// Run all configuration checks and resolve patch membership.
    ///
    /// Patches come back in declaration order, followed by patches that are
    /// only named from block `face_patches` (kind [`PatchKind::Patch`]) in
    /// first-seen order.
    pub fn validate(&self) -> Result<Vec<ResolvedPatch>, MeshError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(MeshError::InvalidConfig(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if self.blocks.is_empty() {
            return Err(MeshError::InvalidConfig("no blocks defined".into()));
        }
        if let Some(idx) = self
            .vertices
            .iter()
            .position(|v| v.iter().any(|c| !c.is_finite()))
        {
            return Err(MeshError::InvalidConfig(format!(
                "vertex {idx} has a non-finite coordinate"
            )));
        }
        for (b, block) in self.blocks.iter().enumerate() {
            if let Some(&v) = block.vertices.iter().find(|&&v| v >= self.vertices.len()) {
                return Err(MeshError::InvalidBlock {
                    block: b,
                    reason: format!("vertex {v} out of range ({} vertices)", self.vertices.len()),
                });
            }
            block.validate(b)?;
        }

        let mut resolved: Vec<ResolvedPatch> = Vec::with_capacity(self.patches.len());
        let mut by_name: HashMap<String, usize> = HashMap::new();
        let mut claims: HashMap<(usize, BlockFace), usize> = HashMap::new();

        let mut claim = |resolved: &mut Vec<ResolvedPatch>,
                         pi: usize,
                         member: (usize, BlockFace)|
         -> Result<(), MeshError> {
            if let Some(&prev) = claims.get(&member) {
                return Err(MeshError::FaceClaimedTwice {
                    block: member.0,
                    face: member.1.index(),
                    first: resolved[prev].name.clone(),
                    second: resolved[pi].name.clone(),
                });
            }
            claims.insert(member, pi);
            resolved[pi].members.push(member);
            Ok(())
        };

        for patch in &self.patches {
            if patch.name.is_empty() {
                return Err(MeshError::InvalidConfig("patch with empty name".into()));
            }
            if by_name.contains_key(&patch.name) {
                return Err(MeshError::DuplicatePatch(patch.name.clone()));
            }
            let pi = resolved.len();
            by_name.insert(patch.name.clone(), pi);
            resolved.push(ResolvedPatch {
                name: patch.name.clone(),
                kind: patch.kind,
                members: Vec::with_capacity(patch.faces.len()),
                stitched: false,
            });
            for face in &patch.faces {
                let member = self.resolve_face(&patch.name, face)?;
                claim(&mut resolved, pi, member)?;
            }
        }

        for (b, block) in self.blocks.iter().enumerate() {
            for (&face, name) in &block.face_patches {
                if name.is_empty() {
                    continue;
                }
                let pi = match by_name.get(name) {
                    Some(&pi) => pi,
                    None => {
                        let pi = resolved.len();
                        by_name.insert(name.clone(), pi);
                        resolved.push(ResolvedPatch {
                            name: name.clone(),
                            kind: PatchKind::Patch,
                            members: Vec::new(),
                            stitched: false,
                        });
                        pi
                    }
                };
                claim(&mut resolved, pi, (b, face))?;
            }
        }

        for pair in &self.merge_pairs {
            if pair.master == pair.slave {
                return Err(MeshError::InvalidConfig(format!(
                    "merge pair stitches `{}` to itself",
                    pair.master
                )));
            }
            for name in [&pair.master, &pair.slave] {
                let pi = *by_name
                    .get(name)
                    .ok_or_else(|| MeshError::UnknownPatch(name.clone()))?;
                if resolved[pi].stitched {
                    return Err(MeshError::InvalidConfig(format!(
                        "patch `{name}` appears in more than one merge pair"
                    )));
                }
                resolved[pi].stitched = true;
            }
        }

        if let Some(p) = resolved
            .iter()
            .find(|p| p.kind == PatchKind::Merge && !p.stitched)
        {
            return Err(MeshError::InvalidConfig(format!(
                "merge patch `{}` is not part of any merge pair",
                p.name
            )));
        }

        Ok(resolved)
    }
}
