//! Derivation of the face list from merged block lattices.
//!
//! Faces inside a block are known from the lattice structure. Faces on block
//! boundaries are matched by their global point sets: two coincident block
//! boundary faces become one internal face, the rest stay on the boundary and
//! are grouped into patches. Faces of merge-pair patches are never matched
//! here; they are left for the stitcher.
//!
//! Collapsed blocks repeat points: repeated points are removed from every
//! face and faces left with fewer than three points are dropped.

use crate::block::expand::BlockLattice;
use crate::block::{BlockFace, HEX_FACES};
use crate::geometry::vector::Vec3;
use crate::mesh_error::MeshError;
use crate::topology::patch::{PatchKind, ResolvedPatch};
use hashbrown::HashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A face with its owner cell and, for internal faces, its neighbour.
///
/// Points are ordered so that the right-hand-rule normal points out of the
/// owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub points: Vec<usize>,
    pub owner: usize,
    pub neighbour: Option<usize>,
}

/// A boundary face before patch ranges are fixed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchFace {
    pub owner: usize,
    pub points: Vec<usize>,
}

/// Faces of one boundary patch.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchFaces {
    pub name: String,
    pub kind: PatchKind,
    pub faces: Vec<PatchFace>,
}

/// Cells and faces in global numbering, grouped per block face.
#[derive(Clone, Debug, Default)]
pub struct BlockTopology {
    pub cells: Vec<[usize; 8]>,
    /// `cell_offsets[b]..cell_offsets[b + 1]` are the cells of block `b`.
    pub cell_offsets: Vec<usize>,
    /// Faces between cells of the same block.
    pub internal: Vec<FaceRecord>,
    /// Per block, the cell faces on each of its six faces.
    pub block_faces: Vec<[Vec<PatchFace>; 6]>,
}

/// Mesh under construction: everything but patch ranges and zones.
#[derive(Clone, Debug, Default)]
pub struct FaceTopology {
    pub points: Vec<Vec3>,
    pub cells: Vec<[usize; 8]>,
    pub internal: Vec<FaceRecord>,
    pub patches: Vec<PatchFaces>,
}

impl FaceTopology {
    pub fn patch_index(&self, name: &str) -> Option<usize> {
        self.patches.iter().position(|p| p.name == name)
    }
}

/// Face points with repeats removed, or `None` when fewer than three remain.
fn distinct_points(points: impl IntoIterator<Item = usize>) -> Option<Vec<usize>> {
    let points: Vec<usize> = points.into_iter().unique().collect();
    (points.len() >= 3).then_some(points)
}

/// Move lattice buffers into global numbering.
///
/// `maps[b]` is the local→global point map of block `b`.
pub fn globalize(lattices: Vec<BlockLattice>, maps: &[Vec<usize>]) -> BlockTopology {
    let mut topo = BlockTopology {
        cells: Vec::with_capacity(lattices.iter().map(BlockLattice::n_cells).sum()),
        cell_offsets: vec![0],
        ..Default::default()
    };

    for (block, lattice) in lattices.into_iter().enumerate() {
        let map = &maps[block];
        let offset = topo.cells.len();
        let [nx, ny, nz] = lattice.divisions;

        let faces = BlockFace::ALL.map(|face| {
            lattice
                .face_cells(face)
                .into_iter()
                .filter_map(|(cell, quad)| {
                    let points = distinct_points(quad.iter().map(|&p| map[p]))?;
                    Some(PatchFace {
                        owner: offset + cell,
                        points,
                    })
                })
                .collect()
        });
        topo.block_faces.push(faces);

        let strides = [1, nx, nx * ny];
        let upper = [BlockFace::XMax, BlockFace::YMax, BlockFace::ZMax];
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let cell = lattice.cell_index(i, j, k);
                    let verts = lattice.cells[cell];
                    for (axis, has_next) in [i + 1 < nx, j + 1 < ny, k + 1 < nz]
                        .into_iter()
                        .enumerate()
                    {
                        if !has_next {
                            continue;
                        }
                        let face = HEX_FACES[upper[axis].index()];
                        let Some(points) = distinct_points(face.map(|c| map[verts[c]])) else {
                            continue;
                        };
                        topo.internal.push(FaceRecord {
                            points,
                            owner: offset + cell,
                            neighbour: Some(offset + cell + strides[axis]),
                        });
                    }
                }
            }
        }

        let BlockLattice { mut cells, .. } = lattice;
        for cell in cells.iter_mut() {
            for v in cell.iter_mut() {
                *v = map[*v];
            }
        }
        topo.cells.extend(cells);
        topo.cell_offsets.push(topo.cells.len());
    }
    topo
}

fn face_key(points: &[usize]) -> Vec<usize> {
    let mut key = points.to_vec();
    key.sort_unstable();
    key
}

/// Match coincident block boundary faces and group the remainder into patches.
///
/// Faces not claimed by any patch go to `default_name` (appended to an
/// existing patch of that name, or a new patch of `default_kind`, omitted when
/// empty).
pub fn build_face_topology(
    topo: BlockTopology,
    points: Vec<Vec3>,
    patches: &[ResolvedPatch],
    default_name: &str,
    default_kind: PatchKind,
) -> Result<FaceTopology, MeshError> {
    let BlockTopology {
        cells,
        mut internal,
        mut block_faces,
        ..
    } = topo;

    let mut claims: HashMap<(usize, BlockFace), usize> = HashMap::new();
    for (pi, patch) in patches.iter().enumerate() {
        for &member in &patch.members {
            claims.insert(member, pi);
        }
    }
    let claimed_patch = |block: usize, face: BlockFace| {
        claims
            .get(&(block, face))
            .map(|&pi| &patches[pi])
            .filter(|p| !p.stitched)
    };

    // first sighting of each boundary face: key -> (block, face, position)
    let mut open: HashMap<Vec<usize>, (usize, BlockFace, usize)> = HashMap::new();
    let mut consumed: Vec<[Vec<bool>; 6]> = block_faces
        .iter()
        .map(|faces| faces.each_ref().map(|f| vec![false; f.len()]))
        .collect();

    for block in 0..block_faces.len() {
        for face in BlockFace::ALL {
            if claims
                .get(&(block, face))
                .is_some_and(|&pi| patches[pi].stitched)
            {
                continue;
            }
            for n in 0..block_faces[block][face.index()].len() {
                let key = face_key(&block_faces[block][face.index()][n].points);
                let Some((ob, of, on)) = open.remove(&key) else {
                    open.insert(key, (block, face, n));
                    continue;
                };
                if consumed[ob][of.index()][on] {
                    return Err(MeshError::InvalidGeometry(format!(
                        "face {key:?} is shared by more than two cells"
                    )));
                }
                for (b, f) in [(ob, of), (block, face)] {
                    if let Some(patch) = claimed_patch(b, f) {
                        return Err(MeshError::InteriorPatchFace {
                            block: b,
                            face: f.index(),
                            patch: patch.name.clone(),
                        });
                    }
                }
                let first = &block_faces[ob][of.index()][on];
                let second = &block_faces[block][face.index()][n];
                if first.owner == second.owner {
                    return Err(MeshError::InvalidGeometry(format!(
                        "cell {} meets itself across face {key:?}",
                        first.owner
                    )));
                }
                let (own, nei) = if first.owner < second.owner {
                    (first, second)
                } else {
                    (second, first)
                };
                internal.push(FaceRecord {
                    points: own.points.clone(),
                    owner: own.owner,
                    neighbour: Some(nei.owner),
                });
                consumed[ob][of.index()][on] = true;
                consumed[block][face.index()][n] = true;
                // keep the key so a third sighting is detected
                open.insert(key, (ob, of, on));
            }
        }
    }

    let mut take = |block: usize, face: BlockFace| -> Vec<PatchFace> {
        let faces = std::mem::take(&mut block_faces[block][face.index()]);
        faces
            .into_iter()
            .zip(consumed[block][face.index()].iter())
            .filter(|(_, used)| !**used)
            .map(|(f, _)| f)
            .collect()
    };

    let mut out: Vec<PatchFaces> = patches
        .iter()
        .map(|p| PatchFaces {
            name: p.name.clone(),
            kind: p.kind,
            faces: Vec::new(),
        })
        .collect();
    for (pi, patch) in patches.iter().enumerate() {
        for &(block, face) in &patch.members {
            let faces = take(block, face);
            out[pi].faces.extend(faces);
        }
    }

    let mut default_faces = Vec::new();
    for block in 0..consumed.len() {
        for face in BlockFace::ALL {
            if !claims.contains_key(&(block, face)) {
                default_faces.extend(take(block, face));
            }
        }
    }
    if default_faces.is_empty() {
        log::debug!("no unassigned boundary faces; `{default_name}` omitted");
    } else if let Some(existing) = out.iter_mut().find(|p| p.name == default_name) {
        existing.faces.extend(default_faces);
    } else {
        log::warn!(
            "{} boundary faces not in any patch, collected into `{default_name}`",
            default_faces.len()
        );
        out.push(PatchFaces {
            name: default_name.to_string(),
            kind: default_kind,
            faces: default_faces,
        });
    }

    Ok(FaceTopology {
        points,
        cells,
        internal,
        patches: out,
    })
}
