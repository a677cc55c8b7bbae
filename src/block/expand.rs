//! Expansion of a block into a structured lattice of points and hex cells.
//!
//! Lattice point `(i, j, k)` has local index `i + (nx + 1) * (j + (ny + 1) * k)`;
//! cells are numbered with `i` fastest, then `j`, then `k`, and reference their
//! corners in hex-model order.
//!
//! Along each axis the parametric coordinate of a lattice point is the bilinear
//! blend of the four parallel edge distributions, weighted by the index
//! fractions of the two other axes. Points on a block face therefore depend only
//! on that face's corners and edges, which keeps shared faces of neighbouring
//! blocks coincident. The physical position is the trilinear interpolation of
//! the eight corners at the blended coordinates.

use crate::block::{BlockDefinition, BlockFace, HEX_FACES};
use crate::geometry::vector::{Vec3, add, scale};
use crate::grading::Distribution;
use crate::mesh_error::MeshError;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Local points and cells of one expanded block.
///
/// The lattice owns its buffers; the assembler consumes them by value.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockLattice {
    /// Cell counts along ξ, η, ζ.
    pub divisions: [usize; 3],
    /// `(nx + 1)(ny + 1)(nz + 1)` points.
    pub points: Vec<Vec3>,
    /// `nx · ny · nz` cells of local point indices.
    pub cells: Vec<[usize; 8]>,
}

impl BlockLattice {
    #[inline]
    pub fn point_index(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.divisions;
        i + (nx + 1) * (j + (ny + 1) * k)
    }

    #[inline]
    pub fn cell_index(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.divisions;
        i + nx * (j + ny * k)
    }

    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Cells touching a block face together with their face loop (local point
    /// indices, outward from the cell).
    ///
    /// Ordered with the lower of the two in-face axes varying fastest.
    pub fn face_cells(&self, face: BlockFace) -> Vec<(usize, [usize; 4])> {
        let [nx, ny, nz] = self.divisions;
        let fixed = if face.is_max() {
            self.divisions[face.axis()] - 1
        } else {
            0
        };
        let loop_corners = HEX_FACES[face.index()];
        let mut out = Vec::new();
        let mut push = |i: usize, j: usize, k: usize| {
            let cell = self.cell_index(i, j, k);
            let verts = self.cells[cell];
            out.push((cell, loop_corners.map(|c| verts[c])));
        };
        match face.axis() {
            0 => {
                for k in 0..nz {
                    for j in 0..ny {
                        push(fixed, j, k);
                    }
                }
            }
            1 => {
                for k in 0..nz {
                    for i in 0..nx {
                        push(i, fixed, k);
                    }
                }
            }
            _ => {
                for j in 0..ny {
                    for i in 0..nx {
                        push(i, j, fixed);
                    }
                }
            }
        }
        out
    }
}

/// Trilinear shape functions of the hex model at `(u, v, w)`.
fn shape_functions(u: f64, v: f64, w: f64) -> [f64; 8] {
    let (iu, iv, iw) = (1.0 - u, 1.0 - v, 1.0 - w);
    [
        iu * iv * iw,
        u * iv * iw,
        u * v * iw,
        iu * v * iw,
        iu * iv * w,
        u * iv * w,
        u * v * w,
        iu * v * w,
    ]
}

/// Bilinear blend of four edge distributions at index `n` with weights from
/// `(s, t)`; edges are ordered `(0,0)`, `(1,0)`, `(1,1)`, `(0,1)` in `(s, t)`.
fn blend(edges: [&[f64]; 4], n: usize, s: f64, t: f64) -> f64 {
    (1.0 - s) * (1.0 - t) * edges[0][n]
        + s * (1.0 - t) * edges[1][n]
        + s * t * edges[2][n]
        + (1.0 - s) * t * edges[3][n]
}

/// Expand one block given its resolved corner coordinates.
pub fn expand_block(
    index: usize,
    block: &BlockDefinition,
    corners: &[Vec3; 8],
) -> Result<BlockLattice, MeshError> {
    block.validate(index)?;
    let [nx, ny, nz] = block.divisions;
    let gradings = block.edge_gradings(index)?;
    let mut dist: Vec<Vec<f64>> = Vec::with_capacity(12);
    for (edge, grading) in gradings.iter().enumerate() {
        dist.push(grading.parametric(block.divisions[edge / 4])?);
    }
    let d = |e: usize| dist[e].as_slice();
    // edge ordering per axis matched to the (s, t) corners of `blend`
    let x_edges = [d(0), d(1), d(2), d(3)];
    let y_edges = [d(4), d(5), d(6), d(7)];
    let z_edges = [d(8), d(9), d(10), d(11)];

    let mut points = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for k in 0..=nz {
        let fk = k as f64 / nz as f64;
        for j in 0..=ny {
            let fj = j as f64 / ny as f64;
            for i in 0..=nx {
                let fi = i as f64 / nx as f64;
                // x-edges sit at (η, ζ) = (0,0), (1,0), (1,1), (0,1)
                let u = blend(x_edges, i, fj, fk);
                // y-edges sit at (ξ, ζ) = (0,0), (1,0), (1,1), (0,1)
                let v = blend(y_edges, j, fi, fk);
                // z-edges sit at (ξ, η) = (0,0), (1,0), (1,1), (0,1)
                let w = blend(z_edges, k, fi, fj);
                let n = shape_functions(u, v, w);
                let p = corners
                    .iter()
                    .zip(n.iter())
                    .fold([0.0; 3], |acc, (c, &ni)| add(acc, scale(*c, ni)));
                points.push(p);
            }
        }
    }

    let mut cells = Vec::with_capacity(nx * ny * nz);
    let row_stride = nx + 1;
    let slab_stride = row_stride * (ny + 1);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let base = k * slab_stride + j * row_stride + i;
                let v0 = base;
                let v1 = base + 1;
                let v3 = base + row_stride;
                let v2 = v3 + 1;
                let v4 = base + slab_stride;
                let v5 = v4 + 1;
                let v7 = v4 + row_stride;
                let v6 = v7 + 1;
                cells.push([v0, v1, v2, v3, v4, v5, v6, v7]);
            }
        }
    }

    log::debug!(
        "block {index}: {}x{}x{} -> {} points, {} cells",
        nx,
        ny,
        nz,
        points.len(),
        cells.len()
    );

    Ok(BlockLattice {
        divisions: block.divisions,
        points,
        cells,
    })
}

/// Resolve the corner coordinates of a block from the vertex list.
pub fn block_corners(
    index: usize,
    block: &BlockDefinition,
    vertices: &[Vec3],
) -> Result<[Vec3; 8], MeshError> {
    let mut corners = [[0.0; 3]; 8];
    for (slot, &v) in corners.iter_mut().zip(block.vertices.iter()) {
        *slot = *vertices.get(v).ok_or_else(|| MeshError::InvalidBlock {
            block: index,
            reason: format!("vertex {v} out of range ({} vertices)", vertices.len()),
        })?;
    }
    Ok(corners)
}

/// Expand every block; results are returned in block order.
///
/// With the `rayon` feature blocks are expanded concurrently, each into its
/// own slot, so the output order never depends on completion order.
pub fn expand_blocks(
    blocks: &[BlockDefinition],
    vertices: &[Vec3],
) -> Result<Vec<BlockLattice>, MeshError> {
    let expand_one = |(index, block): (usize, &BlockDefinition)| {
        let corners = block_corners(index, block, vertices)?;
        expand_block(index, block, &corners)
    };
    #[cfg(feature = "rayon")]
    {
        blocks.par_iter().enumerate().map(expand_one).collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        blocks.iter().enumerate().map(expand_one).collect()
    }
}
