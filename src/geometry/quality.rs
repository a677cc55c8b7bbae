//! Scaled-Jacobian quality for hexahedral cells.
//!
//! # Corner metric
//! For each of the eight corners of a hexahedron, the three edge vectors to the
//! axis-adjacent corners form a 3×3 matrix `M`. With `σ = det(M)`:
//!
//! - `q = 0` when `σ <= 0` (degenerate or inverted corner),
//! - `q = 3 σ^(2/3) / ‖M‖²_F` otherwise.
//!
//! `q` lies in `(0, 1]` and equals `1` for a right-angled corner with equal
//! edge lengths. The cell quality is the mean over its eight corners.
//!
//! # Vertex ordering
//! Cells use the hex-model ordering of [`crate::block`]: bottom face
//! `[0, 1, 2, 3]`, top face `[4, 5, 6, 7]`, with `4` above `0`.
//!
//! # Examples
//! ```rust
//! use multiblock_mesh::geometry::quality::hex_quality;
//!
//! let cube = [
//!     [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0],
//! ];
//! let q = hex_quality(&cube);
//! assert!((q.mean - 1.0).abs() < 1e-12);
//! ```

use crate::geometry::vector::{Vec3, det3, dot, sub};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// For each corner, the three corners it shares an edge with, ordered so that
/// the edge matrix has positive determinant on a valid cell.
pub const CORNER_NEIGHBOURS: [[usize; 3]; 8] = [
    [3, 4, 1],
    [0, 5, 2],
    [1, 6, 3],
    [2, 7, 0],
    [7, 5, 0],
    [4, 6, 1],
    [5, 7, 2],
    [6, 4, 3],
];

/// Per-corner and mean quality of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellQuality {
    /// Quality of each corner, in local vertex order.
    pub corners: [f64; 8],
    /// Mean of `corners`.
    pub mean: f64,
}

impl CellQuality {
    /// Number of corners with zero quality.
    pub fn degenerate_corners(&self) -> usize {
        self.corners.iter().filter(|&&q| q <= 0.0).count()
    }
}

/// A cell with at least one degenerate or inverted corner.
///
/// Raised by [`evaluate_cells`]; never fatal.
#[derive(Clone, Debug, PartialEq)]
pub struct QualityWarning {
    /// Global cell index.
    pub cell: usize,
    /// Quality breakdown of the cell.
    pub quality: CellQuality,
}

/// Mesh-level quality summary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QualityReport {
    /// Mean quality per cell, indexed like the input cell list.
    pub cell_quality: Vec<f64>,
    /// Minimum cell quality (0 for an empty cell list).
    pub min_quality: f64,
    /// Mean cell quality (0 for an empty cell list).
    pub mean_quality: f64,
    /// Cells containing a corner with `σ <= 0`, ascending by cell index.
    pub warnings: Vec<QualityWarning>,
}

/// Quality of a single corner of the hexahedron `corners`.
pub fn corner_quality(corners: &[Vec3; 8], corner: usize) -> f64 {
    let origin = corners[corner];
    let [a, b, c] = CORNER_NEIGHBOURS[corner];
    let e1 = sub(corners[a], origin);
    let e2 = sub(corners[b], origin);
    let e3 = sub(corners[c], origin);
    let sigma = det3(e1, e2, e3);
    if !(sigma > 0.0) {
        return 0.0;
    }
    let frobenius_sq = dot(e1, e1) + dot(e2, e2) + dot(e3, e3);
    3.0 * sigma.powf(2.0 / 3.0) / frobenius_sq
}

/// Quality of a hexahedron given its eight corner coordinates.
pub fn hex_quality(corners: &[Vec3; 8]) -> CellQuality {
    let mut q = [0.0; 8];
    for (corner, slot) in q.iter_mut().enumerate() {
        *slot = corner_quality(corners, corner);
    }
    CellQuality {
        corners: q,
        mean: q.iter().sum::<f64>() / 8.0,
    }
}

fn gather(points: &[Vec3], cell: &[usize; 8]) -> [Vec3; 8] {
    let mut out = [[0.0; 3]; 8];
    for (slot, &p) in out.iter_mut().zip(cell.iter()) {
        *slot = points[p];
    }
    out
}

/// Evaluate every cell and aggregate min/mean quality.
///
/// `cells` index into `points`; callers guarantee indices are in range.
pub fn evaluate_cells(points: &[Vec3], cells: &[[usize; 8]]) -> QualityReport {
    #[cfg(feature = "rayon")]
    let per_cell: Vec<CellQuality> = cells
        .par_iter()
        .map(|cell| hex_quality(&gather(points, cell)))
        .collect();
    #[cfg(not(feature = "rayon"))]
    let per_cell: Vec<CellQuality> = cells
        .iter()
        .map(|cell| hex_quality(&gather(points, cell)))
        .collect();

    if per_cell.is_empty() {
        return QualityReport::default();
    }

    let mut min_quality = f64::INFINITY;
    let mut sum = 0.0;
    let mut warnings = Vec::new();
    for (cell, q) in per_cell.iter().enumerate() {
        min_quality = min_quality.min(q.mean);
        sum += q.mean;
        if q.degenerate_corners() > 0 {
            warnings.push(QualityWarning { cell, quality: *q });
        }
    }

    QualityReport {
        cell_quality: per_cell.iter().map(|q| q.mean).collect(),
        min_quality,
        mean_quality: sum / per_cell.len() as f64,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_cube() -> [Vec3; 8] {
        [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ]
    }

    #[test]
    fn every_corner_of_a_cube_is_perfect() {
        let q = hex_quality(&unit_cube());
        for c in q.corners {
            assert!((c - 1.0).abs() < 1e-12, "corner quality {c}");
        }
    }

    #[test]
    fn stretched_box_is_below_one() {
        let mut cube = unit_cube();
        for p in cube.iter_mut() {
            p[0] *= 4.0;
        }
        let q = hex_quality(&cube);
        assert!(q.mean < 1.0 && q.mean > 0.0);
    }

    #[test]
    fn inverted_corner_scores_zero() {
        let mut cube = unit_cube();
        // push corner 0 through the opposite face
        cube[0] = [1.5, 1.5, 1.5];
        let q = hex_quality(&cube);
        assert_eq!(q.corners[0], 0.0);
        assert!(q.degenerate_corners() >= 1);
    }

    #[test]
    fn collapsed_edge_scores_zero_at_its_ends() {
        let mut cube = unit_cube();
        cube[1] = cube[0];
        let q = hex_quality(&cube);
        assert_eq!(q.corners[0], 0.0);
        assert_eq!(q.corners[1], 0.0);
    }

    #[test]
    fn report_flags_only_bad_cells() {
        let mut points = unit_cube().to_vec();
        let cells = vec![[0, 1, 2, 3, 4, 5, 6, 7]];
        let good = evaluate_cells(&points, &cells);
        assert!(good.warnings.is_empty());
        assert!((good.min_quality - 1.0).abs() < 1e-12);

        points[6] = [-0.5, -0.5, -0.5];
        let bad = evaluate_cells(&points, &cells);
        assert_eq!(bad.warnings.len(), 1);
        assert!(bad.min_quality < good.min_quality);
    }

    proptest! {
        #[test]
        fn corner_quality_is_bounded(
            offsets in proptest::collection::vec(-0.3f64..0.3, 24)
        ) {
            let mut cube = unit_cube();
            for (i, p) in cube.iter_mut().enumerate() {
                for d in 0..3 {
                    p[d] += offsets[3 * i + d];
                }
            }
            let q = hex_quality(&cube);
            for c in q.corners {
                prop_assert!((0.0..=1.0 + 1e-12).contains(&c));
            }
        }
    }
}
