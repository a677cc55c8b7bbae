//! Cutting of non-matching coincident face sets.
//!
//! A [`FaceCutter`] receives the faces of two coincident boundary patches and
//! returns a set of sub-faces covering both, each owned by a master cell and
//! neighboured by a slave cell. New points are allocated through the supplied
//! [`PointMerger`], so intersections landing on existing points reuse them.
//!
//! [`PolygonClipCutter`] intersects every overlapping master/slave pair by
//! clipping the slave polygon against the edge planes of the (convex) master
//! polygon, in the master plane.

use crate::geometry::vector::{
    Vec3, cross, dot, lerp, norm, polygon_area_vector, scale, segment_distance, sub,
};
use crate::merge::PointMerger;
use crate::mesh_error::MeshError;
use crate::topology::faces::PatchFace;
use hashbrown::HashSet;

/// One sub-face produced by a cutter.
#[derive(Clone, Debug, PartialEq)]
pub struct CutFace {
    /// Outward from `owner`.
    pub points: Vec<usize>,
    pub owner: usize,
    pub neighbour: usize,
    /// Index into the master face list.
    pub master_face: usize,
    /// Index into the slave face list.
    pub slave_face: usize,
}

/// A point lying inside an edge of an original interface face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeInsertion {
    /// Edge endpoints, `edge.0 < edge.1`.
    pub edge: (usize, usize),
    pub point: usize,
    /// Position along the edge measured from `edge.0`.
    pub t: f64,
}

/// Output of a cut.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CutResult {
    pub faces: Vec<CutFace>,
    pub insertions: Vec<EdgeInsertion>,
}

/// External capability: conformal intersection of two coincident face sets.
pub trait FaceCutter {
    fn cut(
        &self,
        master: &[PatchFace],
        slave: &[PatchFace],
        points: &mut PointMerger,
    ) -> Result<CutResult, MeshError>;
}

/// Sutherland–Hodgman clipping of slave faces against master faces.
///
/// Master faces must be convex; slave faces may be any simple polygon whose
/// clipped pieces are convex (always true for convex slaves).
#[derive(Clone, Copy, Debug)]
pub struct PolygonClipCutter {
    /// Sub-faces smaller than this fraction of their master face are dropped.
    pub min_area_fraction: f64,
}

impl Default for PolygonClipCutter {
    fn default() -> Self {
        Self {
            min_area_fraction: 1e-8,
        }
    }
}

fn coords(points: &[Vec3], face: &PatchFace) -> Vec<Vec3> {
    face.points.iter().map(|&p| points[p]).collect()
}

fn bounds(poly: &[Vec3], pad: f64) -> (Vec3, Vec3) {
    let mut lo = [f64::INFINITY; 3];
    let mut hi = [f64::NEG_INFINITY; 3];
    for p in poly {
        for d in 0..3 {
            lo[d] = lo[d].min(p[d] - pad);
            hi[d] = hi[d].max(p[d] + pad);
        }
    }
    (lo, hi)
}

fn overlaps(a: &(Vec3, Vec3), b: &(Vec3, Vec3)) -> bool {
    (0..3).all(|d| a.0[d] <= b.1[d] && b.0[d] <= a.1[d])
}

/// Clip `subject` to the inside of the convex polygon `clip` with normal
/// `normal`; points within `tol` of an edge plane count as inside.
pub fn clip_polygon(subject: &[Vec3], clip: &[Vec3], normal: Vec3, tol: f64) -> Vec<Vec3> {
    let mut output = subject.to_vec();
    let n = clip.len();
    for i in 0..n {
        if output.is_empty() {
            break;
        }
        let a = clip[i];
        let b = clip[(i + 1) % n];
        let inward = cross(normal, sub(b, a));
        let len = norm(inward);
        if len == 0.0 {
            continue;
        }
        let inward = scale(inward, 1.0 / len);
        let dist = |p: Vec3| dot(sub(p, a), inward);
        let input = std::mem::take(&mut output);
        let m = input.len();
        for j in 0..m {
            let cur = input[j];
            let prev = input[(j + m - 1) % m];
            let (dc, dp) = (dist(cur), dist(prev));
            let (cur_in, prev_in) = (dc >= -tol, dp >= -tol);
            if cur_in != prev_in {
                output.push(lerp(prev, cur, dp / (dp - dc)));
            }
            if cur_in {
                output.push(cur);
            }
        }
    }
    output
}

fn dedup_cyclic(ids: &mut Vec<usize>) {
    ids.dedup();
    while ids.len() > 1 && ids.first() == ids.last() {
        ids.pop();
    }
}

fn edge_insertions(
    ids: &[usize],
    faces: [&PatchFace; 2],
    points: &[Vec3],
    tol: f64,
    out: &mut Vec<EdgeInsertion>,
) {
    for &v in ids {
        let x = points[v];
        for face in faces {
            let n = face.points.len();
            for e in 0..n {
                let (p, q) = (face.points[e], face.points[(e + 1) % n]);
                if v == p || v == q {
                    continue;
                }
                let (d, t) = segment_distance(x, points[p], points[q]);
                if d <= tol && t > 0.0 && t < 1.0 {
                    let (edge, t) = if p < q { ((p, q), t) } else { ((q, p), 1.0 - t) };
                    out.push(EdgeInsertion { edge, point: v, t });
                }
            }
        }
    }
}

impl FaceCutter for PolygonClipCutter {
    fn cut(
        &self,
        master: &[PatchFace],
        slave: &[PatchFace],
        points: &mut PointMerger,
    ) -> Result<CutResult, MeshError> {
        let tol = points.tolerance();
        let slave_polys: Vec<Vec<Vec3>> = slave.iter().map(|f| coords(points.points(), f)).collect();
        let slave_bounds: Vec<_> = slave_polys.iter().map(|p| bounds(p, tol)).collect();

        let mut result = CutResult::default();
        for (mi, mface) in master.iter().enumerate() {
            let mpoly = coords(points.points(), mface);
            let area = polygon_area_vector(&mpoly);
            let marea = norm(area);
            if marea == 0.0 {
                return Err(MeshError::InvalidGeometry(format!(
                    "master face {mi} has zero area"
                )));
            }
            let normal = scale(area, 1.0 / marea);
            let mbounds = bounds(&mpoly, tol);

            for (si, spoly) in slave_polys.iter().enumerate() {
                if !overlaps(&mbounds, &slave_bounds[si]) {
                    continue;
                }
                let piece = clip_polygon(spoly, &mpoly, normal, tol);
                if piece.len() < 3 {
                    continue;
                }
                let piece_area = polygon_area_vector(&piece);
                if norm(piece_area) <= self.min_area_fraction * marea {
                    continue;
                }
                let mut ids = Vec::with_capacity(piece.len());
                for p in &piece {
                    ids.push(points.insert(*p)?);
                }
                dedup_cyclic(&mut ids);
                if ids.len() < 3 {
                    continue;
                }
                if dot(piece_area, normal) < 0.0 {
                    ids.reverse();
                }
                edge_insertions(
                    &ids,
                    [mface, &slave[si]],
                    points.points(),
                    tol,
                    &mut result.insertions,
                );
                result.faces.push(CutFace {
                    points: ids,
                    owner: mface.owner,
                    neighbour: slave[si].owner,
                    master_face: mi,
                    slave_face: si,
                });
            }
        }

        // one entry per (edge, point)
        let mut seen: HashSet<((usize, usize), usize)> = HashSet::new();
        result
            .insertions
            .retain(|ins| seen.insert((ins.edge, ins.point)));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipping_overlapping_squares() {
        let up = [0.0, 0.0, 1.0];
        let a = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let b = [
            [0.5, 0.5, 0.0],
            [1.5, 0.5, 0.0],
            [1.5, 1.5, 0.0],
            [0.5, 1.5, 0.0],
        ];
        let piece = clip_polygon(&b, &a, up, 1e-12);
        let area = norm(polygon_area_vector(&piece));
        assert!((area - 0.25).abs() < 1e-12);
    }

    #[test]
    fn disjoint_squares_produce_nothing() {
        let up = [0.0, 0.0, 1.0];
        let a = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let b = a.map(|p| [p[0] + 3.0, p[1], p[2]]);
        assert!(clip_polygon(&b, &a, up, 1e-12).is_empty());
    }

    #[test]
    fn coarse_face_split_by_fine_faces() {
        // master: one unit square; slave: four half squares, reversed winding
        let mut pts = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.5, 0.0, 0.0],
            [1.0, 0.5, 0.0],
            [0.5, 1.0, 0.0],
            [0.0, 0.5, 0.0],
            [0.5, 0.5, 0.0],
        ];
        let master = vec![PatchFace {
            owner: 0,
            points: vec![0, 1, 2, 3],
        }];
        let slave = vec![
            PatchFace { owner: 1, points: vec![0, 7, 8, 4] },
            PatchFace { owner: 2, points: vec![4, 8, 5, 1] },
            PatchFace { owner: 3, points: vec![8, 6, 2, 5] },
            PatchFace { owner: 4, points: vec![7, 3, 6, 8] },
        ];
        let mut merger = PointMerger::with_points(std::mem::take(&mut pts), 1e-9).unwrap();
        let cut = PolygonClipCutter::default()
            .cut(&master, &slave, &mut merger)
            .unwrap();
        assert_eq!(cut.faces.len(), 4);
        assert_eq!(merger.len(), 9, "no new points needed");
        for f in &cut.faces {
            let poly: Vec<Vec3> = f.points.iter().map(|&p| merger.points()[p]).collect();
            assert!(polygon_area_vector(&poly)[2] > 0.0, "outward from master");
            assert_eq!(f.owner, 0);
        }
        // slave mid-edge points sit on the four master edges
        let mut edges: Vec<_> = cut.insertions.iter().map(|i| (i.edge, i.point)).collect();
        edges.sort_unstable();
        assert_eq!(edges, vec![((0, 1), 4), ((0, 3), 7), ((1, 2), 5), ((2, 3), 6)]);
    }
}
