//! Tolerance-based deduplication of points shared by neighbouring blocks.
//!
//! Space is hashed into cubic buckets with edge length equal to the merge
//! tolerance, so every point within tolerance of a query lies in one of the
//! 27 buckets around it. Points are processed in block order, then local
//! lattice order; a point within tolerance of an existing global point reuses
//! that index and otherwise allocates the next one. A reused point keeps the
//! coordinates of the first point that created it, so chains of near-tolerance
//! matches cannot drift.
//!
//! When several existing global points lie within tolerance of a new point and
//! they are not mutually coincident, the topology is malformed and
//! [`MeshError::AmbiguousMerge`] is returned.

use crate::block::expand::BlockLattice;
use crate::geometry::vector::{Vec3, distance};
use crate::mesh_error::MeshError;
use hashbrown::HashMap;
use itertools::Itertools;

type BucketKey = (i64, i64, i64);

/// Incremental point set with tolerance lookup.
#[derive(Clone, Debug)]
pub struct PointMerger {
    tolerance: f64,
    buckets: HashMap<BucketKey, Vec<usize>>,
    points: Vec<Vec3>,
}

/// Global points plus, per block, the local→global index map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergedPoints {
    pub points: Vec<Vec3>,
    pub local_to_global: Vec<Vec<usize>>,
}

impl PointMerger {
    /// Create an empty merger. The tolerance must be positive and finite.
    pub fn new(tolerance: f64) -> Result<Self, MeshError> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(MeshError::InvalidConfig(format!(
                "merge tolerance must be positive, got {tolerance}"
            )));
        }
        Ok(Self {
            tolerance,
            buckets: HashMap::new(),
            points: Vec::new(),
        })
    }

    /// Create a merger pre-populated with already distinct points; their
    /// indices are kept.
    pub fn with_points(points: Vec<Vec3>, tolerance: f64) -> Result<Self, MeshError> {
        let n = points.len();
        Ok(Self::new(tolerance)?.adopt(points, 0..n))
    }

    /// Take over `points` as the point buffer, indexing only `searchable`.
    ///
    /// New points are appended after the adopted ones; points left out of
    /// `searchable` keep their indices but are never returned by lookups.
    pub fn adopt(mut self, points: Vec<Vec3>, searchable: impl IntoIterator<Item = usize>) -> Self {
        for idx in searchable {
            let key = self.key(points[idx]);
            self.buckets.entry(key).or_default().push(idx);
        }
        self.points = points;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Vec3> {
        self.points
    }

    fn key(&self, p: Vec3) -> BucketKey {
        let s = 1.0 / self.tolerance;
        (
            (p[0] * s).floor() as i64,
            (p[1] * s).floor() as i64,
            (p[2] * s).floor() as i64,
        )
    }

    /// Existing point within tolerance of `p`, if any.
    ///
    /// Several candidates resolve to the first-created one when they are
    /// mutually within tolerance, and are an error otherwise.
    pub fn find(&self, p: Vec3) -> Result<Option<usize>, MeshError> {
        let (kx, ky, kz) = self.key(p);
        let mut candidates: Vec<usize> = Vec::new();
        for (dx, dy, dz) in (-1..=1)
            .cartesian_product(-1..=1)
            .cartesian_product(-1..=1)
            .map(|((a, b), c)| (a, b, c))
        {
            if let Some(bucket) = self.buckets.get(&(kx + dx, ky + dy, kz + dz)) {
                candidates.extend(
                    bucket
                        .iter()
                        .copied()
                        .filter(|&g| distance(self.points[g], p) <= self.tolerance),
                );
            }
        }
        match candidates.len() {
            0 => Ok(None),
            1 => Ok(Some(candidates[0])),
            _ => {
                candidates.sort_unstable();
                let spread = candidates
                    .iter()
                    .tuple_combinations()
                    .any(|(&a, &b)| distance(self.points[a], self.points[b]) > self.tolerance);
                if spread {
                    Err(MeshError::AmbiguousMerge {
                        location: p,
                        candidates,
                        tolerance: self.tolerance,
                    })
                } else {
                    Ok(Some(candidates[0]))
                }
            }
        }
    }

    /// Global index for `p`, allocating a new point when nothing matches.
    pub fn insert(&mut self, p: Vec3) -> Result<usize, MeshError> {
        if let Some(existing) = self.find(p)? {
            return Ok(existing);
        }
        let idx = self.points.len();
        let key = self.key(p);
        self.buckets.entry(key).or_default().push(idx);
        self.points.push(p);
        Ok(idx)
    }
}

/// Merge the lattices of all blocks, in block order.
pub fn merge_lattices(
    lattices: &[BlockLattice],
    tolerance: f64,
) -> Result<MergedPoints, MeshError> {
    let mut merger = PointMerger::new(tolerance)?;
    let mut local_to_global = Vec::with_capacity(lattices.len());
    for lattice in lattices {
        let mut map = Vec::with_capacity(lattice.n_points());
        for &p in &lattice.points {
            map.push(merger.insert(p)?);
        }
        local_to_global.push(map);
    }
    Ok(MergedPoints {
        points: merger.into_points(),
        local_to_global,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coincident_points_share_an_index() {
        let mut m = PointMerger::new(1e-6).unwrap();
        let a = m.insert([0.0, 0.0, 0.0]).unwrap();
        let b = m.insert([1.0, 0.0, 0.0]).unwrap();
        let c = m.insert([1.0 + 1e-9, 0.0, 0.0]).unwrap();
        assert_eq!((a, b, c), (0, 1, 1));
        assert_eq!(m.points()[1], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn matches_across_bucket_boundaries() {
        let mut m = PointMerger::new(1e-3).unwrap();
        m.insert([0.9999e-3, 0.0, 0.0]).unwrap();
        assert_eq!(m.insert([1.0001e-3, 0.0, 0.0]).unwrap(), 0);
    }

    #[test]
    fn ambiguous_cluster_is_an_error() {
        // two distinct points 1.5 tol apart, queried from their midpoint
        let m = PointMerger::with_points(vec![[0.0, 0.0, 0.0], [1.5, 0.0, 0.0]], 1.0).unwrap();
        let err = m.find([0.75, 0.0, 0.0]).unwrap_err();
        match err {
            MeshError::AmbiguousMerge { candidates, .. } => assert_eq!(candidates, vec![0, 1]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn adopted_points_outside_the_search_set_are_not_reused() {
        let points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let mut m = PointMerger::new(1e-6).unwrap().adopt(points, [1]);
        assert_eq!(m.insert([1.0, 0.0, 0.0]).unwrap(), 1);
        assert_eq!(m.insert([0.0, 0.0, 0.0]).unwrap(), 3);
        assert_eq!(m.into_points().len(), 4);
    }

    #[test]
    fn tolerance_must_be_positive() {
        assert!(PointMerger::new(0.0).is_err());
        assert!(PointMerger::new(f64::NAN).is_err());
    }
}
