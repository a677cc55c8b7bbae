//! Stitching of merge-pair patches into internal faces.
//!
//! Two coincident boundary patches are fused: their faces are replaced by
//! internal faces owned by master-side cells and neighboured by slave-side
//! cells, and both patches disappear from the boundary. When the two patches
//! carry the same point sets face by face, faces are paired directly;
//! otherwise a [`FaceCutter`] computes the sub-faces and any point the cut
//! leaves on an edge of an original interface face is inserted into every
//! other face using that edge, which keeps the result conformal.
//!
//! All checks run before the topology is touched: a failed stitch leaves the
//! input unchanged.

pub mod cutter;

pub use cutter::{CutFace, CutResult, EdgeInsertion, FaceCutter, PolygonClipCutter};

use crate::geometry::vector::{Vec3, dot, norm, polygon_area_vector};
use crate::merge::PointMerger;
use crate::mesh_error::MeshError;
use crate::topology::faces::{FaceRecord, FaceTopology, PatchFace};
use hashbrown::HashMap;
use itertools::Itertools;

/// Relative tolerance on interface areas and per-face coverage.
pub const AREA_TOLERANCE: f64 = 1e-6;

/// Outcome of one stitch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StitchSummary {
    pub master: String,
    pub slave: String,
    pub internal_faces_added: usize,
    pub points_added: usize,
    /// Whether the face sets matched one to one.
    pub conformal: bool,
}

fn mismatch(master: &str, slave: &str, reason: impl Into<String>) -> MeshError {
    MeshError::PatchMismatch {
        master: master.to_string(),
        slave: slave.to_string(),
        reason: reason.into(),
    }
}

fn face_area(points: &[Vec3], face: &[usize]) -> Vec3 {
    let poly: Vec<Vec3> = face.iter().map(|&p| points[p]).collect();
    polygon_area_vector(&poly)
}

fn sorted_key(points: &[usize]) -> Vec<usize> {
    let mut key = points.to_vec();
    key.sort_unstable();
    key
}

/// Pair faces with identical point sets, or `None` if any face is unmatched.
fn pair_conformal(
    points: &[Vec3],
    master: &[PatchFace],
    slave: &[PatchFace],
    names: (&str, &str),
) -> Result<Option<Vec<FaceRecord>>, MeshError> {
    if master.len() != slave.len() {
        return Ok(None);
    }
    let by_key: HashMap<Vec<usize>, usize> = slave
        .iter()
        .enumerate()
        .map(|(i, f)| (sorted_key(&f.points), i))
        .collect();
    let mut faces = Vec::with_capacity(master.len());
    for (mi, m) in master.iter().enumerate() {
        let Some(&si) = by_key.get(&sorted_key(&m.points)) else {
            return Ok(None);
        };
        let s = &slave[si];
        if dot(face_area(points, &m.points), face_area(points, &s.points)) >= 0.0 {
            return Err(mismatch(
                names.0,
                names.1,
                format!("face {mi} and its partner {si} point the same way"),
            ));
        }
        faces.push(FaceRecord {
            points: m.points.clone(),
            owner: m.owner,
            neighbour: Some(s.owner),
        });
    }
    Ok(Some(faces))
}

fn check_coverage(
    side: &str,
    faces: &[PatchFace],
    covered: &[f64],
    points: &[Vec3],
    names: (&str, &str),
) -> Result<(), MeshError> {
    for (i, face) in faces.iter().enumerate() {
        let area = norm(face_area(points, &face.points));
        if (covered[i] - area).abs() > AREA_TOLERANCE * area.max(f64::MIN_POSITIVE) {
            return Err(mismatch(
                names.0,
                names.1,
                format!(
                    "{side} face {i} is {:.6}% covered",
                    100.0 * covered[i] / area
                ),
            ));
        }
    }
    Ok(())
}

/// Insert cut points into the faces that use the split edges.
fn insert_edge_points(faces: &mut [Vec<usize>], insertions: &[EdgeInsertion]) -> usize {
    let mut by_edge: HashMap<(usize, usize), Vec<(f64, usize)>> = HashMap::new();
    for ins in insertions {
        by_edge.entry(ins.edge).or_default().push((ins.t, ins.point));
    }
    for list in by_edge.values_mut() {
        list.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    let mut changed = 0;
    for face in faces.iter_mut() {
        let n = face.len();
        let mut out = Vec::with_capacity(n);
        for e in 0..n {
            let (a, b) = (face[e], face[(e + 1) % n]);
            out.push(a);
            let Some(list) = by_edge.get(&(a.min(b), a.max(b))) else {
                continue;
            };
            let inner = list.iter().map(|&(_, p)| p).filter(|&p| p != a && p != b);
            if a < b {
                out.extend(inner);
            } else {
                out.extend(inner.rev());
            }
        }
        if out.len() != n {
            changed += 1;
            *face = out;
        }
    }
    changed
}

/// Cut non-matching interface faces and check the pieces against both sides.
///
/// New points stay in `merger`; the caller drops them on error.
fn cut_interface(
    cutter: &dyn FaceCutter,
    master_faces: &[PatchFace],
    slave_faces: &[PatchFace],
    merger: &mut PointMerger,
    names: (&str, &str),
) -> Result<(Vec<FaceRecord>, Vec<EdgeInsertion>), MeshError> {
    let cut = cutter.cut(master_faces, slave_faces, merger)?;
    let points = merger.points();

    let master_areas: Vec<Vec3> = master_faces
        .iter()
        .map(|f| face_area(points, &f.points))
        .collect();
    let slave_areas: Vec<Vec3> = slave_faces
        .iter()
        .map(|f| face_area(points, &f.points))
        .collect();
    let mut covered_master = vec![0.0; master_faces.len()];
    let mut covered_slave = vec![0.0; slave_faces.len()];
    for f in &cut.faces {
        if dot(master_areas[f.master_face], slave_areas[f.slave_face]) >= 0.0 {
            return Err(mismatch(
                names.0,
                names.1,
                format!(
                    "master face {} and overlapping slave face {} point the same way",
                    f.master_face, f.slave_face
                ),
            ));
        }
        let a = norm(face_area(points, &f.points));
        covered_master[f.master_face] += a;
        covered_slave[f.slave_face] += a;
    }
    check_coverage("master", master_faces, &covered_master, points, names)?;
    check_coverage("slave", slave_faces, &covered_slave, points, names)?;

    let faces = cut
        .faces
        .into_iter()
        .map(|f| FaceRecord {
            points: f.points,
            owner: f.owner,
            neighbour: Some(f.neighbour),
        })
        .collect();
    Ok((faces, cut.insertions))
}

/// Fuse the patches `master` and `slave` of `topo`.
pub fn stitch_pair(
    topo: &mut FaceTopology,
    master: &str,
    slave: &str,
    tolerance: f64,
    cutter: &dyn FaceCutter,
) -> Result<StitchSummary, MeshError> {
    let names = (master, slave);
    let mi = topo
        .patch_index(master)
        .ok_or_else(|| MeshError::UnknownPatch(master.to_string()))?;
    let si = topo
        .patch_index(slave)
        .ok_or_else(|| MeshError::UnknownPatch(slave.to_string()))?;
    let master_faces = &topo.patches[mi].faces;
    let slave_faces = &topo.patches[si].faces;

    let total = |faces: &[PatchFace]| -> f64 {
        faces
            .iter()
            .map(|f| norm(face_area(&topo.points, &f.points)))
            .sum()
    };
    let (master_area, slave_area) = (total(master_faces), total(slave_faces));
    if (master_area - slave_area).abs() > AREA_TOLERANCE * master_area.max(slave_area) {
        return Err(mismatch(
            master,
            slave,
            format!("interface areas differ: {master_area} vs {slave_area}"),
        ));
    }

    let n_points = topo.points.len();
    let (new_faces, insertions, conformal) =
        match pair_conformal(&topo.points, master_faces, slave_faces, names)? {
            Some(faces) => (faces, Vec::new(), true),
            None => {
                let interface: Vec<usize> = master_faces
                    .iter()
                    .chain(slave_faces)
                    .flat_map(|f| f.points.iter().copied())
                    .unique()
                    .collect();
                let mut merger = PointMerger::new(tolerance)?
                    .adopt(std::mem::take(&mut topo.points), interface);
                let outcome = cut_interface(cutter, master_faces, slave_faces, &mut merger, names);
                topo.points = merger.into_points();
                match outcome {
                    Ok((faces, insertions)) => (faces, insertions, false),
                    Err(err) => {
                        topo.points.truncate(n_points);
                        return Err(err);
                    }
                }
            }
        };

    // validated; mutate
    let (hi, lo) = if mi > si { (mi, si) } else { (si, mi) };
    topo.patches.remove(hi);
    topo.patches.remove(lo);

    if !insertions.is_empty() {
        let mut touched = 0;
        let mut internal: Vec<Vec<usize>> =
            topo.internal.iter_mut().map(|f| std::mem::take(&mut f.points)).collect();
        touched += insert_edge_points(&mut internal, &insertions);
        for (face, points) in topo.internal.iter_mut().zip(internal) {
            face.points = points;
        }
        for patch in topo.patches.iter_mut() {
            let mut faces: Vec<Vec<usize>> = patch
                .faces
                .iter_mut()
                .map(|f| std::mem::take(&mut f.points))
                .collect();
            touched += insert_edge_points(&mut faces, &insertions);
            for (face, points) in patch.faces.iter_mut().zip(faces) {
                face.points = points;
            }
        }
        log::debug!(
            "{} edge points inserted into {touched} neighbouring faces",
            insertions.len()
        );
    }

    let summary = StitchSummary {
        master: master.to_string(),
        slave: slave.to_string(),
        internal_faces_added: new_faces.len(),
        points_added: topo.points.len() - n_points,
        conformal,
    };
    topo.internal.extend(new_faces);
    log::info!(
        "Stitched {master} -> {slave}: {} internal faces, {} new points{}",
        summary.internal_faces_added,
        summary.points_added,
        if conformal { "" } else { " (cut)" }
    );
    Ok(summary)
}
