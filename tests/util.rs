#![allow(dead_code)]
use hashbrown::HashMap;
use multiblock_mesh::geometry::vector::{Vec3, add, norm, polygon_area_vector, scale};
use multiblock_mesh::prelude::*;
use std::path::PathBuf;

/// The eight corners of an axis-aligned box in hex-model order.
pub fn box_vertices(lo: Vec3, hi: Vec3) -> Vec<Vec3> {
    vec![
        [lo[0], lo[1], lo[2]],
        [hi[0], lo[1], lo[2]],
        [hi[0], hi[1], lo[2]],
        [lo[0], hi[1], lo[2]],
        [lo[0], lo[1], hi[2]],
        [hi[0], lo[1], hi[2]],
        [hi[0], hi[1], hi[2]],
        [lo[0], hi[1], hi[2]],
    ]
}

/// Block over vertices `offset..offset + 8`.
pub fn block_at(offset: usize, divisions: [usize; 3]) -> BlockDefinition {
    let v = std::array::from_fn(|i| offset + i);
    BlockDefinition::new(v, divisions)
}

/// Unit cube with `n` cells per axis.
pub fn cube(n: usize) -> BlockMeshDescription {
    BlockMeshDescription::new(
        box_vertices([0.0; 3], [1.0; 3]),
        vec![block_at(0, [n, n, n])],
    )
}

/// Two unit boxes side by side along x with independent vertex lists.
pub fn two_boxes(left: [usize; 3], right: [usize; 3]) -> BlockMeshDescription {
    two_boxes_shifted(left, right, [0.0; 3], 1.0)
}

/// Like [`two_boxes`] with the right box shifted by `shift` and its y extent
/// scaled by `height`.
pub fn two_boxes_shifted(
    left: [usize; 3],
    right: [usize; 3],
    shift: Vec3,
    height: f64,
) -> BlockMeshDescription {
    let mut vertices = box_vertices([0.0; 3], [1.0; 3]);
    vertices.extend(box_vertices(
        add([1.0, 0.0, 0.0], shift),
        add([2.0, height, 1.0], shift),
    ));
    BlockMeshDescription::new(vertices, vec![block_at(0, left), block_at(8, right)])
}

/// Two boxes whose touching faces are declared as a merge pair.
pub fn merge_pair_boxes(desc: BlockMeshDescription) -> BlockMeshDescription {
    desc.with_patch(PatchDefinition::new("left", PatchKind::Merge).with_face(0, BlockFace::XMax))
        .with_patch(PatchDefinition::new("right", PatchKind::Merge).with_face(1, BlockFace::XMin))
        .with_merge_pair(MergePair::new("left", "right"))
}

/// Face loops of every cell, oriented outward from the cell.
pub fn cell_faces(mesh: &Mesh) -> Vec<Vec<Vec<usize>>> {
    let mut out = vec![Vec::new(); mesh.cells().len()];
    for (f, face) in mesh.faces().iter().enumerate() {
        out[mesh.owner()[f]].push(face.clone());
        if f < mesh.n_internal_faces() {
            let mut rev = face.clone();
            rev.reverse();
            out[mesh.neighbour()[f]].push(rev);
        }
    }
    out
}

/// Assert every cell is a closed polyhedron: outward face areas cancel and
/// every directed edge is matched by its reverse exactly once.
pub fn assert_closed_cells(mesh: &Mesh) {
    for (cell, faces) in cell_faces(mesh).iter().enumerate() {
        let mut sum = [0.0; 3];
        let mut edges: HashMap<(usize, usize), i32> = HashMap::new();
        for face in faces {
            let poly: Vec<Vec3> = face.iter().map(|&p| mesh.points()[p]).collect();
            sum = add(sum, polygon_area_vector(&poly));
            for e in 0..face.len() {
                let (a, b) = (face[e], face[(e + 1) % face.len()]);
                *edges.entry((a, b)).or_default() += 1;
            }
        }
        assert!(norm(sum) < 1e-9, "cell {cell} is open: {sum:?}");
        for (&(a, b), &n) in &edges {
            assert_eq!(n, 1, "cell {cell}: edge {a}->{b} used {n} times");
            assert_eq!(
                edges.get(&(b, a)).copied(),
                Some(1),
                "cell {cell}: edge {a}->{b} has no partner"
            );
        }
    }
}

/// Total volume from the divergence theorem; exact for axis-aligned faces.
pub fn cell_volume_sum(mesh: &Mesh) -> f64 {
    let mut total = 0.0;
    for faces in cell_faces(mesh) {
        for face in &faces {
            let poly: Vec<Vec3> = face.iter().map(|&p| mesh.points()[p]).collect();
            let c = scale(poly.iter().fold([0.0; 3], |acc, p| add(acc, *p)), 1.0 / poly.len() as f64);
            total += c[0] * polygon_area_vector(&poly)[0];
        }
    }
    total
}

/// Fresh scratch directory for one test.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "multiblock-mesh-{}-{name}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
