mod util;

use multiblock_mesh::io::json::{JsonReader, JsonWriter};
use multiblock_mesh::io::obj::{CENTRES_FILE, TOPOLOGY_FILE};
use multiblock_mesh::io::polymesh::SETS_DIR;
use multiblock_mesh::prelude::*;
use std::fs;
use util::{box_vertices, merge_pair_boxes, scratch_dir, two_boxes};

fn sample_description() -> BlockMeshDescription {
    let mut desc = merge_pair_boxes(two_boxes([2, 2, 1], [2, 4, 1]))
        .with_patch(PatchDefinition::new("inlet", PatchKind::Wall).with_face(0, BlockFace::XMin));
    desc.blocks[1] = desc.blocks[1].clone().with_zone("right");
    desc
}

#[test]
fn json_round_trip_preserves_mesh() {
    let mesh = generate(&MeshContext::default(), &sample_description())
        .unwrap()
        .mesh;
    let mut buf = Vec::new();
    JsonWriter { pretty: false }.write(&mut buf, &mesh).unwrap();
    let back = JsonReader.read(buf.as_slice()).unwrap();
    assert_eq!(back, mesh);

    let dir = scratch_dir("json");
    let path = dir.join("mesh.json");
    JsonWriter { pretty: true }.write_file(&path, &mesh).unwrap();
    assert_eq!(JsonReader.read_file(&path).unwrap(), mesh);
}

#[test]
fn json_reader_rejects_dangling_indices() {
    let mesh = generate(&MeshContext::default(), &util::cube(1)).unwrap().mesh;
    let mut value = serde_json::to_value(&mesh).unwrap();
    value["owner"][0] = serde_json::json!(5);
    let text = serde_json::to_string(&value).unwrap();
    let err = JsonReader.read(text.as_bytes()).unwrap_err();
    assert!(matches!(err, MeshError::MeshIoParse(_)));
    assert_eq!(err.category(), ErrorCategory::Io);

    let err = JsonReader.read("{\"points\": 3}".as_bytes()).unwrap_err();
    assert!(matches!(err, MeshError::MeshIoParse(_)));
}

#[test]
fn polymesh_files_are_written() {
    let dir = scratch_dir("polymesh");
    let ctx = MeshContext::new(&dir).with_region("fluid");
    let out = run(&ctx, &sample_description(), RunMode::Mesh).unwrap();
    let RunOutput::Mesh(generated) = out else {
        panic!("expected a mesh");
    };
    let mesh_dir = dir.join("constant/fluid/polyMesh");
    assert_eq!(ctx.mesh_dir(), mesh_dir);
    for name in ["points", "faces", "owner", "neighbour", "boundary", "cellZones"] {
        assert!(mesh_dir.join(name).is_file(), "{name} missing");
    }

    let points = fs::read_to_string(mesh_dir.join("points")).unwrap();
    assert!(points.contains("class       vectorField;"));
    assert!(points.contains(&format!("\n{}\n(\n", generated.mesh.points().len())));
    assert!(points.contains("(0.5 0 0)"));

    let boundary = fs::read_to_string(mesh_dir.join("boundary")).unwrap();
    let inlet = generated.mesh.patch("inlet").unwrap();
    assert!(boundary.contains("type            wall;"));
    assert!(boundary.contains(&format!(
        "startFace       {};",
        generated.mesh.n_internal_faces() + inlet.start
    )));
    assert!(!boundary.contains("left"));

    let owner = fs::read_to_string(mesh_dir.join("owner")).unwrap();
    assert!(owner.contains(&format!("nCells: {}", generated.mesh.cells().len())));
    assert!(owner.contains("location    \"constant/fluid/polyMesh\";"));

    let set = fs::read_to_string(mesh_dir.join(SETS_DIR).join("right")).unwrap();
    let zone = &generated.mesh.zones()[0];
    assert!(set.contains("class       cellSet;"));
    assert!(set.contains("location    \"constant/fluid/polyMesh/sets\";"));
    assert!(set.contains(&format!("\n{}\n(\n{}\n", zone.cells.len(), zone.cells[0])));
}

#[test]
fn rewriting_a_case_drops_files_of_the_previous_mesh() {
    let dir = scratch_dir("rewrite");
    let ctx = MeshContext::new(&dir);
    let mut zoned = util::cube(2);
    zoned.blocks[0] = zoned.blocks[0].clone().with_zone("z");
    run(&ctx, &zoned, RunMode::Mesh).unwrap();
    let mesh_dir = ctx.mesh_dir();
    assert!(mesh_dir.join("cellZones").is_file());
    assert!(mesh_dir.join(SETS_DIR).join("z").is_file());

    run(&ctx, &util::cube(3), RunMode::Mesh).unwrap();
    assert!(!mesh_dir.join("cellZones").exists());
    assert!(!mesh_dir.join(SETS_DIR).exists());
    let points = fs::read_to_string(mesh_dir.join("points")).unwrap();
    assert!(points.contains("\n64\n(\n"));
}

#[test]
fn unwritable_case_reports_the_path() {
    let dir = scratch_dir("blocked");
    let blocker = dir.join("case");
    fs::write(&blocker, "not a directory").unwrap();
    let ctx = MeshContext::new(&blocker);
    let err = run(&ctx, &util::cube(1), RunMode::Mesh).unwrap_err();
    match &err {
        MeshError::Write { path, .. } => assert!(path.starts_with(&blocker)),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.category(), ErrorCategory::Io);
}

#[test]
fn topology_dump_lists_unique_edges_and_block_centres() {
    // two blocks sharing four vertices
    let mut vertices = box_vertices([0.0; 3], [1.0; 3]);
    vertices.extend([[2.0, 0.0, 0.0], [2.0, 1.0, 0.0], [2.0, 0.0, 1.0], [2.0, 1.0, 1.0]]);
    let blocks = vec![
        BlockDefinition::new([0, 1, 2, 3, 4, 5, 6, 7], [1, 1, 1]),
        BlockDefinition::new([1, 8, 9, 2, 5, 10, 11, 6], [1, 1, 1]),
    ];
    let desc = BlockMeshDescription::new(vertices, blocks);

    let dir = scratch_dir("topology");
    let out = run(&MeshContext::new(&dir), &desc, RunMode::Topology).unwrap();
    let RunOutput::Topology(dump) = out else {
        panic!("expected a topology dump");
    };
    assert_eq!(dump.edges.len(), 20);
    assert_eq!(dump.centres, vec![[0.5, 0.5, 0.5], [1.5, 0.5, 0.5]]);

    let edges = fs::read_to_string(dir.join(TOPOLOGY_FILE)).unwrap();
    assert_eq!(edges.lines().filter(|l| l.starts_with("v ")).count(), 12);
    assert_eq!(edges.lines().filter(|l| l.starts_with("l ")).count(), 20);
    assert!(edges.contains("l 1 2\n"));
    let centres = fs::read_to_string(dir.join(CENTRES_FILE)).unwrap();
    assert_eq!(centres, "v 0.5 0.5 0.5\nv 1.5 0.5 0.5\n");
    assert!(!dir.join("constant").exists());
}
