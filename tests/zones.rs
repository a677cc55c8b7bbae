mod util;

use multiblock_mesh::prelude::*;
use multiblock_mesh::topology::zones::cell_selection;
use std::collections::HashSet;
use util::{block_at, box_vertices};

fn row_of_blocks(zones: &[Option<&str>]) -> BlockMeshDescription {
    let mut vertices = Vec::new();
    let mut blocks = Vec::new();
    for (b, zone) in zones.iter().enumerate() {
        let x = b as f64;
        vertices.extend(box_vertices([x, 0.0, 0.0], [x + 1.0, 1.0, 1.0]));
        let block = block_at(8 * b, [2, 1, 1]);
        blocks.push(match zone {
            Some(name) => block.with_zone(*name),
            None => block,
        });
    }
    BlockMeshDescription::new(vertices, blocks)
}

#[test]
fn zones_are_disjoint_and_ordered_by_first_use() {
    let desc = row_of_blocks(&[Some("solid"), None, Some("fluid"), Some("solid")]);
    let mesh = generate(&MeshContext::default(), &desc).unwrap().mesh;
    let zones = mesh.zones();
    assert_eq!(zones.len(), 2);
    assert_eq!((zones[0].name.as_str(), zones[0].id), ("solid", 0));
    assert_eq!((zones[1].name.as_str(), zones[1].id), ("fluid", 1));
    assert_eq!(zones[0].cells, vec![0, 1, 6, 7]);
    assert_eq!(zones[1].cells, vec![4, 5]);

    let mut seen = HashSet::new();
    for zone in zones {
        assert!(zone.cells.windows(2).all(|w| w[0] < w[1]));
        for &c in &zone.cells {
            assert!(seen.insert(c), "cell {c} in more than one zone");
        }
    }
    assert_eq!(cell_selection(zones, "fluid"), Some(&[4, 5][..]));
}

#[test]
fn no_zone_names_means_no_zones() {
    let desc = row_of_blocks(&[None, None]);
    let mesh = generate(&MeshContext::default(), &desc).unwrap().mesh;
    assert!(mesh.zones().is_empty());
}
