use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use multiblock_mesh::prelude::*;

fn box_vertices(x0: f64) -> Vec<[f64; 3]> {
    vec![
        [x0, 0.0, 0.0],
        [x0 + 1.0, 0.0, 0.0],
        [x0 + 1.0, 1.0, 0.0],
        [x0, 1.0, 0.0],
        [x0, 0.0, 1.0],
        [x0 + 1.0, 0.0, 1.0],
        [x0 + 1.0, 1.0, 1.0],
        [x0, 1.0, 1.0],
    ]
}

fn row(n_blocks: usize, n: usize) -> BlockMeshDescription {
    let mut vertices = Vec::new();
    let mut blocks = Vec::new();
    for b in 0..n_blocks {
        vertices.extend(box_vertices(b as f64));
        let v = std::array::from_fn(|i| 8 * b + i);
        blocks.push(BlockDefinition::new(v, [n, n, n]));
    }
    BlockMeshDescription::new(vertices, blocks)
}

fn stitched(n: usize) -> BlockMeshDescription {
    let mut desc = row(2, n);
    desc.blocks[1].divisions = [n, 2 * n, 2 * n];
    desc.with_patch(PatchDefinition::new("left", PatchKind::Merge).with_face(0, BlockFace::XMax))
        .with_patch(PatchDefinition::new("right", PatchKind::Merge).with_face(1, BlockFace::XMin))
        .with_merge_pair(MergePair::new("left", "right"))
}

fn bench_assembly(c: &mut Criterion) {
    let ctx = MeshContext::default();
    let mut group = c.benchmark_group("assembly");

    for &n in &[8usize, 16] {
        let single = row(1, n);
        group.bench_with_input(BenchmarkId::new("cube", n), &n, |b, _| {
            b.iter(|| black_box(generate(&ctx, &single).unwrap()));
        });

        let four = row(4, n);
        group.bench_with_input(BenchmarkId::new("four_blocks", n), &n, |b, _| {
            b.iter(|| black_box(generate(&ctx, &four).unwrap()));
        });

        let cut = stitched(n);
        group.bench_with_input(BenchmarkId::new("non_conformal_stitch", n), &n, |b, _| {
            b.iter(|| black_box(generate(&ctx, &cut).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_assembly);
criterion_main!(benches);
