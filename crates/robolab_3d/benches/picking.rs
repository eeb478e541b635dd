//! Picking and world-matrix benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use robolab_3d::{pick_nearest, Geometry, NodeId, SceneGraph, StandardMaterial, Transform};
use robolab_core::{Ray, Vec3};

/// A grid of boxes `side` x `side` on the XY plane
fn grid_scene(side: usize) -> (SceneGraph, Vec<NodeId>) {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let group = scene.spawn_group(root, "grid", Transform::IDENTITY);
    let mut nodes = Vec::with_capacity(side * side);
    for i in 0..side {
        for j in 0..side {
            nodes.push(scene.spawn_mesh(
                group,
                "cell",
                Transform::from_xyz(i as f32 * 1.5, j as f32 * 1.5, 0.0),
                Geometry::cuboid(1.0, 1.0, 1.0),
                StandardMaterial::from_hex(0x6b7280),
            ));
        }
    }
    (scene, nodes)
}

fn bench_pick_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick_nearest");
    for side in [4, 16, 32] {
        let (scene, nodes) = grid_scene(side);
        let ray = Ray::new(Vec3::new(1.5, 1.5, 10.0), Vec3::new(0.0, 0.0, -1.0));
        group.bench_with_input(BenchmarkId::from_parameter(side * side), &side, |b, _| {
            b.iter(|| pick_nearest(black_box(&scene), nodes.iter().copied(), black_box(&ray)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pick_nearest);
criterion_main!(benches);
