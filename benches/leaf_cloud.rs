use criterion::{criterion_group, criterion_main, Criterion, black_box};

use canopygen::biosphere::{CuboidLeafCloudSpec, DiscreteCanopy, LeafCloud};
use canopygen::core::{KernelDictContext, UnitConfig};

fn spec(avoid_overlap: bool) -> CuboidLeafCloudSpec {
    CuboidLeafCloudSpec {
        lai: Some(3.0),
        leaf_radius: Some(0.1),
        l_horizontal: Some(10.0),
        l_vertical: Some(5.0),
        avoid_overlap,
        ..Default::default()
    }
}

fn bench_cuboid(c: &mut Criterion) {
    let spec = spec(false);
    let units = UnitConfig::default();

    c.bench_function("leaf_cloud_cuboid", |b| {
        b.iter(|| LeafCloud::cuboid(black_box(&spec), &units))
    });
}

fn bench_cuboid_avoid_overlap(c: &mut Criterion) {
    let spec = spec(true);
    let units = UnitConfig::default();

    c.bench_function("leaf_cloud_cuboid_avoid_overlap", |b| {
        b.iter(|| LeafCloud::cuboid(black_box(&spec), &units))
    });
}

fn bench_shapes(c: &mut Criterion) {
    let cloud = LeafCloud::cuboid(&spec(false), &UnitConfig::default()).unwrap();
    let ctx = KernelDictContext::default();

    c.bench_function("leaf_cloud_shapes", |b| {
        b.iter(|| black_box(&cloud).shapes(&ctx))
    });
}

fn bench_padding(c: &mut Criterion) {
    let canopy = DiscreteCanopy::homogeneous("bench", &spec(false), &UnitConfig::default()).unwrap();

    c.bench_function("discrete_canopy_padded_10", |b| {
        b.iter(|| canopy.padded(black_box(10)).map(|p| p.into_owned()))
    });
}

criterion_group!(
    benches,
    bench_cuboid,
    bench_cuboid_avoid_overlap,
    bench_shapes,
    bench_padding,
);
criterion_main!(benches);
