use breakline::terrain::{
    analyze, deform, extract, BoundaryGenerator, DragSession, HeightField, NoiseConfig,
    PlanarPoint, ShapeParams,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;

fn random_field(segments: usize) -> HeightField {
    let mut rng = rand::rng();
    let phase: f32 = rng.random_range(0.0..std::f32::consts::TAU);
    HeightField::from_fn(segments, segments, 10.0, 10.0, |x, z| {
        0.05 * (x * 0.8 + phase).sin() + 0.03 * (z * 1.1).cos()
    })
    .unwrap()
}

fn bench_slope(c: &mut Criterion) {
    let mut group = c.benchmark_group("Slope Analysis");

    for &n in &[50, 100, 200] {
        group.bench_function(format!("analyze_{}", n), |b| {
            let field = random_field(n);
            b.iter(|| {
                black_box(analyze(&field));
            });
        });
    }

    group.finish();
}

fn bench_contours(c: &mut Criterion) {
    let mut group = c.benchmark_group("Contours");

    for &n in &[50, 100, 200] {
        group.bench_function(format!("extract_{}", n), |b| {
            let field = random_field(n);
            b.iter(|| {
                black_box(extract(&field, 0.01));
            });
        });
    }

    group.finish();
}

fn bench_deform(c: &mut Criterion) {
    let mut group = c.benchmark_group("Deformation");

    for &n in &[100, 200] {
        group.bench_function(format!("deform_{}", n), |b| {
            let mut field = random_field(n);
            let session = DragSession::begin(&field, 1.0);
            b.iter(|| {
                black_box(deform(&mut field, PlanarPoint::ORIGIN, 1.3, Some(&session), 2.0));
            });
        });
    }

    group.finish();
}

fn bench_boundary(c: &mut Criterion) {
    let generator = BoundaryGenerator::new(NoiseConfig::default());
    let params = ShapeParams::default();
    c.bench_function("boundary_300", |b| {
        b.iter(|| {
            black_box(generator.generate_from(&params));
        });
    });
}

criterion_group!(benches, bench_slope, bench_contours, bench_deform, bench_boundary);
criterion_main!(benches);
