//! Benchmarks pour le build et la recherche de points

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qc2c::geometry::point_in_ring;
use qc2c::{
    BoundingBox, Coordinate, CountryShape, Locator, Pipeline, PipelineConfig, Ring, Sector,
    SectorManifest,
};

const GRID: usize = 4;
const SECTOR_SIZE: f64 = 10.0;

/// Polygone régulier centré sur (lat, lng)
fn blob(lat: f64, lng: f64, radius: f64, vertices: usize) -> Ring {
    let points: Vec<[f64; 2]> = (0..vertices)
        .map(|i| {
            let angle = i as f64 / vertices as f64 * std::f64::consts::TAU;
            // Bruit déterministe pour que la réduction ait du travail
            let r = radius * (1.0 + 0.05 * ((i * 7) % 5) as f64 / 5.0);
            [lat + r * angle.cos(), lng + r * angle.sin()]
        })
        .collect();
    Ring::from_lat_lng("BENCH", &points).unwrap()
}

fn world() -> (SectorManifest, Vec<CountryShape>) {
    let mut sectors = Vec::new();
    let mut countries = Vec::new();

    for row in 0..GRID {
        for col in 0..GRID {
            let (lat, lng) = (row as f64 * SECTOR_SIZE, col as f64 * SECTOR_SIZE);
            let bounds =
                BoundingBox::from_slice("bench", &[lat, lng, lat + SECTOR_SIZE, lng + SECTOR_SIZE])
                    .unwrap();
            sectors.push(Sector {
                id: format!("s{row}_{col}"),
                bounds,
            });

            // Deux pays par secteur, le second en deux îles
            countries.push(CountryShape::new(
                format!("A{row}{col}"),
                vec![blob(lat + 3.0, lng + 3.0, 2.0, 64)],
            ));
            countries.push(CountryShape::new(
                format!("B{row}{col}"),
                vec![
                    blob(lat + 7.5, lng + 2.0, 1.0, 32),
                    blob(lat + 7.5, lng + 7.5, 1.0, 32),
                ],
            ));
        }
    }

    (SectorManifest::new(sectors), countries)
}

fn queries(count: usize) -> Vec<Coordinate> {
    let span = GRID as f64 * SECTOR_SIZE;
    (0..count)
        .map(|i| {
            let t = i as f64 / count as f64;
            Coordinate::new((t * 7.31).fract() * span, (t * 3.17).fract() * span)
        })
        .collect()
}

fn bench_point_in_ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_in_ring");

    for vertices in [16, 256, 4096] {
        let ring = blob(0.0, 0.0, 5.0, vertices);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(vertices), &ring, |b, ring| {
            b.iter(|| point_in_ring(black_box(Coordinate::new(1.0, 1.0)), ring.vertices()))
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let (manifest, countries) = world();
    let pipeline = Pipeline::new(PipelineConfig {
        input_tolerance: None,
        ..Default::default()
    });

    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    group.bench_function("grid", |b| {
        b.iter(|| black_box(pipeline.build(&manifest, black_box(&countries))))
    });

    group.finish();
}

fn bench_locate(c: &mut Criterion) {
    let (manifest, countries) = world();
    let output = Pipeline::new(PipelineConfig::default()).build(&manifest, &countries);
    let locator = Locator::new(manifest, output.artifact).unwrap();
    let points = queries(10_000);

    let mut group = c.benchmark_group("locate");
    group.throughput(Throughput::Elements(points.len() as u64));

    group.bench_function("batch", |b| {
        b.iter(|| {
            let found = points
                .iter()
                .filter(|p| locator.locate(black_box(**p)).is_some())
                .count();
            black_box(found)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_point_in_ring, bench_build, bench_locate);
criterion_main!(benches);
