use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use voroinc::{BoundingBox, Diagram, SampleOptions, SphereSolid, sample_solid};

const SIZES: [usize; 4] = [100, 1000, 5000, 20_000];

fn benchmark_random_insertion(c: &mut Criterion) {
    let bounds = BoundingBox::new([0.0, 0.0, 0.0], [100.0, 100.0, 100.0]);

    let mut group = c.benchmark_group("insert_random");
    group.sample_size(10);

    for &size in &SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &s| {
            b.iter(|| {
                let mut diagram = Diagram::new(bounds).unwrap();
                diagram.insert_random(black_box(s), 42);
                diagram
            })
        });
    }
    group.finish();
}

fn benchmark_sample_sphere(c: &mut Criterion) {
    let bounds = BoundingBox::new([0.0, 0.0, 0.0], [10.0, 10.0, 10.0]);
    let sphere = SphereSolid::new([5.0, 5.0, 5.0], 4.0);

    c.bench_function("sample_sphere_spacing_0.5", |b| {
        b.iter(|| sample_solid(&sphere, bounds, SampleOptions::with_spacing(black_box(0.5))).unwrap())
    });
}

criterion_group!(benches, benchmark_random_insertion, benchmark_sample_sphere);
criterion_main!(benches);
