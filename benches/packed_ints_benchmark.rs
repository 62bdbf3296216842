use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use drusdenx_core::packed::{Direct32, Mutable, Packed64, Packed64SingleBlock};
use rand::Rng;

fn random_values(count: usize, bits_per_value: u32) -> Vec<u64> {
    let mut rng = rand::thread_rng();
    let max = if bits_per_value >= 64 { u64::MAX } else { (1u64 << bits_per_value) - 1 };
    (0..count).map(|_| rng.gen_range(0..=max)).collect()
}

fn bench_sequential_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("packed_ints_sequential_fill");

    for &bits_per_value in &[8u32, 16, 24, 32] {
        let count = 100_000;
        let values = random_values(count, bits_per_value);

        group.bench_with_input(BenchmarkId::new("packed64", bits_per_value), &values, |b, values| {
            b.iter(|| {
                let mut array = Packed64::new(values.len(), bits_per_value);
                for (i, &v) in values.iter().enumerate() {
                    array.set(black_box(i), black_box(v)).unwrap();
                }
            });
        });

        if 64 % bits_per_value == 0 {
            group.bench_with_input(BenchmarkId::new("packed64_single_block", bits_per_value), &values, |b, values| {
                b.iter(|| {
                    let mut array = Packed64SingleBlock::new(values.len(), bits_per_value);
                    for (i, &v) in values.iter().enumerate() {
                        array.set(black_box(i), black_box(v)).unwrap();
                    }
                });
            });
        }
    }

    group.finish();
}

fn bench_random_access_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("packed_ints_random_access_get");

    let count = 100_000;
    let values = random_values(count, 17);
    let mut array = Direct32::new(count);
    for (i, &v) in values.iter().enumerate() {
        array.set(i, v).unwrap();
    }

    let mut rng = rand::thread_rng();
    let indices: Vec<usize> = (0..count).map(|_| rng.gen_range(0..count)).collect();

    group.bench_function("direct32_get", |b| {
        b.iter(|| {
            for &i in &indices {
                black_box(array.get(black_box(i)).unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_sequential_fill, bench_random_access_get);
criterion_main!(benches);
