use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ipsel::{select_with, AlgorithmConfig, CoverTree, KMeans, Point, RandomSubset, SelectArgs, OIPS};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

fn cloud(n: usize) -> Vec<Point> {
    let mut rng = XorShiftRng::seed_from_u64(123);
    (0..n)
        .map(|_| Point::new(vec![rng.gen::<f64>(), rng.gen::<f64>()]))
        .collect()
}

fn bench_selectors(c: &mut Criterion) {
    let points = cloud(500);

    c.bench_function("random_subset_50_of_500", |b| {
        let config = AlgorithmConfig::from(RandomSubset::new(50));
        b.iter(|| {
            let mut rng = XorShiftRng::seed_from_u64(1);
            black_box(select_with(&mut rng, &config, &points, SelectArgs::new()).unwrap())
        })
    });

    c.bench_function("kmeans_20_of_500", |b| {
        let config = AlgorithmConfig::from(KMeans::new(20));
        b.iter(|| {
            let mut rng = XorShiftRng::seed_from_u64(1);
            black_box(select_with(&mut rng, &config, &points, SelectArgs::new()).unwrap())
        })
    });

    c.bench_function("cover_tree_eps_0_1", |b| {
        let config = AlgorithmConfig::from(CoverTree::new(0.1));
        b.iter(|| {
            let mut rng = XorShiftRng::seed_from_u64(1);
            black_box(select_with(&mut rng, &config, &points, SelectArgs::new()).unwrap())
        })
    });

    c.bench_function("oips_stream_500", |b| {
        let config = AlgorithmConfig::from(OIPS::new(0.1).with_kmin(5).with_kmax(100));
        b.iter(|| {
            let mut rng = XorShiftRng::seed_from_u64(1);
            black_box(select_with(&mut rng, &config, &points, SelectArgs::new()).unwrap())
        })
    });
}

criterion_group!(benches, bench_selectors);
criterion_main!(benches);
