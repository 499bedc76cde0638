use criterion::measurement::Measurement;
use criterion::{criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::distr::{Distribution, Uniform};
use rand::{rngs::StdRng, SeedableRng};
use single_eigenmap::dimred::eigenmap::LaplacianBuilder;
use single_eigenmap::distance::Euclidean;
use single_eigenmap::{EigenMethod, LaplacianEigenmapBuilder, NeighborGraph};
use std::time::Duration;

#[derive(Clone)]
pub struct EigenmapConfig {
    seed: u64,
    point_counts: Vec<usize>,
    n_features: usize,
    k: usize,
    measurement_time: u64,
    sample_size: usize,
}

impl Default for EigenmapConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            point_counts: vec![200, 1000, 5000],
            n_features: 10,
            k: 10,
            measurement_time: 10,
            sample_size: 10,
        }
    }
}

fn create_point_cloud(n: usize, n_features: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let value_dist = Uniform::try_from(0.0..1.0).unwrap();
    Array2::from_shape_fn((n, n_features), |_| value_dist.sample(&mut rng))
}

fn configure_group<'a, M: Measurement>(
    c: &'a mut Criterion<M>,
    name: &str,
    config: &EigenmapConfig,
) -> BenchmarkGroup<'a, M> {
    let mut group = c.benchmark_group(name);
    group.measurement_time(Duration::from_secs(config.measurement_time));
    group.sample_size(config.sample_size);
    group
}

pub fn bench_laplacian(c: &mut Criterion) {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = EigenmapConfig::default();
    let mut group = configure_group(c, "Laplacian_Build", &config);

    for &n in config.point_counts.iter() {
        let data = create_point_cloud(n, config.n_features, config.seed + n as u64);
        let rows: Vec<_> = data.rows().into_iter().collect();
        let graph = NeighborGraph::of(&rows, &Euclidean, config.k).unwrap().largest();

        for t in [-1.0, 0.5] {
            group.bench_with_input(
                BenchmarkId::new("build", format!("n{}_t{}", n, t)),
                &(n, t),
                |b, _| {
                    let builder = LaplacianBuilder::new(t);
                    b.iter(|| builder.build(&graph).unwrap());
                },
            );
        }
    }
    group.finish();
}

pub fn bench_embedding(c: &mut Criterion) {
    let config = EigenmapConfig::default();
    let mut group = configure_group(c, "Eigenmap_Embedding", &config);

    for &n in config.point_counts.iter() {
        let data = create_point_cloud(n, config.n_features, config.seed + n as u64);

        let lanczos = LaplacianEigenmapBuilder::new()
            .neighbors(config.k)
            .build()
            .unwrap();
        group.bench_with_input(
            BenchmarkId::new("lanczos", format!("n{}", n)),
            &n,
            |b, _| {
                b.iter(|| lanczos.fit_euclidean(data.view()).unwrap());
            },
        );

        if n <= 1000 {
            let dense = LaplacianEigenmapBuilder::new()
                .neighbors(config.k)
                .eigen_method(EigenMethod::Dense)
                .build()
                .unwrap();
            group.bench_with_input(
                BenchmarkId::new("dense", format!("n{}", n)),
                &n,
                |b, _| {
                    b.iter(|| dense.fit_euclidean(data.view()).unwrap());
                },
            );
        }
    }
    group.finish();
}

criterion_group!(eigenmap_benches, bench_laplacian, bench_embedding);
criterion_main!(eigenmap_benches);
