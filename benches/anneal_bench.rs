//! Criterion benchmarks for u-anneal sweeps.
//!
//! Random symmetric couplings at two densities: a dense matrix and a
//! sparse coordinate map (about four neighbors per variable), so both
//! tensor layouts are exercised.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use std::collections::HashMap;
use u_anneal::{ClassicalModel, CouplingInput, ModelConfig, QuantumModel, SpinModel, StateType};
use u_numflow::random::create_rng;

// ===========================================================================
// Coupling generators
// ===========================================================================

fn dense_couplings(n: usize, seed: u64) -> CouplingInput {
    let mut rng = create_rng(seed);
    let j: Vec<f64> = (0..n * n).map(|_| rng.random_range(-1.0..1.0)).collect();
    j.into()
}

fn sparse_couplings(n: usize, seed: u64) -> CouplingInput {
    let mut rng = create_rng(seed);
    let mut j: HashMap<Vec<usize>, f64> = HashMap::new();
    for i in 0..n {
        for _ in 0..2 {
            let k = rng.random_range(0..n);
            if k != i {
                j.insert(vec![i, k], rng.random_range(-1.0..1.0));
            }
        }
    }
    j.into()
}

fn config(n: usize) -> ModelConfig {
    ModelConfig::default()
        .with_state_type(StateType::Ising)
        .with_state_shape(vec![n])
        .with_beta(1.0)
        .with_gamma(1.0)
        .with_n_trotter(8)
        .with_seed(42)
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_classical_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("classical_sweep");

    for &n in &[64, 256, 1024] {
        for (label, j) in [("dense", dense_couplings(n, 1)), ("sparse", sparse_couplings(n, 1))] {
            let mut model = ClassicalModel::new(j, vec![0.0; n], 0.0, &config(n)).unwrap();
            group.bench_with_input(BenchmarkId::new(label, n), &n, |b, _| {
                b.iter(|| black_box(model.update_state()))
            });
        }
    }

    group.finish();
}

fn bench_quantum_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantum_sweep");
    group.sample_size(20);

    for &n in &[64, 256] {
        for (label, j) in [("dense", dense_couplings(n, 2)), ("sparse", sparse_couplings(n, 2))] {
            let mut model = QuantumModel::new(j, vec![0.0; n], 0.0, &config(n)).unwrap();
            group.bench_with_input(BenchmarkId::new(label, n), &n, |b, _| {
                b.iter(|| black_box(model.update_state()))
            });
        }
    }

    group.finish();
}

fn bench_observe_best(c: &mut Criterion) {
    let n = 256;
    let model = QuantumModel::new(sparse_couplings(n, 3), vec![0.0; n], 0.0, &config(n)).unwrap();
    c.bench_function("observe_best_sparse_256", |b| b.iter(|| black_box(model.observe_best())));
}

criterion_group!(benches, bench_classical_sweep, bench_quantum_sweep, bench_observe_best);
criterion_main!(benches);
