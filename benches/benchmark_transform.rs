use criterion::Criterion;
use criterion::{criterion_group, criterion_main};
use ndarray::Array2;
use shenspace::bases::{BaseSize, Transform};
use shenspace::{legendre_dirichlet, Base};

const SIZES: [usize; 3] = [64, 128, 256];

fn setup(n: usize) -> (Base, Array2<f64>, Array2<f64>) {
    let base = legendre_dirichlet(n).unwrap();
    let phys = Array2::from_shape_fn((base.len_phys(), n), |(i, j)| (i * j) as f64 / n as f64);
    let spec = Array2::<f64>::zeros((base.len_spec(), n));
    (base, phys, spec)
}

pub fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("Forward");
    group.significance_level(0.1).sample_size(10);
    for n in SIZES.iter() {
        let (mut base, phys, mut spec) = setup(*n);
        let name = format!("Size: {}", *n);
        group.bench_function(&name, |b| b.iter(|| base.forward(&phys, &mut spec, 0).unwrap()));
    }
    group.finish();
}

pub fn bench_backward(c: &mut Criterion) {
    let mut group = c.benchmark_group("Backward");
    group.significance_level(0.1).sample_size(10);
    for n in SIZES.iter() {
        let (mut base, mut phys, spec) = setup(*n);
        let name = format!("Size: {}", *n);
        group.bench_function(&name, |b| b.iter(|| base.backward(&spec, &mut phys, 0).unwrap()));
    }
    group.finish();
}

criterion_group!(benches, bench_forward, bench_backward);
criterion_main!(benches);
