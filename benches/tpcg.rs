use criterion::*;
use ndarray::Array1;
use ndarray_linalg::generate::random;

use krylov_core::{truncated_cg, NoSafeguard};

fn tpcg_spd(c: &mut Criterion) {
    let mut group = c.benchmark_group("truncated_cg");
    for &n in &[8, 32, 128] {
        group.bench_with_input(BenchmarkId::new("spd", n), &n, |bencher, &n| {
            let m: ndarray::Array2<f64> = random((n, n));
            let a = m.t().dot(&m) + ndarray::Array2::eye(n);
            let a_op = |x: &Array1<f64>, y: &mut Array1<f64>| y.assign(&a.dot(x));
            let identity = |x: &Array1<f64>, y: &mut Array1<f64>| y.assign(x);
            let b: Array1<f64> = random(n);
            let x_offset = Array1::zeros(n);

            bencher.iter(|| {
                truncated_cg(
                    &a_op,
                    &b,
                    &identity,
                    1e-10,
                    n + 1,
                    n + 1,
                    f64::INFINITY,
                    &x_offset,
                    false,
                    10,
                    &NoSafeguard,
                )
            })
        });
    }
}

criterion_group!(tpcg, tpcg_spd);
criterion_main!(tpcg);
