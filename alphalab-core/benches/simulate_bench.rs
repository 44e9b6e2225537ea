//! Criterion benchmarks for the simulation hot path.
//!
//! Benchmarks:
//! 1. The day-by-day rebalance loop over a multi-year, multi-ticker panel
//! 2. Long-to-wide alignment (pivot + forward fill)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use alphalab_core::backtest::{build_matrices, simulate, SimConfig, TargetRow};
use alphalab_core::data::generate_bars;
use chrono::NaiveDate;

fn make_rows(n_tickers: usize) -> Vec<TargetRow> {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let weight = 1.0 / n_tickers as f64;

    let mut rows = Vec::new();
    for i in 0..n_tickers {
        let symbol = format!("SYN{i:03}");
        for bar in generate_bars(&symbol, start, end) {
            rows.push(TargetRow {
                date: bar.date,
                ticker: symbol.clone(),
                close: bar.close,
                weight,
            });
        }
    }
    rows
}

fn bench_simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");
    for n_tickers in [5, 20, 50] {
        let rows = make_rows(n_tickers);
        let (prices, weights) = build_matrices(&rows).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(n_tickers),
            &n_tickers,
            |b, _| {
                b.iter(|| {
                    simulate(
                        black_box(&prices),
                        black_box(&weights),
                        &SimConfig::default(),
                    )
                    .unwrap()
                })
            },
        );
    }
    group.finish();
}

fn bench_align(c: &mut Criterion) {
    let rows = make_rows(20);
    c.bench_function("build_matrices_20_tickers", |b| {
        b.iter(|| build_matrices(black_box(&rows)).unwrap())
    });
}

criterion_group!(benches, bench_simulate, bench_align);
criterion_main!(benches);
