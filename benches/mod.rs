use chrono::DateTime;
use criterion::{Criterion, criterion_group, criterion_main};
use optionchain_rs::prelude::*;
use std::hint::black_box;

const WEEK: f64 = 7.0 / 365.0;

fn solver_benchmarks(c: &mut Criterion) {
    let config = SolverConfig::default();
    let params = Black76Params::call(24_000.0, 24_300.0, WEEK);
    let premium = Black76::price(&params, 0.14);

    let mut group = c.benchmark_group("solver");
    group.bench_function("newton", |b| {
        b.iter(|| solve_iv(black_box(&params), black_box(premium), 0.2, &config))
    });
    group.bench_function("bisection", |b| {
        b.iter(|| solve_iv_bisection(black_box(&params), black_box(premium), &config))
    });

    let (straddle_price, _) = Black76::straddle(24_000.0, 24_000.0, WEEK, 0.0, 0.14);
    let straddle = AtmStraddle::new(24_000.0, straddle_price / 2.0, straddle_price / 2.0);
    group.bench_function("straddle", |b| {
        b.iter(|| straddle_implied_vol(black_box(&straddle), 24_000.0, WEEK, &config))
    });
    group.finish();
}

fn table_benchmarks(c: &mut Criterion) {
    let pipeline = ChainPipeline::nse().unwrap();
    let now = DateTime::parse_from_rfc3339("2025-10-20T11:00:00+05:30").unwrap();
    let expiry = pipeline.expiry_from_label("28-OCT-2025").unwrap();
    let t = expiry.time_to_expiry(&now);

    let strikes = (200..=300)
        .map(|i| {
            let strike = i as f64 * 100.0;
            let call = Black76::price(&Black76Params::call(25_000.0, strike, t), 0.13);
            let put = Black76::price(&Black76Params::put(25_000.0, strike, t), 0.13);
            StrikeQuotes::new(
                strike,
                Some(OptionQuote::with_last_price(call)),
                Some(OptionQuote::with_last_price(put)),
            )
        })
        .collect();
    let snapshot = ChainSnapshot::new(24_980.0, strikes);

    c.bench_function("build_table", |b| {
        b.iter(|| pipeline.build_table(black_box(&snapshot), 25_000.0, &expiry, &now))
    });
}

criterion_group!(benches, solver_benchmarks, table_benchmarks);
criterion_main!(benches);
