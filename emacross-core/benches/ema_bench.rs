//! Criterion benchmarks for the EMA hot paths.
//!
//! Benchmarks:
//! 1. compute_ema over typical daily-history lengths
//! 2. Dual and multi-period snapshots
//! 3. One full bar walk through snapshot + state machine

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use emacross_core::domain::{BotState, PriceBar};
use emacross_core::indicators::{
    compute_dual_ema_snapshot, compute_ema, compute_multi_ema_snapshot, DEFAULT_MULTI_PERIODS,
};
use emacross_core::signals::evaluate_signal_at;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0)
        .collect()
}

fn make_bars(n: usize) -> Vec<PriceBar> {
    let base = Utc.with_ymd_and_hms(2020, 1, 2, 21, 0, 0).unwrap();
    make_closes(n)
        .into_iter()
        .enumerate()
        .map(|(i, close)| {
            let ts = base + chrono::Duration::days(i as i64);
            PriceBar::new(close, ts.to_rfc3339())
        })
        .collect()
}

// ── 1. EMA ───────────────────────────────────────────────────────────

fn bench_ema(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_ema");

    for &bar_count in &[252, 1260, 2520] {
        let closes = make_closes(bar_count);
        for period in [5, 20, 200] {
            group.bench_with_input(
                BenchmarkId::new(format!("ema_{period}"), bar_count),
                &closes,
                |b, closes| b.iter(|| compute_ema(black_box(closes), period)),
            );
        }
    }

    group.finish();
}

// ── 2. Snapshots ─────────────────────────────────────────────────────

fn bench_snapshots(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for &bar_count in &[252, 2520] {
        let bars = make_bars(bar_count);
        group.bench_with_input(BenchmarkId::new("dual", bar_count), &bars, |b, bars| {
            b.iter(|| compute_dual_ema_snapshot(black_box(bars)))
        });
        group.bench_with_input(BenchmarkId::new("multi_10", bar_count), &bars, |b, bars| {
            b.iter(|| compute_multi_ema_snapshot(black_box(bars), &DEFAULT_MULTI_PERIODS))
        });
    }

    group.finish();
}

// ── 3. Bar walk ──────────────────────────────────────────────────────

fn bench_bar_walk(c: &mut Criterion) {
    let bars = make_bars(504);
    let now = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

    c.bench_function("bar_walk_504", |b| {
        b.iter(|| {
            let mut state = BotState::Flat;
            for end in 21..=bars.len() {
                let window = &bars[..end];
                if let Ok(snapshot) = compute_dual_ema_snapshot(window) {
                    let price = window[end - 1].close;
                    state = evaluate_signal_at(&snapshot, &state, 0.75, price, now).new_state;
                }
            }
            black_box(state)
        });
    });
}

criterion_group!(benches, bench_ema, bench_snapshots, bench_bar_walk);
criterion_main!(benches);
