//! Property tests for the EMA engine, crossover detector and state machine.
//!
//! Uses proptest to verify:
//! 1. EMA seed: value at period-1 is the mean of the first window
//! 2. EMA recurrence: every later value follows the smoothing formula
//! 3. Strictness: compute_ema fails iff there are fewer closes than the period
//! 4. Multi-period degradation: a period reports None iff history is too short
//! 5. Crossover symmetry: equal lines never cross; swapping lines swaps direction
//! 6. Stop-loss: result is the larger of the two floors
//! 7. Transition totality: every (status, crossover, price vs target) maps per the table

use chrono::{TimeZone, Utc};
use emacross_core::domain::{BotState, PriceBar, Status};
use emacross_core::indicators::{
    compute_ema, compute_multi_ema_snapshot, EmaPair, EmaPoint, EmaSnapshot, IndicatorError,
};
use emacross_core::risk::{compute_stop_loss, stop_loss_levels};
use emacross_core::signals::{detect_crossover, evaluate_signal_at, target_price, Action, Crossover};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_price(), 1..max_len)
}

fn arb_crossover() -> impl Strategy<Value = Crossover> {
    prop_oneof![
        Just(Crossover::Bullish),
        Just(Crossover::Bearish),
        Just(Crossover::None),
    ]
}

fn arb_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Flat),
        Just(Status::WaitingConfirmation),
        Just(Status::InPosition),
    ]
}

/// Snapshot whose fast/slow lines produce the requested crossover.
fn snapshot_for(crossover: Crossover, close: f64) -> EmaSnapshot {
    let (cur, prev) = match crossover {
        Crossover::Bullish => ((10.0, 9.0), (8.0, 9.0)),
        Crossover::Bearish => ((8.0, 9.0), (10.0, 9.0)),
        Crossover::None => ((10.5, 9.0), (10.0, 9.0)),
    };
    EmaSnapshot {
        current: EmaPoint::new(cur.0, cur.1, close, "cur"),
        previous: EmaPoint::new(prev.0, prev.1, close, "prev"),
    }
}

fn state_for(status: Status, reference: f64) -> BotState {
    match status {
        Status::Flat => BotState::Flat,
        Status::WaitingConfirmation => BotState::WaitingConfirmation {
            crossover_price: reference,
            crossover_time: "x".into(),
        },
        Status::InPosition => BotState::InPosition {
            crossover_price: Some(reference),
            crossover_time: Some("x".into()),
            entry_price: reference,
            entry_time: "y".into(),
        },
    }
}

// ── 1–3. EMA engine ──────────────────────────────────────────────────

proptest! {
    /// The seed is the simple mean of the first `period` closes.
    #[test]
    fn seed_is_window_mean(closes in arb_closes(120), period in 1usize..60) {
        prop_assume!(period <= closes.len());
        let ema = compute_ema(&closes, period).unwrap();
        let mean = closes[..period].iter().sum::<f64>() / period as f64;
        let seed = ema[period - 1].unwrap();
        prop_assert!((seed - mean).abs() <= 1e-9 * mean.abs().max(1.0));
        prop_assert!(ema[..period - 1].iter().all(|v| v.is_none()));
    }

    /// Every value after the seed follows (p - prev) * k + prev exactly.
    #[test]
    fn recurrence_holds(closes in arb_closes(120), period in 1usize..60) {
        prop_assume!(period <= closes.len());
        let ema = compute_ema(&closes, period).unwrap();
        let k = 2.0 / (period as f64 + 1.0);
        for i in period..closes.len() {
            let prev = ema[i - 1].unwrap();
            let expected = (closes[i] - prev) * k + prev;
            prop_assert_eq!(ema[i], Some(expected));
        }
    }

    /// compute_ema errors exactly when the history is shorter than the period.
    #[test]
    fn insufficient_iff_short(closes in prop::collection::vec(arb_price(), 0..40), period in 1usize..50) {
        let result = compute_ema(&closes, period);
        if closes.len() < period {
            prop_assert_eq!(
                result,
                Err(IndicatorError::InsufficientData { required: period, available: closes.len() })
            );
        } else {
            prop_assert_eq!(result.unwrap().len(), closes.len());
        }
    }

    /// EMA stays within the range of the closes it smooths.
    #[test]
    fn ema_bounded_by_closes(closes in arb_closes(80), period in 1usize..30) {
        prop_assume!(period <= closes.len());
        let lo = closes.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = closes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        for v in compute_ema(&closes, period).unwrap().into_iter().flatten() {
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }
}

// ── 4. Multi-period degradation ──────────────────────────────────────

proptest! {
    #[test]
    fn multi_none_iff_short(closes in prop::collection::vec(arb_price(), 2..60)) {
        let bars: Vec<PriceBar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::new(c, format!("t{i}")))
            .collect();
        let periods = [5, 8, 13, 21, 34, 50];
        let snap = compute_multi_ema_snapshot(&bars, &periods).unwrap();
        for period in periods {
            prop_assert_eq!(snap.current.ema(period).is_none(), bars.len() < period);
            prop_assert_eq!(snap.previous.ema(period).is_none(), bars.len() < period + 1);
        }
    }
}

// ── 5. Crossover symmetry ────────────────────────────────────────────

proptest! {
    /// Equal lines on both ticks never cross.
    #[test]
    fn equal_lines_never_cross(a in arb_price(), b in arb_price()) {
        prop_assert_eq!(
            detect_crossover(EmaPair::new(a, a), EmaPair::new(b, b)),
            Crossover::None
        );
    }

    /// Swapping fast and slow turns bullish into bearish and vice versa.
    #[test]
    fn swapping_lines_mirrors_direction(
        cf in arb_price(), cs in arb_price(), pf in arb_price(), ps in arb_price(),
    ) {
        let forward = detect_crossover(EmaPair::new(cf, cs), EmaPair::new(pf, ps));
        let mirrored = detect_crossover(EmaPair::new(cs, cf), EmaPair::new(ps, pf));
        let expected = match forward {
            Crossover::Bullish => Crossover::Bearish,
            Crossover::Bearish => Crossover::Bullish,
            Crossover::None => Crossover::None,
        };
        prop_assert_eq!(mirrored, expected);
    }
}

// ── 6. Stop-loss ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn stop_is_max_of_floors(entry in arb_price(), ema in arb_price(), pct in 0.0..50.0_f64) {
        let levels = stop_loss_levels(entry, ema, pct);
        let stop = compute_stop_loss(entry, ema, pct);
        prop_assert!(stop >= levels.percent_stop);
        prop_assert!(stop >= levels.ema_stop);
        prop_assert!(stop == levels.percent_stop || stop == levels.ema_stop);
    }
}

// ── 7. Transition totality ───────────────────────────────────────────

proptest! {
    #[test]
    fn transitions_match_table(
        status in arb_status(),
        crossover in arb_crossover(),
        reference in arb_price(),
        confirmation in 0.0..5.0_f64,
        above_target in prop::bool::ANY,
    ) {
        let target = target_price(reference, confirmation);
        let price = if above_target { target * 1.001 } else { target * 0.999 };
        let state = state_for(status, reference);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let result = evaluate_signal_at(
            &snapshot_for(crossover, reference), &state, confirmation, price, now,
        );

        let (expected_action, expected_status) = match (status, crossover) {
            (Status::Flat, Crossover::Bullish) => (Action::SignalDetected, Status::WaitingConfirmation),
            (Status::Flat, _) => (Action::Hold, Status::Flat),
            (Status::WaitingConfirmation, Crossover::Bearish) => (Action::SignalCancelled, Status::Flat),
            (Status::WaitingConfirmation, _) if above_target => (Action::Buy, Status::InPosition),
            (Status::WaitingConfirmation, _) => (Action::Hold, Status::WaitingConfirmation),
            (Status::InPosition, Crossover::Bearish) => (Action::Sell, Status::Flat),
            (Status::InPosition, _) => (Action::Hold, Status::InPosition),
        };

        prop_assert_eq!(result.action, expected_action);
        prop_assert_eq!(result.new_state.status(), expected_status);
        if result.action == Action::Hold {
            prop_assert_eq!(&result.new_state, &state);
        }
        if result.action == Action::Buy {
            prop_assert_eq!(result.new_state.entry_price(), Some(price));
            prop_assert_eq!(result.new_state.crossover_price(), Some(reference));
        }
    }
}
