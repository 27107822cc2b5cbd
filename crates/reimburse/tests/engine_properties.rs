//! Behavioural guarantees of the reimbursement engine exercised through the public API.

use reimburse::engine::{ReceiptsRegime, ReimbursementResult};
use reimburse::{RateSchedule, ReimbursementEngine, TripInput};

fn engine() -> ReimbursementEngine {
    ReimbursementEngine::standard()
}

fn calculate(engine: &ReimbursementEngine, days: i64, miles: f64, receipts: f64) -> ReimbursementResult {
    let trip = TripInput::new(days, miles, receipts).expect("valid trip");
    engine.calculate(&trip)
}

#[test]
fn repeated_calls_are_identical() {
    let engine = engine();
    for (days, miles, receipts) in [(1, 0.0, 0.0), (4, 764.0, 1417.94), (12, 1317.0, 2200.49)] {
        let first = calculate(&engine, days, miles, receipts);
        for _ in 0..50 {
            assert_eq!(calculate(&engine, days, miles, receipts), first);
        }
    }
}

#[test]
fn mileage_contribution_is_monotone_and_concave() {
    let engine = engine();
    let mileage = |miles: f64| calculate(&engine, 3, miles, 0.0).breakdown.mileage;

    let mut previous_value = mileage(0.0);
    let mut previous_rate = f64::INFINITY;
    for step in 1..=160 {
        let miles = f64::from(step) * 10.0;
        let value = mileage(miles);
        let rate = (value - previous_value) / 10.0;

        assert!(value > previous_value, "mileage fell at {miles}");
        assert!(rate <= previous_rate + 1e-9, "marginal rate rose at {miles}");

        previous_value = value;
        previous_rate = rate;
    }
}

#[test]
fn zero_receipts_beat_trivial_receipts() {
    let engine = engine();
    for (days, miles) in [(1, 0.0), (2, 100.0), (4, 250.0), (8, 90.0)] {
        let none = calculate(&engine, days, miles, 0.0).amount;
        for receipts in [0.5, 5.0, 12.5, 29.0] {
            let tiny = calculate(&engine, days, miles, receipts);
            assert_eq!(tiny.breakdown.receipts_regime, ReceiptsRegime::Tiny);
            assert!(
                tiny.amount < none,
                "{days}d/{miles}mi: ${receipts} paid {} vs {} with none",
                tiny.amount,
                none
            );
        }
    }
}

#[test]
fn five_day_trips_outearn_the_short_trip_trend() {
    let engine = engine();
    let per_day = |days: i64| calculate(&engine, days, 0.0, 0.0).amount.as_f64() / days as f64;

    let (one, three) = (per_day(1), per_day(3));
    let extrapolated = three + (three - one) / 2.0 * 2.0;

    assert!(per_day(5) > extrapolated);
    assert!(per_day(5) > per_day(4));
    assert!(per_day(5) > per_day(6));
}

#[test]
fn amounts_always_render_two_decimals() {
    let engine = engine();
    for days in 1..=14 {
        for miles in [0.0, 33.3, 181.0, 999.99, 1500.5] {
            for receipts in [0.0, 3.6, 77.77, 1017.49, 2494.69] {
                let rendered = calculate(&engine, days, miles, receipts).amount.to_string();
                let (_, decimals) = rendered.split_once('.').expect("decimal point present");
                assert_eq!(decimals.len(), 2, "{rendered} for {days}/{miles}/{receipts}");
            }
        }
    }
}

#[test]
fn contributions_are_continuous_at_tier_boundaries() {
    let engine = engine();
    for boundary in [50.0, 100.0, 200.0, 300.0, 500.0, 700.0, 1000.0] {
        let below = calculate(&engine, 2, boundary - 1e-7, 0.0).breakdown.mileage;
        let above = calculate(&engine, 2, boundary + 1e-7, 0.0).breakdown.mileage;
        assert!((above - below).abs() < 1e-6, "mileage jump at {boundary}");
    }
    for boundary in [150.0, 500.0, 1000.0, 1500.0] {
        let below = calculate(&engine, 10, 0.0, boundary - 1e-7).breakdown.receipts;
        let above = calculate(&engine, 10, 0.0, boundary + 1e-7).breakdown.receipts;
        assert!((above - below).abs() < 1e-6, "receipts jump at {boundary}");
    }
}

#[test]
fn one_day_floor_is_the_per_diem_alone() {
    let result = calculate(&engine(), 1, 0.0, 0.0);
    assert_eq!(result.amount.to_string(), "170.00");
    assert_eq!(result.amount.as_f64(), result.breakdown.per_diem);
}

#[test]
fn thousand_mile_drive_is_bracketed() {
    let result = calculate(&engine(), 3, 1000.0, 0.0);
    assert!((result.breakdown.mileage - 390.5).abs() < 1e-9);
}

#[test]
fn heavy_spender_receipts_yield_less_per_dollar() {
    let engine = engine();
    let heavy = calculate(&engine, 6, 372.0, 2494.69);
    let light = calculate(&engine, 6, 372.0, 450.0);

    assert_eq!(heavy.breakdown.receipts_regime, ReceiptsRegime::HighSpending);
    assert!(heavy.breakdown.receipts / 2494.69 < light.breakdown.receipts / 450.0);
}

#[test]
fn schedule_artifact_matches_compiled_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/standard_rates.json");
    let loaded = RateSchedule::from_path(path).expect("artifact loads");

    assert_eq!(loaded, RateSchedule::standard());
}

#[test]
fn swapping_the_schedule_changes_rates_not_the_algorithm() {
    let mut schedule = RateSchedule::standard();
    schedule.version = "flat-mileage-test".to_string();
    schedule.mileage.tiers.truncate(1);
    schedule.mileage.tiers[0].upper_bound = None;
    schedule.adjustments.clear();
    let flat = ReimbursementEngine::new(&schedule).expect("single tier is valid");

    let result = calculate(&flat, 3, 1000.0, 0.0);
    assert!((result.breakdown.mileage - 750.0).abs() < 1e-9);
    assert_eq!(result.amount.to_string(), "1035.00");
    assert_eq!(flat.schedule_version(), "flat-mileage-test");
}
