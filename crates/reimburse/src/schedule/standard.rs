use super::types::{
    AdjustmentGroup, AdjustmentRule, Conditions, DurationBand, Effect, HighSpending,
    MileageSchedule, PerDiemSchedule, RateSchedule, RateTier, ReceiptsSchedule, SparseReceipts,
    TinyReceipts, Window,
};
use chrono::NaiveDate;

pub const STANDARD_VERSION: &str = "legacy-2024.1";

impl RateSchedule {
    /// Compiled-in schedule taken from the legacy calculator's rate tables.
    ///
    /// It is not fitted to any reference dataset; score one with `ReferenceDataset::score`.
    pub fn standard() -> Self {
        Self {
            version: STANDARD_VERSION.to_string(),
            effective_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            per_diem: standard_per_diem(),
            mileage: standard_mileage(),
            receipts: standard_receipts(),
            adjustments: standard_adjustments(),
        }
    }
}

fn band(min_days: u32, max_days: Option<u32>, daily_rate: f64, flat_bonus: f64) -> DurationBand {
    DurationBand {
        min_days,
        max_days,
        daily_rate,
        flat_bonus,
    }
}

fn standard_per_diem() -> PerDiemSchedule {
    PerDiemSchedule {
        bands: vec![
            band(1, Some(1), 120.0, 50.0),
            band(2, Some(2), 100.0, 0.0),
            band(3, Some(3), 95.0, 0.0),
            band(4, Some(4), 90.0, 0.0),
            band(5, Some(5), 95.0, 75.0),
            band(6, Some(6), 85.0, 0.0),
            band(7, Some(9), 78.0, 0.0),
            band(10, Some(12), 72.0, 0.0),
            band(13, None, 65.0, 0.0),
        ],
    }
}

fn standard_mileage() -> MileageSchedule {
    MileageSchedule {
        tiers: vec![
            RateTier::bounded(0.0, 50.0, 0.75),
            RateTier::bounded(50.0, 100.0, 0.58),
            RateTier::bounded(100.0, 200.0, 0.48),
            RateTier::bounded(200.0, 300.0, 0.42),
            RateTier::bounded(300.0, 500.0, 0.38),
            RateTier::bounded(500.0, 700.0, 0.34),
            RateTier::bounded(700.0, 1000.0, 0.30),
            RateTier::open(1000.0, 0.25),
        ],
    }
}

fn standard_receipts() -> ReceiptsSchedule {
    ReceiptsSchedule {
        tiers: vec![
            RateTier::bounded(0.0, 150.0, 0.75),
            RateTier::bounded(150.0, 500.0, 0.55),
            RateTier::bounded(500.0, 1000.0, 0.50),
            RateTier::bounded(1000.0, 1500.0, 0.55),
            RateTier::open(1500.0, 0.40),
        ],
        tiny: TinyReceipts {
            threshold: 30.0,
            penalty_rate: 1.5,
        },
        sparse: Some(SparseReceipts {
            daily_floor: 12.0,
            min_days: 2,
            penalty: 25.0,
        }),
        high_spending: Some(HighSpending {
            daily_allowance: 300.0,
            excess_factor: 0.35,
            contribution_cap: None,
        }),
    }
}

fn rule(name: &str, when: Conditions, effect: Effect) -> AdjustmentRule {
    AdjustmentRule {
        name: name.to_string(),
        when,
        effect,
    }
}

fn group(name: &str, rules: Vec<AdjustmentRule>) -> AdjustmentGroup {
    AdjustmentGroup {
        name: name.to_string(),
        rules,
    }
}

fn trip(
    duration_days: Option<Window>,
    miles_per_day: Option<Window>,
    spending_per_day: Option<Window>,
) -> Conditions {
    Conditions {
        duration_days,
        miles_per_day,
        spending_per_day,
        receipt_cents: None,
    }
}

fn half_open(gte: f64, lt: f64) -> Window {
    Window {
        gte: Some(gte),
        lt: Some(lt),
        ..Window::default()
    }
}

fn standard_adjustments() -> Vec<AdjustmentGroup> {
    let one_day = Some(Window::exactly(1.0));
    let multi_day = Some(Window::at_least(2.0));

    vec![
        group(
            "efficiency",
            vec![
                rule(
                    "one_day_extreme_spending",
                    trip(one_day, None, Some(Window::above(1500.0))),
                    Effect::Multiply(0.45),
                ),
                rule(
                    "one_day_high_spending",
                    trip(one_day, None, Some(Window::above(800.0))),
                    Effect::Multiply(0.65),
                ),
                rule(
                    "one_day_moderate_spending",
                    trip(one_day, None, Some(Window::above(400.0))),
                    Effect::Multiply(0.85),
                ),
                rule(
                    "one_day_high_effort",
                    trip(one_day, Some(Window::between(300.0, 600.0)), None),
                    Effect::Multiply(1.35),
                ),
                rule(
                    "one_day_good_effort",
                    trip(one_day, Some(half_open(180.0, 300.0)), None),
                    Effect::Multiply(1.25),
                ),
                rule(
                    "one_day_moderate_effort",
                    trip(one_day, Some(half_open(100.0, 180.0)), None),
                    Effect::Multiply(1.15),
                ),
                rule(
                    "one_day_extreme_mileage",
                    trip(one_day, Some(Window::above(600.0)), None),
                    Effect::Multiply(0.65),
                ),
                rule(
                    "efficiency_sweet_spot",
                    trip(multi_day, Some(Window::between(180.0, 220.0)), None),
                    Effect::Multiply(1.20),
                ),
                rule(
                    "good_efficiency",
                    trip(multi_day, Some(half_open(100.0, 180.0)), None),
                    Effect::Multiply(1.10),
                ),
                rule(
                    "short_road_trip",
                    trip(
                        Some(Window::between(2.0, 3.0)),
                        Some(Window::above(400.0)),
                        None,
                    ),
                    Effect::Multiply(1.30),
                ),
                rule(
                    "extreme_mileage",
                    trip(Some(Window::above(3.0)), Some(Window::above(350.0)), None),
                    Effect::Multiply(0.40),
                ),
            ],
        ),
        group(
            "spending",
            vec![
                rule(
                    "vacation_heavy",
                    trip(
                        Some(Window::at_least(7.0)),
                        Some(Window::below(100.0)),
                        Some(Window::above(200.0)),
                    ),
                    Effect::Multiply(0.30),
                ),
                rule(
                    "vacation_moderate",
                    trip(
                        Some(Window::at_least(7.0)),
                        Some(Window::below(100.0)),
                        Some(Window::above(180.0)),
                    ),
                    Effect::Multiply(0.50),
                ),
                rule(
                    "five_day_high_spending",
                    trip(
                        Some(Window::exactly(5.0)),
                        Some(Window::below(150.0)),
                        Some(Window {
                            gt: Some(350.0),
                            lt: Some(440.0),
                            ..Window::default()
                        }),
                    ),
                    Effect::Multiply(0.35),
                ),
                rule(
                    "extreme_spending",
                    trip(None, None, Some(Window::above(440.0))),
                    Effect::Multiply(0.70),
                ),
                rule(
                    "short_trip_high_spending",
                    trip(Some(Window::at_most(3.0)), None, Some(Window::above(400.0))),
                    Effect::Multiply(0.75),
                ),
                rule(
                    "long_trip_high_spending",
                    trip(Some(Window::at_least(8.0)), None, Some(Window::above(250.0))),
                    Effect::Multiply(0.85),
                ),
                rule(
                    "high_effort_high_spending",
                    trip(
                        Some(Window::between(4.0, 6.0)),
                        Some(Window::above(150.0)),
                        Some(Window::above(300.0)),
                    ),
                    Effect::Multiply(1.20),
                ),
            ],
        ),
        group(
            "sweet_spot_combo",
            vec![rule(
                "five_day_efficient_frugal",
                trip(
                    Some(Window::exactly(5.0)),
                    Some(Window::at_least(180.0)),
                    Some(Window::at_most(100.0)),
                ),
                Effect::Add(150.0),
            )],
        ),
        group(
            "long_haul",
            vec![rule(
                "long_trip_high_mileage",
                trip(Some(Window::at_least(8.0)), Some(Window::above(200.0)), None),
                Effect::Multiply(1.15),
            )],
        ),
        group(
            "low_effort",
            vec![rule(
                "long_trip_low_mileage",
                trip(Some(Window::at_least(7.0)), Some(Window::below(50.0)), None),
                Effect::Multiply(0.65),
            )],
        ),
        group(
            "rounding_quirk",
            vec![rule(
                "cents_49_or_99",
                Conditions {
                    receipt_cents: Some(vec![49, 99]),
                    ..Conditions::default()
                },
                Effect::Add(20.0),
            )],
        ),
    ]
}
