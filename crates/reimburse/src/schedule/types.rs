use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Versioned set of every constant the engine consults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSchedule {
    pub version: String,
    pub effective_on: NaiveDate,
    pub per_diem: PerDiemSchedule,
    pub mileage: MileageSchedule,
    pub receipts: ReceiptsSchedule,
    #[serde(default)]
    pub adjustments: Vec<AdjustmentGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerDiemSchedule {
    pub bands: Vec<DurationBand>,
}

/// Inclusive day range sharing one daily rate. `max_days: None` is open ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationBand {
    pub min_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_days: Option<u32>,
    pub daily_rate: f64,
    #[serde(default)]
    pub flat_bonus: f64,
}

impl DurationBand {
    pub fn contains(&self, duration_days: u32) -> bool {
        duration_days >= self.min_days && self.max_days.map_or(true, |max| duration_days <= max)
    }
}

/// One bracket of a progressive rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTier {
    pub lower_bound: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
    pub rate: f64,
}

impl RateTier {
    pub fn bounded(lower_bound: f64, upper_bound: f64, rate: f64) -> Self {
        Self {
            lower_bound,
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub fn open(lower_bound: f64, rate: f64) -> Self {
        Self {
            lower_bound,
            upper_bound: None,
            rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MileageSchedule {
    pub tiers: Vec<RateTier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptsSchedule {
    pub tiers: Vec<RateTier>,
    pub tiny: TinyReceipts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse: Option<SparseReceipts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_spending: Option<HighSpending>,
}

/// Non-zero totals under `threshold` are charged `penalty_rate` per dollar instead of reimbursed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TinyReceipts {
    pub threshold: f64,
    pub penalty_rate: f64,
}

/// Flat deduction for receipts spread thinly over a multi-day trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseReceipts {
    pub daily_floor: f64,
    pub min_days: u32,
    pub penalty: f64,
}

/// Spending above `daily_allowance` per day is bracketed as usual and then scaled by
/// `excess_factor`; `contribution_cap` optionally plateaus the receipts contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighSpending {
    pub daily_allowance: f64,
    pub excess_factor: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution_cap: Option<f64>,
}

/// Ordered if/else chain: the first matching rule fires, the rest are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentGroup {
    pub name: String,
    pub rules: Vec<AdjustmentRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRule {
    pub name: String,
    #[serde(default)]
    pub when: Conditions,
    pub effect: Effect,
}

/// Conjunction of per-dimension windows. Absent dimensions always match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<Window>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub miles_per_day: Option<Window>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spending_per_day: Option<Window>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_cents: Option<Vec<u8>>,
}

/// Interval on one dimension; every bound present must hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Window {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
}

impl Window {
    pub fn contains(&self, value: f64) -> bool {
        self.gt.map_or(true, |bound| value > bound)
            && self.gte.map_or(true, |bound| value >= bound)
            && self.lt.map_or(true, |bound| value < bound)
            && self.lte.map_or(true, |bound| value <= bound)
    }

    pub(crate) fn is_finite(&self) -> bool {
        [self.gt, self.gte, self.lt, self.lte]
            .iter()
            .flatten()
            .all(|bound| bound.is_finite())
    }

    pub fn between(gte: f64, lte: f64) -> Self {
        Self {
            gte: Some(gte),
            lte: Some(lte),
            ..Self::default()
        }
    }

    pub fn exactly(value: f64) -> Self {
        Self::between(value, value)
    }

    pub fn above(gt: f64) -> Self {
        Self {
            gt: Some(gt),
            ..Self::default()
        }
    }

    pub fn at_least(gte: f64) -> Self {
        Self {
            gte: Some(gte),
            ..Self::default()
        }
    }

    pub fn below(lt: f64) -> Self {
        Self {
            lt: Some(lt),
            ..Self::default()
        }
    }

    pub fn at_most(lte: f64) -> Self {
        Self {
            lte: Some(lte),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Multiply(f64),
    Add(f64),
}

impl Effect {
    pub fn apply(self, running_total: f64) -> f64 {
        match self {
            Effect::Multiply(factor) => running_total * factor,
            Effect::Add(amount) => running_total + amount,
        }
    }
}
