//! Rate schedules: the versioned, externally loadable tables behind every calculation.
//!
//! A schedule is plain data. It is checked once, when an engine is built from it
//! (or when it is loaded from disk), so a malformed table fails at startup instead
//! of producing a wrong figure for some later trip.

mod standard;
mod types;

pub use standard::STANDARD_VERSION;

pub use types::{
    AdjustmentGroup, AdjustmentRule, Conditions, DurationBand, Effect, HighSpending,
    MileageSchedule, PerDiemSchedule, RateSchedule, RateTier, ReceiptsSchedule, SparseReceipts,
    TinyReceipts, Window,
};

use crate::engine::ReimbursementEngine;
use std::io::Read;
use std::path::Path;
use tracing::debug;

impl RateSchedule {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScheduleError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScheduleError> {
        let schedule: RateSchedule = serde_json::from_reader(reader)?;
        schedule.validate()?;
        debug!(version = %schedule.version, effective_on = %schedule.effective_on, "rate schedule loaded");
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        ReimbursementEngine::new(self).map(|_| ())
    }
}

/// Structural problem with a progressive rate table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TierError {
    #[error("table has no tiers")]
    Empty,
    #[error("first tier must start at 0 (found {0})")]
    NonZeroStart(f64),
    #[error("tier {index} has a non-finite bound")]
    NonFiniteBound { index: usize },
    #[error("tier {index} is empty or inverted ({lower} to {upper})")]
    EmptySpan { index: usize, lower: f64, upper: f64 },
    #[error("tier {index} starts at {found} but the previous tier ends at {expected}")]
    Gap {
        index: usize,
        expected: f64,
        found: f64,
    },
    #[error("tier {index} is unbounded but is not the last tier")]
    UnboundedBeforeEnd { index: usize },
    #[error("last tier must be unbounded (ends at {0})")]
    BoundedFinalTier(f64),
    #[error("tier {index} has an invalid rate {rate}")]
    InvalidRate { index: usize, rate: f64 },
    #[error("tier {index} rate {rate} does not decrease from {previous}")]
    NotDecreasing {
        index: usize,
        previous: f64,
        rate: f64,
    },
}

/// Structural problem with the per-diem duration bands.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BandError {
    #[error("no duration bands configured")]
    Empty,
    #[error("first band must start at day 1 (found {0})")]
    FirstBandStart(u32),
    #[error("band {index} starts at day {found} but day {expected} was expected")]
    Gap {
        index: usize,
        expected: u32,
        found: u32,
    },
    #[error("band {index} ends before it starts ({min} to {max})")]
    Inverted { index: usize, min: u32, max: u32 },
    #[error("band {index} is open ended but is not the last band")]
    UnboundedBeforeEnd { index: usize },
    #[error("last band must be open ended (ends at day {0})")]
    BoundedFinalBand(u32),
    #[error("band {index} has an invalid amount {value}")]
    InvalidAmount { index: usize, value: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid per-diem bands: {0}")]
    PerDiem(#[source] BandError),
    #[error("invalid mileage tiers: {0}")]
    Mileage(#[source] TierError),
    #[error("invalid receipt tiers: {0}")]
    Receipts(#[source] TierError),
    #[error("receipts setting `{name}` is out of range ({value})")]
    ReceiptSetting { name: &'static str, value: f64 },
    #[error("adjustment group `{group}` has no rules")]
    EmptyGroup { group: String },
    #[error("adjustment `{group}/{rule}`: {reason}")]
    Adjustment {
        group: String,
        rule: String,
        reason: String,
    },
    #[error("failed to read rate schedule: {0}")]
    Io(#[from] std::io::Error),
    #[error("rate schedule is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
