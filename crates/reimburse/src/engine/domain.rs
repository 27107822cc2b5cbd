use serde::{Deserialize, Serialize};

use super::adjustments::AppliedAdjustment;
use super::amount::Amount;

/// Largest mileage or receipt total accepted. Keeps every reimbursement well inside
/// the range [`Amount`] can hold in cents.
pub const MAX_QUANTITY: f64 = 1e9;

/// Validated trip facts. Construction is the only place inputs are checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripInput {
    duration_days: u32,
    miles_traveled: f64,
    total_receipts: f64,
}

impl TripInput {
    pub fn new(
        duration_days: i64,
        miles_traveled: f64,
        total_receipts: f64,
    ) -> Result<Self, TripInputError> {
        if duration_days < 1 {
            return Err(TripInputError::DurationTooShort(duration_days));
        }
        let duration_days = u32::try_from(duration_days)
            .map_err(|_| TripInputError::DurationOutOfRange(duration_days))?;

        check_quantity("miles_traveled", miles_traveled)?;
        check_quantity("total_receipts", total_receipts)?;

        Ok(Self {
            duration_days,
            miles_traveled,
            total_receipts,
        })
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    pub fn miles_traveled(&self) -> f64 {
        self.miles_traveled
    }

    pub fn total_receipts(&self) -> f64 {
        self.total_receipts
    }

    pub fn miles_per_day(&self) -> f64 {
        self.miles_traveled / f64::from(self.duration_days)
    }

    pub fn spending_per_day(&self) -> f64 {
        self.total_receipts / f64::from(self.duration_days)
    }

    /// Cents portion of the receipt total, `0..=99`.
    pub fn receipt_cents(&self) -> u8 {
        ((self.total_receipts * 100.0).round() as i64 % 100) as u8
    }
}

fn check_quantity(field: &'static str, value: f64) -> Result<(), TripInputError> {
    if !value.is_finite() {
        return Err(TripInputError::NonFinite { field, value });
    }
    if value < 0.0 {
        return Err(TripInputError::Negative { field, value });
    }
    if value > MAX_QUANTITY {
        return Err(TripInputError::OutOfRange {
            field,
            value,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// Rejection raised before any rate model runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TripInputError {
    #[error("trip duration must be at least one day (found {0})")]
    DurationTooShort(i64),
    #[error("trip duration of {0} days is out of range")]
    DurationOutOfRange(i64),
    #[error("{field} must be a finite number (found {value})")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} must not be negative (found {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} of {value} exceeds the supported maximum of {max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        max: f64,
    },
}

/// Unvalidated trip in the legacy field naming used by datasets and HTTP payloads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub trip_duration_days: i64,
    pub miles_traveled: f64,
    pub total_receipts_amount: f64,
}

impl TryFrom<TripRecord> for TripInput {
    type Error = TripInputError;

    fn try_from(record: TripRecord) -> Result<Self, Self::Error> {
        TripInput::new(
            record.trip_duration_days,
            record.miles_traveled,
            record.total_receipts_amount,
        )
    }
}

/// Which receipts branch produced the receipts contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptsRegime {
    None,
    Tiny,
    Standard,
    HighSpending,
}

/// Component trail behind a reimbursement, kept for audits and tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub per_diem: f64,
    pub mileage: f64,
    pub receipts: f64,
    pub receipts_regime: ReceiptsRegime,
    pub sparse_receipts_penalty: bool,
    pub subtotal: f64,
    pub adjustments: Vec<AppliedAdjustment>,
    pub unrounded: f64,
}

/// Final reimbursement with its breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReimbursementResult {
    pub amount: Amount,
    pub breakdown: Breakdown,
}
