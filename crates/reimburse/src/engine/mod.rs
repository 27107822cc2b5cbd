//! The reimbursement engine: three rate sub-models, an adjustment pass and currency rounding.
//!
//! An engine is compiled from a [`RateSchedule`] once and is immutable afterwards, so a
//! single instance can be shared by reference or `Arc` across any number of threads.

mod adjustments;
mod amount;
mod domain;
mod mileage;
mod per_diem;
mod receipts;
mod tiers;

pub use adjustments::AppliedAdjustment;
pub use amount::Amount;
pub use domain::{
    Breakdown, ReceiptsRegime, ReimbursementResult, TripInput, TripInputError, TripRecord,
    MAX_QUANTITY,
};

use crate::schedule::{RateSchedule, ScheduleError};
use adjustments::AdjustmentStage;
use mileage::MileageModel;
use per_diem::PerDiemModel;
use receipts::ReceiptsModel;
use std::num::NonZeroUsize;
use tracing::trace;

/// Batches smaller than this are not worth a thread spawn.
const PARALLEL_BATCH_THRESHOLD: usize = 512;

/// Stateless calculator compiled from a validated rate schedule.
#[derive(Debug, Clone)]
pub struct ReimbursementEngine {
    version: String,
    per_diem: PerDiemModel,
    mileage: MileageModel,
    receipts: ReceiptsModel,
    adjustments: AdjustmentStage,
}

impl ReimbursementEngine {
    pub fn new(schedule: &RateSchedule) -> Result<Self, ScheduleError> {
        Ok(Self {
            version: schedule.version.clone(),
            per_diem: PerDiemModel::new(&schedule.per_diem).map_err(ScheduleError::PerDiem)?,
            mileage: MileageModel::new(&schedule.mileage).map_err(ScheduleError::Mileage)?,
            receipts: ReceiptsModel::new(&schedule.receipts)?,
            adjustments: AdjustmentStage::new(&schedule.adjustments)?,
        })
    }

    /// Engine over the compiled-in [`RateSchedule::standard`] tables.
    pub fn standard() -> Self {
        Self::new(&RateSchedule::standard()).expect("standard rate schedule is valid")
    }

    pub fn schedule_version(&self) -> &str {
        &self.version
    }

    pub fn calculate(&self, trip: &TripInput) -> ReimbursementResult {
        let per_diem = self.per_diem.contribution(trip.duration_days());
        let mileage = self.mileage.contribution(trip.miles_traveled());
        let receipts = self.receipts.contribution(trip);

        let subtotal = per_diem + mileage + receipts.contribution;
        let (adjusted, applied) = self.adjustments.apply(trip, subtotal);
        let unrounded = adjusted.max(0.0);
        let amount = Amount::round_half_up(unrounded);

        trace!(
            duration_days = trip.duration_days(),
            miles = trip.miles_traveled(),
            receipts = trip.total_receipts(),
            %amount,
            "reimbursement calculated"
        );

        ReimbursementResult {
            amount,
            breakdown: Breakdown {
                per_diem,
                mileage,
                receipts: receipts.contribution,
                receipts_regime: receipts.regime,
                sparse_receipts_penalty: receipts.sparse_penalty,
                subtotal,
                adjustments: applied,
                unrounded,
            },
        }
    }

    /// Validates the raw triple and returns only the rounded amount.
    pub fn reimburse(
        &self,
        duration_days: i64,
        miles_traveled: f64,
        total_receipts: f64,
    ) -> Result<Amount, TripInputError> {
        let trip = TripInput::new(duration_days, miles_traveled, total_receipts)?;
        Ok(self.calculate(&trip).amount)
    }

    /// Calculates every trip, sharding large batches over scoped worker threads.
    /// Results keep the input order.
    pub fn calculate_batch(&self, trips: &[TripInput]) -> Vec<ReimbursementResult> {
        let workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);

        if workers == 1 || trips.len() < PARALLEL_BATCH_THRESHOLD {
            return trips.iter().map(|trip| self.calculate(trip)).collect();
        }

        let shard_len = trips.len().div_ceil(workers);
        std::thread::scope(|scope| {
            let shards: Vec<_> = trips
                .chunks(shard_len)
                .map(|shard| {
                    scope.spawn(move || {
                        shard
                            .iter()
                            .map(|trip| self.calculate(trip))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            shards
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ReimbursementEngine {
        ReimbursementEngine::standard()
    }

    fn calculate(days: i64, miles: f64, receipts: f64) -> ReimbursementResult {
        let trip = TripInput::new(days, miles, receipts).expect("valid trip");
        engine().calculate(&trip)
    }

    #[test]
    fn single_day_without_miles_or_receipts_is_the_per_diem() {
        let result = calculate(1, 0.0, 0.0);

        assert_eq!(result.amount.to_string(), "170.00");
        assert_eq!(result.breakdown.per_diem, 170.0);
        assert_eq!(result.breakdown.mileage, 0.0);
        assert_eq!(result.breakdown.receipts, 0.0);
        assert!(result.breakdown.adjustments.is_empty());
    }

    #[test]
    fn tiny_receipts_lower_the_payout() {
        let with_receipts = calculate(1, 181.0, 3.60);
        let without = calculate(1, 181.0, 0.0);

        assert_eq!(with_receipts.breakdown.receipts_regime, ReceiptsRegime::Tiny);
        assert_eq!(with_receipts.amount.to_string(), "337.48");
        assert_eq!(without.amount.to_string(), "344.23");
        assert!(with_receipts.amount < without.amount);
    }

    #[test]
    fn five_day_trip_gets_the_duration_bonus() {
        let result = calculate(5, 0.0, 0.0);

        assert_eq!(result.amount.to_string(), "550.00");
        let per_day = result.amount.as_f64() / 5.0;
        let short_rates: Vec<f64> = (1..=3)
            .map(|days| calculate(days, 0.0, 0.0).amount.as_f64() / days as f64)
            .collect();
        let slope = (short_rates[2] - short_rates[0]) / 2.0;
        let extrapolated = short_rates[2] + slope * 2.0;
        assert!(per_day > extrapolated);
    }

    #[test]
    fn long_drive_uses_bracket_sum() {
        let result = calculate(3, 1000.0, 0.0);

        assert!((result.breakdown.mileage - 390.5).abs() < 1e-9);
        assert_eq!(result.amount.to_string(), "675.50");
    }

    #[test]
    fn heavy_daily_spending_damps_receipts() {
        let heavy = calculate(6, 372.0, 2494.69);
        let modest = calculate(6, 372.0, 600.0);

        assert_eq!(heavy.breakdown.receipts_regime, ReceiptsRegime::HighSpending);
        assert_eq!(modest.breakdown.receipts_regime, ReceiptsRegime::Standard);
        let heavy_yield = heavy.breakdown.receipts / 2494.69;
        let modest_yield = modest.breakdown.receipts / 600.0;
        assert!(heavy_yield < modest_yield);
        assert_eq!(heavy.amount.to_string(), "1741.12");
    }

    #[test]
    fn result_is_never_negative() {
        let mut schedule = RateSchedule::standard();
        schedule.per_diem.bands.iter_mut().for_each(|band| {
            band.daily_rate = 0.0;
            band.flat_bonus = 0.0;
        });
        let engine = ReimbursementEngine::new(&schedule).expect("zero per-diem is valid");

        let amount = engine.reimburse(3, 0.0, 12.0).expect("valid trip");
        assert_eq!(amount, Amount::ZERO);
    }

    #[test]
    fn reimburse_rejects_invalid_triples() {
        let engine = engine();
        assert!(matches!(
            engine.reimburse(0, 10.0, 10.0),
            Err(TripInputError::DurationTooShort(0))
        ));
        assert!(engine.reimburse(2, -5.0, 10.0).is_err());
        assert!(engine.reimburse(2, 5.0, f64::NAN).is_err());
    }

    #[test]
    fn oversized_trips_are_rejected_not_saturated() {
        let engine = engine();
        for miles in [1e18, 1e19, 1e300] {
            assert!(matches!(
                engine.reimburse(1, miles, 0.0),
                Err(TripInputError::OutOfRange { .. })
            ));
        }
        assert!(matches!(
            engine.reimburse(13, 0.0, 1e300),
            Err(TripInputError::OutOfRange { .. })
        ));

        let largest = engine
            .reimburse(1, MAX_QUANTITY, MAX_QUANTITY)
            .expect("ceiling is accepted");
        assert!(largest.as_f64() > 0.0 && largest.as_f64() < 1e12);
    }

    #[test]
    fn batch_matches_sequential_order() {
        let engine = engine();
        let trips: Vec<TripInput> = (0..2_000)
            .map(|index| {
                TripInput::new(
                    1 + (index % 14) as i64,
                    (index * 37 % 1_300) as f64,
                    (index * 113 % 2_700) as f64 + 0.49,
                )
                .expect("valid trip")
            })
            .collect();

        let batch = engine.calculate_batch(&trips);
        let sequential: Vec<_> = trips.iter().map(|trip| engine.calculate(trip)).collect();

        assert_eq!(batch, sequential);
    }

    #[test]
    fn engine_reports_schedule_version() {
        assert_eq!(engine().schedule_version(), RateSchedule::standard().version);
    }
}
