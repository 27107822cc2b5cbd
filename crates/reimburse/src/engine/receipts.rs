use super::domain::{ReceiptsRegime, TripInput};
use super::tiers::TierTable;
use crate::schedule::{HighSpending, ReceiptsSchedule, ScheduleError, SparseReceipts, TinyReceipts};

/// Receipts contribution: bracketed reimbursement with a tiny-total penalty,
/// a thin-spread penalty and a spending-per-day damper.
#[derive(Debug, Clone)]
pub(crate) struct ReceiptsModel {
    tiers: TierTable,
    tiny: TinyReceipts,
    sparse: Option<SparseReceipts>,
    high_spending: Option<HighSpending>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ReceiptsOutcome {
    pub(crate) contribution: f64,
    pub(crate) regime: ReceiptsRegime,
    pub(crate) sparse_penalty: bool,
}

impl ReceiptsModel {
    pub(crate) fn new(schedule: &ReceiptsSchedule) -> Result<Self, ScheduleError> {
        let tiers = TierTable::new(&schedule.tiers).map_err(ScheduleError::Receipts)?;

        non_negative("tiny.threshold", schedule.tiny.threshold)?;
        non_negative("tiny.penalty_rate", schedule.tiny.penalty_rate)?;

        if let Some(sparse) = &schedule.sparse {
            non_negative("sparse.daily_floor", sparse.daily_floor)?;
            non_negative("sparse.penalty", sparse.penalty)?;
            if sparse.min_days == 0 {
                return Err(ScheduleError::ReceiptSetting {
                    name: "sparse.min_days",
                    value: 0.0,
                });
            }
        }

        if let Some(high) = &schedule.high_spending {
            if !high.daily_allowance.is_finite() || high.daily_allowance <= 0.0 {
                return Err(ScheduleError::ReceiptSetting {
                    name: "high_spending.daily_allowance",
                    value: high.daily_allowance,
                });
            }
            if !(0.0..=1.0).contains(&high.excess_factor) {
                return Err(ScheduleError::ReceiptSetting {
                    name: "high_spending.excess_factor",
                    value: high.excess_factor,
                });
            }
            if let Some(cap) = high.contribution_cap {
                non_negative("high_spending.contribution_cap", cap)?;
            }
        }

        Ok(Self {
            tiers,
            tiny: schedule.tiny.clone(),
            sparse: schedule.sparse.clone(),
            high_spending: schedule.high_spending.clone(),
        })
    }

    pub(crate) fn contribution(&self, trip: &TripInput) -> ReceiptsOutcome {
        let receipts = trip.total_receipts();
        if receipts == 0.0 {
            return ReceiptsOutcome {
                contribution: 0.0,
                regime: ReceiptsRegime::None,
                sparse_penalty: false,
            };
        }

        let (mut contribution, regime) = if receipts < self.tiny.threshold {
            (-self.tiny.penalty_rate * receipts, ReceiptsRegime::Tiny)
        } else {
            match &self.high_spending {
                Some(high) if trip.spending_per_day() > high.daily_allowance => {
                    let allowed = high.daily_allowance * f64::from(trip.duration_days());
                    let within = self.tiers.accumulate(allowed);
                    let excess = self.tiers.accumulate(receipts) - within;
                    (
                        within + excess * high.excess_factor,
                        ReceiptsRegime::HighSpending,
                    )
                }
                _ => (self.tiers.accumulate(receipts), ReceiptsRegime::Standard),
            }
        };

        let sparse_penalty = match &self.sparse {
            Some(sparse)
                if trip.duration_days() >= sparse.min_days
                    && trip.spending_per_day() < sparse.daily_floor =>
            {
                contribution -= sparse.penalty;
                true
            }
            _ => false,
        };

        if let Some(cap) = self
            .high_spending
            .as_ref()
            .and_then(|high| high.contribution_cap)
        {
            contribution = contribution.min(cap);
        }

        ReceiptsOutcome {
            contribution,
            regime,
            sparse_penalty,
        }
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ScheduleError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ScheduleError::ReceiptSetting { name, value })
    }
}
