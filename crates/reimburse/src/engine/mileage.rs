use super::tiers::TierTable;
use crate::schedule::{MileageSchedule, TierError};

/// Progressive per-mile allowance with a falling marginal rate.
#[derive(Debug, Clone)]
pub(crate) struct MileageModel {
    tiers: TierTable,
}

impl MileageModel {
    pub(crate) fn new(schedule: &MileageSchedule) -> Result<Self, TierError> {
        Ok(Self {
            tiers: TierTable::diminishing(&schedule.tiers)?,
        })
    }

    pub(crate) fn contribution(&self, miles: f64) -> f64 {
        self.tiers.accumulate(miles)
    }

    #[cfg(test)]
    pub(crate) fn tiers(&self) -> &TierTable {
        &self.tiers
    }
}
