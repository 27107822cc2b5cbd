use crate::schedule::{BandError, DurationBand, PerDiemSchedule};

/// Duration-conditioned per-day rates plus a flat bonus per band.
#[derive(Debug, Clone)]
pub(crate) struct PerDiemModel {
    bands: Vec<DurationBand>,
}

impl PerDiemModel {
    pub(crate) fn new(schedule: &PerDiemSchedule) -> Result<Self, BandError> {
        let bands = &schedule.bands;
        let first = bands.first().ok_or(BandError::Empty)?;
        if first.min_days != 1 {
            return Err(BandError::FirstBandStart(first.min_days));
        }

        let last_index = bands.len() - 1;
        let mut next_day = 1;
        for (index, band) in bands.iter().enumerate() {
            for value in [band.daily_rate, band.flat_bonus] {
                if !value.is_finite() || value < 0.0 {
                    return Err(BandError::InvalidAmount { index, value });
                }
            }
            if band.min_days != next_day {
                return Err(BandError::Gap {
                    index,
                    expected: next_day,
                    found: band.min_days,
                });
            }

            match band.max_days {
                Some(max) if index == last_index => return Err(BandError::BoundedFinalBand(max)),
                Some(max) if max < band.min_days => {
                    return Err(BandError::Inverted {
                        index,
                        min: band.min_days,
                        max,
                    })
                }
                Some(max) => next_day = max + 1,
                None if index != last_index => {
                    return Err(BandError::UnboundedBeforeEnd { index })
                }
                None => {}
            }
        }

        Ok(Self {
            bands: bands.clone(),
        })
    }

    pub(crate) fn contribution(&self, duration_days: u32) -> f64 {
        self.bands
            .iter()
            .find(|band| band.contains(duration_days))
            .map_or(0.0, |band| {
                band.daily_rate * f64::from(duration_days) + band.flat_bonus
            })
    }
}
