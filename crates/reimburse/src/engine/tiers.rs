use crate::schedule::{RateTier, TierError};

/// Contiguous bracket table covering `[0, inf)`. Only constructible through validation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TierTable {
    tiers: Vec<RateTier>,
}

impl TierTable {
    pub(crate) fn new(tiers: &[RateTier]) -> Result<Self, TierError> {
        let first = tiers.first().ok_or(TierError::Empty)?;
        if first.lower_bound != 0.0 {
            return Err(TierError::NonZeroStart(first.lower_bound));
        }

        let last_index = tiers.len() - 1;
        let mut expected_lower = 0.0;
        for (index, tier) in tiers.iter().enumerate() {
            if !tier.lower_bound.is_finite() {
                return Err(TierError::NonFiniteBound { index });
            }
            if !tier.rate.is_finite() || tier.rate < 0.0 {
                return Err(TierError::InvalidRate {
                    index,
                    rate: tier.rate,
                });
            }
            if tier.lower_bound != expected_lower {
                return Err(TierError::Gap {
                    index,
                    expected: expected_lower,
                    found: tier.lower_bound,
                });
            }

            match tier.upper_bound {
                Some(upper) if index == last_index => {
                    return Err(TierError::BoundedFinalTier(upper));
                }
                Some(upper) => {
                    if !upper.is_finite() {
                        return Err(TierError::NonFiniteBound { index });
                    }
                    if upper <= tier.lower_bound {
                        return Err(TierError::EmptySpan {
                            index,
                            lower: tier.lower_bound,
                            upper,
                        });
                    }
                    expected_lower = upper;
                }
                None if index != last_index => {
                    return Err(TierError::UnboundedBeforeEnd { index });
                }
                None => {}
            }
        }

        Ok(Self {
            tiers: tiers.to_vec(),
        })
    }

    /// Validates as [`TierTable::new`] and additionally requires strictly falling, positive rates.
    pub(crate) fn diminishing(tiers: &[RateTier]) -> Result<Self, TierError> {
        let table = Self::new(tiers)?;
        for (index, pair) in table.tiers.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.rate >= previous.rate {
                return Err(TierError::NotDecreasing {
                    index: index + 1,
                    previous: previous.rate,
                    rate: current.rate,
                });
            }
        }
        if let Some(last) = table.tiers.last() {
            if last.rate <= 0.0 {
                return Err(TierError::InvalidRate {
                    index: table.tiers.len() - 1,
                    rate: last.rate,
                });
            }
        }
        Ok(table)
    }

    /// Tax-bracket accumulation: each tier pays its rate only on the span it covers.
    pub(crate) fn accumulate(&self, quantity: f64) -> f64 {
        if quantity <= 0.0 {
            return 0.0;
        }

        let mut total = 0.0;
        for tier in &self.tiers {
            if quantity <= tier.lower_bound {
                break;
            }
            let ceiling = tier
                .upper_bound
                .map_or(quantity, |upper| upper.min(quantity));
            total += (ceiling - tier.lower_bound) * tier.rate;
        }
        total
    }

    #[cfg(test)]
    pub(crate) fn boundaries(&self) -> impl Iterator<Item = f64> + '_ {
        self.tiers.iter().filter_map(|tier| tier.upper_bound)
    }
}
