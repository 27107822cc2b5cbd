use serde::Serialize;

use super::domain::TripInput;
use crate::schedule::{AdjustmentGroup, Conditions, Effect, ScheduleError, Window};

/// Record of one rule that fired during the adjustment pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedAdjustment {
    pub group: String,
    pub rule: String,
    pub effect: Effect,
    pub before: f64,
    pub after: f64,
}

/// Cross-dimension corrections applied to the summed sub-model contributions.
#[derive(Debug, Clone)]
pub(crate) struct AdjustmentStage {
    groups: Vec<AdjustmentGroup>,
}

impl AdjustmentStage {
    pub(crate) fn new(groups: &[AdjustmentGroup]) -> Result<Self, ScheduleError> {
        for group in groups {
            if group.rules.is_empty() {
                return Err(ScheduleError::EmptyGroup {
                    group: group.name.clone(),
                });
            }
            for rule in &group.rules {
                let invalid = |reason: &str| ScheduleError::Adjustment {
                    group: group.name.clone(),
                    rule: rule.name.clone(),
                    reason: reason.to_string(),
                };

                let windows = [
                    rule.when.duration_days,
                    rule.when.miles_per_day,
                    rule.when.spending_per_day,
                ];
                if !windows.iter().flatten().all(Window::is_finite) {
                    return Err(invalid("window bounds must be finite"));
                }
                if let Some(cents) = &rule.when.receipt_cents {
                    if cents.iter().any(|cent| *cent > 99) {
                        return Err(invalid("receipt cents must be between 0 and 99"));
                    }
                }
                match rule.effect {
                    Effect::Multiply(factor) if !factor.is_finite() || factor < 0.0 => {
                        return Err(invalid("multiplier must be a finite, non-negative factor"));
                    }
                    Effect::Add(amount) if !amount.is_finite() => {
                        return Err(invalid("addend must be finite"));
                    }
                    _ => {}
                }
            }
        }

        Ok(Self {
            groups: groups.to_vec(),
        })
    }

    /// Runs every group in order over `subtotal`; within a group only the first match fires.
    pub(crate) fn apply(&self, trip: &TripInput, subtotal: f64) -> (f64, Vec<AppliedAdjustment>) {
        let mut running = subtotal;
        let mut applied = Vec::new();

        for group in &self.groups {
            if let Some(rule) = group.rules.iter().find(|rule| matches(&rule.when, trip)) {
                let before = running;
                running = rule.effect.apply(running);
                applied.push(AppliedAdjustment {
                    group: group.name.clone(),
                    rule: rule.name.clone(),
                    effect: rule.effect,
                    before,
                    after: running,
                });
            }
        }

        (running, applied)
    }
}

fn matches(conditions: &Conditions, trip: &TripInput) -> bool {
    let within = |window: &Option<Window>, value: f64| {
        window.as_ref().map_or(true, |window| window.contains(value))
    };

    within(&conditions.duration_days, f64::from(trip.duration_days()))
        && within(&conditions.miles_per_day, trip.miles_per_day())
        && within(&conditions.spending_per_day, trip.spending_per_day())
        && conditions
            .receipt_cents
            .as_ref()
            .map_or(true, |cents| cents.contains(&trip.receipt_cents()))
}
