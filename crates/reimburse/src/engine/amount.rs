use serde::{Serialize, Serializer};
use std::fmt;

/// Currency amount held as whole cents so repeated runs never drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    cents: i64,
}

impl Amount {
    pub const ZERO: Amount = Amount { cents: 0 };

    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Rounds a dollar figure to the nearest cent, halves going up (away from zero).
    ///
    /// Binary noise below a millionth of a cent is discarded first, so a figure
    /// such as `337.475` (stored as `337.47499999999997`) still rounds to `337.48`.
    pub fn round_half_up(dollars: f64) -> Self {
        let scaled = dollars * 100.0;
        let cleaned = (scaled * 1e6).round() / 1e6;
        let cents = if cleaned >= 0.0 {
            (cleaned + 0.5).floor()
        } else {
            (cleaned - 0.5).ceil()
        };

        Self {
            cents: cents as i64,
        }
    }

    pub fn cents(self) -> i64 {
        self.cents
    }

    pub fn as_f64(self) -> f64 {
        self.cents as f64 / 100.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let magnitude = self.cents.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, magnitude / 100, magnitude % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_f64())
    }
}
