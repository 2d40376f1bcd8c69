//! Rounding policy for money and claimed hours.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rounds a monetary value to 2 decimal places, half-up.
///
/// The result always carries exactly two decimal places.
///
/// # Example
///
/// ```
/// use otms_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("107.025").unwrap()), Decimal::from_str("107.03").unwrap());
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Rounds an hour figure to 2 decimal places, half-up.
pub fn round_hours(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// How claimed hours are rounded before pricing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundingRule {
    /// Nearest half hour, half-up.
    #[default]
    #[serde(rename = "nearest_0.5")]
    NearestHalf,
    /// Nearest whole hour, half-up.
    #[serde(rename = "nearest_1")]
    NearestWhole,
    /// Keep the 2-dp figure.
    #[serde(rename = "exact")]
    Exact,
}

impl RoundingRule {
    /// Applies the rule to a 2-dp hour figure.
    ///
    /// # Example
    ///
    /// ```
    /// use otms_engine::calculation::RoundingRule;
    /// use rust_decimal::Decimal;
    /// use std::str::FromStr;
    ///
    /// let hours = Decimal::from_str("2.25").unwrap();
    /// assert_eq!(RoundingRule::NearestHalf.apply(hours), Decimal::from_str("2.5").unwrap());
    /// assert_eq!(RoundingRule::NearestWhole.apply(hours), Decimal::from_str("2").unwrap());
    /// assert_eq!(RoundingRule::Exact.apply(hours), hours);
    /// ```
    pub fn apply(self, hours: Decimal) -> Decimal {
        match self {
            RoundingRule::NearestHalf => {
                let halves = (hours * Decimal::TWO)
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
                round_hours(halves / Decimal::TWO)
            }
            RoundingRule::NearestWhole => round_hours(
                hours.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
            ),
            RoundingRule::Exact => round_hours(hours),
        }
    }

    /// Returns the configuration name of the rule.
    pub fn as_str(self) -> &'static str {
        match self {
            RoundingRule::NearestHalf => "nearest_0.5",
            RoundingRule::NearestWhole => "nearest_1",
            RoundingRule::Exact => "exact",
        }
    }
}

impl std::fmt::Display for RoundingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
