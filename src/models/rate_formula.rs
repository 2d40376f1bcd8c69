//! Rate formula model.
//!
//! A [`RateFormula`] is an effective-dated, day-type-scoped multiplier and
//! expression used to convert overtime hours into money. Formulas are
//! versioned by closing `effective_to` rather than edited in place.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{DayType, FormulaExpr};
use crate::error::{EngineError, EngineResult};

use super::employee::STANDARD_CATEGORY;

fn default_category() -> String {
    STANDARD_CATEGORY.to_string()
}

fn default_true() -> bool {
    true
}

/// An effective-dated overtime pay formula.
///
/// # Example
///
/// ```
/// use otms_engine::calculation::DayType;
/// use otms_engine::models::RateFormula;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let formula = RateFormula {
///     id: "f_weekday".to_string(),
///     name: "Weekday OT".to_string(),
///     day_type: DayType::Weekday,
///     employee_category: "standard".to_string(),
///     multiplier: Decimal::new(15, 1),
///     base_formula: "multiplier x HRP x TOH".to_string(),
///     effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     effective_to: None,
///     is_active: true,
///     created_at: None,
/// };
///
/// assert!(formula.is_effective_on(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
/// assert!(!formula.is_effective_on(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateFormula {
    /// Unique identifier for the formula.
    pub id: String,
    /// Human-readable formula name.
    pub name: String,
    /// The day type this formula prices.
    pub day_type: DayType,
    /// Employee category this formula applies to.
    #[serde(default = "default_category")]
    pub employee_category: String,
    /// Multiplier bound to `multiplier` in the expression; must be positive.
    pub multiplier: Decimal,
    /// Expression over ORP, HRP, TOH and multiplier.
    #[serde(default)]
    pub base_formula: String,
    /// First date the formula applies to (inclusive).
    pub effective_from: NaiveDate,
    /// Date the formula stops applying (exclusive); `None` is open-ended.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// Whether the formula is currently in force.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// When the formula was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RateFormula {
    /// Returns true if `date` falls within `[effective_from, effective_to)`.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        date >= self.effective_from && self.effective_to.is_none_or(|to| date < to)
    }

    /// Parses the base formula into an evaluable expression.
    pub fn expression(&self) -> EngineResult<FormulaExpr> {
        FormulaExpr::parse(&self.base_formula).map_err(|e| match e {
            EngineError::InvalidFormula { message, .. } => EngineError::InvalidFormula {
                formula: self.name.clone(),
                message,
            },
            other => other,
        })
    }

    /// Checks the positive multiplier, date range and expression invariants.
    pub fn validate(&self) -> EngineResult<()> {
        if self.multiplier <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig {
                item: self.id.clone(),
                message: format!("multiplier must be positive, got {}", self.multiplier),
            });
        }
        if let Some(to) = self.effective_to {
            if to <= self.effective_from {
                return Err(EngineError::InvalidConfig {
                    item: self.id.clone(),
                    message: format!(
                        "effective_to {} must be after effective_from {}",
                        to, self.effective_from
                    ),
                });
            }
        }
        self.expression().map_err(|e| EngineError::InvalidConfig {
            item: self.id.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}
