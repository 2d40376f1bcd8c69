//! Approval threshold model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::Employee;

fn default_true() -> bool {
    true
}

/// Configurable daily/weekly/monthly hour limits and an amount cap.
///
/// A limit of zero disables that check. Empty scoping lists make the
/// threshold global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalThreshold {
    /// Unique identifier for the threshold.
    pub id: String,
    /// Human-readable threshold name.
    pub name: String,
    /// Maximum claimed hours per calendar day.
    #[serde(default)]
    pub daily_limit_hours: Decimal,
    /// Maximum claimed hours per ISO week.
    #[serde(default)]
    pub weekly_limit_hours: Decimal,
    /// Maximum claimed hours per calendar month.
    #[serde(default)]
    pub monthly_limit_hours: Decimal,
    /// Maximum amount for a single claim.
    #[serde(default)]
    pub max_claimable_amount: Decimal,
    /// Refuse submissions that violate this threshold.
    #[serde(default)]
    pub auto_block_enabled: bool,
    /// Whether the threshold is currently in force.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Departments this threshold is limited to; empty means all.
    #[serde(default)]
    pub department_ids: Vec<String>,
    /// Roles this threshold is limited to; empty means all.
    #[serde(default)]
    pub role_ids: Vec<String>,
}

impl ApprovalThreshold {
    /// Rejects negative limits.
    pub fn validate(&self) -> EngineResult<()> {
        let limits = [
            ("daily_limit_hours", self.daily_limit_hours),
            ("weekly_limit_hours", self.weekly_limit_hours),
            ("monthly_limit_hours", self.monthly_limit_hours),
            ("max_claimable_amount", self.max_claimable_amount),
        ];
        for (field, value) in limits {
            if value < Decimal::ZERO {
                return Err(EngineError::InvalidConfig {
                    item: self.id.clone(),
                    message: format!("{} cannot be negative", field),
                });
            }
        }
        Ok(())
    }

    /// Returns true if the threshold's scoping covers the employee.
    pub fn applies_to(&self, employee: &Employee) -> bool {
        let dept_ok = self.department_ids.is_empty()
            || employee
                .department_id
                .as_ref()
                .is_some_and(|d| self.department_ids.contains(d));
        let role_ok = self.role_ids.is_empty() || employee.has_any_role(&self.role_ids);
        dept_ok && role_ok
    }
}
