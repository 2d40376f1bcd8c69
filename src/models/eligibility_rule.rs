//! Eligibility rule model.
//!
//! An [`EligibilityRule`] is a salary band, optionally narrowed by
//! employment type, department and role, inside which employees may
//! submit overtime claims.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::Employee;

fn default_true() -> bool {
    true
}

/// A salary/employment-type/department-scoped eligibility policy.
///
/// Empty constraint sets match any employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityRule {
    /// Unique identifier for the rule.
    pub id: String,
    /// Human-readable rule name.
    pub name: String,
    /// Lowest basic salary covered (inclusive).
    pub min_salary: Decimal,
    /// Highest basic salary covered (inclusive).
    pub max_salary: Decimal,
    /// Employment types covered; empty means any.
    #[serde(default)]
    pub employment_types: Vec<String>,
    /// Department ids covered; empty means any.
    #[serde(default)]
    pub department_ids: Vec<String>,
    /// Role names covered; empty means any.
    #[serde(default)]
    pub role_ids: Vec<String>,
    /// Whether the rule is currently in force.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// When the rule was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl EligibilityRule {
    /// Checks the `min_salary <= max_salary` invariant.
    pub fn validate(&self) -> EngineResult<()> {
        if self.min_salary > self.max_salary {
            return Err(EngineError::InvalidConfig {
                item: self.id.clone(),
                message: format!(
                    "min_salary {} exceeds max_salary {}",
                    self.min_salary, self.max_salary
                ),
            });
        }
        if self.min_salary < Decimal::ZERO {
            return Err(EngineError::InvalidConfig {
                item: self.id.clone(),
                message: "min_salary cannot be negative".to_string(),
            });
        }
        Ok(())
    }

    /// Returns true if the salary lies inside the band, bounds inclusive.
    pub fn covers_salary(&self, salary: Decimal) -> bool {
        salary >= self.min_salary && salary <= self.max_salary
    }

    /// Returns true if the employee satisfies every non-empty constraint set.
    pub fn matches_profile(&self, employee: &Employee) -> bool {
        let type_ok = self.employment_types.is_empty()
            || self.employment_types.contains(&employee.employment_type);
        let dept_ok = self.department_ids.is_empty()
            || employee
                .department_id
                .as_ref()
                .is_some_and(|d| self.department_ids.contains(d));
        let role_ok = self.role_ids.is_empty() || employee.has_any_role(&self.role_ids);
        type_ok && dept_ok && role_ok
    }

    /// Number of non-empty constraint sets.
    pub fn specificity(&self) -> usize {
        [
            !self.employment_types.is_empty(),
            !self.department_ids.is_empty(),
            !self.role_ids.is_empty(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}
