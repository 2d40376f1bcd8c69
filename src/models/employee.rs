//! Employee model.
//!
//! This module defines the [`Employee`] record the engine consults when
//! deciding eligibility, pricing a claim and scoping thresholds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The employee category used when no category is given.
pub const STANDARD_CATEGORY: &str = "standard";

fn default_category() -> String {
    STANDARD_CATEGORY.to_string()
}

/// Represents an employee who may submit overtime claims.
///
/// # Example
///
/// ```
/// use otms_engine::models::Employee;
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     full_name: "Aisyah Rahman".to_string(),
///     employment_type: "permanent".to_string(),
///     department_id: Some("dept_ops".to_string()),
///     roles: vec!["employee".to_string()],
///     basic_salary: Some(Decimal::new(2600, 0)),
///     employee_category: "standard".to_string(),
///     supervisor_id: None,
/// };
/// assert_eq!(employee.require_basic_salary().unwrap(), Decimal::new(2600, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The employee's display name.
    pub full_name: String,
    /// Employment arrangement (e.g. "permanent", "contract").
    pub employment_type: String,
    /// The department the employee belongs to.
    #[serde(default)]
    pub department_id: Option<String>,
    /// Application roles held by the employee.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Monthly basic salary.
    #[serde(default)]
    pub basic_salary: Option<Decimal>,
    /// Category used to pick category-specific rate formulas.
    #[serde(default = "default_category")]
    pub employee_category: String,
    /// The employee's direct supervisor.
    #[serde(default)]
    pub supervisor_id: Option<String>,
}

impl Employee {
    /// Returns the basic salary, or an error if it is missing or not positive.
    ///
    /// A claim can never be priced against a missing salary.
    pub fn require_basic_salary(&self) -> EngineResult<Decimal> {
        match self.basic_salary {
            Some(salary) if salary > Decimal::ZERO => Ok(salary),
            Some(salary) => Err(EngineError::InvalidEmployee {
                field: "basic_salary".to_string(),
                message: format!("must be positive, got {}", salary),
            }),
            None => Err(EngineError::InvalidEmployee {
                field: "basic_salary".to_string(),
                message: "basic salary is not set".to_string(),
            }),
        }
    }

    /// Returns true if the employee holds any of the given roles.
    pub fn has_any_role(&self, roles: &[String]) -> bool {
        self.roles.iter().any(|r| roles.contains(r))
    }
}
