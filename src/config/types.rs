//! Configuration types for the overtime engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::RoundingRule;
use crate::error::{EngineError, EngineResult};
use crate::models::{ApprovalThreshold, EligibilityRule, Employee, HolidayCalendar, RateFormula};

/// Organisation-wide overtime settings.
///
/// There is exactly one settings record. Missing fields take the defaults
/// below.
///
/// # Example
///
/// ```
/// use otms_engine::config::OtSettings;
/// use rust_decimal::Decimal;
///
/// let settings = OtSettings::default();
/// assert_eq!(settings.submission_limit_days, 3);
/// assert_eq!(settings.working_days_per_month, Decimal::new(26, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtSettings {
    /// Days after the overtime date within which a claim may be submitted.
    pub submission_limit_days: u32,
    /// Salary above which no eligibility rule is expected to apply.
    pub salary_threshold: Decimal,
    /// Maximum hours a single claim may cover.
    pub max_daily_hours: Decimal,
    /// How claimed hours are rounded.
    pub rounding_rule: RoundingRule,
    /// Divisor from monthly basic salary to ORP.
    pub working_days_per_month: Decimal,
    /// Divisor from ORP to HRP.
    pub hours_per_day: Decimal,
    /// Whether approved claims still need board review.
    pub board_review_required: bool,
}

impl Default for OtSettings {
    fn default() -> Self {
        Self {
            submission_limit_days: 3,
            salary_threshold: Decimal::new(4000, 0),
            max_daily_hours: Decimal::new(12, 0),
            rounding_rule: RoundingRule::NearestHalf,
            working_days_per_month: Decimal::new(26, 0),
            hours_per_day: Decimal::new(8, 0),
            board_review_required: true,
        }
    }
}

/// Longest submission window, in days, that settings may configure.
pub const MAX_SUBMISSION_LIMIT_DAYS: u32 = 3650;

impl OtSettings {
    /// Checks that the pay divisors and limits are usable.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: &str| EngineError::InvalidConfig {
            item: "settings".to_string(),
            message: message.to_string(),
        };

        if self.submission_limit_days > MAX_SUBMISSION_LIMIT_DAYS {
            return Err(invalid(&format!(
                "submission_limit_days cannot exceed {}",
                MAX_SUBMISSION_LIMIT_DAYS
            )));
        }
        if self.working_days_per_month <= Decimal::ZERO {
            return Err(invalid("working_days_per_month must be positive"));
        }
        if self.hours_per_day <= Decimal::ZERO || self.hours_per_day > Decimal::from(24) {
            return Err(invalid("hours_per_day must be between 0 and 24"));
        }
        if self.max_daily_hours <= Decimal::ZERO || self.max_daily_hours > Decimal::from(24) {
            return Err(invalid("max_daily_hours must be between 0 and 24"));
        }
        if self.salary_threshold < Decimal::ZERO {
            return Err(invalid("salary_threshold cannot be negative"));
        }
        Ok(())
    }
}

/// eligibility_rules.yaml file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct EligibilityRulesFile {
    /// The configured rules.
    pub rules: Vec<EligibilityRule>,
}

/// rate_formulas.yaml file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct RateFormulasFile {
    /// The configured formulas.
    pub formulas: Vec<RateFormula>,
}

/// approval_thresholds.yaml file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalThresholdsFile {
    /// The configured thresholds.
    #[serde(default)]
    pub thresholds: Vec<ApprovalThreshold>,
}

/// employees.yaml file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeesFile {
    /// The employee directory.
    pub employees: Vec<Employee>,
}

/// The complete overtime configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct OtmsConfig {
    settings: OtSettings,
    eligibility_rules: Vec<EligibilityRule>,
    rate_formulas: Vec<RateFormula>,
    thresholds: Vec<ApprovalThreshold>,
    employees: HashMap<String, Employee>,
    holidays: HolidayCalendar,
}

impl OtmsConfig {
    /// Creates a new configuration and checks every record's invariants.
    ///
    /// Duplicate ids within a collection are rejected.
    pub fn new(
        settings: OtSettings,
        eligibility_rules: Vec<EligibilityRule>,
        rate_formulas: Vec<RateFormula>,
        thresholds: Vec<ApprovalThreshold>,
        employees: Vec<Employee>,
        holidays: HolidayCalendar,
    ) -> EngineResult<Self> {
        settings.validate()?;
        for rule in &eligibility_rules {
            rule.validate()?;
        }
        for formula in &rate_formulas {
            formula.validate()?;
        }
        for threshold in &thresholds {
            threshold.validate()?;
        }

        check_unique("eligibility rule", eligibility_rules.iter().map(|r| r.id.as_str()))?;
        check_unique("rate formula", rate_formulas.iter().map(|f| f.id.as_str()))?;
        check_unique("approval threshold", thresholds.iter().map(|t| t.id.as_str()))?;
        check_unique("employee", employees.iter().map(|e| e.id.as_str()))?;

        let employees = employees.into_iter().map(|e| (e.id.clone(), e)).collect();

        Ok(Self {
            settings,
            eligibility_rules,
            rate_formulas,
            thresholds,
            employees,
            holidays,
        })
    }

    /// Returns the settings record.
    pub fn settings(&self) -> &OtSettings {
        &self.settings
    }

    /// Returns all eligibility rules, active or not.
    pub fn eligibility_rules(&self) -> &[EligibilityRule] {
        &self.eligibility_rules
    }

    /// Returns all rate formulas, active or not.
    pub fn rate_formulas(&self) -> &[RateFormula] {
        &self.rate_formulas
    }

    /// Returns all approval thresholds, active or not.
    pub fn thresholds(&self) -> &[ApprovalThreshold] {
        &self.thresholds
    }

    /// Returns the employee directory.
    pub fn employees(&self) -> &HashMap<String, Employee> {
        &self.employees
    }

    /// Returns the holiday calendar.
    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }
}

fn check_unique<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> EngineResult<()> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(EngineError::InvalidConfig {
                item: id.to_string(),
                message: format!("duplicate {} id", kind),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: OtSettings = serde_yaml::from_str("submission_limit_days: 7").unwrap();
        assert_eq!(settings.submission_limit_days, 7);
        assert_eq!(settings.salary_threshold, Decimal::new(4000, 0));
        assert_eq!(settings.rounding_rule, RoundingRule::NearestHalf);
        assert!(settings.board_review_required);
    }

    #[test]
    fn test_settings_rejects_zero_divisor() {
        let settings = OtSettings {
            working_days_per_month: Decimal::ZERO,
            ..OtSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_settings_rejects_submission_window_over_ten_years() {
        let settings = OtSettings {
            submission_limit_days: 200_000_000,
            ..OtSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(EngineError::InvalidConfig { .. })
        ));

        let settings = OtSettings {
            submission_limit_days: MAX_SUBMISSION_LIMIT_DAYS,
            ..OtSettings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_rejects_max_daily_hours_over_a_day() {
        let settings = OtSettings {
            max_daily_hours: Decimal::from(25),
            ..OtSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_config_rejects_duplicate_ids() {
        let employee = Employee {
            id: "emp_001".to_string(),
            full_name: "A".to_string(),
            employment_type: "permanent".to_string(),
            department_id: None,
            roles: vec![],
            basic_salary: None,
            employee_category: "standard".to_string(),
            supervisor_id: None,
        };
        let result = OtmsConfig::new(
            OtSettings::default(),
            vec![],
            vec![],
            vec![],
            vec![employee.clone(), employee],
            HolidayCalendar::default(),
        );
        match result {
            Err(EngineError::InvalidConfig { item, message }) => {
                assert_eq!(item, "emp_001");
                assert!(message.contains("duplicate employee"));
            }
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }
}
