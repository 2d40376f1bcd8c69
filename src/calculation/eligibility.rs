//! Overtime eligibility evaluation.
//!
//! An employee may claim overtime for a date when the claim falls inside
//! the submission window and an active eligibility rule covers their
//! salary, employment type, department and roles.

use std::cmp::Reverse;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::warn;

use crate::config::OtSettings;
use crate::models::{AuditStep, EligibilityRule, Employee};

/// The outcome of an eligibility check.
///
/// Ineligibility is data, not an error: callers decide whether to refuse.
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityResult {
    /// Whether the employee may submit the claim.
    pub is_eligible: bool,
    /// Human-readable explanation.
    pub reason: String,
    /// Id of the rule that admitted the claim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule_id: Option<String>,
    /// Name of the rule that admitted the claim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule_name: Option<String>,
    /// The audit step recording this check.
    #[serde(skip)]
    pub audit_step: AuditStep,
}

/// Checks whether `employee` may claim overtime worked on `claim_date`.
///
/// Checks run in this order:
/// 1. A claim dated after `today` is ineligible.
/// 2. A claim dated before `today - submission_limit_days` is ineligible.
/// 3. An employee without a basic salary is ineligible.
/// 4. The active rules covering the salary and profile are collected. If
///    none match the claim is ineligible. If several match, the most
///    specific rule wins, then the most recently created, then the
///    smallest id.
///
/// Inactive rules in `rules` are ignored.
///
/// # Example
///
/// ```
/// use otms_engine::calculation::check_eligibility;
/// use otms_engine::config::OtSettings;
/// use otms_engine::models::{EligibilityRule, Employee};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let rule = EligibilityRule {
///     id: "rule_general".to_string(),
///     name: "General staff".to_string(),
///     min_salary: Decimal::ZERO,
///     max_salary: Decimal::new(4000, 0),
///     employment_types: vec![],
///     department_ids: vec![],
///     role_ids: vec![],
///     is_active: true,
///     created_at: None,
/// };
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     full_name: "Aisyah Rahman".to_string(),
///     employment_type: "permanent".to_string(),
///     department_id: None,
///     roles: vec![],
///     basic_salary: Some(Decimal::new(2600, 0)),
///     employee_category: "standard".to_string(),
///     supervisor_id: None,
/// };
/// let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
///
/// let result = check_eligibility(&employee, today, today, &OtSettings::default(), &[rule], 1);
/// assert!(result.is_eligible);
/// assert_eq!(result.matched_rule_id.as_deref(), Some("rule_general"));
/// ```
pub fn check_eligibility(
    employee: &Employee,
    claim_date: NaiveDate,
    today: NaiveDate,
    settings: &OtSettings,
    rules: &[EligibilityRule],
    step_number: u32,
) -> EligibilityResult {
    let input = serde_json::json!({
        "employee_id": employee.id,
        "basic_salary": employee.basic_salary.map(|s| s.normalize().to_string()),
        "employment_type": employee.employment_type,
        "department_id": employee.department_id,
        "claim_date": claim_date.to_string(),
        "today": today.to_string(),
        "submission_limit_days": settings.submission_limit_days,
    });

    let ineligible = |reason: String| EligibilityResult {
        is_eligible: false,
        reason: reason.clone(),
        matched_rule_id: None,
        matched_rule_name: None,
        audit_step: AuditStep {
            step_number,
            rule_id: "eligibility".to_string(),
            rule_name: "Overtime Eligibility".to_string(),
            source: None,
            input: input.clone(),
            output: serde_json::json!({ "is_eligible": false, "reason": reason }),
            reasoning: reason,
        },
    };

    if claim_date > today {
        return ineligible(format!(
            "claim date is in the future: {} is after {}",
            claim_date, today
        ));
    }

    // a window reaching past the earliest representable date covers all history
    let window_start =
        today.checked_sub_signed(Duration::days(i64::from(settings.submission_limit_days)));
    if let Some(window_start) = window_start.filter(|start| claim_date < *start) {
        return ineligible(format!(
            "submission window closed: claims must be submitted within {} days of the overtime date (earliest allowed {})",
            settings.submission_limit_days, window_start
        ));
    }

    let Some(salary) = employee.basic_salary else {
        return ineligible("basic salary is not on record".to_string());
    };

    let mut candidates: Vec<&EligibilityRule> = rules
        .iter()
        .filter(|r| r.is_active && r.covers_salary(salary) && r.matches_profile(employee))
        .collect();

    if candidates.is_empty() {
        return if salary > settings.salary_threshold {
            ineligible(format!(
                "salary exceeds threshold: basic salary {} is above {} and no eligibility rule covers it",
                salary.normalize(),
                settings.salary_threshold.normalize()
            ))
        } else {
            ineligible(format!(
                "no matching rule: no active eligibility rule covers salary {} for a {} employee",
                salary.normalize(),
                employee.employment_type
            ))
        };
    }

    candidates.sort_by_key(|r| (Reverse(r.specificity()), Reverse(r.created_at), r.id.clone()));
    let rule = candidates[0];

    if candidates.len() > 1 {
        warn!(
            employee_id = %employee.id,
            winner = %rule.id,
            candidates = ?candidates.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            "Several eligibility rules match; using the most specific"
        );
    }

    let reason = format!(
        "Eligible under '{}' (salary {} within {} to {})",
        rule.name,
        salary.normalize(),
        rule.min_salary.normalize(),
        rule.max_salary.normalize()
    );

    EligibilityResult {
        is_eligible: true,
        reason: reason.clone(),
        matched_rule_id: Some(rule.id.clone()),
        matched_rule_name: Some(rule.name.clone()),
        audit_step: AuditStep {
            step_number,
            rule_id: "eligibility".to_string(),
            rule_name: "Overtime Eligibility".to_string(),
            source: Some(rule.id.clone()),
            input,
            output: serde_json::json!({
                "is_eligible": true,
                "matched_rule_id": rule.id,
                "candidates": candidates.len(),
            }),
            reasoning: reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 1, 10)
    }

    fn rule(id: &str, min: &str, max: &str) -> EligibilityRule {
        EligibilityRule {
            id: id.to_string(),
            name: format!("Rule {}", id),
            min_salary: dec(min),
            max_salary: dec(max),
            employment_types: vec![],
            department_ids: vec![],
            role_ids: vec![],
            is_active: true,
            created_at: None,
        }
    }

    fn create_test_employee(salary: Option<&str>) -> Employee {
        Employee {
            id: "emp_001".to_string(),
            full_name: "Aisyah Rahman".to_string(),
            employment_type: "permanent".to_string(),
            department_id: Some("dept_ops".to_string()),
            roles: vec!["employee".to_string()],
            basic_salary: salary.map(dec),
            employee_category: "standard".to_string(),
            supervisor_id: None,
        }
    }

    fn check(employee: &Employee, claim_date: NaiveDate, rules: &[EligibilityRule]) -> EligibilityResult {
        check_eligibility(employee, claim_date, today(), &OtSettings::default(), rules, 1)
    }

    #[test]
    fn test_salary_inside_band_is_eligible() {
        let result = check(&create_test_employee(Some("2600")), today(), &[rule("r1", "0", "4000")]);
        assert!(result.is_eligible);
        assert_eq!(result.matched_rule_id.as_deref(), Some("r1"));
        assert_eq!(result.audit_step.source.as_deref(), Some("r1"));
    }

    #[test]
    fn test_band_bounds_are_inclusive() {
        let rules = [rule("r1", "1000", "4000")];
        assert!(check(&create_test_employee(Some("4000")), today(), &rules).is_eligible);
        assert!(check(&create_test_employee(Some("1000")), today(), &rules).is_eligible);
        assert!(!check(&create_test_employee(Some("999.99")), today(), &rules).is_eligible);
    }

    #[test]
    fn test_salary_above_threshold_reason() {
        let result = check(&create_test_employee(Some("4000.01")), today(), &[rule("r1", "0", "4000")]);
        assert!(!result.is_eligible);
        assert!(result.reason.starts_with("salary exceeds threshold"));
    }

    #[test]
    fn test_no_matching_rule_reason() {
        let mut r = rule("r1", "0", "4000");
        r.employment_types = vec!["contract".to_string()];
        let result = check(&create_test_employee(Some("2600")), today(), &[r]);
        assert!(!result.is_eligible);
        assert!(result.reason.starts_with("no matching rule"));
    }

    #[test]
    fn test_inactive_rules_ignored() {
        let mut r = rule("r1", "0", "4000");
        r.is_active = false;
        assert!(!check(&create_test_employee(Some("2600")), today(), &[r]).is_eligible);
    }

    #[test]
    fn test_submission_window_closed() {
        // limit 3 days, today 2025-01-10, claim 2025-01-05
        let result = check(&create_test_employee(Some("2600")), date(2025, 1, 5), &[rule("r1", "0", "4000")]);
        assert!(!result.is_eligible);
        assert!(result.reason.starts_with("submission window closed"));
    }

    #[test]
    fn test_submission_window_boundary_is_open() {
        let result = check(&create_test_employee(Some("2600")), date(2025, 1, 7), &[rule("r1", "0", "4000")]);
        assert!(result.is_eligible);
    }

    #[test]
    fn test_huge_submission_window_covers_all_history() {
        let settings = OtSettings {
            submission_limit_days: u32::MAX,
            ..OtSettings::default()
        };
        let result = check_eligibility(
            &create_test_employee(Some("2600")),
            date(1990, 1, 1),
            today(),
            &settings,
            &[rule("r1", "0", "4000")],
            1,
        );
        assert!(result.is_eligible);
    }

    #[test]
    fn test_future_claim_rejected() {
        let result = check(&create_test_employee(Some("2600")), date(2025, 1, 11), &[rule("r1", "0", "4000")]);
        assert!(!result.is_eligible);
        assert!(result.reason.contains("future"));
    }

    #[test]
    fn test_window_checked_before_rules() {
        let result = check(&create_test_employee(Some("9999")), date(2024, 12, 1), &[]);
        assert!(result.reason.starts_with("submission window closed"));
    }

    #[test]
    fn test_missing_salary_is_ineligible() {
        let result = check(&create_test_employee(None), today(), &[rule("r1", "0", "4000")]);
        assert!(!result.is_eligible);
        assert!(result.reason.contains("basic salary"));
    }

    #[test]
    fn test_most_specific_rule_wins() {
        let general = rule("a_general", "0", "4000");
        let mut ops = rule("z_ops", "0", "4000");
        ops.department_ids = vec!["dept_ops".to_string()];
        let result = check(&create_test_employee(Some("2600")), today(), &[general, ops]);
        assert_eq!(result.matched_rule_id.as_deref(), Some("z_ops"));
    }

    #[test]
    fn test_latest_created_wins_on_equal_specificity() {
        let ts = |s: &str| Some(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc));
        let mut old = rule("a_old", "0", "4000");
        old.created_at = ts("2024-01-01T00:00:00Z");
        let mut new = rule("b_new", "0", "4000");
        new.created_at = ts("2024-06-01T00:00:00Z");
        let result = check(&create_test_employee(Some("2600")), today(), &[old, new]);
        assert_eq!(result.matched_rule_id.as_deref(), Some("b_new"));
    }

    #[test]
    fn test_smallest_id_breaks_remaining_ties() {
        let result = check(
            &create_test_employee(Some("2600")),
            today(),
            &[rule("r2", "0", "4000"), rule("r1", "0", "4000")],
        );
        assert_eq!(result.matched_rule_id.as_deref(), Some("r1"));
    }
}
