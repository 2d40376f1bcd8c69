//! Threshold violation checking.
//!
//! Compares an employee's already-claimed hours for the day, ISO week and
//! calendar month of a new claim, plus the new claim's hours, against every
//! active approval threshold that applies to the employee.

use chrono::{Datelike, Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{ApprovalThreshold, AuditStep, Employee, ThresholdViolation, ViolationType};

/// The day, ISO week and calendar month containing a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregationPeriods {
    /// The date itself.
    pub day: NaiveDate,
    /// Monday of the ISO week.
    pub week_start: NaiveDate,
    /// Sunday of the ISO week.
    pub week_end: NaiveDate,
    /// First day of the month.
    pub month_start: NaiveDate,
    /// Last day of the month.
    pub month_end: NaiveDate,
}

impl AggregationPeriods {
    /// Computes the periods containing `date`.
    ///
    /// # Example
    ///
    /// ```
    /// use otms_engine::calculation::AggregationPeriods;
    /// use chrono::NaiveDate;
    ///
    /// // 2025-01-01 is a Wednesday; its ISO week starts in 2024
    /// let periods = AggregationPeriods::containing(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    /// assert_eq!(periods.week_start, NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());
    /// assert_eq!(periods.week_end, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    /// assert_eq!(periods.month_end, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    /// ```
    pub fn containing(date: NaiveDate) -> Self {
        let back = |days: u32| {
            date.checked_sub_signed(Duration::days(i64::from(days)))
                .unwrap_or(NaiveDate::MIN)
        };
        let week_start = back(date.weekday().num_days_from_monday());
        let week_end = week_start
            .checked_add_signed(Duration::days(6))
            .unwrap_or(NaiveDate::MAX);
        let month_start = back(date.day0());
        let month_end = month_start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self {
            day: date,
            week_start,
            week_end,
            month_start,
            month_end,
        }
    }
}

/// Hours already claimed by an employee in each aggregation period.
///
/// Rejected claims are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedHours {
    /// Hours on the same day.
    pub daily: Decimal,
    /// Hours in the same ISO week.
    pub weekly: Decimal,
    /// Hours in the same calendar month.
    pub monthly: Decimal,
}

/// The result of a threshold check, including the audit step.
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdReport {
    /// Every violation found, advisory and blocking.
    pub violations: Vec<ThresholdViolation>,
    /// The audit step recording this check.
    #[serde(skip)]
    pub audit_step: AuditStep,
}

impl ThresholdReport {
    /// Returns the first violation from an auto-blocking threshold.
    pub fn first_blocking(&self) -> Option<&ThresholdViolation> {
        self.violations.iter().find(|v| v.blocking)
    }

    /// Returns a `ThresholdExceeded` error for the first blocking violation.
    pub fn blocking_error(&self) -> Option<EngineError> {
        self.first_blocking().map(|v| EngineError::ThresholdExceeded {
            threshold: v.threshold_name.clone(),
            message: v.describe(),
        })
    }
}

/// Checks a new claim against the active thresholds.
///
/// `requested_amount` is the claim's priced amount when known; the amount
/// cap is only checked when it is given. Thresholds that are inactive or
/// scoped away from the employee are skipped. A limit of zero is disabled.
///
/// # Example
///
/// ```
/// use otms_engine::calculation::{check_thresholds, ClaimedHours};
/// use otms_engine::models::{ApprovalThreshold, Employee};
/// use rust_decimal::Decimal;
///
/// let threshold = ApprovalThreshold {
///     id: "th_default".to_string(),
///     name: "Standard OT limits".to_string(),
///     daily_limit_hours: Decimal::ZERO,
///     weekly_limit_hours: Decimal::new(20, 0),
///     monthly_limit_hours: Decimal::ZERO,
///     max_claimable_amount: Decimal::ZERO,
///     auto_block_enabled: false,
///     is_active: true,
///     department_ids: vec![],
///     role_ids: vec![],
/// };
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     full_name: "Aisyah Rahman".to_string(),
///     employment_type: "permanent".to_string(),
///     department_id: None,
///     roles: vec![],
///     basic_salary: None,
///     employee_category: "standard".to_string(),
///     supervisor_id: None,
/// };
/// let claimed = ClaimedHours { weekly: Decimal::new(6, 0), ..ClaimedHours::default() };
///
/// let report = check_thresholds(&employee, Decimal::new(16, 0), None, &claimed, &[threshold], 1);
/// assert_eq!(report.violations.len(), 1);
/// assert_eq!(report.violations[0].total, Decimal::new(22, 0));
/// ```
pub fn check_thresholds(
    employee: &Employee,
    requested_hours: Decimal,
    requested_amount: Option<Decimal>,
    claimed: &ClaimedHours,
    thresholds: &[ApprovalThreshold],
    step_number: u32,
) -> ThresholdReport {
    let mut violations = Vec::new();
    let mut evaluated = Vec::new();

    for threshold in thresholds
        .iter()
        .filter(|t| t.is_active && t.applies_to(employee))
    {
        evaluated.push(threshold.id.as_str());
        let blocking = threshold.auto_block_enabled;

        let hour_limits = [
            (ViolationType::DailyLimit, threshold.daily_limit_hours, claimed.daily),
            (ViolationType::WeeklyLimit, threshold.weekly_limit_hours, claimed.weekly),
            (ViolationType::MonthlyLimit, threshold.monthly_limit_hours, claimed.monthly),
        ];
        for (violation_type, limit, current) in hour_limits {
            let total = current.saturating_add(requested_hours);
            if limit > Decimal::ZERO && total > limit {
                violations.push(ThresholdViolation {
                    threshold_id: threshold.id.clone(),
                    threshold_name: threshold.name.clone(),
                    violation_type,
                    current,
                    requested: requested_hours,
                    total,
                    limit,
                    blocking,
                });
            }
        }

        if let Some(amount) = requested_amount {
            let limit = threshold.max_claimable_amount;
            if limit > Decimal::ZERO && amount > limit {
                violations.push(ThresholdViolation {
                    threshold_id: threshold.id.clone(),
                    threshold_name: threshold.name.clone(),
                    violation_type: ViolationType::MaxAmount,
                    current: Decimal::ZERO,
                    requested: amount,
                    total: amount,
                    limit,
                    blocking,
                });
            }
        }
    }

    let reasoning = if violations.is_empty() {
        format!(
            "{}h is within every limit of {} applicable threshold(s)",
            requested_hours.normalize(),
            evaluated.len()
        )
    } else {
        violations
            .iter()
            .map(|v| format!("{} ({})", v.describe(), v.threshold_name))
            .collect::<Vec<_>>()
            .join("; ")
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "threshold_check".to_string(),
        rule_name: "Approval Threshold Check".to_string(),
        source: None,
        input: serde_json::json!({
            "employee_id": employee.id,
            "requested_hours": requested_hours.normalize().to_string(),
            "requested_amount": requested_amount.map(|a| a.to_string()),
            "claimed_daily": claimed.daily.normalize().to_string(),
            "claimed_weekly": claimed.weekly.normalize().to_string(),
            "claimed_monthly": claimed.monthly.normalize().to_string(),
        }),
        output: serde_json::json!({
            "thresholds_evaluated": evaluated,
            "violations": violations,
        }),
        reasoning,
    };

    ThresholdReport {
        violations,
        audit_step,
    }
}
