//! Claim submission pipeline.
//!
//! `submit` runs hours → day type → eligibility → pricing → thresholds and
//! stores the priced claim in one write. `quote` runs the same pipeline
//! without writing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{
    AggregationPeriods, AmountInput, AmountResult, ClaimedHours, DayType, DurationResult,
    EligibilityResult, ThresholdReport, calculate_amount, calculate_duration, check_eligibility,
    check_thresholds, day_type_audit_step, parse_clock_time, resolve_day_type,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditTrace, OtRequest, OtStatus, STANDARD_CATEGORY};
use crate::store::OtStore;

use super::{Clock, EvaluationContext};

const MIN_REASON_CHARS: usize = 10;
const MAX_REASON_CHARS: usize = 500;
// a threshold check covers at most one day of hours
const MAX_REQUESTED_HOURS: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

/// A claim as entered by the employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitClaim {
    /// The date the overtime was worked.
    pub ot_date: NaiveDate,
    /// Clock time the overtime started, `HH:MM`.
    pub start_time: String,
    /// Clock time the overtime ended, `HH:MM`. Earlier than the start means overnight.
    pub end_time: String,
    /// Why the overtime was needed.
    pub reason: String,
    /// Link to supporting evidence.
    #[serde(default)]
    pub attachment_url: Option<String>,
}

/// The priced claim plus any advisory threshold warnings.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    /// The claim with its computed snapshot.
    pub request: OtRequest,
    /// Descriptions of non-blocking threshold violations.
    pub warnings: Vec<String>,
}

/// The day type of a date and the holiday behind it.
#[derive(Debug, Clone, Serialize)]
pub struct DayTypeResolution {
    /// The date resolved.
    pub date: NaiveDate,
    /// Its day type.
    pub day_type: DayType,
    /// The holiday name when the date is a public holiday.
    pub holiday_name: Option<String>,
    /// The audit step for the decision.
    #[serde(skip)]
    pub audit_step: AuditStep,
}

/// Runs the overtime engine against a store.
///
/// Submissions and transitions for the same employee are serialized, so
/// the threshold aggregate a claim is checked against cannot go stale
/// before the claim is written. This only holds within one process.
pub struct ClaimService {
    pub(super) store: Arc<dyn OtStore>,
    pub(super) clock: Clock,
    employee_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for ClaimService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimService")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl ClaimService {
    /// Creates a service over `store`.
    pub fn new(store: Arc<dyn OtStore>, clock: Clock) -> Self {
        Self {
            store,
            clock,
            employee_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn OtStore> {
        &self.store
    }

    /// The clock evaluations run against.
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Runs `f` while holding the lock for `employee_id`.
    pub(super) fn with_employee_lock<T>(
        &self,
        employee_id: &str,
        f: impl FnOnce() -> EngineResult<T>,
    ) -> EngineResult<T> {
        let lock = {
            let mut locks = self
                .employee_locks
                .lock()
                .map_err(|_| EngineError::StoreUnavailable {
                    message: "submission lock registry poisoned".to_string(),
                })?;
            Arc::clone(locks.entry(employee_id.to_string()).or_default())
        };
        let _guard = lock.lock().map_err(|_| EngineError::StoreUnavailable {
            message: format!("submission lock for {} poisoned", employee_id),
        })?;
        f()
    }

    /// Classifies `date` against the store's holiday calendar.
    pub fn resolve_day_type(&self, date: NaiveDate) -> EngineResult<DayTypeResolution> {
        let holiday = self.store.public_holiday(date)?;
        let day_type = resolve_day_type(date, holiday.as_ref());
        Ok(DayTypeResolution {
            date,
            day_type,
            audit_step: day_type_audit_step(date, holiday.as_ref(), day_type, 1),
            holiday_name: holiday.map(|h| h.name),
        })
    }

    /// Computes the hours between two clock times under the configured rounding rule.
    pub fn compute_hours(&self, start_time: &str, end_time: &str) -> EngineResult<DurationResult> {
        let start = parse_clock_time(start_time)?;
        let end = parse_clock_time(end_time)?;
        let settings = self.store.settings()?;
        Ok(calculate_duration(start, end, settings.rounding_rule, 1))
    }

    /// Checks whether an employee may claim overtime on `claim_date`.
    pub fn check_eligibility(
        &self,
        employee_id: &str,
        claim_date: NaiveDate,
    ) -> EngineResult<EligibilityResult> {
        let employee = self.store.employee(employee_id)?;
        let settings = self.store.settings()?;
        let rules = self.store.active_eligibility_rules()?;
        Ok(check_eligibility(
            &employee,
            claim_date,
            self.clock.today(),
            &settings,
            &rules,
            1,
        ))
    }

    /// Prices hours for a salary and day type.
    pub fn calculate_amount(
        &self,
        basic_salary: Decimal,
        total_hours: Decimal,
        day_type: DayType,
        employee_category: Option<&str>,
        claim_date: NaiveDate,
    ) -> EngineResult<AmountResult> {
        let settings = self.store.settings()?;
        let formulas = self.store.active_rate_formulas()?;
        let input = AmountInput {
            basic_salary,
            total_hours,
            day_type,
            employee_category: employee_category.unwrap_or(STANDARD_CATEGORY),
            claim_date,
        };
        calculate_amount(&input, &settings, &formulas, 1)
    }

    /// Reports threshold violations for requesting `requested_hours` on `requested_date`.
    ///
    /// Advisory only: blocking violations are reported, not raised.
    pub fn check_thresholds(
        &self,
        employee_id: &str,
        requested_hours: Decimal,
        requested_date: NaiveDate,
    ) -> EngineResult<ThresholdReport> {
        if requested_hours < Decimal::ZERO || requested_hours > MAX_REQUESTED_HOURS {
            return Err(EngineError::InvalidInput {
                field: "requested_hours".to_string(),
                message: format!("must be between 0 and 24, got {}", requested_hours),
            });
        }
        let employee = self.store.employee(employee_id)?;
        let thresholds = self.store.active_thresholds()?;
        let claimed = self.claimed_hours(employee_id, requested_date)?;
        Ok(check_thresholds(
            &employee,
            requested_hours,
            None,
            &claimed,
            &thresholds,
            1,
        ))
    }

    /// Prices a claim without storing it.
    pub fn quote(&self, employee_id: &str, claim: &SubmitClaim) -> EngineResult<SubmissionOutcome> {
        self.evaluate(employee_id, claim)
    }

    /// Prices a claim and stores it as `pending_verification`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` / `InvalidTime` / `InvalidEmployee` for bad input
    /// - `Ineligible` when no rule admits the claim
    /// - `FormulaNotFound` / `InvalidFormula` when it cannot be priced
    /// - `ThresholdExceeded` when an auto-blocking threshold is tripped
    /// - `StoreUnavailable` when any read or the write fails
    pub fn submit(&self, employee_id: &str, claim: &SubmitClaim) -> EngineResult<SubmissionOutcome> {
        self.with_employee_lock(employee_id, || {
            let outcome = self.evaluate(employee_id, claim)?;
            self.store.insert_request(outcome.request.clone())?;
            info!(
                employee_id,
                request_id = %outcome.request.id,
                ot_date = %outcome.request.ot_date,
                total_hours = %outcome.request.total_hours,
                ot_amount = %outcome.request.ot_amount,
                warnings = outcome.warnings.len(),
                "Overtime claim submitted"
            );
            Ok(outcome)
        })
    }

    fn claimed_hours(&self, employee_id: &str, date: NaiveDate) -> EngineResult<ClaimedHours> {
        let periods = AggregationPeriods::containing(date);
        Ok(ClaimedHours {
            daily: self.store.claimed_hours(employee_id, periods.day, periods.day)?,
            weekly: self
                .store
                .claimed_hours(employee_id, periods.week_start, periods.week_end)?,
            monthly: self
                .store
                .claimed_hours(employee_id, periods.month_start, periods.month_end)?,
        })
    }

    fn evaluate(&self, employee_id: &str, claim: &SubmitClaim) -> EngineResult<SubmissionOutcome> {
        let started = Instant::now();

        let reason = validate_reason(&claim.reason)?;
        let start = parse_clock_time(&claim.start_time)?;
        let end = parse_clock_time(&claim.end_time)?;

        let employee = self.store.employee(employee_id)?;
        let ctx = EvaluationContext::load(self.store.as_ref(), claim.ot_date)?;
        let mut trace = AuditTrace::default();

        let duration = calculate_duration(start, end, ctx.settings.rounding_rule, 1);
        let total_hours = duration.total_hours;
        trace.push(duration.audit_step);
        if total_hours <= Decimal::ZERO {
            return Err(EngineError::InvalidInput {
                field: "end_time".to_string(),
                message: format!(
                    "{} to {} is {}h after rounding; a claim must cover some time",
                    claim.start_time,
                    claim.end_time,
                    total_hours.normalize()
                ),
            });
        }
        if total_hours > ctx.settings.max_daily_hours {
            return Err(EngineError::InvalidInput {
                field: "end_time".to_string(),
                message: format!(
                    "{}h exceeds the maximum of {}h for a single claim",
                    total_hours.normalize(),
                    ctx.settings.max_daily_hours.normalize()
                ),
            });
        }

        let day_type = resolve_day_type(claim.ot_date, ctx.holiday.as_ref());
        trace.push(day_type_audit_step(
            claim.ot_date,
            ctx.holiday.as_ref(),
            day_type,
            trace.next_step_number(),
        ));

        let basic_salary = employee.require_basic_salary()?;

        let eligibility = check_eligibility(
            &employee,
            claim.ot_date,
            self.clock.today(),
            &ctx.settings,
            &ctx.eligibility_rules,
            trace.next_step_number(),
        );
        trace.push(eligibility.audit_step.clone());
        if !eligibility.is_eligible {
            info!(employee_id, reason = %eligibility.reason, "Overtime claim ineligible");
            return Err(EngineError::Ineligible {
                reason: eligibility.reason,
            });
        }

        let mut amount = calculate_amount(
            &AmountInput {
                basic_salary,
                total_hours,
                day_type,
                employee_category: &employee.employee_category,
                claim_date: claim.ot_date,
            },
            &ctx.settings,
            &ctx.rate_formulas,
            trace.next_step_number(),
        )?;
        for step in std::mem::take(&mut amount.audit_steps) {
            trace.push(step);
        }
        if amount.category_fallback {
            trace.warn(
                "CATEGORY_FALLBACK",
                format!(
                    "No formula for category '{}'; priced with the standard formula '{}'",
                    employee.employee_category, amount.formula_id
                ),
                "info",
            );
        }

        let claimed = self.claimed_hours(&employee.id, claim.ot_date)?;
        let report = check_thresholds(
            &employee,
            total_hours,
            Some(amount.ot_amount),
            &claimed,
            &ctx.thresholds,
            trace.next_step_number(),
        );
        trace.push(report.audit_step.clone());
        if let Some(error) = report.blocking_error() {
            warn!(employee_id, %error, "Overtime claim blocked by threshold");
            return Err(error);
        }

        let warnings: Vec<String> = report.violations.iter().map(|v| v.describe()).collect();
        for warning in &warnings {
            trace.warn("THRESHOLD_VIOLATION", warning.clone(), "warning");
        }
        trace.duration_us = started.elapsed().as_micros() as u64;

        debug!(
            employee_id,
            day_type = %day_type,
            formula_id = %amount.formula_id,
            ot_amount = %amount.ot_amount,
            "Overtime claim priced"
        );

        let now = self.clock.now();
        let request = OtRequest {
            id: Uuid::new_v4(),
            employee_id: employee.id.clone(),
            ot_date: claim.ot_date,
            start_time: start,
            end_time: end,
            total_hours,
            day_type,
            orp: amount.orp,
            hrp: amount.hrp,
            ot_amount: amount.ot_amount,
            reason,
            attachment_url: claim
                .attachment_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            status: OtStatus::PendingVerification,
            eligibility_rule_id: eligibility.matched_rule_id,
            formula_id: Some(amount.formula_id),
            supervisor_id: None,
            supervisor_verified_at: None,
            supervisor_remarks: None,
            hr_id: None,
            hr_approved_at: None,
            hr_remarks: None,
            bod_id: None,
            bod_reviewed_at: None,
            bod_remarks: None,
            rejected_at: None,
            threshold_violations: report.violations,
            audit_trace: trace,
            created_at: now,
            updated_at: now,
        };

        Ok(SubmissionOutcome { request, warnings })
    }
}

fn validate_reason(reason: &str) -> EngineResult<String> {
    let reason = reason.trim();
    let chars = reason.chars().count();
    if !(MIN_REASON_CHARS..=MAX_REASON_CHARS).contains(&chars) {
        return Err(EngineError::InvalidInput {
            field: "reason".to_string(),
            message: format!(
                "must be {} to {} characters, got {}",
                MIN_REASON_CHARS, MAX_REASON_CHARS, chars
            ),
        });
    }
    Ok(reason.to_string())
}
