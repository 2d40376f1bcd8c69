//! Overtime request model and its approval state machine.
//!
//! An [`OtRequest`] is created once, at submission, with its computed pay
//! fields frozen. Later status changes only stamp approval metadata; they
//! never recompute `orp`, `hrp` or `ot_amount`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::DayType;
use crate::error::{EngineError, EngineResult};

use super::AuditTrace;

/// Status of an overtime request.
///
/// The happy path is `pending_verification → verified → approved → reviewed`.
/// `rejected` is reachable from `pending_verification` and `verified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtStatus {
    /// Waiting for the supervisor.
    PendingVerification,
    /// Verified by the supervisor, waiting for HR.
    Verified,
    /// Approved by HR.
    Approved,
    /// Reviewed by the board.
    Reviewed,
    /// Rejected by the supervisor or HR.
    Rejected,
}

impl OtStatus {
    /// Returns the status reached by applying `action`, if allowed.
    ///
    /// `review` is only available when the organisation requires board review.
    pub fn next(self, action: OtAction, board_review_required: bool) -> Option<OtStatus> {
        match (self, action) {
            (OtStatus::PendingVerification, OtAction::Verify) => Some(OtStatus::Verified),
            (OtStatus::Verified, OtAction::Approve) => Some(OtStatus::Approved),
            (OtStatus::Approved, OtAction::Review) if board_review_required => {
                Some(OtStatus::Reviewed)
            }
            (OtStatus::PendingVerification | OtStatus::Verified, OtAction::Reject) => {
                Some(OtStatus::Rejected)
            }
            _ => None,
        }
    }

    /// Returns true if no further action can change the status.
    pub fn is_terminal(self, board_review_required: bool) -> bool {
        match self {
            OtStatus::Rejected | OtStatus::Reviewed => true,
            OtStatus::Approved => !board_review_required,
            OtStatus::PendingVerification | OtStatus::Verified => false,
        }
    }

    /// Returns true while the claim still counts as awaiting a decision.
    pub fn is_pending(self) -> bool {
        matches!(self, OtStatus::PendingVerification | OtStatus::Verified)
    }

    /// Returns the snake_case name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            OtStatus::PendingVerification => "pending_verification",
            OtStatus::Verified => "verified",
            OtStatus::Approved => "approved",
            OtStatus::Reviewed => "reviewed",
            OtStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for OtStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An approval workflow action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtAction {
    /// Supervisor verification.
    Verify,
    /// HR approval.
    Approve,
    /// Board review.
    Review,
    /// Rejection by supervisor or HR.
    Reject,
}

impl std::fmt::Display for OtAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OtAction::Verify => "verify",
            OtAction::Approve => "approve",
            OtAction::Review => "review",
            OtAction::Reject => "reject",
        };
        f.write_str(name)
    }
}

/// The kind of limit a threshold violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    /// Hours on the same calendar day.
    DailyLimit,
    /// Hours in the same ISO week.
    WeeklyLimit,
    /// Hours in the same calendar month.
    MonthlyLimit,
    /// Amount of the single claim.
    MaxAmount,
}

impl std::fmt::Display for ViolationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ViolationType::DailyLimit => "daily limit",
            ViolationType::WeeklyLimit => "weekly limit",
            ViolationType::MonthlyLimit => "monthly limit",
            ViolationType::MaxAmount => "max amount",
        };
        f.write_str(name)
    }
}

/// A single exceeded limit.
///
/// For hour limits `current` is the already-claimed hours, `requested` the
/// new claim's hours and `total` their sum. For `max_amount`, `current` is
/// zero and the figures are money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdViolation {
    /// The threshold that was exceeded.
    pub threshold_id: String,
    /// The threshold's display name.
    pub threshold_name: String,
    /// Which limit was exceeded.
    #[serde(rename = "type")]
    pub violation_type: ViolationType,
    /// Value already on record for the period.
    pub current: Decimal,
    /// Value requested by the new claim.
    pub requested: Decimal,
    /// `current + requested`.
    pub total: Decimal,
    /// The configured limit.
    pub limit: Decimal,
    /// Whether this violation refuses the submission.
    pub blocking: bool,
}

impl ThresholdViolation {
    /// Describes the violation in one line.
    pub fn describe(&self) -> String {
        format!(
            "{}: current {} + requested {} = {} exceeds limit of {}",
            self.violation_type,
            self.current.normalize(),
            self.requested.normalize(),
            self.total.normalize(),
            self.limit.normalize()
        )
    }
}

/// A submitted overtime claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtRequest {
    /// Unique identifier for the request.
    pub id: Uuid,
    /// The claimant.
    pub employee_id: String,
    /// The date the overtime was worked.
    pub ot_date: NaiveDate,
    /// Wall-clock start time.
    pub start_time: NaiveTime,
    /// Wall-clock end time; at or before `start_time` means the shift crossed midnight.
    pub end_time: NaiveTime,
    /// Claimed hours after the rounding rule.
    pub total_hours: Decimal,
    /// Day type the claim was priced as.
    pub day_type: DayType,
    /// Ordinary rate of pay at submission.
    pub orp: Decimal,
    /// Hourly rate of pay at submission.
    pub hrp: Decimal,
    /// Priced overtime amount.
    pub ot_amount: Decimal,
    /// Why the overtime was worked.
    pub reason: String,
    /// Supporting document, if uploaded.
    #[serde(default)]
    pub attachment_url: Option<String>,
    /// Current workflow status.
    pub status: OtStatus,
    /// Eligibility rule that admitted the claim.
    #[serde(default)]
    pub eligibility_rule_id: Option<String>,
    /// Rate formula that priced the claim.
    #[serde(default)]
    pub formula_id: Option<String>,
    /// Supervisor assigned to or acting on the claim.
    #[serde(default)]
    pub supervisor_id: Option<String>,
    /// When the supervisor verified the claim.
    #[serde(default)]
    pub supervisor_verified_at: Option<DateTime<Utc>>,
    /// Supervisor remarks.
    #[serde(default)]
    pub supervisor_remarks: Option<String>,
    /// HR officer acting on the claim.
    #[serde(default)]
    pub hr_id: Option<String>,
    /// When HR approved the claim.
    #[serde(default)]
    pub hr_approved_at: Option<DateTime<Utc>>,
    /// HR remarks.
    #[serde(default)]
    pub hr_remarks: Option<String>,
    /// Board member who reviewed the claim.
    #[serde(default)]
    pub bod_id: Option<String>,
    /// When the board reviewed the claim.
    #[serde(default)]
    pub bod_reviewed_at: Option<DateTime<Utc>>,
    /// Board remarks.
    #[serde(default)]
    pub bod_remarks: Option<String>,
    /// When the claim was rejected.
    #[serde(default)]
    pub rejected_at: Option<DateTime<Utc>>,
    /// Threshold violations recorded at submission.
    #[serde(default)]
    pub threshold_violations: Vec<ThresholdViolation>,
    /// How the pay fields were derived.
    #[serde(default)]
    pub audit_trace: AuditTrace,
    /// When the claim was created.
    pub created_at: DateTime<Utc>,
    /// When the claim was last changed.
    pub updated_at: DateTime<Utc>,
}

impl OtRequest {
    /// Applies an approval workflow action, stamping actor, time and remarks.
    ///
    /// Rejections require remarks. Computed pay fields are left untouched.
    ///
    /// # Returns
    ///
    /// The new status, or `InvalidTransition` / `RemarksRequired`.
    pub fn apply_action(
        &mut self,
        action: OtAction,
        actor_id: &str,
        remarks: Option<&str>,
        at: DateTime<Utc>,
        board_review_required: bool,
    ) -> EngineResult<OtStatus> {
        let next = self
            .status
            .next(action, board_review_required)
            .ok_or_else(|| EngineError::InvalidTransition {
                from: self.status.to_string(),
                action: action.to_string(),
            })?;

        let remarks = remarks
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        if action == OtAction::Reject && remarks.is_none() {
            return Err(EngineError::RemarksRequired {
                action: action.to_string(),
            });
        }

        let actor = Some(actor_id.to_string());
        match (action, self.status) {
            (OtAction::Verify, _) => {
                self.supervisor_id = actor;
                self.supervisor_verified_at = Some(at);
                self.supervisor_remarks = remarks.or(self.supervisor_remarks.take());
            }
            (OtAction::Approve, _) => {
                self.hr_id = actor;
                self.hr_approved_at = Some(at);
                self.hr_remarks = remarks.or(self.hr_remarks.take());
            }
            (OtAction::Review, _) => {
                self.bod_id = actor;
                self.bod_reviewed_at = Some(at);
                self.bod_remarks = remarks.or(self.bod_remarks.take());
            }
            (OtAction::Reject, OtStatus::PendingVerification) => {
                self.supervisor_id = actor;
                self.supervisor_remarks = remarks;
                self.rejected_at = Some(at);
            }
            (OtAction::Reject, _) => {
                self.hr_id = actor;
                self.hr_remarks = remarks;
                self.rejected_at = Some(at);
            }
        }

        self.status = next;
        self.updated_at = at;
        Ok(next)
    }
}
