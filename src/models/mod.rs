//! Core data models for the overtime engine.
//!
//! This module contains the configuration records the engine consults and
//! the claim records it produces.

mod approval_threshold;
mod audit;
mod eligibility_rule;
mod employee;
mod holiday;
mod ot_request;
mod rate_formula;
mod summary;

pub use approval_threshold::ApprovalThreshold;
pub use audit::{AuditStep, AuditTrace, AuditWarning};
pub use eligibility_rule::EligibilityRule;
pub use employee::{Employee, STANDARD_CATEGORY};
pub use holiday::{HolidayCalendar, HolidayFile, PublicHoliday};
pub use ot_request::{OtAction, OtRequest, OtStatus, ThresholdViolation, ViolationType};
pub use rate_formula::RateFormula;
pub use summary::{OtSummary, summarize};
