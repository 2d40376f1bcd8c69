//! Persistence collaborator.
//!
//! The engine reads its configuration snapshot and writes claims through
//! the [`OtStore`] trait. [`MemoryStore`] is the in-process implementation
//! seeded from the YAML configuration.

mod memory;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::OtSettings;
use crate::error::EngineResult;
use crate::models::{
    ApprovalThreshold, EligibilityRule, Employee, OtRequest, PublicHoliday, RateFormula,
};

pub use memory::MemoryStore;

/// Typed access to settings, rules, holidays and claims.
///
/// Every method may fail with `StoreUnavailable`; callers must treat that
/// as a refusal and never fall back to defaults.
pub trait OtStore: Send + Sync {
    /// Reads the settings record.
    fn settings(&self) -> EngineResult<OtSettings>;

    /// Replaces the settings record after validating it.
    fn upsert_settings(&self, settings: OtSettings) -> EngineResult<OtSettings>;

    /// Looks up the public holiday on `date`.
    fn public_holiday(&self, date: NaiveDate) -> EngineResult<Option<PublicHoliday>>;

    /// Adds a holiday, returning the one it replaced on the same date.
    fn add_holiday(&self, holiday: PublicHoliday) -> EngineResult<Option<PublicHoliday>>;

    /// Removes the holiday on `date`, returning it.
    fn remove_holiday(&self, date: NaiveDate) -> EngineResult<Option<PublicHoliday>>;

    /// Lists eligibility rules with `is_active` set.
    fn active_eligibility_rules(&self) -> EngineResult<Vec<EligibilityRule>>;

    /// Lists rate formulas with `is_active` set.
    fn active_rate_formulas(&self) -> EngineResult<Vec<RateFormula>>;

    /// Lists approval thresholds with `is_active` set.
    fn active_thresholds(&self) -> EngineResult<Vec<ApprovalThreshold>>;

    /// Looks up an employee, failing with `EmployeeNotFound`.
    fn employee(&self, id: &str) -> EngineResult<Employee>;

    /// Sums the hours of the employee's non-rejected claims dated in
    /// `[from, to]`.
    fn claimed_hours(&self, employee_id: &str, from: NaiveDate, to: NaiveDate)
    -> EngineResult<Decimal>;

    /// Stores a new claim in one write.
    fn insert_request(&self, request: OtRequest) -> EngineResult<()>;

    /// Looks up a claim, failing with `RequestNotFound`.
    fn request(&self, id: Uuid) -> EngineResult<OtRequest>;

    /// Replaces an existing claim.
    fn update_request(&self, request: OtRequest) -> EngineResult<()>;

    /// Lists claims, newest overtime date first, optionally for one employee.
    fn requests_for(&self, employee_id: Option<&str>) -> EngineResult<Vec<OtRequest>>;
}
