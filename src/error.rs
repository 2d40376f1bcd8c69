//! Error types for the overtime calculation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while pricing and admitting
//! overtime claims.

use chrono::NaiveDate;
use thiserror::Error;

use crate::calculation::DayType;

/// The main error type for the overtime calculation engine.
///
/// Business rejections (ineligible claims, blocking thresholds) and
/// configuration faults (unpriceable claims) are separate variants so that
/// callers can tell a user-facing refusal from a misconfigured rule set.
///
/// # Example
///
/// ```
/// use otms_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/settings.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/settings.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration record violates one of its invariants.
    #[error("Invalid configuration for '{item}': {message}")]
    InvalidConfig {
        /// The rule, formula or threshold that is invalid.
        item: String,
        /// A description of the violated invariant.
        message: String,
    },

    /// A clock time could not be parsed.
    #[error("Invalid time '{value}': expected HH:MM")]
    InvalidTime {
        /// The offending input.
        value: String,
    },

    /// A request field was rejected before reaching eligibility or pricing.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The employee may not submit an overtime claim.
    #[error("Not eligible for overtime: {reason}")]
    Ineligible {
        /// Human-readable reason for the rejection.
        reason: String,
    },

    /// No active rate formula covers the claim.
    #[error("No active rate formula for {day_type} (category '{category}') on {date}")]
    FormulaNotFound {
        /// The resolved day type of the claim.
        day_type: DayType,
        /// The employee category requested.
        category: String,
        /// The claim date.
        date: NaiveDate,
    },

    /// A rate formula could not be parsed or evaluated.
    #[error("Rate formula '{formula}' is invalid: {message}")]
    InvalidFormula {
        /// The formula name or expression.
        formula: String,
        /// A description of the problem.
        message: String,
    },

    /// A threshold with auto-blocking enabled was exceeded.
    #[error("Blocked by threshold '{threshold}': {message}")]
    ThresholdExceeded {
        /// The name of the blocking threshold.
        threshold: String,
        /// A description of the first blocking violation.
        message: String,
    },

    /// The persistence collaborator could not be read or written.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// A description of the failure.
        message: String,
    },

    /// No employee exists with the given id.
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// The employee id.
        id: String,
    },

    /// No overtime request exists with the given id.
    #[error("Overtime request not found: {id}")]
    RequestNotFound {
        /// The request id.
        id: String,
    },

    /// No public holiday is registered on the given date.
    #[error("No public holiday on {date}")]
    HolidayNotFound {
        /// The date looked up.
        date: NaiveDate,
    },

    /// The requested status transition is not allowed from the current status.
    #[error("Cannot {action} a request in status '{from}'")]
    InvalidTransition {
        /// The current status.
        from: String,
        /// The attempted action.
        action: String,
    },

    /// The action requires remarks but none were given.
    #[error("Remarks are required to {action} a request")]
    RemarksRequired {
        /// The attempted action.
        action: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
