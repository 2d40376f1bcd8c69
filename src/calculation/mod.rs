//! Calculation logic for the overtime engine.
//!
//! This module contains the pure rule functions used to admit and price an
//! overtime claim: day type resolution, duration and rounding, eligibility,
//! rate formula selection and evaluation, amount calculation and threshold
//! checks. None of them touch storage; callers pass in the configuration
//! snapshot they were evaluated against.

mod amount;
mod day_type;
mod duration;
mod eligibility;
mod formula;
mod rate_selection;
mod rounding;
mod thresholds;

pub use amount::{AmountInput, AmountResult, PayRates, calculate_amount, derive_pay_rates};
pub use day_type::{DayType, day_type_audit_step, resolve_day_type};
pub use duration::{DurationResult, calculate_duration, compute_hours, parse_clock_time};
pub use eligibility::{EligibilityResult, check_eligibility};
pub use formula::{BinaryOp, FormulaBindings, FormulaExpr, FormulaVar};
pub use rate_selection::{FormulaSelection, select_formula};
pub use rounding::{RoundingRule, round_hours, round_money};
pub use thresholds::{AggregationPeriods, ClaimedHours, ThresholdReport, check_thresholds};
