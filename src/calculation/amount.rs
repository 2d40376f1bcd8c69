//! Overtime amount calculation.
//!
//! ORP is the monthly basic salary divided by the configured working days
//! per month. HRP is ORP divided by the configured hours per day. Both are
//! rounded to cents before the formula is evaluated, and the final amount is
//! rounded to cents half-up.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::OtSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, RateFormula};

use super::DayType;
use super::formula::FormulaBindings;
use super::rate_selection::select_formula;
use super::rounding::round_money;

/// Ordinary and hourly rates of pay derived from a basic salary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayRates {
    /// Ordinary rate of pay (daily).
    pub orp: Decimal,
    /// Hourly rate of pay.
    pub hrp: Decimal,
}

/// Derives ORP and HRP from a monthly basic salary.
///
/// # Example
///
/// ```
/// use otms_engine::calculation::derive_pay_rates;
/// use otms_engine::config::OtSettings;
/// use rust_decimal::Decimal;
///
/// let rates = derive_pay_rates(Decimal::new(2600, 0), &OtSettings::default()).unwrap();
/// assert_eq!(rates.orp, Decimal::new(10000, 2));
/// assert_eq!(rates.hrp, Decimal::new(1250, 2));
/// ```
pub fn derive_pay_rates(basic_salary: Decimal, settings: &OtSettings) -> EngineResult<PayRates> {
    if basic_salary <= Decimal::ZERO {
        return Err(EngineError::InvalidEmployee {
            field: "basic_salary".to_string(),
            message: format!("must be positive, got {}", basic_salary),
        });
    }
    let divide = |value: Decimal, divisor: Decimal, what: &str| {
        value
            .checked_div(divisor)
            .map(round_money)
            .ok_or_else(|| EngineError::InvalidConfig {
                item: "settings".to_string(),
                message: format!("cannot divide by {} {}", what, divisor),
            })
    };
    let orp = divide(basic_salary, settings.working_days_per_month, "working_days_per_month")?;
    let hrp = divide(orp, settings.hours_per_day, "hours_per_day")?;
    Ok(PayRates { orp, hrp })
}

/// The result of an amount calculation, including audit steps.
#[derive(Debug, Clone, Serialize)]
pub struct AmountResult {
    /// Ordinary rate of pay.
    pub orp: Decimal,
    /// Hourly rate of pay.
    pub hrp: Decimal,
    /// Priced overtime amount, 2 dp.
    pub ot_amount: Decimal,
    /// Multiplier of the formula used.
    pub multiplier: Decimal,
    /// Id of the formula used.
    pub formula_id: String,
    /// Name of the formula used.
    pub formula_name: String,
    /// True if the standard-category formula stood in for the employee's category.
    pub category_fallback: bool,
    /// The audit steps recording this calculation.
    #[serde(skip)]
    pub audit_steps: Vec<AuditStep>,
}

/// Inputs to [`calculate_amount`].
#[derive(Debug, Clone, Copy)]
pub struct AmountInput<'a> {
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Claimed hours, after rounding.
    pub total_hours: Decimal,
    /// The claim's day type.
    pub day_type: DayType,
    /// The employee's category.
    pub employee_category: &'a str,
    /// The claim date, used to pick the effective formula.
    pub claim_date: NaiveDate,
}

/// Prices an overtime claim.
///
/// # Errors
///
/// - `InvalidEmployee` for a missing or non-positive basic salary
/// - `InvalidInput` for zero or negative hours
/// - `FormulaNotFound` / `InvalidFormula` when the claim cannot be priced
///
/// A claim never prices at zero: a formula that yields zero or less is
/// reported as `InvalidFormula`.
///
/// # Example
///
/// ```
/// use otms_engine::calculation::{calculate_amount, AmountInput, DayType};
/// use otms_engine::config::OtSettings;
/// use otms_engine::models::RateFormula;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let formula = RateFormula {
///     id: "f_weekday".to_string(),
///     name: "Weekday OT".to_string(),
///     day_type: DayType::Weekday,
///     employee_category: "standard".to_string(),
///     multiplier: Decimal::new(15, 1),
///     base_formula: "multiplier x HRP x TOH".to_string(),
///     effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     effective_to: None,
///     is_active: true,
///     created_at: None,
/// };
/// let input = AmountInput {
///     basic_salary: Decimal::new(2600, 0),
///     total_hours: Decimal::new(2, 0),
///     day_type: DayType::Weekday,
///     employee_category: "standard",
///     claim_date: NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
/// };
///
/// let result = calculate_amount(&input, &OtSettings::default(), &[formula], 1).unwrap();
/// assert_eq!(result.ot_amount, Decimal::new(3750, 2));
/// ```
pub fn calculate_amount(
    input: &AmountInput<'_>,
    settings: &OtSettings,
    formulas: &[RateFormula],
    start_step_number: u32,
) -> EngineResult<AmountResult> {
    if input.total_hours <= Decimal::ZERO {
        return Err(EngineError::InvalidInput {
            field: "total_hours".to_string(),
            message: format!("must be positive, got {}", input.total_hours),
        });
    }

    let mut current_step = start_step_number;
    let mut audit_steps = Vec::new();

    let rates = derive_pay_rates(input.basic_salary, settings)?;

    let selection = select_formula(
        formulas,
        input.day_type,
        input.employee_category,
        input.claim_date,
        current_step,
    )?;
    audit_steps.push(selection.audit_step);
    current_step += 1;

    audit_steps.push(AuditStep {
        step_number: current_step,
        rule_id: "pay_rates".to_string(),
        rule_name: "Ordinary and Hourly Rate of Pay".to_string(),
        source: None,
        input: serde_json::json!({
            "basic_salary": input.basic_salary.normalize().to_string(),
            "working_days_per_month": settings.working_days_per_month.normalize().to_string(),
            "hours_per_day": settings.hours_per_day.normalize().to_string(),
        }),
        output: serde_json::json!({
            "orp": rates.orp.to_string(),
            "hrp": rates.hrp.to_string(),
        }),
        reasoning: format!(
            "ORP = {} / {} = {}; HRP = {} / {} = {}",
            input.basic_salary.normalize(),
            settings.working_days_per_month.normalize(),
            rates.orp,
            rates.orp,
            settings.hours_per_day.normalize(),
            rates.hrp
        ),
    });
    current_step += 1;

    let formula = selection.formula;
    let expr = formula.expression()?;
    let bindings = FormulaBindings {
        orp: rates.orp,
        hrp: rates.hrp,
        toh: input.total_hours,
        multiplier: formula.multiplier,
    };
    let raw_amount = expr.evaluate(&bindings).map_err(|e| match e {
        EngineError::InvalidFormula { message, .. } => EngineError::InvalidFormula {
            formula: formula.name.clone(),
            message,
        },
        other => other,
    })?;
    let ot_amount = round_money(raw_amount);

    if ot_amount <= Decimal::ZERO {
        return Err(EngineError::InvalidFormula {
            formula: formula.name.clone(),
            message: format!(
                "formula priced {}h at {}; a claim cannot be priced at zero or less",
                input.total_hours.normalize(),
                ot_amount
            ),
        });
    }

    audit_steps.push(AuditStep {
        step_number: current_step,
        rule_id: "ot_amount".to_string(),
        rule_name: "Overtime Amount".to_string(),
        source: Some(formula.id.clone()),
        input: serde_json::json!({
            "formula": expr.to_string(),
            "orp": rates.orp.to_string(),
            "hrp": rates.hrp.to_string(),
            "toh": input.total_hours.normalize().to_string(),
            "multiplier": formula.multiplier.normalize().to_string(),
        }),
        output: serde_json::json!({
            "raw_amount": raw_amount.normalize().to_string(),
            "ot_amount": ot_amount.to_string(),
        }),
        reasoning: format!(
            "{} with ORP={}, HRP={}, TOH={}, multiplier={} = {} (rounded half-up to {})",
            expr,
            rates.orp,
            rates.hrp,
            input.total_hours.normalize(),
            formula.multiplier.normalize(),
            raw_amount.normalize(),
            ot_amount
        ),
    });

    Ok(AmountResult {
        orp: rates.orp,
        hrp: rates.hrp,
        ot_amount,
        multiplier: formula.multiplier,
        formula_id: formula.id,
        formula_name: formula.name,
        category_fallback: selection.category_fallback,
        audit_steps,
    })
}
