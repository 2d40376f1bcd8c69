//! Rate formula selection.
//!
//! Picks the one active, effective-dated formula that prices a claim for a
//! day type and employee category.

use std::cmp::Reverse;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, RateFormula, STANDARD_CATEGORY};

use super::DayType;

/// The result of a formula selection, including the audit step.
#[derive(Debug, Clone)]
pub struct FormulaSelection {
    /// The selected formula.
    pub formula: RateFormula,
    /// True if no formula existed for the requested category and the
    /// standard category was used instead.
    pub category_fallback: bool,
    /// Number of formulas that matched before the tie-break.
    pub candidates: usize,
    /// The audit step recording this selection.
    pub audit_step: AuditStep,
}

/// Selects the rate formula for a claim.
///
/// A formula matches when it is active, prices `day_type`, is effective on
/// `date` and belongs to `category`. If no formula exists for `category`
/// the standard category is tried. Several matches are resolved by latest
/// `effective_from`, then latest `created_at`, then smallest id.
///
/// # Errors
///
/// - `FormulaNotFound` when nothing matches
/// - `InvalidFormula` when the winner's multiplier is not positive
pub fn select_formula(
    formulas: &[RateFormula],
    day_type: DayType,
    category: &str,
    date: NaiveDate,
    step_number: u32,
) -> EngineResult<FormulaSelection> {
    let matching = |cat: &str| {
        formulas
            .iter()
            .filter(|f| {
                f.is_active
                    && f.day_type == day_type
                    && f.employee_category == cat
                    && f.is_effective_on(date)
            })
            .collect::<Vec<&RateFormula>>()
    };

    let mut candidates = matching(category);
    let mut category_fallback = false;
    if candidates.is_empty() && category != STANDARD_CATEGORY {
        candidates = matching(STANDARD_CATEGORY);
        category_fallback = true;
    }

    if candidates.is_empty() {
        return Err(EngineError::FormulaNotFound {
            day_type,
            category: category.to_string(),
            date,
        });
    }

    candidates.sort_by_key(|f| (Reverse(f.effective_from), Reverse(f.created_at), f.id.clone()));
    let formula = candidates[0];

    if candidates.len() > 1 {
        warn!(
            day_type = %day_type,
            category = %category,
            date = %date,
            winner = %formula.id,
            candidates = ?candidates.iter().map(|f| f.id.as_str()).collect::<Vec<_>>(),
            "Several rate formulas match; using the latest effective_from"
        );
    }

    if formula.multiplier <= Decimal::ZERO {
        return Err(EngineError::InvalidFormula {
            formula: formula.name.clone(),
            message: format!("multiplier must be positive, got {}", formula.multiplier),
        });
    }

    let reasoning = if category_fallback {
        format!(
            "No {} formula for category '{}'; using standard formula '{}' ({}x)",
            day_type.label(),
            category,
            formula.name,
            formula.multiplier.normalize()
        )
    } else {
        format!(
            "Using '{}' ({}x) for {} on {}",
            formula.name,
            formula.multiplier.normalize(),
            day_type.label(),
            date
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "formula_selection".to_string(),
        rule_name: "Rate Formula Selection".to_string(),
        source: Some(formula.id.clone()),
        input: serde_json::json!({
            "day_type": day_type,
            "employee_category": category,
            "date": date.to_string(),
        }),
        output: serde_json::json!({
            "formula_id": formula.id,
            "multiplier": formula.multiplier.normalize().to_string(),
            "base_formula": formula.base_formula,
            "effective_from": formula.effective_from.to_string(),
            "category_fallback": category_fallback,
            "candidates": candidates.len(),
        }),
        reasoning,
    };

    Ok(FormulaSelection {
        formula: formula.clone(),
        category_fallback,
        candidates: candidates.len(),
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn formula(id: &str, day_type: DayType, category: &str, multiplier: &str, from: NaiveDate) -> RateFormula {
        RateFormula {
            id: id.to_string(),
            name: format!("Formula {}", id),
            day_type,
            employee_category: category.to_string(),
            multiplier: dec(multiplier),
            base_formula: String::new(),
            effective_from: from,
            effective_to: None,
            is_active: true,
            created_at: None,
        }
    }

    #[test]
    fn test_selects_matching_day_type() {
        let formulas = vec![
            formula("f_weekday", DayType::Weekday, "standard", "1.5", date(2024, 1, 1)),
            formula("f_sat", DayType::Saturday, "standard", "2.0", date(2024, 1, 1)),
        ];
        let sel = select_formula(&formulas, DayType::Saturday, "standard", date(2025, 1, 11), 1).unwrap();
        assert_eq!(sel.formula.id, "f_sat");
        assert!(!sel.category_fallback);
    }

    #[test]
    fn test_no_formula_is_an_error() {
        let formulas = vec![formula("f_weekday", DayType::Weekday, "standard", "1.5", date(2024, 1, 1))];
        match select_formula(&formulas, DayType::PublicHoliday, "standard", date(2025, 1, 1), 1) {
            Err(EngineError::FormulaNotFound { day_type, .. }) => {
                assert_eq!(day_type, DayType::PublicHoliday);
            }
            other => panic!("Expected FormulaNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_formula_not_yet_effective_is_skipped() {
        let formulas = vec![formula("f_weekday", DayType::Weekday, "standard", "1.5", date(2025, 2, 1))];
        assert!(select_formula(&formulas, DayType::Weekday, "standard", date(2025, 1, 31), 1).is_err());
    }

    #[test]
    fn test_closed_formula_is_skipped() {
        let mut old = formula("f_old", DayType::Weekday, "standard", "1.25", date(2023, 1, 1));
        old.effective_to = Some(date(2024, 1, 1));
        let new = formula("f_new", DayType::Weekday, "standard", "1.5", date(2024, 1, 1));
        let formulas = vec![old, new];

        let sel = select_formula(&formulas, DayType::Weekday, "standard", date(2024, 1, 1), 1).unwrap();
        assert_eq!(sel.formula.id, "f_new");
        let sel = select_formula(&formulas, DayType::Weekday, "standard", date(2023, 12, 31), 1).unwrap();
        assert_eq!(sel.formula.id, "f_old");
    }

    #[test]
    fn test_inactive_formula_is_skipped() {
        let mut f = formula("f_weekday", DayType::Weekday, "standard", "1.5", date(2024, 1, 1));
        f.is_active = false;
        assert!(select_formula(&[f], DayType::Weekday, "standard", date(2025, 1, 6), 1).is_err());
    }

    #[test]
    fn test_category_specific_formula_preferred() {
        let formulas = vec![
            formula("f_std", DayType::PublicHoliday, "standard", "3.0", date(2024, 1, 1)),
            formula("f_shift", DayType::PublicHoliday, "shift", "3.5", date(2024, 1, 1)),
        ];
        let sel = select_formula(&formulas, DayType::PublicHoliday, "shift", date(2025, 1, 1), 1).unwrap();
        assert_eq!(sel.formula.id, "f_shift");
    }

    #[test]
    fn test_falls_back_to_standard_category() {
        let formulas = vec![formula("f_std", DayType::Sunday, "standard", "2.0", date(2024, 1, 1))];
        let sel = select_formula(&formulas, DayType::Sunday, "shift", date(2025, 1, 12), 4).unwrap();
        assert_eq!(sel.formula.id, "f_std");
        assert!(sel.category_fallback);
        assert_eq!(sel.audit_step.step_number, 4);
    }

    #[test]
    fn test_tie_break_latest_effective_from() {
        let formulas = vec![
            formula("f_a", DayType::Weekday, "standard", "1.5", date(2024, 1, 1)),
            formula("f_b", DayType::Weekday, "standard", "1.75", date(2024, 7, 1)),
        ];
        let sel = select_formula(&formulas, DayType::Weekday, "standard", date(2025, 1, 6), 1).unwrap();
        assert_eq!(sel.formula.id, "f_b");
        assert_eq!(sel.candidates, 2);
    }

    #[test]
    fn test_tie_break_created_at_then_id() {
        let ts = |s: &str| Some(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc));
        let mut a = formula("f_a", DayType::Weekday, "standard", "1.5", date(2024, 1, 1));
        let mut b = formula("f_b", DayType::Weekday, "standard", "1.5", date(2024, 1, 1));
        a.created_at = ts("2024-03-01T00:00:00Z");
        b.created_at = ts("2024-02-01T00:00:00Z");
        let sel = select_formula(&[a.clone(), b.clone()], DayType::Weekday, "standard", date(2025, 1, 6), 1).unwrap();
        assert_eq!(sel.formula.id, "f_a");

        a.created_at = None;
        b.created_at = None;
        let sel = select_formula(&[b, a], DayType::Weekday, "standard", date(2025, 1, 6), 1).unwrap();
        assert_eq!(sel.formula.id, "f_a");
    }

    #[test]
    fn test_non_positive_multiplier_is_an_error() {
        let f = formula("f_zero", DayType::Weekday, "standard", "0", date(2024, 1, 1));
        assert!(matches!(
            select_formula(&[f], DayType::Weekday, "standard", date(2025, 1, 6), 1),
            Err(EngineError::InvalidFormula { .. })
        ));
    }
}
