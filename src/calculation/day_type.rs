//! Day type resolution.
//!
//! This module classifies a calendar date as a weekday, Saturday, Sunday or
//! public holiday. Holiday status always wins over the day of the week.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, PublicHoliday};

/// The type of day a claim falls on, driving which rate formula applies.
///
/// # Example
///
/// ```
/// use otms_engine::calculation::DayType;
///
/// assert_eq!(DayType::PublicHoliday.to_string(), "public_holiday");
/// assert_eq!(DayType::PublicHoliday.label(), "Public Holiday");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// Monday through Friday.
    Weekday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
    /// A date registered in the holiday calendar.
    PublicHoliday,
}

impl DayType {
    /// Returns the snake_case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Saturday => "saturday",
            DayType::Sunday => "sunday",
            DayType::PublicHoliday => "public_holiday",
        }
    }

    /// Returns a display label for reports.
    pub fn label(self) -> &'static str {
        match self {
            DayType::Weekday => "Weekday",
            DayType::Saturday => "Saturday",
            DayType::Sunday => "Sunday",
            DayType::PublicHoliday => "Public Holiday",
        }
    }
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the day type of `date`.
///
/// `holiday` is the holiday calendar entry for `date`, if any.
///
/// # Example
///
/// ```
/// use otms_engine::calculation::{resolve_day_type, DayType};
/// use otms_engine::models::PublicHoliday;
/// use chrono::NaiveDate;
///
/// // 2025-08-31 is a Sunday, but also a public holiday
/// let date = NaiveDate::from_ymd_opt(2025, 8, 31).unwrap();
/// let holiday = PublicHoliday { date, name: "National Day".to_string() };
/// assert_eq!(resolve_day_type(date, Some(&holiday)), DayType::PublicHoliday);
/// assert_eq!(resolve_day_type(date, None), DayType::Sunday);
/// ```
pub fn resolve_day_type(date: NaiveDate, holiday: Option<&PublicHoliday>) -> DayType {
    if holiday.is_some_and(|h| h.date == date) {
        return DayType::PublicHoliday;
    }
    match date.weekday() {
        Weekday::Sat => DayType::Saturday,
        Weekday::Sun => DayType::Sunday,
        _ => DayType::Weekday,
    }
}

/// Builds the audit step describing a day type decision.
pub fn day_type_audit_step(
    date: NaiveDate,
    holiday: Option<&PublicHoliday>,
    day_type: DayType,
    step_number: u32,
) -> AuditStep {
    let reasoning = match (day_type, holiday) {
        (DayType::PublicHoliday, Some(h)) => {
            format!("{} is the public holiday '{}'", date, h.name)
        }
        _ => format!("{} is a {} ({})", date, day_type.label(), date.weekday()),
    };
    AuditStep {
        step_number,
        rule_id: "day_type_resolution".to_string(),
        rule_name: "Day Type Resolution".to_string(),
        source: holiday.map(|h| h.date.to_string()),
        input: serde_json::json!({
            "date": date.to_string(),
            "holiday": holiday.map(|h| h.name.clone()),
        }),
        output: serde_json::json!({ "day_type": day_type }),
        reasoning,
    }
}
