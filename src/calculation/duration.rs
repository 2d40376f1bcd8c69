//! Overtime duration calculation.
//!
//! Start and end are wall-clock times on the same nominal day. An end time
//! before the start time means the overtime crossed midnight.

use chrono::{NaiveTime, Timelike};
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

use super::rounding::{RoundingRule, round_hours};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Parses an `HH:MM` or `HH:MM:SS` clock time.
///
/// Hours may have one or two digits; minutes and seconds must have two.
///
/// # Example
///
/// ```
/// use otms_engine::calculation::parse_clock_time;
/// use chrono::NaiveTime;
///
/// assert_eq!(parse_clock_time("9:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
/// assert_eq!(parse_clock_time("22:00:00").unwrap(), NaiveTime::from_hms_opt(22, 0, 0).unwrap());
/// assert!(parse_clock_time("24:00").is_err());
/// ```
pub fn parse_clock_time(value: &str) -> EngineResult<NaiveTime> {
    let invalid = || EngineError::InvalidTime {
        value: value.to_string(),
    };

    let parts: Vec<&str> = value.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(invalid());
    }

    let field = |text: &str, widths: &[usize], max: u32| -> Option<u32> {
        if !widths.contains(&text.len()) || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse::<u32>().ok().filter(|v| *v <= max)
    };

    let hour = field(parts[0], &[1, 2], 23).ok_or_else(invalid)?;
    let minute = field(parts[1], &[2], 59).ok_or_else(invalid)?;
    let second = match parts.get(2) {
        Some(s) => field(s, &[2], 59).ok_or_else(invalid)?,
        None => 0,
    };

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(invalid)
}

/// Computes the hours between `start` and `end`, rounded to 2 dp half-up.
///
/// If `end` is before `start` the span crosses midnight and 24 hours are
/// added to `end`. Identical times give zero hours, which callers treat
/// as a rejected claim.
///
/// # Example
///
/// ```
/// use otms_engine::calculation::compute_hours;
/// use chrono::NaiveTime;
/// use rust_decimal::Decimal;
///
/// let start = NaiveTime::from_hms_opt(22, 0, 0).unwrap();
/// let end = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
/// assert_eq!(compute_hours(start, end), Decimal::new(8, 0));
/// ```
pub fn compute_hours(start: NaiveTime, end: NaiveTime) -> Decimal {
    let start_secs = i64::from(start.num_seconds_from_midnight());
    let end_secs = i64::from(end.num_seconds_from_midnight());

    let mut elapsed = end_secs - start_secs;
    if elapsed < 0 {
        elapsed += SECONDS_PER_DAY;
    }

    round_hours(Decimal::from(elapsed) / Decimal::from(3600))
}

/// The result of a duration calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct DurationResult {
    /// Hours before the rounding rule.
    pub raw_hours: Decimal,
    /// Hours after the rounding rule.
    pub total_hours: Decimal,
    /// True if the span crossed midnight.
    pub overnight: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes claimed hours and applies the organisation's rounding rule.
pub fn calculate_duration(
    start: NaiveTime,
    end: NaiveTime,
    rule: RoundingRule,
    step_number: u32,
) -> DurationResult {
    let raw_hours = compute_hours(start, end);
    let total_hours = rule.apply(raw_hours);
    let overnight = end < start;

    let reasoning = if overnight {
        format!(
            "{} to {} crosses midnight: {}h, rounded ({}) to {}h",
            start.format("%H:%M"),
            end.format("%H:%M"),
            raw_hours.normalize(),
            rule,
            total_hours.normalize()
        )
    } else {
        format!(
            "{} to {}: {}h, rounded ({}) to {}h",
            start.format("%H:%M"),
            end.format("%H:%M"),
            raw_hours.normalize(),
            rule,
            total_hours.normalize()
        )
    };

    DurationResult {
        raw_hours,
        total_hours,
        overnight,
        audit_step: AuditStep {
            step_number,
            rule_id: "duration".to_string(),
            rule_name: "Overtime Duration".to_string(),
            source: None,
            input: serde_json::json!({
                "start_time": start.format("%H:%M:%S").to_string(),
                "end_time": end.format("%H:%M:%S").to_string(),
                "rounding_rule": rule,
            }),
            output: serde_json::json!({
                "raw_hours": raw_hours.normalize().to_string(),
                "total_hours": total_hours.normalize().to_string(),
                "overnight": overnight,
            }),
            reasoning,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_same_day_span() {
        assert_eq!(compute_hours(time(18, 0), time(20, 30)), dec("2.5"));
    }

    #[test]
    fn test_overnight_span() {
        assert_eq!(compute_hours(time(22, 0), time(6, 0)), dec("8"));
        assert_eq!(compute_hours(time(23, 30), time(0, 15)), dec("0.75"));
    }

    #[test]
    fn test_identical_times_are_zero_hours() {
        assert_eq!(compute_hours(time(9, 0), time(9, 0)), Decimal::ZERO);
    }

    #[test]
    fn test_twenty_minutes_rounds_to_two_places() {
        assert_eq!(compute_hours(time(9, 0), time(9, 20)), dec("0.33"));
        assert_eq!(compute_hours(time(9, 0), time(9, 40)), dec("0.67"));
    }

    #[test]
    fn test_parse_clock_time_formats() {
        assert_eq!(parse_clock_time("07:05").unwrap(), time(7, 5));
        assert_eq!(parse_clock_time(" 7:05 ").unwrap(), time(7, 5));
        assert_eq!(parse_clock_time("00:00:00").unwrap(), time(0, 0));
    }

    #[test]
    fn test_parse_clock_time_rejects_garbage() {
        for bad in ["", "7", "7:5", "24:00", "12:60", "ab:cd", "12:00:60", "-1:00", "12:00:00:00"] {
            assert!(
                matches!(parse_clock_time(bad), Err(EngineError::InvalidTime { .. })),
                "expected InvalidTime for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_calculate_duration_applies_rounding_rule() {
        let result = calculate_duration(time(18, 0), time(20, 20), RoundingRule::NearestHalf, 1);
        assert_eq!(result.raw_hours, dec("2.33"));
        assert_eq!(result.total_hours, dec("2.5"));
        assert!(!result.overnight);
        assert_eq!(result.audit_step.rule_id, "duration");
    }

    #[test]
    fn test_calculate_duration_flags_overnight() {
        let result = calculate_duration(time(22, 0), time(6, 0), RoundingRule::Exact, 2);
        assert!(result.overnight);
        assert_eq!(result.total_hours, dec("8"));
        assert!(result.audit_step.reasoning.contains("crosses midnight"));
    }
}
