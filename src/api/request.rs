//! Request types for the overtime engine API.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::DayType;
use crate::models::{OtAction, PublicHoliday};
use crate::workflow::SubmitClaim;

/// Request body for `POST /day-type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayTypeRequest {
    /// The date to classify.
    pub date: NaiveDate,
}

/// Request body for `POST /hours`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoursRequest {
    /// Start clock time, `HH:MM`.
    pub start_time: String,
    /// End clock time, `HH:MM`.
    pub end_time: String,
}

/// Request body for `POST /eligibility`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityRequest {
    /// The claiming employee.
    pub employee_id: String,
    /// The overtime date.
    pub claim_date: NaiveDate,
}

/// Request body for `POST /amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountRequest {
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Hours to price.
    pub total_hours: Decimal,
    /// Day type of the overtime date.
    pub day_type: DayType,
    /// Employee category; `standard` when omitted.
    #[serde(default)]
    pub employee_category: Option<String>,
    /// Date used to pick the effective formula; today when omitted.
    #[serde(default)]
    pub claim_date: Option<NaiveDate>,
}

/// Request body for `POST /thresholds`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdRequest {
    /// The claiming employee.
    pub employee_id: String,
    /// Hours the new claim would add.
    pub requested_hours: Decimal,
    /// The overtime date.
    pub requested_date: NaiveDate,
}

/// Request body for `POST /requests` and `POST /requests/quote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitClaimRequest {
    /// The claiming employee.
    pub employee_id: String,
    /// The date the overtime was worked.
    pub ot_date: NaiveDate,
    /// Start clock time, `HH:MM`.
    pub start_time: String,
    /// End clock time, `HH:MM`.
    pub end_time: String,
    /// Why the overtime was needed.
    pub reason: String,
    /// Link to supporting evidence.
    #[serde(default)]
    pub attachment_url: Option<String>,
}

impl SubmitClaimRequest {
    /// Splits into the employee id and the claim.
    pub fn into_parts(self) -> (String, SubmitClaim) {
        (
            self.employee_id,
            SubmitClaim {
                ot_date: self.ot_date,
                start_time: self.start_time,
                end_time: self.end_time,
                reason: self.reason,
                attachment_url: self.attachment_url,
            },
        )
    }
}

/// Request body for `POST /requests/{id}/transition`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    /// The workflow action.
    pub action: OtAction,
    /// Who is acting.
    pub actor_id: String,
    /// Remarks; required to reject.
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Request body for `POST /holidays`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolidayRequest {
    /// The holiday date.
    pub date: NaiveDate,
    /// The holiday name.
    pub name: String,
}

impl From<HolidayRequest> for PublicHoliday {
    fn from(req: HolidayRequest) -> Self {
        PublicHoliday {
            date: req.date,
            name: req.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_deserialize_submit_claim_request() {
        let json = r#"{
            "employee_id": "emp_001",
            "ot_date": "2025-01-09",
            "start_time": "18:00",
            "end_time": "20:00",
            "reason": "Month-end closing support"
        }"#;

        let request: SubmitClaimRequest = serde_json::from_str(json).unwrap();
        let (employee_id, claim) = request.into_parts();
        assert_eq!(employee_id, "emp_001");
        assert_eq!(claim.ot_date, NaiveDate::from_ymd_opt(2025, 1, 9).unwrap());
        assert!(claim.attachment_url.is_none());
    }

    #[test]
    fn test_amount_request_accepts_string_or_number_decimals() {
        let json = r#"{
            "basic_salary": "2600.00",
            "total_hours": 2,
            "day_type": "public_holiday"
        }"#;

        let request: AmountRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.basic_salary, Decimal::from_str("2600").unwrap());
        assert_eq!(request.total_hours, Decimal::from(2));
        assert_eq!(request.day_type, DayType::PublicHoliday);
        assert!(request.claim_date.is_none());
    }

    #[test]
    fn test_transition_request_action_is_snake_case() {
        let json = r#"{"action": "reject", "actor_id": "sup_001", "remarks": "Duplicate"}"#;
        let request: TransitionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.action, OtAction::Reject);
        assert_eq!(request.remarks.as_deref(), Some("Duplicate"));
    }

    #[test]
    fn test_unknown_day_type_is_rejected() {
        let json = r#"{"basic_salary": "2600", "total_hours": "2", "day_type": "holiday"}"#;
        assert!(serde_json::from_str::<AmountRequest>(json).is_err());
    }
}
