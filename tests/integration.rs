//! Integration tests for the overtime engine HTTP API.
//!
//! This test suite covers:
//! - The worked pricing example and claim storage
//! - Overnight claims
//! - Day type resolution against the holiday calendar
//! - Eligibility refusals
//! - Effective-dated formula selection
//! - Threshold aggregation
//! - The approval workflow
//! - Error cases
//! - Out-of-range inputs and settings

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;

use otms_engine::api::{AppState, create_router};
use otms_engine::config::ConfigLoader;
use otms_engine::store::{MemoryStore, OtStore};
use otms_engine::workflow::{ClaimService, Clock};

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let loader = ConfigLoader::load("./config/otms").expect("Failed to load config");
    let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
    AppState::from_config(loader.config(), Clock::fixed_on(today))
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn field_decimal(json: &Value, field: &str) -> Decimal {
    decimal(json[field].as_str().unwrap_or_else(|| panic!("{} is not a string: {}", field, json)))
}

async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
    let response = router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

fn claim(employee_id: &str, ot_date: &str, start: &str, end: &str) -> Value {
    json!({
        "employee_id": employee_id,
        "ot_date": ot_date,
        "start_time": start,
        "end_time": end,
        "reason": "Month-end closing support"
    })
}

async fn submit(state: &AppState, body: Value) -> (StatusCode, Value) {
    send(create_router(state.clone()), "POST", "/requests", Some(body)).await
}

async fn transition(state: &AppState, id: &str, body: Value) -> (StatusCode, Value) {
    let uri = format!("/requests/{}/transition", id);
    send(create_router(state.clone()), "POST", &uri, Some(body)).await
}

// =============================================================================
// SECTION 1: Worked Example
// =============================================================================

#[tokio::test]
async fn test_weekday_claim_prices_at_37_50() {
    let state = create_test_state();
    let (status, json) = submit(&state, claim("emp_001", "2025-01-09", "18:00", "20:00")).await;

    assert_eq!(status, StatusCode::CREATED);
    let request = &json["request"];
    assert_eq!(request["day_type"], "weekday");
    assert_eq!(request["orp"], "100.00");
    assert_eq!(request["hrp"], "12.50");
    assert_eq!(request["ot_amount"], "37.50");
    assert_eq!(field_decimal(request, "total_hours"), decimal("2"));
    assert_eq!(request["status"], "pending_verification");
    assert_eq!(request["formula_id"], "f_weekday");
    assert_eq!(request["eligibility_rule_id"], "rule_general");
    assert_eq!(json["warnings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_submitted_claim_can_be_fetched() {
    let state = create_test_state();
    let (_, json) = submit(&state, claim("emp_001", "2025-01-09", "18:00", "20:00")).await;
    let id = json["request"]["id"].as_str().unwrap();

    let uri = format!("/requests/{}", id);
    let (status, fetched) = send(create_router(state.clone()), "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["ot_amount"], "37.50");
    assert!(!fetched["audit_trace"]["steps"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_quote_matches_submission_without_storing() {
    let state = create_test_state();
    let (status, quote) = send(
        create_router(state.clone()),
        "POST",
        "/requests/quote",
        Some(claim("emp_001", "2025-01-09", "18:00", "20:00")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["request"]["ot_amount"], "37.50");

    let (_, summary) = send(create_router(state), "GET", "/employees/emp_001/summary", None).await;
    assert_eq!(summary["total_requests"], 0);
}

// =============================================================================
// SECTION 2: Overnight Claims
// =============================================================================

#[tokio::test]
async fn test_overnight_hours_are_eight() {
    let (status, json) = send(
        create_router_for_test(),
        "POST",
        "/hours",
        Some(json!({"start_time": "22:00", "end_time": "06:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(field_decimal(&json, "total_hours"), decimal("8"));
    assert_eq!(json["overnight"], true);
}

#[tokio::test]
async fn test_overnight_claim_warns_on_daily_limit() {
    let state = create_test_state();
    let (status, json) = submit(&state, claim("emp_001", "2025-01-08", "22:00", "06:00")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["request"]["ot_amount"], "150.00");
    let warnings = json["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0],
        "daily limit: current 0 + requested 8 = 8 exceeds limit of 4"
    );
}

// =============================================================================
// SECTION 3: Day Types
// =============================================================================

#[tokio::test]
async fn test_day_types() {
    let cases = [
        ("2025-01-09", "weekday"),
        ("2025-01-11", "saturday"),
        ("2025-01-12", "sunday"),
        ("2025-12-25", "public_holiday"),
        ("2025-08-31", "public_holiday"),
    ];
    for (date, expected) in cases {
        let (status, json) = send(
            create_router_for_test(),
            "POST",
            "/day-type",
            Some(json!({ "date": date })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["day_type"], expected, "date {}", date);
    }
}

// =============================================================================
// SECTION 4: Eligibility
// =============================================================================

#[tokio::test]
async fn test_submission_window_closed() {
    let state = create_test_state();
    let (status, json) = submit(&state, claim("emp_001", "2025-01-05", "18:00", "20:00")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "INELIGIBLE");
    assert!(json["details"].as_str().unwrap().starts_with("submission window closed"));
}

#[tokio::test]
async fn test_last_day_of_window_is_open() {
    let state = create_test_state();
    let (status, _) = submit(&state, claim("emp_001", "2025-01-07", "18:00", "20:00")).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_future_claim_ineligible() {
    let state = create_test_state();
    let (status, json) = submit(&state, claim("emp_001", "2025-01-11", "09:00", "11:00")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["details"].as_str().unwrap().contains("in the future"));
}

#[tokio::test]
async fn test_salary_above_threshold_ineligible() {
    let state = create_test_state();
    let (status, json) = submit(&state, claim("emp_003", "2025-01-09", "18:00", "20:00")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["details"].as_str().unwrap().starts_with("salary exceeds threshold"));
}

#[tokio::test]
async fn test_supervisor_band_admits_higher_salary() {
    let (status, json) = send(
        create_router_for_test(),
        "POST",
        "/eligibility",
        Some(json!({"employee_id": "sup_001", "claim_date": "2025-01-09"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_eligible"], true);
    assert_eq!(json["matched_rule_id"], "rule_ops_supervisors");
}

#[tokio::test]
async fn test_missing_salary_is_invalid_employee() {
    let state = create_test_state();
    let (status, json) = submit(&state, claim("emp_005", "2025-01-09", "18:00", "20:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_EMPLOYEE");
}

#[tokio::test]
async fn test_unknown_employee_not_found() {
    let state = create_test_state();
    let (status, json) = submit(&state, claim("emp_404", "2025-01-09", "18:00", "20:00")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "EMPLOYEE_NOT_FOUND");
}

// =============================================================================
// SECTION 5: Pricing
// =============================================================================

async fn post_amount(body: Value) -> (StatusCode, Value) {
    send(create_router_for_test(), "POST", "/amount", Some(body)).await
}

#[tokio::test]
async fn test_public_holiday_amount() {
    let (status, json) = post_amount(json!({
        "basic_salary": "2600",
        "total_hours": "2",
        "day_type": "public_holiday",
        "claim_date": "2025-08-31"
    }))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ot_amount"], "75.00");
}

#[tokio::test]
async fn test_closed_formula_still_prices_historical_dates() {
    let (status, json) = post_amount(json!({
        "basic_salary": "2600",
        "total_hours": "2",
        "day_type": "weekday",
        "claim_date": "2023-06-01"
    }))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["formula_id"], "f_weekday_2023");
    assert_eq!(json["ot_amount"], "31.25");
}

#[tokio::test]
async fn test_formula_boundary_switches_on_effective_from() {
    let (_, json) = post_amount(json!({
        "basic_salary": "2600",
        "total_hours": "2",
        "day_type": "weekday",
        "claim_date": "2024-01-01"
    }))
    .await;
    assert_eq!(json["formula_id"], "f_weekday");
}

#[tokio::test]
async fn test_no_formula_is_unpriceable() {
    let (status, json) = post_amount(json!({
        "basic_salary": "2600",
        "total_hours": "2",
        "day_type": "weekday",
        "claim_date": "2022-06-01"
    }))
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "FORMULA_NOT_FOUND");
}

#[tokio::test]
async fn test_shift_formula_on_public_holiday() {
    let (status, json) = post_amount(json!({
        "basic_salary": "3120",
        "total_hours": "2",
        "day_type": "public_holiday",
        "employee_category": "shift",
        "claim_date": "2025-08-31"
    }))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["formula_id"], "f_public_holiday_shift");
    assert_eq!(json["ot_amount"], "330.00");
}

#[tokio::test]
async fn test_zero_salary_is_invalid_employee() {
    let (status, json) = post_amount(json!({
        "basic_salary": "0",
        "total_hours": "2",
        "day_type": "weekday",
        "claim_date": "2025-01-09"
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_EMPLOYEE");
}

// =============================================================================
// SECTION 6: Thresholds
// =============================================================================

async fn post_thresholds(state: &AppState, hours: &str) -> Value {
    let (status, json) = send(
        create_router(state.clone()),
        "POST",
        "/thresholds",
        Some(json!({
            "employee_id": "emp_001",
            "requested_hours": hours,
            "requested_date": "2025-01-10"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json
}

fn weekly_violation(report: &Value) -> Option<&Value> {
    report["violations"]
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["type"] == "weekly_limit")
}

#[tokio::test]
async fn test_weekly_limit_scenario() {
    let state = create_test_state();
    submit(&state, claim("emp_001", "2025-01-08", "18:00", "21:00")).await;
    submit(&state, claim("emp_001", "2025-01-09", "18:00", "21:00")).await;

    let report = post_thresholds(&state, "16").await;
    let weekly = weekly_violation(&report).expect("weekly violation");
    assert_eq!(field_decimal(weekly, "current"), decimal("6"));
    assert_eq!(field_decimal(weekly, "requested"), decimal("16"));
    assert_eq!(field_decimal(weekly, "total"), decimal("22"));
    assert_eq!(field_decimal(weekly, "limit"), decimal("20"));
    assert_eq!(weekly["blocking"], false);

    let report = post_thresholds(&state, "10").await;
    assert!(weekly_violation(&report).is_none());
}

#[tokio::test]
async fn test_previous_week_does_not_count() {
    let loader = ConfigLoader::load("./config/otms").unwrap();
    let store: Arc<dyn OtStore> = Arc::new(MemoryStore::from_config(loader.config()));
    let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    let earlier = AppState::new(ClaimService::new(store.clone(), Clock::fixed_on(monday)));
    let friday = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
    let state = AppState::new(ClaimService::new(store, Clock::fixed_on(friday)));

    // 2025-01-05 is the Sunday closing the previous ISO week
    let (status, _) = submit(&earlier, claim("emp_001", "2025-01-05", "09:00", "12:00")).await;
    assert_eq!(status, StatusCode::CREATED);

    let report = post_thresholds(&state, "16").await;
    assert!(weekly_violation(&report).is_none());
}

// =============================================================================
// SECTION 7: Approval Workflow
// =============================================================================

#[tokio::test]
async fn test_full_approval_chain() {
    let state = create_test_state();
    let (_, json) = submit(&state, claim("emp_001", "2025-01-09", "18:00", "20:00")).await;
    let id = json["request"]["id"].as_str().unwrap().to_string();

    let (status, r) = transition(&state, &id, json!({"action": "verify", "actor_id": "sup_001"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(r["status"], "verified");
    assert_eq!(r["supervisor_id"], "sup_001");

    let (status, r) = transition(
        &state,
        &id,
        json!({"action": "approve", "actor_id": "hr_001", "remarks": "OK for payroll"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(r["status"], "approved");
    assert_eq!(r["hr_remarks"], "OK for payroll");

    let (status, r) = transition(&state, &id, json!({"action": "review", "actor_id": "bod_001"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(r["status"], "reviewed");
    assert_eq!(r["ot_amount"], "37.50");

    let (status, json) = transition(&state, &id, json!({"action": "reject", "actor_id": "hr_001", "remarks": "Too late"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_cannot_skip_verification() {
    let state = create_test_state();
    let (_, json) = submit(&state, claim("emp_001", "2025-01-09", "18:00", "20:00")).await;
    let id = json["request"]["id"].as_str().unwrap().to_string();

    let (status, json) = transition(&state, &id, json!({"action": "approve", "actor_id": "hr_001"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_reject_requires_remarks() {
    let state = create_test_state();
    let (_, json) = submit(&state, claim("emp_001", "2025-01-09", "18:00", "20:00")).await;
    let id = json["request"]["id"].as_str().unwrap().to_string();

    let (status, json) = transition(&state, &id, json!({"action": "reject", "actor_id": "sup_001"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (status, r) = transition(
        &state,
        &id,
        json!({"action": "reject", "actor_id": "sup_001", "remarks": "Not pre-approved"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(r["status"], "rejected");
    assert_eq!(r["supervisor_remarks"], "Not pre-approved");
}

#[tokio::test]
async fn test_summary_excludes_rejected_amounts() {
    let state = create_test_state();
    let (_, first) = submit(&state, claim("emp_001", "2025-01-09", "18:00", "20:00")).await;
    let (_, second) = submit(&state, claim("emp_001", "2025-01-08", "18:00", "19:00")).await;
    let second_id = second["request"]["id"].as_str().unwrap().to_string();
    transition(
        &state,
        &second_id,
        json!({"action": "reject", "actor_id": "sup_001", "remarks": "Duplicate"}),
    )
    .await;
    assert_eq!(first["request"]["status"], "pending_verification");

    let (status, summary) = send(create_router(state), "GET", "/employees/emp_001/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_requests"], 2);
    assert_eq!(summary["pending_count"], 1);
    assert_eq!(summary["rejected_count"], 1);
    assert_eq!(field_decimal(&summary, "total_amount"), decimal("37.50"));
}

// =============================================================================
// SECTION 8: Settings
// =============================================================================

#[tokio::test]
async fn test_rounding_rule_change_applies_to_new_claims() {
    let state = create_test_state();
    let (status, _) = send(
        create_router(state.clone()),
        "PUT",
        "/settings",
        Some(json!({"rounding_rule": "exact"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(
        create_router(state),
        "POST",
        "/hours",
        Some(json!({"start_time": "18:00", "end_time": "19:50"})),
    )
    .await;
    assert_eq!(field_decimal(&json, "total_hours"), decimal("1.83"));
}

// =============================================================================
// SECTION 9: Error Cases
// =============================================================================

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/requests")
                .header("Content-Type", "application/json")
                .body(Body::from("{\"employee_id\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_missing_field_returns_validation_error() {
    let (status, json) = send(
        create_router_for_test(),
        "POST",
        "/requests",
        Some(json!({"employee_id": "emp_001", "ot_date": "2025-01-09"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_content_type() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/day-type")
                .body(Body::from(json!({"date": "2025-01-09"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_time_returns_400() {
    let state = create_test_state();
    let (status, json) = submit(&state, claim("emp_001", "2025-01-09", "18:60", "20:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_TIME");
}

#[tokio::test]
async fn test_zero_length_claim_returns_400() {
    let state = create_test_state();
    let (status, json) = submit(&state, claim("emp_001", "2025-01-09", "18:00", "18:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_short_reason_returns_400() {
    let state = create_test_state();
    let mut body = claim("emp_001", "2025-01-09", "18:00", "20:00");
    body["reason"] = json!("OT");
    let (status, json) = submit(&state, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");
}

// =============================================================================
// SECTION 10: Out-of-Range Inputs
// =============================================================================

#[tokio::test]
async fn test_oversized_submission_window_rejected_and_engine_keeps_working() {
    let state = create_test_state();
    let (status, json) = send(
        create_router(state.clone()),
        "PUT",
        "/settings",
        Some(json!({"submission_limit_days": 200000000})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");

    let (status, json) = send(
        create_router(state.clone()),
        "POST",
        "/eligibility",
        Some(json!({"employee_id": "emp_001", "claim_date": "2025-01-09"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_eligible"], true);

    let (status, _) = submit(&state, claim("emp_001", "2025-01-09", "18:00", "20:00")).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_huge_requested_hours_rejected() {
    let state = create_test_state();
    submit(&state, claim("emp_001", "2025-01-09", "18:00", "20:00")).await;

    let (status, json) = send(
        create_router(state),
        "POST",
        "/thresholds",
        Some(json!({
            "employee_id": "emp_001",
            "requested_hours": "79228162514264337593543950335",
            "requested_date": "2025-01-10"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_zero_hours_are_not_priced() {
    let (status, json) = post_amount(json!({
        "basic_salary": "2600",
        "total_hours": "0",
        "day_type": "weekday",
        "claim_date": "2025-01-09"
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");
}
