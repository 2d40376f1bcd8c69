//! HTTP request handlers for the overtime engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::OtSettings;
use crate::error::{EngineError, EngineResult};

use super::request::{
    AmountRequest, DayTypeRequest, EligibilityRequest, HolidayRequest, HoursRequest,
    SubmitClaimRequest, ThresholdRequest, TransitionRequest,
};
use super::response::{ApiError, ApiErrorResponse, HoursResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/day-type", post(day_type_handler))
        .route("/hours", post(hours_handler))
        .route("/eligibility", post(eligibility_handler))
        .route("/amount", post(amount_handler))
        .route("/thresholds", post(thresholds_handler))
        .route("/requests", post(submit_handler))
        .route("/requests/quote", post(quote_handler))
        .route("/requests/:id", get(get_request_handler))
        .route("/requests/:id/transition", post(transition_handler))
        .route("/employees/:id/summary", get(summary_handler))
        .route("/settings", get(get_settings_handler).put(put_settings_handler))
        .route("/holidays", post(add_holiday_handler))
        .route("/holidays/:date", delete(remove_holiday_handler))
        .with_state(state)
}

/// Turns a body rejection into a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // serde's message carries the field name
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse {
        status: StatusCode::BAD_REQUEST,
        error,
    }
    .into_response()
}

/// Unwraps a JSON body or returns the rejection response from the handler.
macro_rules! json_body {
    ($payload:expr, $correlation_id:expr) => {
        match $payload {
            Ok(Json(body)) => body,
            Err(rejection) => return rejection_response($correlation_id, rejection),
        }
    };
}

/// Renders an engine result, logging how the request ended.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    operation: &str,
    started: Instant,
    success: StatusCode,
    result: EngineResult<T>,
) -> Response {
    match result {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                operation,
                duration_us = started.elapsed().as_micros() as u64,
                "Request completed"
            );
            (
                success,
                [(header::CONTENT_TYPE, "application/json")],
                Json(body),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                error = %err,
                "Request failed"
            );
            let api_error: ApiErrorResponse = err.into();
            api_error.into_response()
        }
    }
}

fn begin(operation: &str) -> (Uuid, Instant) {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, operation, "Processing request");
    (correlation_id, Instant::now())
}

fn parse_request_id(raw: &str) -> EngineResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| EngineError::InvalidInput {
        field: "id".to_string(),
        message: format!("'{}' is not a request id", raw),
    })
}

fn parse_date(raw: &str) -> EngineResult<NaiveDate> {
    raw.parse::<NaiveDate>()
        .map_err(|_| EngineError::InvalidInput {
            field: "date".to_string(),
            message: format!("'{}' is not a YYYY-MM-DD date", raw),
        })
}

/// Handler for POST /day-type.
async fn day_type_handler(
    State(state): State<AppState>,
    payload: Result<Json<DayTypeRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, started) = begin("resolve_day_type");
    let request = json_body!(payload, correlation_id);
    let result = state.service().resolve_day_type(request.date);
    respond(correlation_id, "resolve_day_type", started, StatusCode::OK, result)
}

/// Handler for POST /hours.
async fn hours_handler(
    State(state): State<AppState>,
    payload: Result<Json<HoursRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, started) = begin("compute_hours");
    let request = json_body!(payload, correlation_id);
    let result = state
        .service()
        .compute_hours(&request.start_time, &request.end_time)
        .map(HoursResponse::from);
    respond(correlation_id, "compute_hours", started, StatusCode::OK, result)
}

/// Handler for POST /eligibility.
async fn eligibility_handler(
    State(state): State<AppState>,
    payload: Result<Json<EligibilityRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, started) = begin("check_eligibility");
    let request = json_body!(payload, correlation_id);
    let result = state
        .service()
        .check_eligibility(&request.employee_id, request.claim_date);
    respond(correlation_id, "check_eligibility", started, StatusCode::OK, result)
}

/// Handler for POST /amount.
async fn amount_handler(
    State(state): State<AppState>,
    payload: Result<Json<AmountRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, started) = begin("calculate_amount");
    let request = json_body!(payload, correlation_id);
    let service = state.service();
    let claim_date = request
        .claim_date
        .unwrap_or_else(|| service.clock().today());
    let result = service.calculate_amount(
        request.basic_salary,
        request.total_hours,
        request.day_type,
        request.employee_category.as_deref(),
        claim_date,
    );
    respond(correlation_id, "calculate_amount", started, StatusCode::OK, result)
}

/// Handler for POST /thresholds.
async fn thresholds_handler(
    State(state): State<AppState>,
    payload: Result<Json<ThresholdRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, started) = begin("check_thresholds");
    let request = json_body!(payload, correlation_id);
    let result = state.service().check_thresholds(
        &request.employee_id,
        request.requested_hours,
        request.requested_date,
    );
    respond(correlation_id, "check_thresholds", started, StatusCode::OK, result)
}

/// Handler for POST /requests/quote.
async fn quote_handler(
    State(state): State<AppState>,
    payload: Result<Json<SubmitClaimRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, started) = begin("quote_claim");
    let (employee_id, claim) = json_body!(payload, correlation_id).into_parts();
    let result = state.service().quote(&employee_id, &claim);
    respond(correlation_id, "quote_claim", started, StatusCode::OK, result)
}

/// Handler for POST /requests.
async fn submit_handler(
    State(state): State<AppState>,
    payload: Result<Json<SubmitClaimRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, started) = begin("submit_claim");
    let (employee_id, claim) = json_body!(payload, correlation_id).into_parts();
    let result = state.service().submit(&employee_id, &claim);
    respond(correlation_id, "submit_claim", started, StatusCode::CREATED, result)
}

/// Handler for GET /requests/:id.
async fn get_request_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let (correlation_id, started) = begin("get_request");
    let result = parse_request_id(&id).and_then(|id| state.service().request(id));
    respond(correlation_id, "get_request", started, StatusCode::OK, result)
}

/// Handler for POST /requests/:id/transition.
async fn transition_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TransitionRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, started) = begin("transition_request");
    let request = json_body!(payload, correlation_id);
    let result = parse_request_id(&id).and_then(|id| {
        state.service().transition(
            id,
            request.action,
            &request.actor_id,
            request.remarks.as_deref(),
        )
    });
    respond(correlation_id, "transition_request", started, StatusCode::OK, result)
}

/// Handler for GET /employees/:id/summary.
async fn summary_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let (correlation_id, started) = begin("claim_summary");
    let result = state.service().summary(&id);
    respond(correlation_id, "claim_summary", started, StatusCode::OK, result)
}

/// Handler for GET /settings.
async fn get_settings_handler(State(state): State<AppState>) -> Response {
    let (correlation_id, started) = begin("get_settings");
    let result = state.service().settings();
    respond(correlation_id, "get_settings", started, StatusCode::OK, result)
}

/// Handler for PUT /settings.
async fn put_settings_handler(
    State(state): State<AppState>,
    payload: Result<Json<OtSettings>, JsonRejection>,
) -> Response {
    let (correlation_id, started) = begin("update_settings");
    let settings = json_body!(payload, correlation_id);
    let result = state.service().update_settings(settings);
    respond(correlation_id, "update_settings", started, StatusCode::OK, result)
}

/// Handler for POST /holidays.
async fn add_holiday_handler(
    State(state): State<AppState>,
    payload: Result<Json<HolidayRequest>, JsonRejection>,
) -> Response {
    let (correlation_id, started) = begin("add_holiday");
    let request = json_body!(payload, correlation_id);
    let result = state.service().add_holiday(request.into());
    respond(correlation_id, "add_holiday", started, StatusCode::CREATED, result)
}

/// Handler for DELETE /holidays/:date.
async fn remove_holiday_handler(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Response {
    let (correlation_id, started) = begin("remove_holiday");
    let result = parse_date(&date).and_then(|date| state.service().remove_holiday(date));
    respond(correlation_id, "remove_holiday", started, StatusCode::OK, result)
}
