//! HTTP API for the overtime engine.
//!
//! Exposes the engine's calculations, the submission and approval
//! workflow, and settings maintenance as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AmountRequest, DayTypeRequest, EligibilityRequest, HolidayRequest, HoursRequest,
    SubmitClaimRequest, ThresholdRequest, TransitionRequest,
};
pub use response::{ApiError, ApiErrorResponse, HoursResponse};
pub use state::AppState;
