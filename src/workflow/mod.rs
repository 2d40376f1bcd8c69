//! Submission and approval workflow.
//!
//! [`ClaimService`] is the entry point the HTTP layer calls. It reads an
//! [`EvaluationContext`] from the store for each evaluation, runs the pure
//! rule functions in `calculation`, and writes the priced claim back.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use otms_engine::config::ConfigLoader;
//! use otms_engine::store::MemoryStore;
//! use otms_engine::workflow::{ClaimService, Clock, SubmitClaim};
//! use chrono::NaiveDate;
//!
//! let loader = ConfigLoader::load("./config/otms").unwrap();
//! let service = ClaimService::new(
//!     Arc::new(MemoryStore::from_config(loader.config())),
//!     Clock::System,
//! );
//! let claim = SubmitClaim {
//!     ot_date: NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
//!     start_time: "18:00".to_string(),
//!     end_time: "20:00".to_string(),
//!     reason: "Month-end closing support".to_string(),
//!     attachment_url: None,
//! };
//! let outcome = service.submit("emp_001", &claim).unwrap();
//! println!("Claimed {}", outcome.request.ot_amount);
//! ```

mod admin;
mod approval;
mod context;
mod submission;

pub use context::{Clock, EvaluationContext};
pub use submission::{ClaimService, DayTypeResolution, SubmissionOutcome, SubmitClaim};
