//! Approval workflow and claim summaries.

use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{OtAction, OtRequest, OtSummary, summarize};

use super::ClaimService;

impl ClaimService {
    /// Fetches a stored claim.
    pub fn request(&self, id: Uuid) -> EngineResult<OtRequest> {
        self.store.request(id)
    }

    /// Applies a workflow action to a stored claim and persists it.
    ///
    /// The claim is re-read under the employee's lock so two reviewers
    /// acting at once cannot both move it out of the same status.
    pub fn transition(
        &self,
        id: Uuid,
        action: OtAction,
        actor_id: &str,
        remarks: Option<&str>,
    ) -> EngineResult<OtRequest> {
        let actor_id = actor_id.trim();
        if actor_id.is_empty() {
            return Err(EngineError::InvalidInput {
                field: "actor_id".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        let employee_id = self.store.request(id)?.employee_id;
        self.with_employee_lock(&employee_id, || {
            let mut request = self.store.request(id)?;
            let settings = self.store.settings()?;
            let from = request.status;
            let to = request.apply_action(
                action,
                actor_id,
                remarks,
                self.clock.now(),
                settings.board_review_required,
            )?;
            self.store.update_request(request.clone())?;
            info!(request_id = %id, %from, %to, actor_id, "Overtime request transitioned");
            Ok(request)
        })
    }

    /// Totals an employee's claims.
    pub fn summary(&self, employee_id: &str) -> EngineResult<OtSummary> {
        self.store.employee(employee_id)?;
        let requests = self.store.requests_for(Some(employee_id))?;
        Ok(summarize(&requests))
    }
}
