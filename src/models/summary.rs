//! Per-employee claim summary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OtRequest, OtStatus};

/// Totals over a set of overtime requests.
///
/// Hours and amount only include claims that are not rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtSummary {
    /// Hours across non-rejected claims.
    pub total_hours: Decimal,
    /// Amount across non-rejected claims.
    pub total_amount: Decimal,
    /// Number of claims, rejected included.
    pub total_requests: usize,
    /// Claims awaiting the supervisor or HR.
    pub pending_count: usize,
    /// Claims approved or reviewed.
    pub approved_count: usize,
    /// Rejected claims.
    pub rejected_count: usize,
}

/// Summarises a list of requests.
pub fn summarize<'a, I>(requests: I) -> OtSummary
where
    I: IntoIterator<Item = &'a OtRequest>,
{
    let mut summary = OtSummary::default();
    for request in requests {
        summary.total_requests += 1;
        match request.status {
            OtStatus::PendingVerification | OtStatus::Verified => summary.pending_count += 1,
            OtStatus::Approved | OtStatus::Reviewed => summary.approved_count += 1,
            OtStatus::Rejected => {
                summary.rejected_count += 1;
                continue;
            }
        }
        summary.total_hours += request.total_hours;
        summary.total_amount += request.ot_amount;
    }
    summary
}
