//! Evaluation snapshot and clock.

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::OtSettings;
use crate::error::EngineResult;
use crate::models::{ApprovalThreshold, EligibilityRule, PublicHoliday, RateFormula};
use crate::store::OtStore;

/// Source of "now" for submission windows and audit timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// The system clock, in UTC.
    #[default]
    System,
    /// A frozen instant, for reproducible evaluations.
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// A clock frozen at noon UTC on `date`.
    pub fn fixed_on(date: NaiveDate) -> Self {
        let noon = date
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Clock::Fixed(noon)
    }

    /// The current instant.
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// The current calendar date.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Everything one evaluation reads from the store, fetched once up front.
///
/// Rule functions only ever see this snapshot, so an evaluation can be
/// replayed against the same fixtures and yield the same result.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    /// The settings record at evaluation time.
    pub settings: OtSettings,
    /// Active eligibility rules.
    pub eligibility_rules: Vec<EligibilityRule>,
    /// Active rate formulas.
    pub rate_formulas: Vec<RateFormula>,
    /// Active approval thresholds.
    pub thresholds: Vec<ApprovalThreshold>,
    /// The public holiday on the claim date, if any.
    pub holiday: Option<PublicHoliday>,
}

impl EvaluationContext {
    /// Reads a snapshot for a claim dated `claim_date`.
    ///
    /// Any store failure aborts the load; there is no partial snapshot.
    pub fn load(store: &dyn OtStore, claim_date: NaiveDate) -> EngineResult<Self> {
        Ok(Self {
            settings: store.settings()?,
            eligibility_rules: store.active_eligibility_rules()?,
            rate_formulas: store.active_rate_formulas()?,
            thresholds: store.active_thresholds()?,
            holiday: store.public_holiday(claim_date)?,
        })
    }
}
