//! Settings and holiday calendar maintenance.

use chrono::NaiveDate;
use tracing::info;

use crate::config::OtSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::PublicHoliday;

use super::ClaimService;

impl ClaimService {
    /// Reads the settings record.
    pub fn settings(&self) -> EngineResult<OtSettings> {
        self.store.settings()
    }

    /// Replaces the settings record.
    ///
    /// Claims already priced keep their stored snapshot.
    pub fn update_settings(&self, settings: OtSettings) -> EngineResult<OtSettings> {
        let saved = self.store.upsert_settings(settings).map_err(|e| match e {
            EngineError::InvalidConfig { item, message } => EngineError::InvalidInput {
                field: item,
                message,
            },
            other => other,
        })?;
        info!(
            submission_limit_days = saved.submission_limit_days,
            salary_threshold = %saved.salary_threshold,
            rounding_rule = %saved.rounding_rule,
            "Overtime settings updated"
        );
        Ok(saved)
    }

    /// Registers a public holiday, replacing any on the same date.
    pub fn add_holiday(&self, holiday: PublicHoliday) -> EngineResult<PublicHoliday> {
        let name = holiday.name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput {
                field: "name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        let holiday = PublicHoliday {
            date: holiday.date,
            name: name.to_string(),
        };
        let replaced = self.store.add_holiday(holiday.clone())?;
        info!(
            date = %holiday.date,
            name = %holiday.name,
            replaced = ?replaced.map(|h| h.name),
            "Public holiday added"
        );
        Ok(holiday)
    }

    /// Removes the public holiday on `date`.
    pub fn remove_holiday(&self, date: NaiveDate) -> EngineResult<PublicHoliday> {
        let removed = self
            .store
            .remove_holiday(date)?
            .ok_or(EngineError::HolidayNotFound { date })?;
        info!(date = %date, name = %removed.name, "Public holiday removed");
        Ok(removed)
    }
}
