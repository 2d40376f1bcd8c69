//! In-memory store.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::config::{OtSettings, OtmsConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ApprovalThreshold, EligibilityRule, Employee, HolidayCalendar, OtRequest, OtStatus,
    PublicHoliday, RateFormula,
};

use super::OtStore;

/// An [`OtStore`] held in process memory.
///
/// Configuration collections come from [`OtmsConfig`]; settings, holidays
/// and claims can change at runtime.
#[derive(Debug)]
pub struct MemoryStore {
    settings: RwLock<OtSettings>,
    holidays: RwLock<HolidayCalendar>,
    eligibility_rules: Vec<EligibilityRule>,
    rate_formulas: Vec<RateFormula>,
    thresholds: Vec<ApprovalThreshold>,
    employees: HashMap<String, Employee>,
    requests: RwLock<HashMap<Uuid, OtRequest>>,
}

fn read<T>(lock: &RwLock<T>) -> EngineResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| EngineError::StoreUnavailable {
        message: "store lock poisoned".to_string(),
    })
}

fn write<T>(lock: &RwLock<T>) -> EngineResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| EngineError::StoreUnavailable {
        message: "store lock poisoned".to_string(),
    })
}

impl MemoryStore {
    /// Seeds a store from loaded configuration, with no claims.
    pub fn from_config(config: &OtmsConfig) -> Self {
        Self {
            settings: RwLock::new(config.settings().clone()),
            holidays: RwLock::new(config.holidays().clone()),
            eligibility_rules: config.eligibility_rules().to_vec(),
            rate_formulas: config.rate_formulas().to_vec(),
            thresholds: config.thresholds().to_vec(),
            employees: config.employees().clone(),
            requests: RwLock::new(HashMap::new()),
        }
    }
}

impl OtStore for MemoryStore {
    fn settings(&self) -> EngineResult<OtSettings> {
        Ok(read(&self.settings)?.clone())
    }

    fn upsert_settings(&self, settings: OtSettings) -> EngineResult<OtSettings> {
        settings.validate()?;
        let mut current = write(&self.settings)?;
        *current = settings.clone();
        debug!(rounding_rule = %settings.rounding_rule, "Settings updated");
        Ok(settings)
    }

    fn public_holiday(&self, date: NaiveDate) -> EngineResult<Option<PublicHoliday>> {
        Ok(read(&self.holidays)?.get(date).cloned())
    }

    fn add_holiday(&self, holiday: PublicHoliday) -> EngineResult<Option<PublicHoliday>> {
        Ok(write(&self.holidays)?.insert(holiday))
    }

    fn remove_holiday(&self, date: NaiveDate) -> EngineResult<Option<PublicHoliday>> {
        Ok(write(&self.holidays)?.remove(date))
    }

    fn active_eligibility_rules(&self) -> EngineResult<Vec<EligibilityRule>> {
        Ok(self
            .eligibility_rules
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }

    fn active_rate_formulas(&self) -> EngineResult<Vec<RateFormula>> {
        Ok(self
            .rate_formulas
            .iter()
            .filter(|f| f.is_active)
            .cloned()
            .collect())
    }

    fn active_thresholds(&self) -> EngineResult<Vec<ApprovalThreshold>> {
        Ok(self
            .thresholds
            .iter()
            .filter(|t| t.is_active)
            .cloned()
            .collect())
    }

    fn employee(&self, id: &str) -> EngineResult<Employee> {
        self.employees
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::EmployeeNotFound { id: id.to_string() })
    }

    fn claimed_hours(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Decimal> {
        Ok(read(&self.requests)?
            .values()
            .filter(|r| {
                r.employee_id == employee_id
                    && r.status != OtStatus::Rejected
                    && r.ot_date >= from
                    && r.ot_date <= to
            })
            .map(|r| r.total_hours)
            .sum())
    }

    fn insert_request(&self, request: OtRequest) -> EngineResult<()> {
        let mut requests = write(&self.requests)?;
        if requests.contains_key(&request.id) {
            return Err(EngineError::InvalidInput {
                field: "id".to_string(),
                message: format!("request {} already exists", request.id),
            });
        }
        requests.insert(request.id, request);
        Ok(())
    }

    fn request(&self, id: Uuid) -> EngineResult<OtRequest> {
        read(&self.requests)?
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::RequestNotFound { id: id.to_string() })
    }

    fn update_request(&self, request: OtRequest) -> EngineResult<()> {
        let mut requests = write(&self.requests)?;
        match requests.get_mut(&request.id) {
            Some(existing) => {
                *existing = request;
                Ok(())
            }
            None => Err(EngineError::RequestNotFound {
                id: request.id.to_string(),
            }),
        }
    }

    fn requests_for(&self, employee_id: Option<&str>) -> EngineResult<Vec<OtRequest>> {
        let mut list: Vec<OtRequest> = read(&self.requests)?
            .values()
            .filter(|r| employee_id.is_none_or(|id| r.employee_id == id))
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            b.ot_date
                .cmp(&a.ot_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(list)
    }
}
