//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the overtime
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{HolidayCalendar, HolidayFile, PublicHoliday};

use super::types::{
    ApprovalThresholdsFile, EligibilityRulesFile, EmployeesFile, OtSettings, OtmsConfig,
    RateFormulasFile,
};

/// Loads and provides access to the overtime configuration.
///
/// # Directory Structure
///
/// ```text
/// config/otms/
/// ├── settings.yaml             # Organisation-wide settings
/// ├── eligibility_rules.yaml    # Salary bands and scoping
/// ├── rate_formulas.yaml        # Effective-dated formulas per day type
/// ├── approval_thresholds.yaml  # Hour and amount limits
/// ├── employees.yaml            # Employee directory
/// └── holidays/
///     └── 2025.yaml             # Public holidays for one year
/// ```
///
/// # Example
///
/// ```no_run
/// use otms_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/otms").unwrap();
/// println!("Loaded {} rate formulas", loader.config().rate_formulas().len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: OtmsConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - Any record breaks its invariants (`InvalidConfig`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<OtSettings>(&path.join("settings.yaml"))?;
        let rules = Self::load_yaml::<EligibilityRulesFile>(&path.join("eligibility_rules.yaml"))?;
        let formulas = Self::load_yaml::<RateFormulasFile>(&path.join("rate_formulas.yaml"))?;
        let thresholds =
            Self::load_yaml::<ApprovalThresholdsFile>(&path.join("approval_thresholds.yaml"))?;
        let employees = Self::load_yaml::<EmployeesFile>(&path.join("employees.yaml"))?;
        let holidays = Self::load_holidays(&path.join("holidays"))?;

        debug!(
            config_dir = %path.display(),
            rules = rules.rules.len(),
            formulas = formulas.formulas.len(),
            thresholds = thresholds.thresholds.len(),
            employees = employees.employees.len(),
            holidays = holidays.len(),
            "Loaded overtime configuration"
        );

        let config = OtmsConfig::new(
            settings,
            rules.rules,
            formulas.formulas,
            thresholds.thresholds,
            employees.employees,
            holidays,
        )?;

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every holiday file in the holidays directory.
    ///
    /// A missing directory means no holidays are configured.
    fn load_holidays(holidays_dir: &Path) -> EngineResult<HolidayCalendar> {
        if !holidays_dir.exists() {
            return Ok(HolidayCalendar::default());
        }

        let dir_str = holidays_dir.display().to_string();
        let entries = fs::read_dir(holidays_dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut holidays: Vec<PublicHoliday> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let file = Self::load_yaml::<HolidayFile>(&path)?;
                holidays.extend(file.holidays);
            }
        }

        Ok(HolidayCalendar::from_holidays(holidays))
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &OtmsConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> OtmsConfig {
        self.config
    }
}
