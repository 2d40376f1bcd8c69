//! Configuration loading for the overtime engine.
//!
//! This module loads the settings record, eligibility rules, rate formulas,
//! approval thresholds, employee directory and holiday calendar from YAML
//! files.
//!
//! # Example
//!
//! ```no_run
//! use otms_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/otms").unwrap();
//! println!("Rounding rule: {}", loader.config().settings().rounding_rule);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    ApprovalThresholdsFile, EligibilityRulesFile, EmployeesFile, MAX_SUBMISSION_LIMIT_DAYS,
    OtSettings, OtmsConfig, RateFormulasFile,
};
