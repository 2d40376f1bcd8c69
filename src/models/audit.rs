//! Audit trace models.
//!
//! Every decision the engine takes while admitting and pricing a claim is
//! recorded as an [`AuditStep`]. The trace is stored with the claim so the
//! computed amount can be explained long after the formulas have changed.

use serde::{Deserialize, Serialize};

/// A single step in the calculation audit trace.
///
/// # Example
///
/// ```
/// use otms_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "day_type_resolution".to_string(),
///     rule_name: "Day Type Resolution".to_string(),
///     source: None,
///     input: serde_json::json!({"date": "2025-08-31"}),
///     output: serde_json::json!({"day_type": "public_holiday"}),
///     reasoning: "2025-08-31 is the public holiday 'National Day'".to_string(),
/// };
/// assert_eq!(step.step_number, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number in the calculation.
    pub step_number: u32,
    /// Identifier of the engine rule applied.
    pub rule_id: String,
    /// Human-readable name of the rule.
    pub rule_name: String,
    /// Id of the configuration record that drove the decision, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Input values for this step.
    pub input: serde_json::Value,
    /// Output values from this step.
    pub output: serde_json::Value,
    /// Plain-language explanation of the decision.
    pub reasoning: String,
}

/// A warning raised during calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// Warning code for programmatic handling.
    pub code: String,
    /// Human-readable warning message.
    pub message: String,
    /// Severity ("low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for one claim evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// Returns the number the next step should carry.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Appends a step.
    pub fn push(&mut self, step: AuditStep) {
        self.steps.push(step);
    }

    /// Appends a warning.
    pub fn warn(&mut self, code: &str, message: impl Into<String>, severity: &str) {
        self.warnings.push(AuditWarning {
            code: code.to_string(),
            message: message.into(),
            severity: severity.to_string(),
        });
    }
}
