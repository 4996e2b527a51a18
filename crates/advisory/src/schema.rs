//! Structured advisory output: typed records and the response schemas sent to the model.
//!
//! Enum values outside the closed sets fail deserialization, which the service treats the same
//! as malformed JSON.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Probability {
    #[serde(alias = "LOW", alias = "low")]
    Low,
    #[serde(alias = "MEDIUM", alias = "medium")]
    Medium,
    #[serde(alias = "HIGH", alias = "high")]
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Urgency {
    Emergent,
    Urgent,
    Routine,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// One candidate condition in a symptom differential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomFinding {
    pub condition: String,
    pub probability: Probability,
    pub urgency: Urgency,
    pub reasoning: String,
    pub clinical_advice: String,
    pub recommended_actions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomAnalysis {
    pub disclaimer: String,
    pub findings: Vec<SymptomFinding>,
}

/// A safety flag raised by the risk scan and stored on the patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAlert {
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

pub fn symptom_analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "disclaimer": {"type": "STRING"},
            "findings": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "condition": {"type": "STRING"},
                        "probability": {"type": "STRING", "description": "Low, Medium, or High"},
                        "urgency": {"type": "STRING", "description": "EMERGENT, URGENT, or ROUTINE"},
                        "reasoning": {"type": "STRING"},
                        "clinicalAdvice": {"type": "STRING"},
                        "recommendedActions": {"type": "ARRAY", "items": {"type": "STRING"}}
                    },
                    "required": [
                        "condition", "probability", "urgency",
                        "reasoning", "clinicalAdvice", "recommendedActions"
                    ]
                }
            }
        },
        "required": ["disclaimer", "findings"]
    })
}

pub fn risk_alerts_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "severity": {"type": "STRING", "description": "One of CRITICAL, WARNING, INFO"},
                "title": {"type": "STRING", "description": "Short name of the risk"},
                "description": {"type": "STRING", "description": "Clinical reasoning for the alert"}
            },
            "required": ["severity", "title", "description"]
        }
    })
}
