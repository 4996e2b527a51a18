//! Total advisory operations.
//!
//! Each operation returns either the model's shaped answer or its sentinel. Failures are logged
//! with `tracing::error!` and never propagated.

use crate::config::AdvisoryConfig;
use crate::provider::{AdvisoryError, AdvisoryResult, CompletionRequest, CompletionService};
use crate::schema::{risk_alerts_schema, symptom_analysis_schema, RiskAlert, SymptomAnalysis};
use serde::de::DeserializeOwned;

pub const DIAGNOSTIC_ADVICE_FALLBACK: &str = "Error: Unable to generate diagnostic advice. Ensure symptoms are provided and your clinical context is valid.";
pub const SYMPTOM_ANALYSIS_DISCLAIMER: &str = "System error during analysis.";
pub const SUMMARY_FALLBACK: &str = "Failed to summarize records.";

/// Substituted when the model returns a differential with a blank disclaimer.
const DEFAULT_DISCLAIMER: &str =
    "AI-generated guidance for clinical staff. This is not a final medical diagnosis.";

const NARRATIVE_TEMPERATURE: f32 = 0.7;
const NARRATIVE_TOP_P: f32 = 0.9;

pub struct AdvisoryService<C> {
    client: C,
    reasoning_model: String,
    fast_model: String,
}

impl<C: CompletionService> AdvisoryService<C> {
    pub fn new(client: C, config: &AdvisoryConfig) -> Self {
        Self {
            client,
            reasoning_model: config.reasoning_model.clone(),
            fast_model: config.fast_model.clone(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Free-text differential summary and next steps for a clinician.
    pub async fn diagnostic_advice(&self, symptoms: &str, history: &str) -> String {
        let prompt = format!(
            "You are a clinical decision support assistant inside a hospital management system.\n\
             Review the symptoms and patient history below and give a concise differential \
             diagnosis summary with suggested next steps for a medical professional.\n\
             Open with a clear disclaimer that this is AI-generated advice and not a final \
             medical diagnosis.\n\n\
             Symptoms: {}\nPatient history: {}",
            symptoms, history
        );
        let request = CompletionRequest::new(&self.reasoning_model, prompt)
            .with_sampling(NARRATIVE_TEMPERATURE, NARRATIVE_TOP_P);

        match self.text(request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("diagnostic advice failed via {}: {}", self.client.name(), e);
                DIAGNOSTIC_ADVICE_FALLBACK.to_owned()
            }
        }
    }

    /// Structured differential for a free-text symptom description.
    pub async fn check_symptoms(&self, symptoms: &str) -> SymptomAnalysis {
        let prompt = format!(
            "Act as an expert clinical diagnostic system. Analyse these symptoms: \"{}\".\n\
             Return a structured differential diagnosis listing potential conditions with \
             specific clinical advice for each.",
            symptoms
        );
        let request = CompletionRequest::new(&self.reasoning_model, prompt)
            .with_schema(symptom_analysis_schema());

        match self.structured::<SymptomAnalysis>(request).await {
            Ok(mut analysis) => {
                if analysis.disclaimer.trim().is_empty() {
                    analysis.disclaimer = DEFAULT_DISCLAIMER.to_owned();
                }
                analysis
            }
            Err(e) => {
                tracing::error!("symptom check failed via {}: {}", self.client.name(), e);
                SymptomAnalysis {
                    disclaimer: SYMPTOM_ANALYSIS_DISCLAIMER.to_owned(),
                    findings: Vec::new(),
                }
            }
        }
    }

    /// Scans a clinical scenario for red flags. An empty list means none found or failure.
    pub async fn analyze_patient_risk(&self, symptoms: &str, history: &str) -> Vec<RiskAlert> {
        let prompt = format!(
            "Analyse this clinical scenario for immediate life-threatening risks or critical \
             clinical alerts.\nSymptoms: {}\nHistory: {}\n\n\
             Focus on red flags such as sepsis, stroke, myocardial infarction or severe drug \
             interactions.",
            symptoms, history
        );
        let request = CompletionRequest::new(&self.reasoning_model, prompt)
            .with_schema(risk_alerts_schema());

        match self.structured::<Vec<RiskAlert>>(request).await {
            Ok(alerts) => alerts,
            Err(e) => {
                tracing::error!("risk analysis failed via {}: {}", self.client.name(), e);
                Vec::new()
            }
        }
    }

    /// Condenses history lines into one professional summary.
    pub async fn summarize_records(&self, records: &[String]) -> String {
        let prompt = format!(
            "Summarise the following patient history records into a clean, professional \
             clinical summary:\n{}",
            records.join("\n")
        );
        let request = CompletionRequest::new(&self.fast_model, prompt);

        match self.text(request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("record summary failed via {}: {}", self.client.name(), e);
                SUMMARY_FALLBACK.to_owned()
            }
        }
    }

    async fn text(&self, request: CompletionRequest) -> AdvisoryResult<String> {
        let text = self.client.complete(request).await?;
        if text.trim().is_empty() {
            return Err(AdvisoryError::Parse("empty completion".into()));
        }
        Ok(text)
    }

    async fn structured<T: DeserializeOwned>(&self, request: CompletionRequest) -> AdvisoryResult<T> {
        let raw = self.client.complete(request).await?;
        Ok(serde_json::from_str(strip_code_fence(&raw))?)
    }
}

/// Removes a surrounding markdown code fence (with or without a language tag).
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
