//! # FIH Advisory
//!
//! Clinical decision-support calls over a hosted completion service.
//!
//! Every public operation on [`AdvisoryService`] is total: transport failures, malformed JSON
//! and enum values outside the closed sets all collapse into a fixed sentinel value after being
//! logged. Callers never see an [`AdvisoryError`].
//!
//! The network is reached only through the [`CompletionService`] trait. [`GeminiClient`] is the
//! production implementation; tests plug in scripted fakes.
//!
//! This crate has no dependency on the record store.

pub mod config;
pub mod gemini;
pub mod provider;
pub mod schema;
pub mod service;

pub use config::AdvisoryConfig;
pub use gemini::GeminiClient;
pub use provider::{AdvisoryError, AdvisoryResult, CompletionRequest, CompletionService};
pub use schema::{Probability, RiskAlert, Severity, SymptomAnalysis, SymptomFinding, Urgency};
pub use service::{
    AdvisoryService, DIAGNOSTIC_ADVICE_FALLBACK, SUMMARY_FALLBACK, SYMPTOM_ANALYSIS_DISCLAIMER,
};
