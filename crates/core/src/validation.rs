//! Input validation applied before any record is built.

use crate::constants::{CLINIC_TYPES, DEFAULT_EMAIL_DOMAIN};
use crate::model::Patient;
use crate::{HospitalError, HospitalResult};
use fih_ids::PatientId;
use fih_types::{NonEmptyText, TextError};

/// Converts a mandatory form field, reporting `field` by name when it is blank.
pub fn required(field: &'static str, value: &str) -> HospitalResult<NonEmptyText> {
    NonEmptyText::new(value).map_err(|_| HospitalError::MissingField(field))
}

/// Like [`required`], but also rejects input longer than `max` characters.
pub fn required_bounded(
    field: &'static str,
    value: &str,
    max: usize,
) -> HospitalResult<NonEmptyText> {
    NonEmptyText::bounded(value, max).map_err(|e| match e {
        TextError::Empty => HospitalError::MissingField(field),
        TextError::TooLong { max } => {
            HospitalError::InvalidInput(format!("{} exceeds {} characters", field, max))
        }
    })
}

/// Resolves a clinic name, ignoring case, to its entry in [`CLINIC_TYPES`].
pub fn clinic_type(value: &str) -> HospitalResult<&'static str> {
    let wanted = required("clinicType", value)?;
    CLINIC_TYPES
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(wanted.as_str()))
        .ok_or_else(|| HospitalError::InvalidInput(format!("unknown clinic: {}", wanted)))
}

/// Checks a manually entered patient id for shape and uniqueness against `existing`.
///
/// # Errors
///
/// - [`HospitalError::MalformedPatientId`] unless the id matches `P` plus 3 to 5 digits.
/// - [`HospitalError::PatientIdTaken`] if a loaded patient already uses it.
pub fn validate_manual_patient_id(candidate: &str, existing: &[Patient]) -> HospitalResult<PatientId> {
    let id = PatientId::parse(candidate.trim())?;
    if existing.iter().any(|p| p.id == id.as_str()) {
        return Err(HospitalError::PatientIdTaken(id.to_string()));
    }
    Ok(id)
}

/// Rejects negative, NaN and infinite amounts.
pub fn money(field: &'static str, amount: f64) -> HospitalResult<f64> {
    if amount.is_finite() && amount >= 0.0 {
        return Ok(amount);
    }
    Err(HospitalError::InvalidInput(format!(
        "{} must be a non-negative amount, got {}",
        field, amount
    )))
}

/// Email synthesised for a patient registered without one: lowercased name with each
/// whitespace character replaced by `.`, at the hospital domain.
pub fn default_email(name: &str) -> String {
    let local: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '.' } else { c })
        .collect();
    format!("{}@{}", local, DEFAULT_EMAIL_DOMAIN)
}
