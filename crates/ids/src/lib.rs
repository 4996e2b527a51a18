//! Identifier generation for hospital records.
//!
//! Every record carries a human-legible identifier assigned once at creation. This crate
//! owns the textual templates for those identifiers and the policies for drawing them:
//!
//! - [`generate_patient_id`]: `P` + zero-padded suffix, retried against the currently loaded
//!   patient collection up to [`MAX_PATIENT_ID_ATTEMPTS`] times. Best effort: when the budget
//!   is exhausted the last candidate is returned even if it collides.
//! - [`generate_mrn`]: `MRN-###-###`, never collision-checked.
//! - [`generate_upi`]: a UUID-v4 shaped token from the OS secure RNG, with a hex-template
//!   fallback that keeps the version and variant bits.
//! - [`ReferenceKind`]: short prefix + random number or millisecond timestamp, used for
//!   ledger, lab, task, audit and other write-once references.
//!
//! Randomness is always injected through [`rand::Rng`] so callers (and tests) decide the
//! source. None of these functions fail; manual identifiers typed by a user are checked with
//! [`PatientId::parse`] by the caller before a write.

mod patient;
mod reference;
mod upi;

pub use patient::{
    generate_mrn, generate_patient_id, is_mrn_shaped, PatientId, MAX_PATIENT_ID_ATTEMPTS,
};
pub use reference::ReferenceKind;
pub use upi::{fallback_upi, generate_upi, is_v4_shaped};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdError {
    /// Identifier does not follow its template
    #[error("Malformed identifier: {0}")]
    Malformed(String),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
