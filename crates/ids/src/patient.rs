//! Patient identifiers: internal `P###` ids and medical record numbers.

use crate::{IdError, IdResult};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Upper bound on draws made by [`generate_patient_id`] before giving up on uniqueness.
pub const MAX_PATIENT_ID_ATTEMPTS: usize = 1000;

/// Generated suffixes are drawn from `0..GENERATED_SUFFIX_SPACE` and padded to three digits.
const GENERATED_SUFFIX_SPACE: u32 = 1000;

const MIN_SUFFIX_DIGITS: usize = 3;
const MAX_SUFFIX_DIGITS: usize = 5;

/// A syntactically valid internal patient identifier (`P` followed by 3 to 5 digits).
///
/// Uniqueness is not part of this type: it depends on the collection the id is written to,
/// which only the caller knows.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatientId(String);

impl PatientId {
    /// Validates a manually entered identifier against `^P\d{3,5}$`.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Malformed`] for anything else, including lowercase `p`.
    pub fn parse(input: &str) -> IdResult<Self> {
        if Self::is_well_formed(input) {
            return Ok(Self(input.to_owned()));
        }
        Err(IdError::Malformed(format!(
            "patient id must be 'P' followed by 3 to 5 digits, got: '{}'",
            input
        )))
    }

    /// Returns true if `input` matches `^P\d{3,5}$`.
    pub fn is_well_formed(input: &str) -> bool {
        let Some(digits) = input.strip_prefix('P') else {
            return false;
        };
        (MIN_SUFFIX_DIGITS..=MAX_SUFFIX_DIGITS).contains(&digits.len())
            && digits.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PatientId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatientId::parse(s)
    }
}

/// Draws a patient id that `is_taken` reports as free.
///
/// Each attempt draws a fresh three-digit suffix. After [`MAX_PATIENT_ID_ATTEMPTS`] draws the
/// last candidate is returned as-is, so a caller writing to a nearly full id space may receive
/// a colliding id. The function never fails and never loops unboundedly.
pub fn generate_patient_id<R, F>(rng: &mut R, mut is_taken: F) -> PatientId
where
    R: Rng + ?Sized,
    F: FnMut(&str) -> bool,
{
    let mut candidate = String::new();
    for _attempt in 0..MAX_PATIENT_ID_ATTEMPTS {
        candidate = format!("P{:03}", rng.gen_range(0..GENERATED_SUFFIX_SPACE));
        if !is_taken(&candidate) {
            return PatientId(candidate);
        }
    }

    tracing::warn!(
        "patient id space exhausted after {} attempts, reusing {}",
        MAX_PATIENT_ID_ATTEMPTS,
        candidate
    );
    PatientId(candidate)
}

/// Draws a medical record number of the form `MRN-###-###`.
///
/// Both segments are drawn independently from `100..=999`. No collision check is made.
pub fn generate_mrn<R: Rng + ?Sized>(rng: &mut R) -> String {
    let part1 = rng.gen_range(100..1000);
    let part2 = rng.gen_range(100..1000);
    format!("MRN-{}-{}", part1, part2)
}

/// Returns true if `input` looks like `MRN-ddd-ddd`.
pub fn is_mrn_shaped(input: &str) -> bool {
    let Some(rest) = input.strip_prefix("MRN-") else {
        return false;
    };
    match rest.split_once('-') {
        Some((a, b)) => [a, b]
            .iter()
            .all(|seg| seg.len() == 3 && seg.bytes().all(|c| c.is_ascii_digit())),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_parse_accepts_three_to_five_digits() {
        for ok in ["P000", "P1234", "P99999"] {
            assert!(PatientId::parse(ok).is_ok(), "{} should be accepted", ok);
        }
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        for bad in ["", "P", "P12", "P123456", "p123", "X123", "P12a", " P123", "P123 "] {
            assert!(
                matches!(PatientId::parse(bad), Err(IdError::Malformed(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_generate_patient_id_avoids_taken_ids() {
        let mut rng = StdRng::seed_from_u64(7);
        let taken: HashSet<String> = (0..500).map(|n| format!("P{:03}", n)).collect();

        for _ in 0..50 {
            let id = generate_patient_id(&mut rng, |c| taken.contains(c));
            assert!(!taken.contains(id.as_str()));
            assert!(PatientId::is_well_formed(id.as_str()));
        }
    }

    #[test]
    fn test_generate_patient_id_in_nearly_full_space_is_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        let taken: HashSet<String> = (0..999).map(|n| format!("P{:03}", n)).collect();

        for _ in 0..1000 {
            let mut calls = 0usize;
            let id = generate_patient_id(&mut rng, |c| {
                calls += 1;
                taken.contains(c)
            });

            assert!(calls <= MAX_PATIENT_ID_ATTEMPTS, "retry budget exceeded");
            assert!(
                id.as_str() == "P999" || taken.contains(id.as_str()),
                "unexpected id {}",
                id
            );
        }
    }

    #[test]
    fn test_generate_patient_id_returns_last_candidate_when_exhausted() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut calls = 0usize;
        let id = generate_patient_id(&mut rng, |_| {
            calls += 1;
            true
        });

        assert_eq!(calls, MAX_PATIENT_ID_ATTEMPTS);
        assert!(PatientId::is_well_formed(id.as_str()));
    }

    #[test]
    fn test_generate_mrn_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let mrn = generate_mrn(&mut rng);
            assert!(is_mrn_shaped(&mrn), "bad mrn {}", mrn);
        }
    }

    #[test]
    fn test_is_mrn_shaped() {
        assert!(is_mrn_shaped("MRN-442-991"));
        assert!(!is_mrn_shaped("MRN-44-991"));
        assert!(!is_mrn_shaped("MRN-442991"));
        assert!(!is_mrn_shaped("mrn-442-991"));
    }
}
