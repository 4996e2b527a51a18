//! Patient visit workflow.
//!
//! ```text
//! Registered ─(admin)─> Awaiting Doctor ──> In Consultation ──order──> Awaiting Lab
//!                              │                   │                       │
//!                              │                   └──finalize──> Completed <┘ (lab complete)
//!                              └──────────────────────────(finalize with no open orders)
//! ```
//!
//! Every function here is pure: it takes the current patient and returns the next one. The
//! coordinator persists the result. `Admitted`, `Outpatient` and `Discharged` are only reached
//! through [`override_status`].

use crate::constants::{DEFAULT_CONSULT_CLINIC, VISIT_NOTE_LIMIT};
use crate::model::{LabSnapshot, LabTest, Patient, PatientStatus, VisitRecord, Vitals};
use crate::{HospitalError, HospitalResult};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const LAB_CLINIC: &str = "Laboratory";

/// Opens a consultation. Only a patient awaiting the doctor moves; anyone else is returned
/// unchanged.
pub fn start_consultation(mut patient: Patient) -> Patient {
    if patient.status == PatientStatus::AwaitingDoctor {
        patient.status = PatientStatus::InConsultation;
    }
    patient
}

/// Adds catalog tests to the patient's order. Tests already on the order are skipped.
///
/// # Errors
///
/// [`HospitalError::InvalidInput`] when `tests` is empty.
pub fn commit_lab_order(mut patient: Patient, tests: &[LabTest]) -> HospitalResult<Patient> {
    if tests.is_empty() {
        return Err(HospitalError::InvalidInput(
            "select at least one investigation to order".into(),
        ));
    }

    let mut ordered = patient.requested_tests.take().unwrap_or_default();
    for test in tests {
        if ordered.iter().any(|t| t.id == test.id) {
            continue;
        }
        ordered.push(LabTest {
            result: Some(String::new()),
            ..test.clone()
        });
    }
    patient.requested_tests = Some(ordered);
    patient.total_lab_bill = Some(patient.lab_bill());
    patient.status = PatientStatus::AwaitingLab;
    Ok(patient)
}

fn truncate_note(description: &str) -> String {
    if description.chars().count() <= VISIT_NOTE_LIMIT {
        return description.to_owned();
    }
    let mut note: String = description.chars().take(VISIT_NOTE_LIMIT).collect();
    note.push_str("...");
    note
}

/// Closes the consultation and records it in the visit history.
///
/// The full description is kept on the patient; the history entry carries at most
/// [`VISIT_NOTE_LIMIT`] characters of it. The patient goes to the lab while any ordered test
/// lacks a result, otherwise the visit is complete.
///
/// # Errors
///
/// [`HospitalError::MissingField`] when `description` is blank.
pub fn finalize_consultation(
    mut patient: Patient,
    description: &str,
    vitals: Vitals,
    today: NaiveDate,
) -> HospitalResult<Patient> {
    if description.trim().is_empty() {
        return Err(HospitalError::MissingField("clinical findings"));
    }

    let entry = VisitRecord {
        date: today,
        clinic_type: patient
            .clinic_type
            .clone()
            .unwrap_or_else(|| DEFAULT_CONSULT_CLINIC.to_owned()),
        notes: truncate_note(description),
        vitals: Some(vitals.clone()),
    };

    patient.status = if patient.unresolved_tests().next().is_some() {
        PatientStatus::AwaitingLab
    } else {
        PatientStatus::Completed
    };
    patient.doctor_description = Some(description.to_owned());
    patient.vitals = Some(vitals);
    patient.history.insert(0, entry);
    Ok(patient)
}

fn merge_results(patient: &mut Patient, results: &BTreeMap<String, String>) {
    if let Some(tests) = patient.requested_tests.as_mut() {
        for test in tests.iter_mut() {
            if let Some(value) = results.get(&test.id) {
                test.result = Some(value.clone());
            }
        }
    }
}

/// Saves in-progress results keyed by test id. Status is unchanged; unknown ids are ignored.
pub fn record_lab_results(mut patient: Patient, results: &BTreeMap<String, String>) -> Patient {
    merge_results(&mut patient, results);
    patient
}

/// Appends a fresh instance of a catalog test to the order, with its own instance id.
pub fn add_test_instance(mut patient: Patient, test: &LabTest, instance_id: String) -> Patient {
    let mut ordered = patient.requested_tests.take().unwrap_or_default();
    ordered.push(LabTest {
        id: instance_id,
        result: Some(String::new()),
        ..test.clone()
    });
    patient.requested_tests = Some(ordered);
    patient.total_lab_bill = Some(patient.lab_bill());
    patient
}

/// Drops one investigation from the order. Removing an id not on the order is a no-op.
pub fn remove_investigation(mut patient: Patient, test_id: &str) -> Patient {
    if let Some(tests) = patient.requested_tests.as_mut() {
        tests.retain(|t| t.id != test_id);
    }
    patient.total_lab_bill = Some(patient.lab_bill());
    patient
}

/// Commits lab results, snapshots them into `labHistory` and completes the visit.
///
/// # Errors
///
/// [`HospitalError::InvalidInput`] when nothing is on order or any ordered test is still
/// without a result after merging `results`.
pub fn complete_lab(
    mut patient: Patient,
    results: &BTreeMap<String, String>,
    today: NaiveDate,
) -> HospitalResult<Patient> {
    merge_results(&mut patient, results);

    if patient.requested_tests().is_empty() {
        return Err(HospitalError::InvalidInput(
            "no investigations are on order".into(),
        ));
    }
    let pending: Vec<&str> = patient
        .unresolved_tests()
        .map(|t| t.name.as_str())
        .collect();
    if !pending.is_empty() {
        return Err(HospitalError::InvalidInput(format!(
            "analysis incomplete, results missing for: {}",
            pending.join(", ")
        )));
    }

    let tests = patient.requested_tests().to_vec();
    let names: Vec<&str> = tests.iter().map(|t| t.name.as_str()).collect();
    let entry = VisitRecord {
        date: today,
        clinic_type: LAB_CLINIC.to_owned(),
        notes: format!(
            "Investigation results committed for: {}. All tests processed and dispatched.",
            names.join(", ")
        ),
        vitals: None,
    };

    let mut lab_history = patient.lab_history.take().unwrap_or_default();
    lab_history.insert(
        0,
        LabSnapshot {
            date: today,
            results: tests.clone(),
        },
    );
    patient.lab_history = Some(lab_history);
    patient.history.insert(0, entry);
    patient.status = PatientStatus::Completed;
    Ok(patient)
}

/// Administrative transition to any status. Callers are expected to audit it.
pub fn override_status(mut patient: Patient, target: PatientStatus) -> Patient {
    patient.status = target;
    patient
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{lab_catalog, seed_database};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).expect("date")
    }

    fn awaiting_doctor() -> Patient {
        seed_database(today())
            .patients
            .into_iter()
            .find(|p| p.id == "P003")
            .expect("seeded P003")
    }

    fn results(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_start_consultation_only_from_awaiting_doctor() {
        let p = start_consultation(awaiting_doctor());
        assert_eq!(p.status, PatientStatus::InConsultation);

        let again = start_consultation(p.clone());
        assert_eq!(again, p);

        let mut registered = awaiting_doctor();
        registered.status = PatientStatus::Registered;
        assert_eq!(start_consultation(registered).status, PatientStatus::Registered);
    }

    #[test]
    fn test_commit_lab_order_skips_duplicates_and_sets_awaiting_lab() {
        let catalog = lab_catalog();
        let p = start_consultation(awaiting_doctor());
        let p = commit_lab_order(p, &catalog[0..2]).expect("order");
        let p = commit_lab_order(p, &catalog[1..3]).expect("order");

        let ids: Vec<&str> = p.requested_tests().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["LT001", "LT002", "LT003"]);
        assert!(p.requested_tests().iter().all(|t| !t.has_result()));
        assert_eq!(p.status, PatientStatus::AwaitingLab);
        assert_eq!(p.total_lab_bill, Some(45_000.0 + 75_000.0 + 90_000.0));
    }

    #[test]
    fn test_commit_lab_order_rejects_empty_selection() {
        assert!(matches!(
            commit_lab_order(awaiting_doctor(), &[]),
            Err(HospitalError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_finalize_without_orders_completes_and_truncates_notes() {
        let long = "x".repeat(450);
        let before = awaiting_doctor();
        let p = finalize_consultation(
            start_consultation(before.clone()),
            &long,
            Vitals::default(),
            today(),
        )
        .expect("finalize");

        assert_eq!(p.status, PatientStatus::Completed);
        assert_eq!(p.history.len(), before.history.len() + 1);
        let entry = &p.history[0];
        assert_eq!(entry.notes.chars().count(), 303);
        assert!(entry.notes.ends_with("..."));
        assert_eq!(entry.clinic_type, "General Medicine");
        assert_eq!(p.doctor_description.as_deref(), Some(long.as_str()));
    }

    #[test]
    fn test_finalize_with_open_orders_goes_to_lab() {
        let p = commit_lab_order(start_consultation(awaiting_doctor()), &lab_catalog()[5..6])
            .expect("order");
        let mut p = finalize_consultation(p, "Fever for 3 days", Vitals::default(), today())
            .expect("finalize");
        assert_eq!(p.status, PatientStatus::AwaitingLab);

        p.clinic_type = None;
        p.requested_tests = None;
        let p = finalize_consultation(p, "Review", Vitals::default(), today()).expect("finalize");
        assert_eq!(p.status, PatientStatus::Completed);
        assert_eq!(p.history[0].clinic_type, "Consultation");
    }

    #[test]
    fn test_finalize_rejects_blank_description() {
        assert!(matches!(
            finalize_consultation(awaiting_doctor(), "  \n", Vitals::default(), today()),
            Err(HospitalError::MissingField(_))
        ));
    }

    #[test]
    fn test_complete_lab_requires_every_result() {
        let p = commit_lab_order(awaiting_doctor(), &lab_catalog()[0..2]).expect("order");
        let p = record_lab_results(p, &results(&[("LT001", "Hb 12.1 g/dL")]));
        assert_eq!(p.status, PatientStatus::AwaitingLab);

        let err = complete_lab(p.clone(), &BTreeMap::new(), today()).expect_err("LT002 missing");
        assert!(matches!(err, HospitalError::InvalidInput(msg) if msg.contains("Lipid Profile")));
    }

    #[test]
    fn test_complete_lab_appends_one_snapshot_and_one_history_entry() {
        let p = commit_lab_order(awaiting_doctor(), &lab_catalog()[0..2]).expect("order");
        let history_before = p.history.len();
        let p = complete_lab(
            p,
            &results(&[("LT001", "Normal"), ("LT002", "LDL 3.1 mmol/L")]),
            today(),
        )
        .expect("complete");

        assert_eq!(p.status, PatientStatus::Completed);
        let lab_history = p.lab_history.as_ref().expect("lab history");
        assert_eq!(lab_history.len(), 1);
        assert_eq!(lab_history[0].results.len(), 2);
        assert_eq!(p.history.len(), history_before + 1);
        assert_eq!(p.history[0].clinic_type, "Laboratory");
        assert_eq!(
            p.history[0].notes,
            "Investigation results committed for: Full Blood Count (FBC), Lipid Profile. \
             All tests processed and dispatched."
        );
    }

    #[test]
    fn test_add_and_remove_test_instances() {
        let catalog = lab_catalog();
        let p = add_test_instance(awaiting_doctor(), &catalog[6], "LT-1-5".into());
        let p = add_test_instance(p, &catalog[6], "LT-1-6".into());
        assert_eq!(p.requested_tests().len(), 2);
        assert_eq!(p.total_lab_bill, Some(50_000.0));

        let p = remove_investigation(p, "LT-1-5");
        let p = remove_investigation(p, "absent");
        assert_eq!(p.requested_tests().len(), 1);
        assert_eq!(p.requested_tests()[0].id, "LT-1-6");
    }

    #[test]
    fn test_override_reaches_terminal_states() {
        let p = override_status(awaiting_doctor(), PatientStatus::Discharged);
        assert_eq!(p.status, PatientStatus::Discharged);
    }
}
