//! Reception, clinical desks, lab desk and patient-list administration.

use super::forms::{DirectRegistrationForm, DraftIdentifiers, ReceptionForm};
use super::{free_reference, Coordinator};
use crate::constants::{BLOOD_TYPE_UNKNOWN, NAME_LIMIT, REGISTRATION_FEE};
use crate::export::patients_to_csv;
use crate::model::{
    ActivityType, FinancialKind, FinancialRecord, Gender, Patient, PatientDocument,
    PatientStatus, VisitRecord, Vitals,
};
use crate::search::{archive_search, PatientQuery};
use crate::store::{Financials, LabTests, Patients};
use crate::validation::{
    clinic_type, default_email, required, required_bounded, validate_manual_patient_id,
};
use crate::workflow;
use crate::{HospitalError, HospitalResult};
use base64::Engine;
use fih_advisory::{AdvisoryService, CompletionService, RiskAlert};
use fih_ids::{generate_mrn, generate_patient_id, generate_upi, ReferenceKind};
use std::collections::BTreeMap;

const MAX_AGE: u32 = 150;
const REGISTRATION_CLINIC: &str = "Registration";
const SCAN_DEFAULT_SYMPTOMS: &str = "Checkup";

fn checked_age(age: Option<u32>) -> HospitalResult<u32> {
    match age {
        None => Err(HospitalError::MissingField("age")),
        Some(a) if a > MAX_AGE => Err(HospitalError::InvalidInput(format!(
            "age {} is outside the accepted range",
            a
        ))),
        Some(a) => Ok(a),
    }
}

fn email_or_default(email: Option<String>, name: &str) -> String {
    email
        .map(|e| e.trim().to_owned())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| default_email(name))
}

struct NewPatient {
    id: String,
    upi: String,
    medical_record_number: String,
    national_id: String,
    name: String,
    age: u32,
    gender: Gender,
    blood_type: String,
    contact: String,
    email: String,
    clinic_type: String,
    status: PatientStatus,
    note: String,
}

impl Coordinator {
    fn fresh_patient(&self, new: NewPatient) -> Patient {
        let today = self.today();
        Patient {
            id: new.id,
            upi: new.upi,
            medical_record_number: new.medical_record_number,
            national_id: new.national_id,
            name: new.name,
            age: new.age,
            gender: new.gender,
            blood_type: new.blood_type,
            last_visit: today,
            status: new.status,
            contact: new.contact,
            email: new.email,
            history: vec![VisitRecord {
                date: today,
                clinic_type: REGISTRATION_CLINIC.to_owned(),
                notes: new.note,
                vitals: None,
            }],
            lab_history: None,
            clinic_type: Some(new.clinic_type),
            requested_tests: Some(Vec::new()),
            doctor_description: None,
            total_lab_bill: Some(0.0),
            risk_alerts: None,
            documents: None,
            vitals: None,
        }
    }

    fn next_patient_id(&mut self) -> String {
        let patients = &self.view.patients;
        generate_patient_id(&mut self.rng, |c| patients.iter().any(|p| p.id == c)).to_string()
    }

    /// Identifiers to pre-fill a blank reception form.
    pub fn draft_identifiers(&mut self) -> DraftIdentifiers {
        DraftIdentifiers {
            id: self.next_patient_id(),
            upi: generate_upi(),
            medical_record_number: generate_mrn(&mut self.rng),
        }
    }

    pub fn patients(&self) -> &[Patient] {
        &self.view.patients
    }

    pub fn patient(&self, id: &str) -> HospitalResult<&Patient> {
        self.find::<Patients>("patient", id)
    }

    pub fn search_archive(&self, term: &str) -> Vec<&Patient> {
        archive_search(&self.view.patients, term)
    }

    pub fn query_patients(&self, query: &PatientQuery) -> Vec<&Patient> {
        query.run(&self.view.patients)
    }

    /// Cashier desk registration: creates the patient awaiting the doctor and books the
    /// registration fee as income.
    ///
    /// # Errors
    ///
    /// Mandatory fields, id shape and id uniqueness are checked before anything is written.
    pub async fn register_at_reception(&mut self, form: ReceptionForm) -> HospitalResult<Patient> {
        let name = required_bounded("name", &form.name, NAME_LIMIT)?;
        let age = checked_age(form.age)?;
        let national_id = required("nationalId", &form.national_id)?;
        let mrn = required("medicalRecordNumber", &form.medical_record_number)?;
        let id = validate_manual_patient_id(&form.id, &self.view.patients)?;
        let clinic = clinic_type(&form.clinic_type)?;

        let upi = form
            .upi
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(generate_upi);
        let email = email_or_default(form.email, name.as_str());
        let patient = self.fresh_patient(NewPatient {
            id: id.to_string(),
            upi,
            medical_record_number: mrn.into_inner(),
            national_id: national_id.into_inner(),
            name: name.to_string(),
            age,
            gender: form.gender,
            blood_type: BLOOD_TYPE_UNKNOWN.to_owned(),
            contact: form.contact.trim().to_owned(),
            email,
            note: format!(
                "Registered for {} clinic. Initial registration fee collected.",
                clinic
            ),
            clinic_type: clinic.to_owned(),
            status: PatientStatus::AwaitingDoctor,
        });

        self.upsert::<Patients>(patient.clone()).await?;

        let fee = FinancialRecord {
            id: self.unique_reference::<Financials>(ReferenceKind::Financial),
            kind: FinancialKind::Income,
            category: "Patient Registration".to_owned(),
            amount: REGISTRATION_FEE,
            date: self.today(),
            description: format!("New Registration: {} ({})", patient.name, patient.id),
        };
        self.append::<Financials>(fee).await?;

        tracing::info!("registered {} at reception", patient.id);
        Ok(patient)
    }

    /// Administrative registration with generated identifiers. The patient starts as
    /// `Registered` and the action is audited.
    ///
    /// # Errors
    ///
    /// [`HospitalError::PatientIdTaken`] when the id generator runs out of draws and hands
    /// back an id already on file.
    pub async fn register_direct(&mut self, form: DirectRegistrationForm) -> HospitalResult<Patient> {
        let name = required_bounded("name", &form.name, NAME_LIMIT)?;
        let age = checked_age(form.age)?;
        let national_id = required("nationalId", &form.national_id)?;
        let contact = required("contact", &form.contact)?;
        let clinic = clinic_type(&form.clinic_type)?;

        let id = self.next_patient_id();
        if self.view.find::<Patients>(&id).is_some() {
            return Err(HospitalError::PatientIdTaken(id));
        }
        let mrn = generate_mrn(&mut self.rng);
        let email = email_or_default(form.email, name.as_str());
        let blood_type = form
            .blood_type
            .map(|b| b.trim().to_owned())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| BLOOD_TYPE_UNKNOWN.to_owned());
        let patient = self.fresh_patient(NewPatient {
            id,
            upi: generate_upi(),
            medical_record_number: mrn,
            national_id: national_id.into_inner(),
            name: name.to_string(),
            age,
            gender: form.gender,
            blood_type,
            contact: contact.into_inner(),
            email,
            note: format!(
                "Record initialized via Master Portal. Assigned to {} clinic.",
                clinic
            ),
            clinic_type: clinic.to_owned(),
            status: PatientStatus::Registered,
        });

        self.upsert::<Patients>(patient.clone()).await?;
        self.audit(
            ActivityType::Registration,
            1,
            format!("New patient record {} initialized in system", patient.name),
        )
        .await?;
        Ok(patient)
    }

    /// Persists `next` if it differs from what the view holds.
    async fn save_patient(&mut self, next: Patient) -> HospitalResult<Patient> {
        if self.patient(&next.id)? != &next {
            self.upsert::<Patients>(next.clone()).await?;
        }
        Ok(next)
    }

    /// Doctor opens the chart. Only `Awaiting Doctor` moves to `In Consultation`.
    pub async fn start_consultation(&mut self, id: &str) -> HospitalResult<Patient> {
        let next = workflow::start_consultation(self.patient(id)?.clone());
        self.save_patient(next).await
    }

    /// Orders catalog tests by catalog id.
    pub async fn commit_lab_order(
        &mut self,
        id: &str,
        catalog_ids: &[String],
    ) -> HospitalResult<Patient> {
        let tests = catalog_ids
            .iter()
            .map(|tid| self.find::<LabTests>("lab test", tid).cloned())
            .collect::<HospitalResult<Vec<_>>>()?;
        let next = workflow::commit_lab_order(self.patient(id)?.clone(), &tests)?;
        self.save_patient(next).await
    }

    pub async fn finalize_consultation(
        &mut self,
        id: &str,
        description: &str,
        vitals: Vitals,
    ) -> HospitalResult<Patient> {
        let today = self.today();
        let next =
            workflow::finalize_consultation(self.patient(id)?.clone(), description, vitals, today)?;
        self.save_patient(next).await
    }

    /// Lab desk "save progress".
    pub async fn save_lab_progress(
        &mut self,
        id: &str,
        results: &BTreeMap<String, String>,
    ) -> HospitalResult<Patient> {
        let next = workflow::record_lab_results(self.patient(id)?.clone(), results);
        self.save_patient(next).await
    }

    /// Adds another instance of a catalog test to the patient's order.
    pub async fn add_sample(&mut self, id: &str, catalog_id: &str) -> HospitalResult<Patient> {
        let test = self.find::<LabTests>("lab test", catalog_id)?.clone();
        let patient = self.patient(id)?.clone();
        let ordered = patient.requested_tests();
        let instance_id = free_reference(&mut self.rng, ReferenceKind::LabOrderInstance, |c| {
            ordered.iter().any(|t| t.id == c)
        });
        let next = workflow::add_test_instance(patient, &test, instance_id);
        self.save_patient(next).await
    }

    pub async fn remove_investigation(&mut self, id: &str, test_id: &str) -> HospitalResult<Patient> {
        let next = workflow::remove_investigation(self.patient(id)?.clone(), test_id);
        self.save_patient(next).await
    }

    pub async fn complete_lab(
        &mut self,
        id: &str,
        results: &BTreeMap<String, String>,
    ) -> HospitalResult<Patient> {
        let today = self.today();
        let next = workflow::complete_lab(self.patient(id)?.clone(), results, today)?;
        self.save_patient(next).await
    }

    /// Administrative override of one patient's status. Always audited.
    pub async fn set_status(&mut self, id: &str, status: PatientStatus) -> HospitalResult<Patient> {
        let next = workflow::override_status(self.patient(id)?.clone(), status);
        self.save_patient(next.clone()).await?;
        self.audit(
            ActivityType::StatusUpdate,
            1,
            format!(
                "Clinical status for {} transitioned to \"{}\"",
                next.name, status
            ),
        )
        .await?;
        Ok(next)
    }

    /// Moves every listed patient to `status` and records one audit entry for the batch.
    ///
    /// Every id is resolved before the first write.
    pub async fn bulk_set_status(
        &mut self,
        ids: &[String],
        status: PatientStatus,
    ) -> HospitalResult<Vec<Patient>> {
        let targets = ids
            .iter()
            .map(|id| self.patient(id).cloned())
            .collect::<HospitalResult<Vec<_>>>()?;

        let mut updated = Vec::with_capacity(targets.len());
        for patient in targets {
            updated.push(self.save_patient(workflow::override_status(patient, status)).await?);
        }

        let count = updated.len();
        self.audit(
            ActivityType::StatusUpdate,
            count as u32,
            format!(
                "Clinical status batch transition to \"{}\" authorized for {} files",
                status, count
            ),
        )
        .await?;
        Ok(updated)
    }

    /// Permanently removes the listed patients and returns how many were on file.
    pub async fn delete_patients(&mut self, ids: &[String]) -> HospitalResult<usize> {
        let mut removed = 0;
        for id in ids {
            if self.delete::<Patients>(id).await? {
                removed += 1;
            }
        }
        let count = ids.len();
        self.audit(
            ActivityType::StatusUpdate,
            count as u32,
            format!(
                "Administrative batch purge of {} patient records executed",
                count
            ),
        )
        .await?;
        Ok(removed)
    }

    /// Renders the listed patients as CSV, in the order given, and audits the export.
    pub async fn export_patients(&mut self, ids: &[String]) -> HospitalResult<String> {
        let selected = ids
            .iter()
            .map(|id| self.patient(id))
            .collect::<HospitalResult<Vec<_>>>()?;
        let csv = patients_to_csv(selected);

        let count = ids.len();
        self.audit(
            ActivityType::Export,
            count as u32,
            format!("Bulk clinical data export executed for {} dossiers", count),
        )
        .await?;
        Ok(csv)
    }

    /// Stores a file on the patient as base64.
    pub async fn attach_document(
        &mut self,
        id: &str,
        name: &str,
        doc_type: &str,
        contents: &[u8],
    ) -> HospitalResult<PatientDocument> {
        let name = required_bounded("document name", name, NAME_LIMIT)?;
        let mut patient = self.patient(id)?.clone();
        let attached = patient.documents.as_deref().unwrap_or(&[]);
        let document_id = free_reference(&mut self.rng, ReferenceKind::Document, |c| {
            attached.iter().any(|d| d.id == c)
        });
        let document = PatientDocument {
            id: document_id,
            name: name.into_inner(),
            doc_type: doc_type.trim().to_owned(),
            data: base64::engine::general_purpose::STANDARD.encode(contents),
            timestamp: self.now(),
        };
        patient
            .documents
            .get_or_insert_with(Vec::new)
            .push(document.clone());
        self.save_patient(patient).await?;
        Ok(document)
    }

    /// Decodes a stored document's contents.
    pub fn document_contents(&self, id: &str, document_id: &str) -> HospitalResult<Vec<u8>> {
        let document = self
            .patient(id)?
            .documents
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .find(|d| d.id == document_id)
            .ok_or_else(|| HospitalError::not_found("document", document_id))?;
        base64::engine::general_purpose::STANDARD
            .decode(&document.data)
            .map_err(|e| HospitalError::InvalidInput(format!("document is not valid base64: {}", e)))
    }

    pub async fn remove_document(&mut self, id: &str, document_id: &str) -> HospitalResult<Patient> {
        let mut patient = self.patient(id)?.clone();
        if let Some(docs) = patient.documents.as_mut() {
            docs.retain(|d| d.id != document_id);
        }
        self.save_patient(patient).await
    }

    /// Asks the advisory layer for red flags, stores them on the patient and audits the scan.
    ///
    /// An advisory failure yields an empty alert list, which is stored like any other result.
    pub async fn run_safety_scan<C: CompletionService>(
        &mut self,
        id: &str,
        advisory: &AdvisoryService<C>,
    ) -> HospitalResult<Vec<RiskAlert>> {
        let mut patient = self.patient(id)?.clone();
        let history = patient
            .history
            .iter()
            .map(|h| format!("{}: {}", h.date, h.notes))
            .collect::<Vec<_>>()
            .join(" | ");
        let symptoms = patient
            .doctor_description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| SCAN_DEFAULT_SYMPTOMS.to_owned());

        let alerts = advisory.analyze_patient_risk(&symptoms, &history).await;
        patient.risk_alerts = Some(alerts.clone());
        let name = patient.name.clone();
        self.save_patient(patient).await?;

        self.audit(
            ActivityType::Registration,
            1,
            format!(
                "Neural safety scan finalized for patient {}. Potential risks detected: {}",
                name,
                alerts.len()
            ),
        )
        .await?;
        Ok(alerts)
    }

    /// One line per visit for the advisory summary, newest first.
    pub fn history_lines(&self, id: &str) -> HospitalResult<Vec<String>> {
        Ok(self
            .patient(id)?
            .history
            .iter()
            .map(|h| format!("{}: [{}] {}", h.date, h.clinic_type, h.notes))
            .collect())
    }
}
