use chrono::{DateTime, NaiveDate, Utc};
use fih_advisory::RiskAlert;
use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum Gender {
        Male => "Male",
        Female => "Female",
        Other => "Other",
    }
}

wire_enum! {
    /// Where a patient sits in the visit workflow.
    pub enum PatientStatus {
        Registered => "Registered",
        AwaitingDoctor => "Awaiting Doctor",
        InConsultation => "In Consultation",
        AwaitingLab => "Awaiting Lab",
        Completed => "Completed",
        Admitted => "Admitted",
        Outpatient => "Outpatient",
        Discharged => "Discharged",
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub bp: String,
    pub hr: String,
    pub temp: String,
    pub spo2: String,
}

/// One entry in a patient's visit history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub date: NaiveDate,
    pub clinic_type: String,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitals: Option<Vitals>,
}

/// A lab catalog entry, or an ordered instance of one carrying a result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabTest {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl LabTest {
    pub fn has_result(&self) -> bool {
        self.result.as_deref().is_some_and(|r| !r.trim().is_empty())
    }
}

/// Results committed by the lab on one day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabSnapshot {
    pub date: NaiveDate,
    pub results: Vec<LabTest>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDocument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Base64-encoded file contents.
    pub data: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub upi: String,
    pub medical_record_number: String,
    pub national_id: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub blood_type: String,
    pub last_visit: NaiveDate,
    pub status: PatientStatus,
    pub contact: String,
    pub email: String,
    /// Newest first.
    #[serde(default)]
    pub history: Vec<VisitRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_history: Option<Vec<LabSnapshot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_tests: Option<Vec<LabTest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_lab_bill: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_alerts: Option<Vec<RiskAlert>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<PatientDocument>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitals: Option<Vitals>,
}

impl Patient {
    pub fn requested_tests(&self) -> &[LabTest] {
        self.requested_tests.as_deref().unwrap_or(&[])
    }

    /// Ordered tests still waiting on a result.
    pub fn unresolved_tests(&self) -> impl Iterator<Item = &LabTest> {
        self.requested_tests().iter().filter(|t| !t.has_result())
    }

    pub fn lab_bill(&self) -> f64 {
        self.requested_tests().iter().map(|t| t.price).sum()
    }

    pub fn clinic_label(&self) -> &str {
        self.clinic_type.as_deref().unwrap_or("N/A")
    }
}
