//! Demonstration data written on first start.

use super::Database;
use crate::model::{
    Appointment, AppointmentStatus, FinancialKind, FinancialRecord, Gender, LabTest, Patient,
    PatientStatus, StaffMember, StaffStatus, StaffTask, TaskCategory, TaskPriority, VisitRecord,
};
use chrono::NaiveDate;

const SEED_STAFF_SALARY: f64 = 5_000_000.0;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn visit(on: NaiveDate, clinic: &str, notes: &str) -> VisitRecord {
    VisitRecord {
        date: on,
        clinic_type: clinic.into(),
        notes: notes.into(),
        vitals: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn patient(
    id: &str,
    upi: &str,
    mrn: &str,
    national_id: &str,
    name: &str,
    age: u32,
    gender: Gender,
    blood_type: &str,
    last_visit: NaiveDate,
    status: PatientStatus,
    clinic_type: Option<&str>,
    contact: &str,
    email: &str,
    history: Vec<VisitRecord>,
) -> Patient {
    Patient {
        id: id.into(),
        upi: upi.into(),
        medical_record_number: mrn.into(),
        national_id: national_id.into(),
        name: name.into(),
        age,
        gender,
        blood_type: blood_type.into(),
        last_visit,
        status,
        contact: contact.into(),
        email: email.into(),
        history,
        lab_history: None,
        clinic_type: clinic_type.map(str::to_owned),
        requested_tests: None,
        doctor_description: None,
        total_lab_bill: None,
        risk_alerts: None,
        documents: None,
        vitals: None,
    }
}

pub fn lab_catalog() -> Vec<LabTest> {
    [
        ("LT001", "Full Blood Count (FBC)", 45_000.0),
        ("LT002", "Lipid Profile", 75_000.0),
        ("LT003", "Liver Function Test (LFT)", 90_000.0),
        ("LT004", "Kidney Function Test (KFT)", 100_000.0),
        ("LT005", "Blood Sugar (Fasting)", 20_000.0),
        ("LT006", "Malaria Parasite (MP)", 30_000.0),
        ("LT007", "Urinalysis", 25_000.0),
        ("LT008", "HBA1C", 60_000.0),
        ("LT009", "Thyroid Panel", 110_000.0),
        ("LT010", "Chest X-Ray", 150_000.0),
        ("LT011", "ECG/EKG", 85_000.0),
    ]
    .into_iter()
    .map(|(id, name, price)| LabTest {
        id: id.into(),
        name: name.into(),
        price,
        result: None,
    })
    .collect()
}

/// Builds the first-start database. Seeded tasks fall due on `today`.
pub fn seed_database(today: NaiveDate) -> Database {
    let patients = vec![
        patient(
            "P001",
            "8f72c3d0-a1e4-4e92-8f1b-3f48c0a2d5e1",
            "MRN-442-991",
            "NHID-100293-A",
            "Sarah Johnson",
            34,
            Gender::Female,
            "A+",
            date(2024, 5, 10),
            PatientStatus::Admitted,
            None,
            "+232 76 123456",
            "sarah.j@example.com",
            vec![
                visit(date(2024, 5, 10), "General", "Asthma flare-up symptoms"),
                visit(date(2024, 1, 15), "General", "Routine checkup completed"),
            ],
        ),
        patient(
            "P002",
            "2b9e4a1c-7d5f-4b3a-9c2e-1d8a7f6e5d4c",
            "MRN-881-203",
            "PASS-882201-C",
            "Michael Chen",
            45,
            Gender::Male,
            "O-",
            date(2024, 5, 12),
            PatientStatus::AwaitingDoctor,
            Some("Cardiology"),
            "+232 77 654321",
            "mchen@example.com",
            vec![
                visit(date(2024, 5, 12), "Cardiology", "Hypertension monitoring"),
                visit(date(2022, 11, 4), "Endocrinology", "Type 2 Diabetes diagnosis"),
            ],
        ),
        patient(
            "P003",
            "9a8b7c6d-5e4f-4a2b-9c0d-9e8f7a6b5c4d",
            "MRN-112-556",
            "NHID-339281-K",
            "Aminata Conteh",
            28,
            Gender::Female,
            "B+",
            date(2024, 5, 19),
            PatientStatus::AwaitingDoctor,
            Some("General Medicine"),
            "+232 33 987654",
            "aminata.c@example.sl",
            vec![visit(
                date(2024, 5, 19),
                "General Medicine",
                "Initial Registration via Cashier Desk",
            )],
        ),
    ];

    let staff = vec![StaffMember {
        id: "S001".into(),
        name: "Dr. Gregory House".into(),
        role: "Diagnostic Specialist".into(),
        department: "Internal Medicine".into(),
        status: StaffStatus::OnDuty,
        experience: "20 Years".into(),
        image: "https://picsum.photos/seed/doctor1/200/200".into(),
        salary: Some(SEED_STAFF_SALARY),
    }];

    let appointments = vec![Appointment {
        id: "A101".into(),
        patient_id: "P002".into(),
        patient_name: "Michael Chen".into(),
        doctor_name: "Dr. Gregory House".into(),
        date: date(2024, 5, 20),
        time: "09:00 AM".into(),
        department: "Cardiology".into(),
        status: AppointmentStatus::Scheduled,
        reason: None,
    }];

    let financials = vec![FinancialRecord {
        id: "F001".into(),
        kind: FinancialKind::Income,
        category: "Patient Consultation".into(),
        amount: 120_000.0,
        date: date(2024, 5, 18),
        description: "Consultation fees".into(),
    }];

    let task = |id: &str, title: &str, priority, category| StaffTask {
        id: id.into(),
        title: title.into(),
        priority,
        category,
        completed: false,
        due_date: today,
    };
    let tasks = vec![
        task(
            "T1",
            "Verify Lab results for Sarah Johnson",
            TaskPriority::Urgent,
            TaskCategory::Clinical,
        ),
        task(
            "T2",
            "Review monthly inventory requisition",
            TaskPriority::Routine,
            TaskCategory::Admin,
        ),
        task(
            "T3",
            "Matron meeting regarding ward 4 staffing",
            TaskPriority::Urgent,
            TaskCategory::Admin,
        ),
    ];

    Database {
        patients,
        staff,
        appointments,
        financials,
        lab_tests: lab_catalog(),
        tasks,
        ..Database::default()
    }
}
