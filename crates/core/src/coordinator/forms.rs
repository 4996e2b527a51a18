//! Desk input as typed by staff, before validation.

use crate::model::{
    FinancialKind, Gender, InventoryCategory, TaskCategory, TaskPriority, VendorCategory,
    VendorStatus,
};
use chrono::NaiveDate;

/// Identifiers pre-filled on a blank reception form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftIdentifiers {
    pub id: String,
    pub upi: String,
    pub medical_record_number: String,
}

/// Cashier desk registration. The id may be the drafted one or typed by hand.
#[derive(Clone, Debug)]
pub struct ReceptionForm {
    pub id: String,
    pub upi: Option<String>,
    pub medical_record_number: String,
    pub national_id: String,
    pub name: String,
    pub age: Option<u32>,
    pub gender: Gender,
    pub contact: String,
    pub email: Option<String>,
    pub clinic_type: String,
}

/// Administrative registration from the patient list. Identifiers are always generated.
#[derive(Clone, Debug)]
pub struct DirectRegistrationForm {
    pub name: String,
    pub age: Option<u32>,
    pub gender: Gender,
    pub blood_type: Option<String>,
    pub national_id: String,
    pub contact: String,
    pub email: Option<String>,
    pub clinic_type: String,
}

#[derive(Clone, Debug)]
pub struct AppointmentForm {
    pub patient_id: String,
    pub doctor_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub department: String,
    pub reason: Option<String>,
}

#[derive(Clone, Debug)]
pub struct FinancialForm {
    pub kind: FinancialKind,
    pub category: String,
    pub amount: f64,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    pub description: String,
}

#[derive(Clone, Debug)]
pub struct InventoryForm {
    pub name: String,
    pub category: InventoryCategory,
    pub quantity: u32,
    pub min_threshold: u32,
    pub unit: String,
    pub price_per_unit: f64,
}

#[derive(Clone, Debug)]
pub struct VendorForm {
    pub name: String,
    pub category: VendorCategory,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub status: VendorStatus,
    pub last_supply_date: String,
}

#[derive(Clone, Debug)]
pub struct PayrollForm {
    pub staff_id: String,
    pub month: String,
    pub year: String,
    pub allowances: f64,
    pub deductions: f64,
}

#[derive(Clone, Debug)]
pub struct SurgeryForm {
    pub patient_id: String,
    pub procedure: String,
    pub surgeon: String,
    pub theater_room: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub anesthesia_type: String,
}

#[derive(Clone, Debug)]
pub struct TaskForm {
    pub title: String,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub due_date: NaiveDate,
}
