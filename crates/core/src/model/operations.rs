//! Scheduling, ledger, supply and audit records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::UserRole;

wire_enum! {
    pub enum AppointmentStatus {
        Scheduled => "Scheduled",
        Completed => "Completed",
        Cancelled => "Cancelled",
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub department: String,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

wire_enum! {
    pub enum FinancialKind {
        Income => "Income",
        Expense => "Expense",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FinancialKind,
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
}

wire_enum! {
    pub enum InventoryCategory {
        Pharmaceutical => "Pharmaceutical",
        Surgical => "Surgical",
        Lab => "Lab",
        General => "General",
    }
}

/// Shelf state derived from quantity and reorder threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StockLevel {
    OutOfStock,
    Low,
    InStock,
}

impl std::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StockLevel::OutOfStock => "Out of stock",
            StockLevel::Low => "Low stock",
            StockLevel::InStock => "In stock",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub category: InventoryCategory,
    pub quantity: u32,
    pub min_threshold: u32,
    pub unit: String,
    pub price_per_unit: f64,
    pub last_updated: NaiveDate,
}

impl InventoryItem {
    pub fn stock_level(&self) -> StockLevel {
        if self.quantity == 0 {
            StockLevel::OutOfStock
        } else if self.quantity <= self.min_threshold {
            StockLevel::Low
        } else {
            StockLevel::InStock
        }
    }

    /// Applies a signed adjustment, clamping at zero.
    pub fn adjusted(&self, delta: i64, today: NaiveDate) -> Self {
        let next = (i64::from(self.quantity) + delta).clamp(0, i64::from(u32::MAX));
        Self {
            quantity: u32::try_from(next).unwrap_or(u32::MAX),
            last_updated: today,
            ..self.clone()
        }
    }
}

wire_enum! {
    pub enum VendorCategory {
        Pharmaceutical => "Pharmaceutical",
        SurgicalEquipment => "Surgical Equipment",
        MedicalSupplies => "Medical Supplies",
        Maintenance => "Maintenance",
        General => "General",
    }
}

wire_enum! {
    pub enum VendorStatus {
        Active => "Active",
        UnderReview => "Under Review",
        Inactive => "Inactive",
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub category: VendorCategory,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub status: VendorStatus,
    /// Free text as typed at the desk; may be empty for a new supplier.
    pub last_supply_date: String,
}

wire_enum! {
    pub enum SurgeryStatus {
        Scheduled => "Scheduled",
        Ongoing => "Ongoing",
        Completed => "Completed",
        PostOp => "Post-Op",
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurgicalRecord {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub procedure: String,
    pub surgeon: String,
    pub theater_room: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub anesthesia_type: String,
    pub status: SurgeryStatus,
}

wire_enum! {
    pub enum ActivityType {
        StatusUpdate => "STATUS_UPDATE",
        Export => "EXPORT",
        Registration => "REGISTRATION",
        InventoryAdjust => "INVENTORY_ADJUST",
        SurgeryLog => "SURGERY_LOG",
        PayrollGen => "PAYROLL_GEN",
    }
}

wire_enum! {
    pub enum ActivityStatus {
        Success => "SUCCESS",
        Info => "INFO",
        Warning => "WARNING",
    }
}

/// One audit trail entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub user_role: UserRole,
    pub timestamp: DateTime<Utc>,
    /// Number of records the action touched.
    pub count: u32,
    pub details: String,
    pub status: ActivityStatus,
}
