use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum StaffStatus {
        OnDuty => "On Duty",
        OffDuty => "Off Duty",
        OnLeave => "On Leave",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub role: String,
    pub department: String,
    pub status: StaffStatus,
    pub experience: String,
    pub image: String,
    /// Monthly base salary, when contracted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
}

wire_enum! {
    pub enum PayrollStatus {
        Paid => "Paid",
        Pending => "Pending",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRecord {
    pub id: String,
    pub staff_id: String,
    pub staff_name: String,
    pub month: String,
    pub year: String,
    pub base_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub net_pay: f64,
    pub status: PayrollStatus,
}

wire_enum! {
    pub enum TaskPriority {
        Routine => "Routine",
        Urgent => "Urgent",
        Critical => "Critical",
    }
}

wire_enum! {
    pub enum TaskCategory {
        Clinical => "Clinical",
        Admin => "Admin",
        Personal => "Personal",
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffTask {
    pub id: String,
    pub title: String,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub completed: bool,
    pub due_date: NaiveDate,
}
