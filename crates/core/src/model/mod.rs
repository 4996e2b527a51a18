//! Hospital records as persisted in the snapshot.
//!
//! Field names serialise in camelCase and every categorical field is a closed enum whose wire
//! form is the exact label staff see, so a snapshot written by one build loads in the next.

/// Declares a closed enum with a fixed wire label per variant, plus `as_str`, `Display` and a
/// case-insensitive `FromStr` over those labels.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::HospitalError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        crate::HospitalError::InvalidInput(format!(
                            "unknown {} '{}'",
                            stringify!($name),
                            s
                        ))
                    })
            }
        }
    };
}

mod operations;
mod patient;
mod staff;

pub use operations::{
    ActivityLog, ActivityStatus, ActivityType, Appointment, AppointmentStatus, FinancialKind,
    FinancialRecord, InventoryCategory, InventoryItem, StockLevel, SurgeryStatus, SurgicalRecord,
    Vendor, VendorCategory, VendorStatus,
};
pub use patient::{
    Gender, LabSnapshot, LabTest, Patient, PatientDocument, PatientStatus, VisitRecord, Vitals,
};
pub use staff::{
    PayrollRecord, PayrollStatus, StaffMember, StaffStatus, StaffTask, TaskCategory, TaskPriority,
};

wire_enum! {
    /// Desk roles. Each acting role is stamped onto the audit entries it produces.
    pub enum UserRole {
        Cashier => "CASHIER",
        Doctor => "DOCTOR",
        LabTech => "LAB_TECH",
        Matron => "MATRON",
        Admin => "ADMIN",
    }
}
