//! Constants used throughout the hospital core crate.

/// Default directory holding the snapshot slot when none is configured.
pub const DEFAULT_DATA_DIR: &str = "hospital_data";

/// Default snapshot file name. Versioned so a layout change can start from a fresh slot.
pub const DEFAULT_SNAPSHOT_FILE: &str = "FIH_HMS_DB_V2.json";

/// Registration fee collected at reception, in leones.
pub const REGISTRATION_FEE: f64 = 50_000.0;

/// Base salary used for payroll when a staff record carries none.
pub const DEFAULT_BASE_SALARY: f64 = 3_500_000.0;

/// Domain used to synthesise an email address when reception leaves it blank.
pub const DEFAULT_EMAIL_DOMAIN: &str = "freetown-int.sl";

/// Longest accepted person name, task title or document name.
pub const NAME_LIMIT: usize = 120;

/// Visit notes longer than this are truncated in the history entry.
pub const VISIT_NOTE_LIMIT: usize = 300;

/// Clinic type recorded on a consultation when the patient has none.
pub const DEFAULT_CONSULT_CLINIC: &str = "Consultation";

pub const BLOOD_TYPE_UNKNOWN: &str = "N/A";

/// Mutations queued ahead of the store task before senders wait.
pub const STORE_QUEUE_DEPTH: usize = 64;

/// Clinics a patient can be registered into.
pub const CLINIC_TYPES: &[&str] = &[
    "Surgical",
    "Pediatric",
    "Dental",
    "Gynecological",
    "Orthopedic",
    "Cardiology",
    "Dermatology",
    "Neurology",
    "General Medicine",
];
