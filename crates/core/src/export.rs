//! Bulk CSV export of patient rows.

use crate::model::Patient;

pub const CSV_HEADER: &str = "HMS ID,MRN,Name,Age,Gender,Status,Clinic,Last Visit,Contact,Email";

/// Renders one header line plus one row per patient, in the given order.
///
/// Only the contact column is quoted. Rows are joined with `\n` and there is no trailing
/// newline.
pub fn patients_to_csv<'a>(patients: impl IntoIterator<Item = &'a Patient>) -> String {
    let mut lines = vec![CSV_HEADER.to_owned()];
    lines.extend(patients.into_iter().map(|p| {
        format!(
            "{},{},{},{},{},{},{},{},\"{}\",{}",
            p.id,
            p.medical_record_number,
            p.name,
            p.age,
            p.gender,
            p.status,
            p.clinic_label(),
            p.last_visit.format("%Y-%m-%d"),
            p.contact,
            p.email
        )
    }));
    lines.join("\n")
}

/// File name offered for an export generated on `date`.
pub fn export_file_name(date: chrono::NaiveDate) -> String {
    format!("FIH_Batch_Export_{}.csv", date.format("%Y-%m-%d"))
}
