//! Patient lookup and list queries, and audit trail filtering.

use crate::model::{ActivityLog, ActivityType, Patient, PatientStatus, UserRole};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Case-insensitive substring match over name, internal id, MRN, UPI and national id.
///
/// A blank term matches every patient.
pub fn archive_search<'a>(patients: &'a [Patient], term: &str) -> Vec<&'a Patient> {
    let needle = term.trim().to_lowercase();
    patients
        .iter()
        .filter(|p| {
            needle.is_empty()
                || [
                    &p.name,
                    &p.id,
                    &p.medical_record_number,
                    &p.upi,
                    &p.national_id,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    Name,
    #[default]
    LastVisit,
    Status,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Filters and ordering for the patient list. `None` means "all".
#[derive(Clone, Debug, Default)]
pub struct PatientQuery {
    pub text: Option<String>,
    pub status: Option<PatientStatus>,
    pub clinic: Option<String>,
    pub blood_type: Option<String>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub visited_from: Option<NaiveDate>,
    pub visited_to: Option<NaiveDate>,
    pub sort_by: SortKey,
    pub direction: SortDirection,
}

impl PatientQuery {
    fn matches_text(&self, p: &Patient, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let lower = |s: &str| s.to_lowercase().contains(needle);
        lower(&p.name)
            || lower(&p.id)
            || lower(&p.medical_record_number)
            || lower(p.status.as_str())
            || p.clinic_type.as_deref().is_some_and(lower)
            || lower(&p.blood_type)
            || p.contact.contains(needle)
            || lower(&p.email)
    }

    pub fn matches(&self, p: &Patient) -> bool {
        let needle = self
            .text
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .unwrap_or_default();

        self.status.map_or(true, |s| p.status == s)
            && self
                .clinic
                .as_deref()
                .map_or(true, |c| p.clinic_type.as_deref() == Some(c))
            && self.blood_type.as_deref().map_or(true, |b| p.blood_type == b)
            && self.min_age.map_or(true, |min| p.age >= min)
            && self.max_age.map_or(true, |max| p.age <= max)
            && self.visited_from.map_or(true, |from| p.last_visit >= from)
            && self.visited_to.map_or(true, |to| p.last_visit <= to)
            && self.matches_text(p, &needle)
    }

    pub fn run<'a>(&self, patients: &'a [Patient]) -> Vec<&'a Patient> {
        let mut hits: Vec<&Patient> = patients.iter().filter(|p| self.matches(p)).collect();
        hits.sort_by(|a, b| {
            let ord = match self.sort_by {
                SortKey::Name => compare_text(&a.name, &b.name),
                SortKey::LastVisit => a.last_visit.cmp(&b.last_visit),
                SortKey::Status => compare_text(a.status.as_str(), b.status.as_str()),
            };
            match self.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        hits
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Audit entries matching an optional type and role, in stored (newest first) order.
pub fn filter_logs<'a>(
    logs: &'a [ActivityLog],
    kind: Option<ActivityType>,
    role: Option<UserRole>,
) -> Vec<&'a ActivityLog> {
    logs.iter()
        .filter(|l| kind.map_or(true, |k| l.kind == k))
        .filter(|l| role.map_or(true, |r| l.user_role == r))
        .collect()
}
