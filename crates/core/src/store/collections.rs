//! The snapshot layout and the typed collections inside it.
//!
//! Each collection is a zero-sized marker implementing [`Collection`]. Which operations a
//! collection supports is decided by the marker traits it implements, so calling `delete` on
//! the financial ledger is a compile error rather than a runtime check.

use crate::model::{
    ActivityLog, Appointment, FinancialRecord, InventoryItem, LabTest, Patient, PayrollRecord,
    StaffMember, StaffTask, SurgicalRecord, Vendor,
};
use serde::{Deserialize, Serialize};

/// Full persisted state. Keys absent from a stored snapshot load as empty collections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Database {
    pub patients: Vec<Patient>,
    pub staff: Vec<StaffMember>,
    pub appointments: Vec<Appointment>,
    pub financials: Vec<FinancialRecord>,
    pub lab_tests: Vec<LabTest>,
    pub inventory: Vec<InventoryItem>,
    pub logs: Vec<ActivityLog>,
    pub vendors: Vec<Vendor>,
    pub payrolls: Vec<PayrollRecord>,
    pub surgeries: Vec<SurgicalRecord>,
    pub tasks: Vec<StaffTask>,
}

/// A record with a stable string key.
pub trait Record: Clone + Send + 'static {
    fn key(&self) -> &str;
}

macro_rules! keyed_by_id {
    ($($ty:ty),+ $(,)?) => {
        $(impl Record for $ty {
            fn key(&self) -> &str {
                &self.id
            }
        })+
    };
}

keyed_by_id!(
    Patient,
    StaffMember,
    Appointment,
    FinancialRecord,
    LabTest,
    InventoryItem,
    ActivityLog,
    Vendor,
    PayrollRecord,
    SurgicalRecord,
    StaffTask,
);

/// Where a record not already present is placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Front,
    Back,
}

pub trait Collection: Send + 'static {
    type Item: Record;
    /// Snapshot key, used in logs.
    const NAME: &'static str;
    const PLACEMENT: Placement;

    fn items(db: &Database) -> &Vec<Self::Item>;
    fn items_mut(db: &mut Database) -> &mut Vec<Self::Item>;
}

/// Insert-or-replace by key. Replacement keeps the record's position.
pub trait Upsertable: Collection {}
/// Ledger-style add with no key check.
pub trait Appendable: Collection {}
pub trait Deletable: Collection {}
pub trait Clearable: Collection {}

macro_rules! collection {
    ($marker:ident, $item:ty, $field:ident, $name:literal, $placement:ident $(, $cap:ident)*) => {
        pub struct $marker;

        impl Collection for $marker {
            type Item = $item;
            const NAME: &'static str = $name;
            const PLACEMENT: Placement = Placement::$placement;

            fn items(db: &Database) -> &Vec<$item> {
                &db.$field
            }

            fn items_mut(db: &mut Database) -> &mut Vec<$item> {
                &mut db.$field
            }
        }

        $(impl $cap for $marker {})*
    };
}

collection!(Patients, Patient, patients, "patients", Back, Upsertable, Deletable);
collection!(Staff, StaffMember, staff, "staff", Back, Appendable);
collection!(Appointments, Appointment, appointments, "appointments", Front, Appendable);
collection!(Financials, FinancialRecord, financials, "financials", Front, Appendable);
collection!(LabTests, LabTest, lab_tests, "labTests", Back, Appendable);
collection!(Inventory, InventoryItem, inventory, "inventory", Back, Upsertable);
collection!(Logs, ActivityLog, logs, "logs", Front, Appendable, Clearable);
collection!(Vendors, Vendor, vendors, "vendors", Back, Upsertable);
collection!(Payrolls, PayrollRecord, payrolls, "payrolls", Front, Appendable);
collection!(Surgeries, SurgicalRecord, surgeries, "surgeries", Back, Upsertable);
collection!(Tasks, StaffTask, tasks, "tasks", Front, Upsertable, Deletable);

fn place<T>(items: &mut Vec<T>, record: T, placement: Placement) {
    match placement {
        Placement::Front => items.insert(0, record),
        Placement::Back => items.push(record),
    }
}

/// Pure mutations, shared by the store and by the coordinator's mirror of it.
impl Database {
    pub fn all<C: Collection>(&self) -> &[C::Item] {
        C::items(self)
    }

    pub fn find<C: Collection>(&self, key: &str) -> Option<&C::Item> {
        C::items(self).iter().find(|r| r.key() == key)
    }

    pub fn upsert<C: Upsertable>(&mut self, record: C::Item) {
        let items = C::items_mut(self);
        match items.iter().position(|r| r.key() == record.key()) {
            Some(idx) => items[idx] = record,
            None => place(items, record, C::PLACEMENT),
        }
    }

    pub fn append<C: Appendable>(&mut self, record: C::Item) {
        place(C::items_mut(self), record, C::PLACEMENT);
    }

    /// Removes every record with `key`. Returns whether anything was removed.
    pub fn delete<C: Deletable>(&mut self, key: &str) -> bool {
        let items = C::items_mut(self);
        let before = items.len();
        items.retain(|r| r.key() != key);
        items.len() != before
    }

    pub fn clear<C: Clearable>(&mut self) {
        C::items_mut(self).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TaskCategory, TaskPriority};
    use chrono::NaiveDate;

    fn task(id: &str, title: &str) -> StaffTask {
        StaffTask {
            id: id.into(),
            title: title.into(),
            priority: TaskPriority::Routine,
            category: TaskCategory::Admin,
            completed: false,
            due_date: NaiveDate::from_ymd_opt(2024, 5, 20).expect("date"),
        }
    }

    fn catalog(id: &str) -> LabTest {
        LabTest {
            id: id.into(),
            name: "Full Blood Count".into(),
            price: 40_000.0,
            result: None,
        }
    }

    #[test]
    fn test_upsert_replaces_in_place_and_prepends_new_tasks() {
        let mut db = Database::default();
        db.upsert::<Tasks>(task("T1", "first"));
        db.upsert::<Tasks>(task("T2", "second"));
        assert_eq!(db.tasks[0].id, "T2");

        db.upsert::<Tasks>(task("T1", "renamed"));
        assert_eq!(db.tasks.len(), 2);
        assert_eq!(db.tasks[1].title, "renamed");
    }

    #[test]
    fn test_append_keeps_duplicate_keys() {
        let mut db = Database::default();
        db.append::<LabTests>(catalog("LT001"));
        db.append::<LabTests>(catalog("LT001"));
        assert_eq!(db.lab_tests.len(), 2);
    }

    #[test]
    fn test_delete_absent_key_is_noop() {
        let mut db = Database::default();
        db.upsert::<Tasks>(task("T1", "keep"));
        assert!(!db.delete::<Tasks>("missing"));
        assert_eq!(db.tasks.len(), 1);
        assert!(db.delete::<Tasks>("T1"));
        assert!(db.tasks.is_empty());
    }

    #[test]
    fn test_absent_snapshot_keys_backfill_empty() {
        let db: Database = serde_json::from_str(r#"{"tasks": []}"#).expect("partial snapshot");
        assert!(db.patients.is_empty());
        assert!(db.payrolls.is_empty());
        let json = serde_json::to_value(&db).expect("serialize");
        for key in [
            "patients", "staff", "appointments", "financials", "labTests", "inventory", "logs",
            "vendors", "payrolls", "surgeries", "tasks",
        ] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
    }
}
