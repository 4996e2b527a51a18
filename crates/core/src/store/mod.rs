//! # Record Store
//!
//! Durable, collection-oriented storage for every hospital record, backed by one
//! [`SnapshotSlot`]. The whole database is one JSON document; every mutation rewrites it.
//!
//! A mutation is applied to a working copy, the copy is serialised and written, and only then
//! does it replace the live state. If serialisation or the write fails the caller gets the
//! error and the live state is exactly what it was before the call.
//!
//! [`RecordStore`] itself is synchronous. [`spawn_store`] moves it onto a tokio task and hands
//! out [`StoreHandle`]s, which makes the task the only writer.

mod collections;
mod handle;
mod seed;
mod slot;

pub use collections::{
    Appendable, Appointments, Clearable, Collection, Database, Deletable, Financials, Inventory,
    LabTests, Logs, Patients, Payrolls, Placement, Record, Staff, Surgeries, Tasks, Upsertable,
    Vendors,
};
pub use handle::{spawn_store, StoreHandle};
pub use seed::{lab_catalog, seed_database};
pub use slot::{FileSlot, MemorySlot, SnapshotSlot};

use crate::{HospitalError, HospitalResult};
use chrono::NaiveDate;

pub struct RecordStore {
    db: Database,
    slot: Box<dyn SnapshotSlot>,
}

impl RecordStore {
    /// Loads the snapshot held in `slot`, or seeds and persists demonstration data if the slot
    /// is empty.
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::Deserialization`] if the slot holds something that is not a
    /// snapshot, and slot errors as raised.
    pub fn open(slot: impl SnapshotSlot + 'static, today: NaiveDate) -> HospitalResult<Self> {
        let mut slot: Box<dyn SnapshotSlot> = Box::new(slot);
        let db = match slot.load()? {
            Some(raw) => {
                let db: Database =
                    serde_json::from_str(&raw).map_err(HospitalError::Deserialization)?;
                tracing::info!(
                    "loaded snapshot with {} patients and {} ledger entries",
                    db.patients.len(),
                    db.financials.len()
                );
                db
            }
            None => {
                let db = seed_database(today);
                let raw = serde_json::to_string(&db).map_err(HospitalError::Serialization)?;
                slot.save(&raw)?;
                tracing::info!("empty slot, seeded demonstration records");
                db
            }
        };
        Ok(Self { db, slot })
    }

    pub fn snapshot(&self) -> &Database {
        &self.db
    }

    /// Returns an owned copy; later mutations do not affect it.
    pub fn get_all<C: Collection>(&self) -> Vec<C::Item> {
        self.db.all::<C>().to_vec()
    }

    pub fn upsert<C: Upsertable>(&mut self, record: C::Item) -> HospitalResult<()> {
        self.commit(C::NAME, "upsert", |db| db.upsert::<C>(record))
    }

    pub fn append<C: Appendable>(&mut self, record: C::Item) -> HospitalResult<()> {
        self.commit(C::NAME, "append", |db| db.append::<C>(record))
    }

    /// Deleting an absent key succeeds and still rewrites the slot.
    pub fn delete<C: Deletable>(&mut self, key: &str) -> HospitalResult<bool> {
        self.commit(C::NAME, "delete", |db| db.delete::<C>(key))
    }

    pub fn clear<C: Clearable>(&mut self) -> HospitalResult<()> {
        self.commit(C::NAME, "clear", |db| db.clear::<C>())
    }

    fn commit<T>(
        &mut self,
        collection: &'static str,
        op: &'static str,
        mutate: impl FnOnce(&mut Database) -> T,
    ) -> HospitalResult<T> {
        let mut working = self.db.clone();
        let out = mutate(&mut working);

        let persisted = serde_json::to_string(&working)
            .map_err(HospitalError::Serialization)
            .and_then(|raw| self.slot.save(&raw));
        if let Err(e) = persisted {
            tracing::error!("{} on {} rolled back: {}", op, collection, e);
            return Err(e);
        }

        self.db = working;
        tracing::debug!("{} on {} persisted", op, collection);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FinancialKind, FinancialRecord, PatientStatus};
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).expect("date")
    }

    fn expense(id: &str) -> FinancialRecord {
        FinancialRecord {
            id: id.into(),
            kind: FinancialKind::Expense,
            category: "Utilities".into(),
            amount: 250_000.0,
            date: today(),
            description: "Generator diesel".into(),
        }
    }

    #[test]
    fn test_open_seeds_once_and_persists() {
        let slot = MemorySlot::new();
        let store = RecordStore::open(slot.clone(), today()).expect("open");
        assert_eq!(store.get_all::<Patients>().len(), 3);
        assert_eq!(store.get_all::<LabTests>().len(), 11);
        assert_eq!(store.get_all::<Staff>()[0].salary, Some(5_000_000.0));
        assert!(store.get_all::<Tasks>().iter().all(|t| t.due_date == today()));
        assert_eq!(slot.writes(), 1);

        let reopened = RecordStore::open(slot.clone(), today()).expect("reopen");
        assert_eq!(slot.writes(), 1, "existing snapshot must not be reseeded");
        assert_eq!(reopened.snapshot(), store.snapshot());
    }

    #[test]
    fn test_open_rejects_corrupt_slot() {
        let slot = MemorySlot::with_contents("not a snapshot");
        assert!(matches!(
            RecordStore::open(slot, today()),
            Err(HospitalError::Deserialization(_))
        ));
    }

    #[test]
    fn test_snapshot_round_trips_through_file_slot() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("FIH_HMS_DB_V2.json");

        let mut store = RecordStore::open(FileSlot::new(&path), today()).expect("open");
        store.append::<Financials>(expense("F9000")).expect("append");
        let before = store.snapshot().clone();

        let reopened = RecordStore::open(FileSlot::new(&path), today()).expect("reopen");
        assert_eq!(reopened.snapshot(), &before);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let slot = MemorySlot::new();
        let mut store = RecordStore::open(slot.clone(), today()).expect("open");
        let before = store.get_all::<Financials>();

        slot.fail_writes(true);
        let err = store
            .append::<Financials>(expense("F9001"))
            .expect_err("write should fail");
        assert!(err.is_persistence());
        assert_eq!(store.get_all::<Financials>(), before);

        slot.fail_writes(false);
        store.append::<Financials>(expense("F9001")).expect("append");
        assert_eq!(store.get_all::<Financials>()[0].id, "F9001");
    }

    #[test]
    fn test_get_all_returns_an_owned_copy() {
        let mut store = RecordStore::open(MemorySlot::new(), today()).expect("open");
        let mut copy = store.get_all::<Patients>();
        copy[0].status = PatientStatus::Discharged;
        copy.clear();
        assert_eq!(store.get_all::<Patients>().len(), 3);

        let mut p = store.get_all::<Patients>()[1].clone();
        p.status = PatientStatus::InConsultation;
        store.upsert::<Patients>(p).expect("upsert");
        assert_eq!(copy.len(), 0);
        assert_eq!(
            store.get_all::<Patients>()[1].status,
            PatientStatus::InConsultation
        );
    }

    #[test]
    fn test_delete_absent_key_succeeds() {
        let slot = MemorySlot::new();
        let mut store = RecordStore::open(slot.clone(), today()).expect("open");
        assert!(!store.delete::<Patients>("P999").expect("delete"));
        assert_eq!(store.get_all::<Patients>().len(), 3);
        assert_eq!(slot.writes(), 2);
    }
}
