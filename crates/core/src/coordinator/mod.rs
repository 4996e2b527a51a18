//! # Application State Coordinator
//!
//! Holds the in-memory view every desk reads from, and is the only component that issues
//! writes to the record store. Each mutating operation validates its input, builds the new
//! record, persists it through the [`StoreHandle`], and only then applies the same change to
//! its own view, so a failed write leaves the view untouched.
//!
//! Administrative actions (direct registration, status overrides, purges, exports, safety
//! scans, payroll, theatre bookings, stock adjustments) also append an audit entry stamped
//! with the acting role.

mod forms;
mod operations;
mod patients;

pub use forms::{
    AppointmentForm, DirectRegistrationForm, DraftIdentifiers, FinancialForm, InventoryForm,
    PayrollForm, ReceptionForm, SurgeryForm, TaskForm, VendorForm,
};
pub use operations::LedgerSummary;

use crate::model::{ActivityLog, ActivityStatus, ActivityType, UserRole};
use crate::store::{
    Appendable, Appointments, Clearable, Collection, Database, Deletable, Financials, Inventory,
    LabTests, Logs, Patients, Payrolls, Staff, StoreHandle, Surgeries, Tasks, Upsertable, Vendors,
};
use crate::{HospitalError, HospitalResult};
use chrono::{DateTime, NaiveDate, Utc};
use fih_ids::ReferenceKind;
use rand::rngs::StdRng;
use rand::SeedableRng;

const MAX_REFERENCE_ATTEMPTS: usize = 100;

/// Outcome of the most recent store interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStatus {
    Connected,
    Syncing,
    Error,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SyncStatus::Connected => "connected",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Error => "error",
        })
    }
}

/// Draws references of `kind` until `is_taken` rejects one. Timestamp templates repeat within
/// a millisecond, so once the draws are spent a `-<n>` suffix is added to the last candidate.
fn free_reference<R, F>(rng: &mut R, kind: ReferenceKind, is_taken: F) -> String
where
    R: rand::Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    let mut candidate = kind.generate(rng, Utc::now());
    for _attempt in 1..MAX_REFERENCE_ATTEMPTS {
        if !is_taken(&candidate) {
            return candidate;
        }
        candidate = kind.generate(rng, Utc::now());
    }
    if !is_taken(&candidate) {
        return candidate;
    }

    let mut n = 1u32;
    loop {
        let suffixed = format!("{}-{}", candidate, n);
        if !is_taken(&suffixed) {
            tracing::warn!("reference {} in use, issued {}", candidate, suffixed);
            return suffixed;
        }
        n += 1;
    }
}

pub struct Coordinator {
    store: StoreHandle,
    view: Database,
    role: UserRole,
    sync: SyncStatus,
    rng: StdRng,
}

impl Coordinator {
    /// Reads every collection from the store and builds the initial view for `role`.
    pub async fn load(store: StoreHandle, role: UserRole) -> HospitalResult<Self> {
        let view = Self::read_all(&store).await?;
        tracing::info!(
            "coordinator ready for {} with {} patients",
            role.display_name(),
            view.patients.len()
        );
        Ok(Self {
            store,
            view,
            role,
            sync: SyncStatus::Connected,
            rng: StdRng::from_entropy(),
        })
    }

    async fn read_all(store: &StoreHandle) -> HospitalResult<Database> {
        let (
            patients,
            staff,
            appointments,
            financials,
            lab_tests,
            inventory,
            logs,
            vendors,
            payrolls,
            surgeries,
            tasks,
        ) = tokio::try_join!(
            store.get_all::<Patients>(),
            store.get_all::<Staff>(),
            store.get_all::<Appointments>(),
            store.get_all::<Financials>(),
            store.get_all::<LabTests>(),
            store.get_all::<Inventory>(),
            store.get_all::<Logs>(),
            store.get_all::<Vendors>(),
            store.get_all::<Payrolls>(),
            store.get_all::<Surgeries>(),
            store.get_all::<Tasks>(),
        )?;
        Ok(Database {
            patients,
            staff,
            appointments,
            financials,
            lab_tests,
            inventory,
            logs,
            vendors,
            payrolls,
            surgeries,
            tasks,
        })
    }

    /// Discards the view and reloads it from the store.
    pub async fn refresh(&mut self) -> HospitalResult<()> {
        self.sync = SyncStatus::Syncing;
        let result = Self::read_all(&self.store).await;
        self.settle(&result);
        self.view = result?;
        Ok(())
    }

    pub fn view(&self) -> &Database {
        &self.view
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Switches the acting role stamped on subsequent audit entries.
    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync
    }

    #[cfg(test)]
    pub(crate) fn reseed_rng(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn reference(&mut self, kind: ReferenceKind) -> String {
        let now = self.now();
        kind.generate(&mut self.rng, now)
    }

    /// Draws a reference of `kind` not already used as a key in collection `C`.
    fn unique_reference<C: Collection>(&mut self, kind: ReferenceKind) -> String {
        let view = &self.view;
        free_reference(&mut self.rng, kind, |c| view.find::<C>(c).is_some())
    }

    fn settle<T>(&mut self, result: &HospitalResult<T>) {
        self.sync = match result {
            Ok(_) => SyncStatus::Connected,
            Err(e) => {
                tracing::error!("store interaction failed: {}", e);
                SyncStatus::Error
            }
        };
    }

    async fn upsert<C: Upsertable>(&mut self, record: C::Item) -> HospitalResult<()> {
        self.sync = SyncStatus::Syncing;
        let result = self.store.upsert::<C>(record.clone()).await;
        self.settle(&result);
        result?;
        self.view.upsert::<C>(record);
        Ok(())
    }

    async fn append<C: Appendable>(&mut self, record: C::Item) -> HospitalResult<()> {
        self.sync = SyncStatus::Syncing;
        let result = self.store.append::<C>(record.clone()).await;
        self.settle(&result);
        result?;
        self.view.append::<C>(record);
        Ok(())
    }

    async fn delete<C: Deletable>(&mut self, key: &str) -> HospitalResult<bool> {
        self.sync = SyncStatus::Syncing;
        let result = self.store.delete::<C>(key).await;
        self.settle(&result);
        let removed = result?;
        self.view.delete::<C>(key);
        Ok(removed)
    }

    async fn clear<C: Clearable>(&mut self) -> HospitalResult<()> {
        self.sync = SyncStatus::Syncing;
        let result = self.store.clear::<C>().await;
        self.settle(&result);
        result?;
        self.view.clear::<C>();
        Ok(())
    }

    fn find<C: Collection>(&self, kind: &'static str, id: &str) -> HospitalResult<&C::Item> {
        self.view
            .find::<C>(id)
            .ok_or_else(|| HospitalError::not_found(kind, id))
    }

    /// Appends an audit entry for the acting role.
    async fn audit(
        &mut self,
        kind: ActivityType,
        count: u32,
        details: String,
    ) -> HospitalResult<ActivityLog> {
        let entry = ActivityLog {
            id: self.reference(ReferenceKind::Audit),
            kind,
            user_role: self.role,
            timestamp: self.now(),
            count,
            details,
            status: ActivityStatus::Success,
        };
        self.append::<Logs>(entry.clone()).await?;
        Ok(entry)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::store::{spawn_store, MemorySlot, RecordStore};

    /// A coordinator over a freshly seeded in-memory store, plus the slot for fault injection.
    pub async fn coordinator(role: UserRole) -> (Coordinator, MemorySlot) {
        over(MemorySlot::new(), role).await
    }

    /// A coordinator whose store starts from `db` instead of the seed data.
    pub async fn coordinator_with(db: &Database, role: UserRole) -> (Coordinator, MemorySlot) {
        let raw = serde_json::to_string(db).expect("serialize snapshot");
        over(MemorySlot::with_contents(raw), role).await
    }

    async fn over(slot: MemorySlot, role: UserRole) -> (Coordinator, MemorySlot) {
        let store = RecordStore::open(slot.clone(), Utc::now().date_naive()).expect("open store");
        let (handle, _task) = spawn_store(store);
        let mut coordinator = Coordinator::load(handle, role).await.expect("load coordinator");
        coordinator.reseed_rng(7);
        (coordinator, slot)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::coordinator;
    use super::*;

    #[test]
    fn test_free_reference_suffixes_when_draws_are_spent() {
        let mut rng = StdRng::seed_from_u64(3);
        let taken = |c: &str| c.starts_with("TASK-") && !c.ends_with("-2");
        let id = free_reference(&mut rng, ReferenceKind::Task, taken);
        assert!(id.starts_with("TASK-") && id.ends_with("-2"), "{}", id);

        let id = free_reference(&mut rng, ReferenceKind::Inventory, |c| c == "INV0000");
        assert_ne!(id, "INV0000");
    }

    #[tokio::test]
    async fn test_load_mirrors_store() {
        let (c, _slot) = coordinator(UserRole::Admin).await;
        assert_eq!(c.view().patients.len(), 3);
        assert_eq!(c.view().lab_tests.len(), 11);
        assert_eq!(c.sync_status(), SyncStatus::Connected);
    }

    #[tokio::test]
    async fn test_failed_write_sets_error_and_keeps_view() {
        let (mut c, slot) = coordinator(UserRole::Admin).await;
        slot.fail_writes(true);
        let before = c.view().clone();

        let err = c.clear_activity_logs().await;
        assert!(err.is_err());
        assert_eq!(c.sync_status(), SyncStatus::Error);
        assert_eq!(c.view(), &before);

        slot.fail_writes(false);
        c.refresh().await.expect("refresh");
        assert_eq!(c.sync_status(), SyncStatus::Connected);
        assert_eq!(c.view(), &before);
    }
}
