//! Single-writer access to the [`RecordStore`].

use super::{Appendable, Clearable, Collection, Database, Deletable, RecordStore, Upsertable};
use crate::constants::STORE_QUEUE_DEPTH;
use crate::{HospitalError, HospitalResult};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

type Job = Box<dyn FnOnce(&mut RecordStore) + Send>;

/// Cloneable handle to a store owned by a background task.
///
/// Jobs run in the order they are queued. A caller that stops waiting does not cancel its job;
/// the job still runs and its result is dropped.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<Job>,
}

/// Moves `store` onto a tokio task. The task stops once every handle is dropped.
pub fn spawn_store(mut store: RecordStore) -> (StoreHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Job>(STORE_QUEUE_DEPTH);
    let task = tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            job(&mut store);
        }
        tracing::debug!("record store task stopped");
    });
    (StoreHandle { tx }, task)
}

impl StoreHandle {
    async fn call<T, F>(&self, f: F) -> HospitalResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut RecordStore) -> HospitalResult<T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |store: &mut RecordStore| {
            // Receiver gone means the caller stopped waiting.
            let _ = reply_tx.send(f(store));
        });
        self.tx
            .send(job)
            .await
            .map_err(|_| HospitalError::StoreClosed)?;
        reply_rx.await.map_err(|_| HospitalError::StoreClosed)?
    }

    pub async fn get_all<C: Collection>(&self) -> HospitalResult<Vec<C::Item>> {
        self.call(|store| Ok(store.get_all::<C>())).await
    }

    pub async fn snapshot(&self) -> HospitalResult<Database> {
        self.call(|store| Ok(store.snapshot().clone())).await
    }

    pub async fn upsert<C: Upsertable>(&self, record: C::Item) -> HospitalResult<()> {
        self.call(move |store| store.upsert::<C>(record)).await
    }

    pub async fn append<C: Appendable>(&self, record: C::Item) -> HospitalResult<()> {
        self.call(move |store| store.append::<C>(record)).await
    }

    pub async fn delete<C: Deletable>(&self, key: impl Into<String>) -> HospitalResult<bool> {
        let key = key.into();
        self.call(move |store| store.delete::<C>(&key)).await
    }

    pub async fn clear<C: Clearable>(&self) -> HospitalResult<()> {
        self.call(|store| store.clear::<C>()).await
    }
}
