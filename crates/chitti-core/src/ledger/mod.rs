//! The ledger context object.
//!
//! A [`Ledger`] owns handles to the store, the event bus and the random
//! source. Every operation is a read-modify-write against the store: the
//! group is read, the change is computed locally, and the result is
//! committed as one [`WriteBatch`] guarded by the group version. Version
//! conflicts are retried from a fresh read.

mod draws;
mod groups;
mod payments;
mod watch;

use std::future::Future;
use std::sync::{Arc, Mutex};

use chitti_config::LedgerConfig;
use chitti_events::{Collection, EventBus, EventType, LedgerChangeEvent};
use chitti_storage::{GroupId, Member, Store, StoreError, Write, WriteBatch};
use chrono::Utc;
use tracing::warn;

use crate::lottery::{self, Pick, RandomSource, ThreadRandom};
use crate::LedgerError;

pub use payments::{BatchOutcome, PaymentSelection};
pub use watch::{GroupSnapshot, GroupWatch};

pub struct Ledger<S, E> {
    store: Arc<S>,
    events: Arc<E>,
    config: LedgerConfig,
    rng: Mutex<Box<dyn RandomSource>>,
}

impl<S, E> Ledger<S, E>
where
    S: Store + 'static,
    E: EventBus + 'static,
{
    pub fn new(store: Arc<S>, events: Arc<E>, config: LedgerConfig) -> Self {
        Self {
            store,
            events,
            config,
            rng: Mutex::new(Box::new(ThreadRandom)),
        }
    }

    /// Replace the random source used by the lottery engine.
    pub fn with_random_source(self, rng: impl RandomSource + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
            ..self
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn pick_winner<'a>(&self, eligible: &[&'a Member]) -> Pick<'a> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        lottery::pick_winner(eligible, rng.as_mut())
    }

    /// Run `attempt` until it succeeds, fails with something other than a
    /// version conflict, or runs out of retries.
    async fn retrying<T, F, Fut>(&self, op: &'static str, mut attempt: F) -> Result<T, LedgerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LedgerError>>,
    {
        let mut retries = 0;
        loop {
            match attempt().await {
                Err(e) if e.is_conflict() && retries < self.config.max_conflict_retries => {
                    retries += 1;
                    warn!(op, retries, "version conflict, retrying");
                }
                other => return other,
            }
        }
    }

    /// Commit `batch` and announce each write to the group's watchers.
    async fn commit(
        &self,
        op: &'static str,
        group_id: GroupId,
        batch: WriteBatch,
    ) -> Result<(), LedgerError> {
        self.store.commit(&batch).await.map_err(|e| match e {
            // Something read for this batch vanished since; the retry re-reads
            // and reports it through the lookup.
            StoreError::NotFound => LedgerError::storage(op, StoreError::Conflict),
            other => LedgerError::storage(op, other),
        })?;

        let timestamp = Utc::now().timestamp();
        for write in &batch.writes {
            let (event_type, collection, entity_id) = describe(write);
            let event = LedgerChangeEvent {
                event_type,
                collection,
                entity_id,
                timestamp,
            };
            // The write has landed; a lost notification only delays watchers.
            if let Err(e) = self.events.publish(&group_id, event).await {
                warn!(op, %group_id, error = %e, "failed to publish change event");
            }
        }
        Ok(())
    }
}

fn describe(write: &Write) -> (EventType, Collection, String) {
    match write {
        Write::InsertGroup(g) => (EventType::Created, Collection::Groups, g.id.to_string()),
        Write::UpdateGroup { group, .. } => {
            (EventType::Updated, Collection::Groups, group.id.to_string())
        }
        Write::DeleteGroup(id) => (EventType::Deleted, Collection::Groups, id.to_string()),
        Write::InsertPayment(p) => (EventType::Created, Collection::Payments, p.id.to_string()),
        Write::DeletePayment(id) => (EventType::Deleted, Collection::Payments, id.to_string()),
        Write::InsertDraw(d) => (EventType::Created, Collection::Draws, d.id.to_string()),
        Write::DeleteDraw(id) => (EventType::Deleted, Collection::Draws, id.to_string()),
    }
}
