use std::sync::Arc;

use chitti_events::EventBus;
use chitti_storage::{
    DrawFilter, Group, GroupId, LotteryDraw, Payment, PaymentFilter, Store, StoreError,
};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::Ledger;
use crate::reports::{self, GroupReport};
use crate::{Entity, LedgerError};

const WATCH_BUFFER: usize = 16;

/// Consistent view of one group, read from the store in one pass.
#[derive(Clone, Debug)]
pub struct GroupSnapshot {
    pub group: Group,
    pub payments: Vec<Payment>,
    pub draws: Vec<LotteryDraw>,
    pub report: GroupReport,
}

/// Live subscription to a group.
///
/// Yields a snapshot right away and another after every committed change.
/// Ends once the group is deleted. Dropping the watch stops the background
/// task and releases the event subscription.
pub struct GroupWatch {
    rx: mpsc::Receiver<Result<GroupSnapshot, LedgerError>>,
    task: JoinHandle<()>,
}

impl GroupWatch {
    /// Next snapshot, or `None` once the watch has ended.
    pub async fn next(&mut self) -> Option<Result<GroupSnapshot, LedgerError>> {
        self.rx.recv().await
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for GroupWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn read_snapshot<S: Store>(
    store: &S,
    group_id: GroupId,
) -> Result<GroupSnapshot, LedgerError> {
    const OP: &str = "watch_group";
    let group = store
        .get_group(&group_id)
        .await
        .map_err(LedgerError::lookup(OP, Entity::Group, group_id))?;
    let payments = store
        .list_payments(&PaymentFilter::for_group(group_id))
        .await
        .map_err(|e| LedgerError::storage(OP, e))?;
    let draws = store
        .list_draws(&DrawFilter::for_group(group_id))
        .await
        .map_err(|e| LedgerError::storage(OP, e))?;
    let report = reports::group_report(&group);
    Ok(GroupSnapshot {
        group,
        payments,
        draws,
        report,
    })
}

impl<S, E> Ledger<S, E>
where
    S: Store + 'static,
    E: EventBus + 'static,
{
    /// Subscribe to changes of one group.
    pub async fn watch_group(&self, group_id: GroupId) -> Result<GroupWatch, LedgerError> {
        const OP: &str = "watch_group";
        // Fail fast on unknown groups.
        self.load_group(OP, group_id).await?;

        // Subscribe before the first read so no change slips in between.
        let mut events = self
            .events
            .subscribe(&group_id)
            .await
            .map_err(|e| LedgerError::storage(OP, StoreError::Backend(e.to_string())))?;

        let store = Arc::clone(&self.store);
        let (tx, rx) = mpsc::channel(WATCH_BUFFER);

        let task = tokio::spawn(async move {
            loop {
                let snapshot = read_snapshot(store.as_ref(), group_id).await;
                let gone = matches!(snapshot, Err(LedgerError::NotFound { .. }));
                if tx.send(snapshot).await.is_err() || gone {
                    break;
                }
                let Some(event) = events.next().await else {
                    break;
                };
                debug!(%group_id, collection = ?event.collection, entity_id = %event.entity_id, "group changed");
                // One commit publishes an event per write; read once for all of them.
                while let Some(Some(_)) = events.next().now_or_never() {}
            }
            debug!(%group_id, "group watch ended");
        });

        Ok(GroupWatch { rx, task })
    }
}
