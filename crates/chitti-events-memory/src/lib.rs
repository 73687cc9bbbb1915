//! In-process [`EventBus`] on tokio broadcast channels.
//!
//! Each group gets one broadcast channel, created by its first subscriber.
//! A channel is dropped again when its last subscription goes away, when a
//! publish finds nobody listening, or when the group itself is deleted, so
//! the map only holds groups that someone is watching.

use std::sync::Arc;

use async_trait::async_trait;
use chitti_events::{
    Collection, EventBus, EventBusError, EventStream, EventType, LedgerChangeEvent,
};
use chitti_storage::GroupId;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

const CHANNEL_CAPACITY: usize = 100;

type Channels = DashMap<GroupId, broadcast::Sender<LedgerChangeEvent>>;

/// Event bus for a single process: the CLI, tests, and any embedding that
/// owns both the ledger and its watchers.
#[derive(Default)]
pub struct MemoryEventBus {
    channels: Arc<Channels>,
}

impl MemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscribers for a group.
    pub fn subscriber_count(&self, group_id: &GroupId) -> usize {
        self.channels
            .get(group_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Number of groups with an open channel.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

fn release_if_idle(channels: &Channels, group_id: &GroupId) {
    channels.remove_if(group_id, |_, tx| tx.receiver_count() == 0);
}

fn is_group_deletion(event: &LedgerChangeEvent) -> bool {
    event.event_type == EventType::Deleted && event.collection == Collection::Groups
}

#[async_trait]
impl EventBus for MemoryEventBus {
    async fn publish(
        &self,
        group_id: &GroupId,
        event: LedgerChangeEvent,
    ) -> Result<(), EventBusError> {
        let closing = is_group_deletion(&event);
        let delivered = match self.channels.get(group_id) {
            Some(tx) => tx.send(event).is_ok(),
            None => return Ok(()),
        };

        if closing {
            // Subscribers drain what is buffered, then see the stream end.
            self.channels.remove(group_id);
        } else if !delivered {
            release_if_idle(&self.channels, group_id);
        }
        Ok(())
    }

    async fn subscribe(&self, group_id: &GroupId) -> Result<EventStream, EventBusError> {
        // Subscribe under the entry lock so a concurrent release cannot
        // drop the channel between lookup and subscribe.
        let rx = self
            .channels
            .entry(*group_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();

        let subscription = Subscription {
            events: Some(BroadcastStream::new(rx)),
            group_id: *group_id,
            channels: Arc::clone(&self.channels),
        };

        // A lagged receiver loses events; watchers re-read the whole group on
        // the next one anyway, so those are skipped.
        let stream = futures::stream::unfold(subscription, |mut sub| async move {
            loop {
                let item = sub.events.as_mut()?.next().await?;
                if let Ok(event) = item {
                    return Some((event, sub));
                }
            }
        });

        Ok(Box::pin(stream))
    }
}

/// Receiver side of one group channel. Dropping it releases the channel
/// once nobody else listens.
struct Subscription {
    events: Option<BroadcastStream<LedgerChangeEvent>>,
    group_id: GroupId,
    channels: Arc<Channels>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Drop the receiver first so the count below no longer includes it.
        self.events.take();
        release_if_idle(&self.channels, &self.group_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn event(event_type: EventType, collection: Collection, entity_id: &str) -> LedgerChangeEvent {
        LedgerChangeEvent {
            event_type,
            collection,
            entity_id: entity_id.to_string(),
            timestamp: 12345,
        }
    }

    #[tokio::test]
    async fn subscriber_receives_group_events() {
        let bus = MemoryEventBus::new();
        let group_id = GroupId::new();

        let mut stream = bus.subscribe(&group_id).await.unwrap();
        bus.publish(
            &group_id,
            event(EventType::Created, Collection::Payments, "p1"),
        )
        .await
        .unwrap();

        let received = tokio::time::timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout")
            .expect("stream ended");
        assert_eq!(received.entity_id, "p1");
        assert_eq!(received.collection, Collection::Payments);
    }

    #[tokio::test]
    async fn publish_without_subscribers_opens_no_channel() {
        let bus = MemoryEventBus::new();
        let group_id = GroupId::new();

        bus.publish(&group_id, event(EventType::Created, Collection::Draws, "old"))
            .await
            .unwrap();
        assert_eq!(bus.channel_count(), 0);

        let mut stream = bus.subscribe(&group_id).await.unwrap();
        let result = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
        assert!(result.is_err(), "earlier event must not be replayed");
    }

    #[tokio::test]
    async fn groups_do_not_see_each_other() {
        let bus = MemoryEventBus::new();
        let group_a = GroupId::new();
        let group_b = GroupId::new();

        let mut stream_a = bus.subscribe(&group_a).await.unwrap();
        let _stream_b = bus.subscribe(&group_b).await.unwrap();
        assert_eq!(bus.channel_count(), 2);

        bus.publish(&group_b, event(EventType::Updated, Collection::Groups, "b"))
            .await
            .unwrap();
        bus.publish(&group_a, event(EventType::Updated, Collection::Groups, "a"))
            .await
            .unwrap();

        let received = tokio::time::timeout(Duration::from_millis(100), stream_a.next())
            .await
            .expect("timeout")
            .expect("stream ended");
        assert_eq!(received.entity_id, "a");
    }

    #[tokio::test]
    async fn last_dropped_subscription_releases_channel() {
        let bus = MemoryEventBus::new();
        let group_id = GroupId::new();

        let first = bus.subscribe(&group_id).await.unwrap();
        let second = bus.subscribe(&group_id).await.unwrap();
        assert_eq!(bus.subscriber_count(&group_id), 2);

        drop(first);
        assert_eq!(bus.subscriber_count(&group_id), 1);
        assert_eq!(bus.channel_count(), 1);

        drop(second);
        assert_eq!(bus.subscriber_count(&group_id), 0);
        assert_eq!(bus.channel_count(), 0);
    }

    #[tokio::test]
    async fn group_deletion_ends_subscriptions() {
        let bus = MemoryEventBus::new();
        let group_id = GroupId::new();
        let mut stream = bus.subscribe(&group_id).await.unwrap();

        bus.publish(
            &group_id,
            event(EventType::Deleted, Collection::Groups, "gone"),
        )
        .await
        .unwrap();
        assert_eq!(bus.channel_count(), 0);

        let last = stream.next().await.expect("deletion event is delivered");
        assert_eq!(last.event_type, EventType::Deleted);
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn new_bus_is_empty() {
        let bus = MemoryEventBus::default();
        assert_eq!(bus.channel_count(), 0);
        assert_eq!(bus.subscriber_count(&GroupId::new()), 0);
    }
}
