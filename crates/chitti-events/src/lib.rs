//! Event bus abstraction for chitti ledger change notifications.
//!
//! This crate defines the EventBus trait that lets watchers learn about
//! committed writes without polling:
//! - Memory (single process, tokio broadcast channels)
//!
//! Events only say *what* changed. Consumers re-read the affected group
//! from the store instead of patching local state from the event.

use async_trait::async_trait;
use chitti_storage::GroupId;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;

/// Type of change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Created,
    Updated,
    Deleted,
}

/// Collection the changed record lives in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Groups,
    Payments,
    Draws,
}

/// Event representing a committed change to one record of a group
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerChangeEvent {
    pub event_type: EventType,
    pub collection: Collection,
    pub entity_id: String,
    pub timestamp: i64,
}

/// Error type for event bus operations
#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("backend error: {0}")]
    Backend(String),
}

/// Stream of ledger change events
pub type EventStream = Pin<Box<dyn Stream<Item = LedgerChangeEvent> + Send>>;

/// Event bus trait for publishing and subscribing to ledger change events.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a change event to all watchers of this group.
    ///
    /// Called after a write batch touching the group has been committed.
    async fn publish(
        &self,
        group_id: &GroupId,
        event: LedgerChangeEvent,
    ) -> Result<(), EventBusError>;

    /// Subscribe to change events for a group.
    ///
    /// Returns a stream that yields events as they occur.
    /// The stream will continue until dropped.
    async fn subscribe(&self, group_id: &GroupId) -> Result<EventStream, EventBusError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_equality() {
        assert_eq!(EventType::Created, EventType::Created);
        assert_ne!(EventType::Created, EventType::Updated);
        assert_ne!(EventType::Updated, EventType::Deleted);
    }

    #[test]
    fn test_change_event_serialization() {
        let event = LedgerChangeEvent {
            event_type: EventType::Created,
            collection: Collection::Payments,
            entity_id: "0191d7a4-0000-7000-8000-000000000000".to_string(),
            timestamp: 1234567890,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"payments\""));
        let deserialized: LedgerChangeEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(event.event_type, deserialized.event_type);
        assert_eq!(event.collection, deserialized.collection);
        assert_eq!(event.entity_id, deserialized.entity_id);
        assert_eq!(event.timestamp, deserialized.timestamp);
    }

    #[test]
    fn test_event_bus_error_display() {
        let error = EventBusError::Backend("connection failed".to_string());
        let display = error.to_string();
        assert!(display.contains("backend error"));
        assert!(display.contains("connection failed"));
    }
}
