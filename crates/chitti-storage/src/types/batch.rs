//! Atomic write batches.

use super::{DrawId, Group, GroupId, LotteryDraw, Payment, PaymentId};

/// A single write inside a [`WriteBatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Write {
    InsertGroup(Group),
    /// Replace a group if its stored version equals `expected_version`.
    /// The stored copy gets `version = expected_version + 1`.
    UpdateGroup {
        group: Group,
        expected_version: u64,
    },
    DeleteGroup(GroupId),
    InsertPayment(Payment),
    DeletePayment(PaymentId),
    InsertDraw(LotteryDraw),
    DeleteDraw(DrawId),
}

/// Ordered list of writes applied all-or-nothing by [`crate::Store::commit`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    pub writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, write: Write) -> Self {
        self.writes.push(write);
        self
    }

    pub fn update_group(self, group: Group, expected_version: u64) -> Self {
        self.push(Write::UpdateGroup {
            group,
            expected_version,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }
}
