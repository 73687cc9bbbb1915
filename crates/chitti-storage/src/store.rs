//! The Store trait that backends implement.

use crate::types::*;
use crate::StoreError;

/// The storage trait `chitti-core` depends on.
///
/// Reads are plain lookups and equality-filtered queries. Every mutation
/// goes through [`Store::commit`], which applies a whole [`WriteBatch`] or
/// nothing at all.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────────── Groups ─────────────────────────────────────────

    /// Get a group (with its embedded members) by ID.
    async fn get_group(&self, group_id: &GroupId) -> Result<Group, StoreError>;

    /// List all groups in creation order.
    async fn list_groups(&self) -> Result<Vec<Group>, StoreError>;

    // ───────────────────────────────────── Payments ───────────────────────────────────────

    /// Get a payment by ID.
    async fn get_payment(&self, payment_id: &PaymentId) -> Result<Payment, StoreError>;

    /// List payments matching the filter, in creation order.
    async fn list_payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, StoreError>;

    // ───────────────────────────────────── Draws ──────────────────────────────────────────

    /// Get a lottery draw by ID.
    async fn get_draw(&self, draw_id: &DrawId) -> Result<LotteryDraw, StoreError>;

    /// List draws matching the filter, in creation order.
    async fn list_draws(&self, filter: &DrawFilter) -> Result<Vec<LotteryDraw>, StoreError>;

    // ───────────────────────────────────── Writes ─────────────────────────────────────────

    /// Apply every write in order, atomically.
    ///
    /// Fails with `Conflict` when an `UpdateGroup` version check fails,
    /// `NotFound` when an updated or deleted record is missing, and
    /// `AlreadyExists` when an inserted id is taken. On failure nothing
    /// is applied.
    async fn commit(&self, batch: &WriteBatch) -> Result<(), StoreError>;
}
