//! Chit fund ledger core.
//!
//! A chit fund is a group of members who each pay a fixed monthly amount
//! into a common pot. This crate keeps the ledger for such groups: who
//! paid for which month, which members may enter the monthly lottery, who
//! won it, and how far each member and each group is towards completion.
//!
//! The [`Ledger`] context object is generic over a [`chitti_storage::Store`]
//! and a [`chitti_events::EventBus`], so the same logic runs against a local
//! JSON document, an in-memory store in tests, or any other backend.

mod error;
mod ledger;

pub mod eligibility;
pub mod lottery;
pub mod model;
pub mod reconcile;
pub mod reports;

pub use error::{Entity, LedgerError};
pub use ledger::{BatchOutcome, GroupSnapshot, GroupWatch, Ledger, PaymentSelection};
pub use lottery::{
    Pick, RandomSource, ScriptedRandom, SeededRandom, ThreadRandom, SURCHARGE_DESCRIPTION,
};
pub use model::{GroupChanges, NewGroup};
pub use reports::{CompletionStatus, DashboardSummary, GroupReport, MemberReport};
