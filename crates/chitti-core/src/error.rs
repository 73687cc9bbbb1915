use chitti_storage::{DrawId, GroupId, PeriodId, StoreError};
use thiserror::Error;

/// Kind of record an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    Group,
    Member,
    Payment,
    Draw,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group => write!(f, "group"),
            Self::Member => write!(f, "member"),
            Self::Payment => write!(f, "payment"),
            Self::Draw => write!(f, "draw"),
        }
    }
}

/// Errors returned by ledger operations. Every variant names the
/// operation that failed.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{op}: {reason}")]
    Validation { op: &'static str, reason: String },

    #[error("{op}: {entity} {id} not found")]
    NotFound {
        op: &'static str,
        entity: Entity,
        id: String,
    },

    #[error("{op}: no members selected")]
    NoSelection { op: &'static str },

    #[error("draw_lottery: no eligible members in group {group_id} for {period}")]
    NoEligibleMembers { group_id: GroupId, period: PeriodId },

    #[error("draw_lottery: group {group_id} already has draw {draw_id} for {period}")]
    DuplicateDraw {
        group_id: GroupId,
        period: PeriodId,
        draw_id: DrawId,
    },

    #[error("{op}: storage unavailable: {source}")]
    StorageUnavailable {
        op: &'static str,
        #[source]
        source: StoreError,
    },
}

impl LedgerError {
    pub(crate) fn validation(op: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            op,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(op: &'static str, entity: Entity, id: impl ToString) -> Self {
        Self::NotFound {
            op,
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn storage(op: &'static str, source: StoreError) -> Self {
        Self::StorageUnavailable { op, source }
    }

    /// Map a store error for a lookup of `entity` `id`.
    pub(crate) fn lookup(
        op: &'static str,
        entity: Entity,
        id: impl ToString,
    ) -> impl FnOnce(StoreError) -> Self {
        move |e| match e {
            StoreError::NotFound => Self::not_found(op, entity, id),
            other => Self::storage(op, other),
        }
    }

    /// True for an optimistic version conflict worth retrying.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable {
                source: StoreError::Conflict,
                ..
            }
        )
    }
}
