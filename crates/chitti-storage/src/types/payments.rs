//! Payment records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DrawId, GroupId, MemberId, PaymentId, PeriodId};

/// Payment record. Immutable once created; only deletion is allowed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub group_id: GroupId,
    pub member_id: MemberId,
    pub member_name: String,
    pub amount: i64,
    pub period: PeriodId,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    /// Set for lottery surcharges; the draw owns this payment.
    #[serde(default)]
    pub draw_id: Option<DrawId>,
}

impl Payment {
    pub fn is_surcharge(&self) -> bool {
        self.draw_id.is_some()
    }
}

/// Equality filter for payment queries. `None` fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub group_id: Option<GroupId>,
    pub member_id: Option<MemberId>,
    pub period: Option<PeriodId>,
}

impl PaymentFilter {
    pub fn for_group(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    pub fn for_member(group_id: GroupId, member_id: MemberId) -> Self {
        Self {
            group_id: Some(group_id),
            member_id: Some(member_id),
            period: None,
        }
    }

    pub fn matches(&self, payment: &Payment) -> bool {
        self.group_id.is_none_or(|g| g == payment.group_id)
            && self.member_id.is_none_or(|m| m == payment.member_id)
            && self.period.as_ref().is_none_or(|p| p == &payment.period)
    }
}
