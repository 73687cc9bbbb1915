//! Lottery draw records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DrawId, GroupId, MemberId, PaymentId, PeriodId};

/// Outcome of one lottery draw. At most one per (group, period).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryDraw {
    pub id: DrawId,
    pub group_id: GroupId,
    pub period: PeriodId,
    pub winner_member_id: MemberId,
    /// Denormalized at draw time.
    pub winner_name: String,
    pub surcharge_amount: i64,
    pub surcharge_payment_id: PaymentId,
    pub drawn_at: DateTime<Utc>,
}

/// Equality filter for draw queries. `None` fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawFilter {
    pub group_id: Option<GroupId>,
    pub period: Option<PeriodId>,
    pub winner_member_id: Option<MemberId>,
}

impl DrawFilter {
    pub fn for_group(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    pub fn for_period(group_id: GroupId, period: PeriodId) -> Self {
        Self {
            group_id: Some(group_id),
            period: Some(period),
            winner_member_id: None,
        }
    }

    pub fn matches(&self, draw: &LotteryDraw) -> bool {
        self.group_id.is_none_or(|g| g == draw.group_id)
            && self.period.as_ref().is_none_or(|p| p == &draw.period)
            && self
                .winner_member_id
                .is_none_or(|m| m == draw.winner_member_id)
    }
}
