//! Chit fund groups and their embedded members.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupId, MemberId, PeriodId};

/// Lifecycle status of a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    Active,
    Closed,
}

impl std::fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Member record, embedded in its group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    /// Periods with at least one recorded payment.
    #[serde(default)]
    pub paid_periods: BTreeSet<PeriodId>,
    /// Running sum of every live payment for this member.
    #[serde(default)]
    pub total_paid: i64,
    #[serde(default)]
    pub lottery_participant: bool,
    #[serde(default)]
    pub won_lottery: bool,
}

impl Member {
    /// New member with a fresh id and no payment history.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: MemberId::new(),
            name: name.into(),
            paid_periods: BTreeSet::new(),
            total_paid: 0,
            lottery_participant: false,
            won_lottery: false,
        }
    }

    pub fn has_paid(&self, period: &PeriodId) -> bool {
        self.paid_periods.contains(period)
    }
}

/// Group record.
///
/// The group and its members form one consistency unit: every member
/// mutation is written back as a whole group guarded by `version`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub monthly_amount: i64,
    pub commission_percent: u8,
    /// Insertion order is display and participation order.
    pub members: Vec<Member>,
    pub status: GroupStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Group {
    pub fn total_members(&self) -> usize {
        self.members.len()
    }

    pub fn find_member(&self, member_id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == member_id)
    }

    pub fn find_member_mut(&mut self, member_id: &MemberId) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| &m.id == member_id)
    }

    /// Sum of every member's running total. Widened so that member totals
    /// near `i64::MAX` still add up.
    pub fn total_collected(&self) -> i128 {
        self.members.iter().map(|m| i128::from(m.total_paid)).sum()
    }

    /// Amount owed by the whole group for a single period.
    pub fn expected_per_period(&self) -> i128 {
        i128::from(self.monthly_amount) * self.members.len() as i128
    }

    pub fn is_active(&self) -> bool {
        self.status == GroupStatus::Active
    }
}
