//! Read-side summaries of the ledger. Nothing here mutates state.

use chitti_storage::{Group, GroupId, GroupStatus, LotteryDraw, Member, MemberId, Payment};
use serde::{Deserialize, Serialize};

/// Whether a member has paid their full share of the scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
    Pending,
}

impl std::fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "Completed"),
            Self::Pending => write!(f, "Pending"),
        }
    }
}

/// `round(numerator / denominator)`, halves rounded up. Zero denominator yields 0.
fn round_div(numerator: i128, denominator: i128) -> i128 {
    if denominator == 0 {
        return 0;
    }
    let q = numerator.div_euclid(denominator);
    let r = numerator.rem_euclid(denominator);
    if 2 * r >= denominator.abs() {
        q + 1
    } else {
        q
    }
}

/// Each member's share of the whole scheme: one monthly payment per
/// member-period, for as many periods as there are members.
pub fn total_due(group: &Group) -> i128 {
    group.expected_per_period()
}

pub fn member_status(group: &Group, member: &Member) -> CompletionStatus {
    if i128::from(member.total_paid) >= total_due(group) {
        CompletionStatus::Completed
    } else {
        CompletionStatus::Pending
    }
}

/// Collected amount as a percentage of `members * monthly_amount`.
pub fn group_progress(group: &Group) -> i128 {
    round_div(100 * group.total_collected(), group.expected_per_period())
}

pub fn commission_amount(group: &Group) -> i128 {
    round_div(
        group.total_collected() * i128::from(group.commission_percent),
        100,
    )
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberReport {
    pub member_id: MemberId,
    pub name: String,
    pub periods_paid: usize,
    pub total_paid: i64,
    pub lottery_participant: bool,
    pub won_lottery: bool,
    pub status: CompletionStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    pub group_id: GroupId,
    pub name: String,
    pub status: GroupStatus,
    pub total_members: usize,
    pub monthly_amount: i64,
    pub total_expected: i128,
    pub total_collected: i128,
    pub commission_percent: u8,
    pub commission_amount: i128,
    pub progress_percent: i128,
    pub members: Vec<MemberReport>,
}

pub fn group_report(group: &Group) -> GroupReport {
    GroupReport {
        group_id: group.id,
        name: group.name.clone(),
        status: group.status,
        total_members: group.total_members(),
        monthly_amount: group.monthly_amount,
        total_expected: group.expected_per_period(),
        total_collected: group.total_collected(),
        commission_percent: group.commission_percent,
        commission_amount: commission_amount(group),
        progress_percent: group_progress(group),
        members: group
            .members
            .iter()
            .map(|m| MemberReport {
                member_id: m.id,
                name: m.name.clone(),
                periods_paid: m.paid_periods.len(),
                total_paid: m.total_paid,
                lottery_participant: m.lottery_participant,
                won_lottery: m.won_lottery,
                status: member_status(group, m),
            })
            .collect(),
    }
}

/// Totals across every group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_groups: usize,
    pub total_members: usize,
    pub total_collected: i128,
    pub total_draws: usize,
}

pub fn dashboard_summary(
    groups: &[Group],
    payments: &[Payment],
    draws: &[LotteryDraw],
) -> DashboardSummary {
    DashboardSummary {
        total_groups: groups.len(),
        total_members: groups.iter().map(Group::total_members).sum(),
        total_collected: payments.iter().map(|p| i128::from(p.amount)).sum(),
        total_draws: draws.len(),
    }
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// One row per member of every group.
pub fn export_csv(groups: &[Group]) -> String {
    let mut out = String::from("Group Name,Member Name,Total Paid,Periods Paid,Won Lottery\n");
    for group in groups {
        for member in &group.members {
            let periods: Vec<&str> = member.paid_periods.iter().map(|p| p.as_str()).collect();
            out.push_str(&format!(
                "{},{},{},{},{}\n",
                csv_field(&group.name),
                csv_field(&member.name),
                member.total_paid,
                csv_field(&periods.join(", ")),
                if member.won_lottery { "Yes" } else { "No" },
            ));
        }
    }
    out
}
