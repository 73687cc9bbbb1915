//! Rebuild derived member fields from the payment and draw records.

use std::collections::BTreeSet;

use chitti_storage::{Group, LotteryDraw, Member, MemberId, Payment, PeriodId};

/// Derived state of one member, as implied by the records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DerivedState {
    pub total_paid: i64,
    pub paid_periods: BTreeSet<PeriodId>,
    pub won_lottery: bool,
}

/// `None` if the member's payments add up past `i64::MAX`.
pub(crate) fn derive(
    member: &Member,
    payments: &[Payment],
    draws: &[LotteryDraw],
) -> Option<DerivedState> {
    let mine = payments.iter().filter(|p| p.member_id == member.id);
    let mut total_paid: i64 = 0;
    let mut paid_periods = BTreeSet::new();
    for p in mine {
        total_paid = total_paid.checked_add(p.amount)?;
        paid_periods.insert(p.period.clone());
    }
    Some(DerivedState {
        total_paid,
        paid_periods,
        won_lottery: draws.iter().any(|d| d.winner_member_id == member.id),
    })
}

/// Recompute `total_paid`, `paid_periods` and `won_lottery` for every
/// member of `group`. Returns how many members changed, or the first
/// member whose payments overflow a total. The group is untouched on error.
pub fn rebuild_members(
    group: &mut Group,
    payments: &[Payment],
    draws: &[LotteryDraw],
) -> Result<usize, MemberId> {
    let derived = group
        .members
        .iter()
        .map(|m| derive(m, payments, draws).ok_or(m.id))
        .collect::<Result<Vec<_>, _>>()?;

    let mut changed = 0;
    for (member, derived) in group.members.iter_mut().zip(derived) {
        if member.total_paid != derived.total_paid
            || member.paid_periods != derived.paid_periods
            || member.won_lottery != derived.won_lottery
        {
            member.total_paid = derived.total_paid;
            member.paid_periods = derived.paid_periods;
            member.won_lottery = derived.won_lottery;
            changed += 1;
        }
    }
    Ok(changed)
}

/// After `removed` is deleted, does any remaining payment still cover the
/// same member and period?
pub(crate) fn period_still_covered(removed: &Payment, remaining: &[Payment]) -> bool {
    remaining.iter().any(|p| {
        p.id != removed.id && p.member_id == removed.member_id && p.period == removed.period
    })
}
