use chitti_storage::{Group, Member, PeriodId};

/// Members who may take part in the draw for `period`: paid for the
/// period and opted in. Group order is preserved.
pub fn eligible_for_draw<'a>(group: &'a Group, period: &PeriodId) -> Vec<&'a Member> {
    group
        .members
        .iter()
        .filter(|m| m.lottery_participant && m.has_paid(period))
        .collect()
}
