//! Construction and validation of groups and members.

use std::collections::HashSet;

use chitti_storage::{Group, GroupId, GroupStatus, Member};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Input for creating a group.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub monthly_amount: i64,
    pub commission_percent: u8,
    pub member_names: Vec<String>,
}

/// Partial edit of a group's settings. Members are untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupChanges {
    pub name: Option<String>,
    pub monthly_amount: Option<i64>,
    pub commission_percent: Option<u8>,
}

impl GroupChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.monthly_amount.is_none() && self.commission_percent.is_none()
    }
}

fn clean_name(op: &'static str, what: &str, name: &str) -> Result<String, LedgerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation(op, format!("{what} name is empty")));
    }
    Ok(name.to_string())
}

fn check_amount(op: &'static str, monthly_amount: i64) -> Result<(), LedgerError> {
    if monthly_amount <= 0 {
        return Err(LedgerError::validation(
            op,
            format!("monthly amount must be positive, got {monthly_amount}"),
        ));
    }
    Ok(())
}

fn check_commission(op: &'static str, commission_percent: u8) -> Result<(), LedgerError> {
    if commission_percent > 100 {
        return Err(LedgerError::validation(
            op,
            format!("commission must be 0-100%, got {commission_percent}"),
        ));
    }
    Ok(())
}

/// Validate `NewGroup` and build the group with fresh member ids.
///
/// Member names are compared case-insensitively; duplicates are rejected
/// so per-member totals are never ambiguous.
pub fn build_group(new: NewGroup, now: DateTime<Utc>) -> Result<Group, LedgerError> {
    const OP: &str = "create_group";
    let name = clean_name(OP, "group", &new.name)?;
    check_amount(OP, new.monthly_amount)?;
    check_commission(OP, new.commission_percent)?;

    if new.member_names.is_empty() {
        return Err(LedgerError::validation(OP, "at least one member is required"));
    }

    let mut seen = HashSet::new();
    let mut members = Vec::with_capacity(new.member_names.len());
    for raw in &new.member_names {
        let member_name = clean_name(OP, "member", raw)?;
        if !seen.insert(member_name.to_lowercase()) {
            return Err(LedgerError::validation(
                OP,
                format!("duplicate member name '{member_name}'"),
            ));
        }
        members.push(Member::new(member_name));
    }

    Ok(Group {
        id: GroupId::new(),
        name,
        monthly_amount: new.monthly_amount,
        commission_percent: new.commission_percent,
        members,
        status: GroupStatus::Active,
        created_at: now,
        updated_at: now,
        version: 0,
    })
}

/// Apply validated setting changes in place.
pub fn apply_changes(group: &mut Group, changes: &GroupChanges) -> Result<(), LedgerError> {
    const OP: &str = "update_group";
    if let Some(name) = &changes.name {
        group.name = clean_name(OP, "group", name)?;
    }
    if let Some(amount) = changes.monthly_amount {
        check_amount(OP, amount)?;
        group.monthly_amount = amount;
    }
    if let Some(commission) = changes.commission_percent {
        check_commission(OP, commission)?;
        group.commission_percent = commission;
    }
    Ok(())
}

/// New member for `group`, rejecting a name already in use.
pub fn new_member(group: &Group, name: &str) -> Result<Member, LedgerError> {
    const OP: &str = "add_member";
    let name = clean_name(OP, "member", name)?;
    let lowered = name.to_lowercase();
    if group
        .members
        .iter()
        .any(|m| m.name.to_lowercase() == lowered)
    {
        return Err(LedgerError::validation(
            OP,
            format!("member '{name}' already exists in group {}", group.id),
        ));
    }
    Ok(Member::new(name))
}

pub(crate) fn ensure_active(op: &'static str, group: &Group) -> Result<(), LedgerError> {
    if !group.is_active() {
        return Err(LedgerError::validation(
            op,
            format!("group {} is closed", group.id),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_group(names: &[&str]) -> NewGroup {
        NewGroup {
            name: "Friends Fund".to_string(),
            monthly_amount: 5000,
            commission_percent: 5,
            member_names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn builds_group_in_member_order() {
        let group = build_group(new_group(&[" A ", "B", "C"]), Utc::now()).unwrap();
        let names: Vec<_> = group.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(group.total_members(), 3);
        assert_eq!(group.status, GroupStatus::Active);
        assert!(group.members.iter().all(|m| m.total_paid == 0));
    }

    #[test]
    fn member_ids_are_unique() {
        let group = build_group(new_group(&["A", "B", "C"]), Utc::now()).unwrap();
        let ids: HashSet<_> = group.members.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn rejects_bad_input() {
        let cases = [
            NewGroup {
                name: "  ".to_string(),
                ..new_group(&["A"])
            },
            NewGroup {
                monthly_amount: 0,
                ..new_group(&["A"])
            },
            NewGroup {
                monthly_amount: -10,
                ..new_group(&["A"])
            },
            NewGroup {
                commission_percent: 101,
                ..new_group(&["A"])
            },
            new_group(&[]),
            new_group(&["A", ""]),
            new_group(&["Ravi", "ravi"]),
        ];
        for case in cases {
            let err = build_group(case.clone(), Utc::now()).unwrap_err();
            assert!(
                matches!(err, LedgerError::Validation { op: "create_group", .. }),
                "{case:?} should be rejected"
            );
        }
    }

    #[test]
    fn changes_apply_and_validate() {
        let mut group = build_group(new_group(&["A"]), Utc::now()).unwrap();
        apply_changes(
            &mut group,
            &GroupChanges {
                name: Some("Office Fund".to_string()),
                monthly_amount: Some(6000),
                commission_percent: None,
            },
        )
        .unwrap();
        assert_eq!(group.name, "Office Fund");
        assert_eq!(group.monthly_amount, 6000);
        assert_eq!(group.commission_percent, 5);

        let err = apply_changes(
            &mut group,
            &GroupChanges {
                monthly_amount: Some(0),
                ..GroupChanges::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
        assert!(GroupChanges::default().is_empty());
    }

    #[test]
    fn new_member_rejects_duplicate_name() {
        let group = build_group(new_group(&["Asha"]), Utc::now()).unwrap();
        assert!(new_member(&group, "ASHA").is_err());
        assert_eq!(new_member(&group, " Bala ").unwrap().name, "Bala");
    }
}
