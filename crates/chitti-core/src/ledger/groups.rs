use std::collections::HashSet;

use chitti_events::EventBus;
use chitti_storage::{
    DrawFilter, Group, GroupId, GroupStatus, Member, MemberId, PaymentFilter, Store, Write,
    WriteBatch,
};
use chrono::Utc;
use tracing::info;

use super::Ledger;
use crate::model::{self, GroupChanges, NewGroup};
use crate::reconcile::rebuild_members;
use crate::reports::{self, DashboardSummary, GroupReport};
use crate::{Entity, LedgerError};

impl<S, E> Ledger<S, E>
where
    S: Store + 'static,
    E: EventBus + 'static,
{
    pub(crate) async fn load_group(
        &self,
        op: &'static str,
        group_id: GroupId,
    ) -> Result<Group, LedgerError> {
        self.store
            .get_group(&group_id)
            .await
            .map_err(LedgerError::lookup(op, Entity::Group, group_id))
    }

    /// Write `group` back over the version it was read at.
    pub(crate) fn stamp(group: &mut Group) -> u64 {
        group.updated_at = Utc::now();
        let expected = group.version;
        group.version = expected + 1;
        expected
    }

    pub async fn create_group(&self, new: NewGroup) -> Result<Group, LedgerError> {
        let group = model::build_group(new, Utc::now())?;
        self.commit(
            "create_group",
            group.id,
            WriteBatch::new().push(Write::InsertGroup(group.clone())),
        )
        .await?;
        info!(group_id = %group.id, name = %group.name, members = group.total_members(), "group created");
        Ok(group)
    }

    pub async fn get_group(&self, group_id: GroupId) -> Result<Group, LedgerError> {
        self.load_group("get_group", group_id).await
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, LedgerError> {
        self.store
            .list_groups()
            .await
            .map_err(|e| LedgerError::storage("list_groups", e))
    }

    /// Edit name, monthly amount or commission. Member state is kept.
    pub async fn update_group(
        &self,
        group_id: GroupId,
        changes: GroupChanges,
    ) -> Result<Group, LedgerError> {
        const OP: &str = "update_group";
        if changes.is_empty() {
            return Err(LedgerError::validation(OP, "nothing to change"));
        }
        let changes = &changes;
        self.retrying(OP, move || async move {
            let mut group = self.load_group(OP, group_id).await?;
            model::apply_changes(&mut group, changes)?;
            let expected = Self::stamp(&mut group);
            self.commit(
                OP,
                group_id,
                WriteBatch::new().update_group(group.clone(), expected),
            )
            .await?;
            info!(%group_id, "group updated");
            Ok(group)
        })
        .await
    }

    pub async fn add_member(&self, group_id: GroupId, name: &str) -> Result<Member, LedgerError> {
        const OP: &str = "add_member";
        self.retrying(OP, move || async move {
            let mut group = self.load_group(OP, group_id).await?;
            let member = model::new_member(&group, name)?;
            group.members.push(member.clone());
            let expected = Self::stamp(&mut group);
            self.commit(OP, group_id, WriteBatch::new().update_group(group, expected))
                .await?;
            info!(%group_id, member_id = %member.id, name = %member.name, "member added");
            Ok(member)
        })
        .await
    }

    /// Remove a member with no payment history. The last member stays.
    pub async fn remove_member(
        &self,
        group_id: GroupId,
        member_id: MemberId,
    ) -> Result<Member, LedgerError> {
        const OP: &str = "remove_member";
        self.retrying(OP, move || async move {
            let mut group = self.load_group(OP, group_id).await?;
            let idx = group
                .members
                .iter()
                .position(|m| m.id == member_id)
                .ok_or_else(|| LedgerError::not_found(OP, Entity::Member, member_id))?;
            if group.members.len() == 1 {
                return Err(LedgerError::validation(
                    OP,
                    format!("member {member_id} is the last member of group {group_id}"),
                ));
            }
            let payments = self
                .store
                .list_payments(&PaymentFilter::for_member(group_id, member_id))
                .await
                .map_err(|e| LedgerError::storage(OP, e))?;
            if !payments.is_empty() {
                return Err(LedgerError::validation(
                    OP,
                    format!(
                        "member {member_id} has {} payment(s); delete them first",
                        payments.len()
                    ),
                ));
            }
            let member = group.members.remove(idx);
            let expected = Self::stamp(&mut group);
            self.commit(OP, group_id, WriteBatch::new().update_group(group, expected))
                .await?;
            info!(%group_id, %member_id, "member removed");
            Ok(member)
        })
        .await
    }

    /// Opt the `selected` members into future draws and every other member out.
    pub async fn set_lottery_participants(
        &self,
        group_id: GroupId,
        selected: &[MemberId],
    ) -> Result<Group, LedgerError> {
        const OP: &str = "set_lottery_participants";
        let selected: HashSet<MemberId> = selected.iter().copied().collect();
        let selected = &selected;
        self.retrying(OP, move || async move {
            let mut group = self.load_group(OP, group_id).await?;
            if let Some(unknown) = selected.iter().find(|id| group.find_member(id).is_none()) {
                return Err(LedgerError::not_found(OP, Entity::Member, unknown));
            }
            for member in &mut group.members {
                member.lottery_participant = selected.contains(&member.id);
            }
            let expected = Self::stamp(&mut group);
            self.commit(
                OP,
                group_id,
                WriteBatch::new().update_group(group.clone(), expected),
            )
            .await?;
            info!(%group_id, participants = selected.len(), "lottery participants set");
            Ok(group)
        })
        .await
    }

    /// Mark the group closed; it then refuses payments and draws.
    pub async fn close_group(&self, group_id: GroupId) -> Result<Group, LedgerError> {
        const OP: &str = "close_group";
        self.retrying(OP, move || async move {
            let mut group = self.load_group(OP, group_id).await?;
            if group.status == GroupStatus::Closed {
                return Ok(group);
            }
            group.status = GroupStatus::Closed;
            let expected = Self::stamp(&mut group);
            self.commit(
                OP,
                group_id,
                WriteBatch::new().update_group(group.clone(), expected),
            )
            .await?;
            info!(%group_id, "group closed");
            Ok(group)
        })
        .await
    }

    /// Delete the group together with its payments and draws.
    pub async fn delete_group(&self, group_id: GroupId) -> Result<(), LedgerError> {
        const OP: &str = "delete_group";
        self.retrying(OP, move || async move {
            let mut group = self.load_group(OP, group_id).await?;
            let payments = self
                .store
                .list_payments(&PaymentFilter::for_group(group_id))
                .await
                .map_err(|e| LedgerError::storage(OP, e))?;
            let draws = self
                .store
                .list_draws(&DrawFilter::for_group(group_id))
                .await
                .map_err(|e| LedgerError::storage(OP, e))?;

            // The version check fails the batch if a payment or draw landed
            // after the reads above.
            let expected = Self::stamp(&mut group);
            let mut batch = WriteBatch::new().update_group(group, expected);
            for d in &draws {
                batch = batch.push(Write::DeleteDraw(d.id));
            }
            for p in &payments {
                batch = batch.push(Write::DeletePayment(p.id));
            }
            batch = batch.push(Write::DeleteGroup(group_id));

            self.commit(OP, group_id, batch).await?;
            info!(
                %group_id,
                payments = payments.len(),
                draws = draws.len(),
                "group deleted"
            );
            Ok(())
        })
        .await
    }

    /// Recompute member totals, periods and winner flags from the records
    /// and persist them if they drifted. Returns the group and the number
    /// of members corrected.
    pub async fn reconcile_group(&self, group_id: GroupId) -> Result<(Group, usize), LedgerError> {
        const OP: &str = "reconcile_group";
        self.retrying(OP, move || async move {
            let mut group = self.load_group(OP, group_id).await?;
            let payments = self
                .store
                .list_payments(&PaymentFilter::for_group(group_id))
                .await
                .map_err(|e| LedgerError::storage(OP, e))?;
            let draws = self
                .store
                .list_draws(&DrawFilter::for_group(group_id))
                .await
                .map_err(|e| LedgerError::storage(OP, e))?;

            let changed = rebuild_members(&mut group, &payments, &draws).map_err(|member_id| {
                LedgerError::validation(
                    OP,
                    format!("payments for member {member_id} add up past the largest amount"),
                )
            })?;
            if changed > 0 {
                let expected = Self::stamp(&mut group);
                self.commit(
                    OP,
                    group_id,
                    WriteBatch::new().update_group(group.clone(), expected),
                )
                .await?;
                info!(%group_id, changed, "group reconciled");
            }
            Ok((group, changed))
        })
        .await
    }

    pub async fn group_report(&self, group_id: GroupId) -> Result<GroupReport, LedgerError> {
        let group = self.load_group("group_report", group_id).await?;
        Ok(reports::group_report(&group))
    }

    pub async fn dashboard(&self) -> Result<DashboardSummary, LedgerError> {
        const OP: &str = "dashboard";
        let groups = self.list_groups().await?;
        let payments = self
            .store
            .list_payments(&PaymentFilter::default())
            .await
            .map_err(|e| LedgerError::storage(OP, e))?;
        let draws = self
            .store
            .list_draws(&DrawFilter::default())
            .await
            .map_err(|e| LedgerError::storage(OP, e))?;
        Ok(reports::dashboard_summary(&groups, &payments, &draws))
    }

    pub async fn export_csv(&self) -> Result<String, LedgerError> {
        let groups = self.list_groups().await?;
        Ok(reports::export_csv(&groups))
    }
}
