use chitti_events::EventBus;
use chitti_storage::{
    GroupId, MemberId, Payment, PaymentFilter, PaymentId, PeriodId, Store, Write, WriteBatch,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::Ledger;
use crate::model::ensure_active;
use crate::reconcile::period_still_covered;
use crate::{Entity, LedgerError};

/// One member ticked as paid in a batch payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSelection {
    pub member_id: MemberId,
    pub amount: i64,
}

/// Result of a batch payment. Each selection is applied on its own.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub recorded: Vec<Payment>,
    pub failed: Vec<(MemberId, LedgerError)>,
}

impl BatchOutcome {
    pub fn total_recorded(&self) -> i128 {
        self.recorded.iter().map(|p| i128::from(p.amount)).sum()
    }
}

impl<S, E> Ledger<S, E>
where
    S: Store + 'static,
    E: EventBus + 'static,
{
    /// Record `amount` from a member for `period`.
    ///
    /// Creates the payment, adds the period to the member's paid periods
    /// and raises the member's total, all in one commit.
    pub async fn record_payment(
        &self,
        group_id: GroupId,
        member_id: MemberId,
        period: &PeriodId,
        amount: i64,
    ) -> Result<Payment, LedgerError> {
        const OP: &str = "record_payment";
        if amount <= 0 {
            return Err(LedgerError::validation(
                OP,
                format!("amount must be positive, got {amount}"),
            ));
        }
        self.retrying(OP, move || async move {
            let mut group = self.load_group(OP, group_id).await?;
            ensure_active(OP, &group)?;
            let member = group
                .find_member_mut(&member_id)
                .ok_or_else(|| LedgerError::not_found(OP, Entity::Member, member_id))?;

            member.total_paid = member.total_paid.checked_add(amount).ok_or_else(|| {
                LedgerError::validation(OP, format!("total for member {member_id} overflows"))
            })?;
            member.paid_periods.insert(period.clone());

            let payment = Payment {
                id: PaymentId::new(),
                group_id,
                member_id,
                member_name: member.name.clone(),
                amount,
                period: period.clone(),
                recorded_at: Utc::now(),
                description: None,
                draw_id: None,
            };

            let expected = Self::stamp(&mut group);
            let batch = WriteBatch::new()
                .update_group(group, expected)
                .push(Write::InsertPayment(payment.clone()));
            self.commit(OP, group_id, batch).await?;
            info!(%group_id, %member_id, %period, amount, "payment recorded");
            Ok(payment)
        })
        .await
    }

    /// Record payments for every selected member for one period.
    ///
    /// An empty selection fails outright. Otherwise each selection is
    /// recorded independently; failures are reported per member.
    pub async fn record_payments(
        &self,
        group_id: GroupId,
        period: &PeriodId,
        selections: &[PaymentSelection],
    ) -> Result<BatchOutcome, LedgerError> {
        const OP: &str = "record_payments";
        if selections.is_empty() {
            return Err(LedgerError::NoSelection { op: OP });
        }
        let group = self.load_group(OP, group_id).await?;
        ensure_active(OP, &group)?;

        let mut outcome = BatchOutcome::default();
        for selection in selections {
            match self
                .record_payment(group_id, selection.member_id, period, selection.amount)
                .await
            {
                Ok(payment) => outcome.recorded.push(payment),
                Err(e) => {
                    warn!(%group_id, member_id = %selection.member_id, error = %e, "batch payment entry failed");
                    outcome.failed.push((selection.member_id, e));
                }
            }
        }
        info!(
            %group_id,
            %period,
            recorded = outcome.recorded.len(),
            failed = outcome.failed.len(),
            total = outcome.total_recorded(),
            "batch payments recorded"
        );
        Ok(outcome)
    }

    /// Delete a dues payment and reverse its effect on the member.
    ///
    /// The period stays paid if another payment still covers it. Lottery
    /// surcharges belong to their draw and are removed with `delete_draw`.
    pub async fn delete_payment(&self, payment_id: PaymentId) -> Result<Payment, LedgerError> {
        const OP: &str = "delete_payment";
        self.retrying(OP, move || async move {
            let payment = self
                .store
                .get_payment(&payment_id)
                .await
                .map_err(LedgerError::lookup(OP, Entity::Payment, payment_id))?;
            if let Some(draw_id) = payment.draw_id {
                return Err(LedgerError::validation(
                    OP,
                    format!("payment {payment_id} is the surcharge of draw {draw_id}; delete the draw instead"),
                ));
            }

            let group_id = payment.group_id;
            let mut group = self.load_group(OP, group_id).await?;
            let same_period = self
                .store
                .list_payments(&PaymentFilter {
                    group_id: Some(group_id),
                    member_id: Some(payment.member_id),
                    period: Some(payment.period.clone()),
                })
                .await
                .map_err(|e| LedgerError::storage(OP, e))?;

            let member = group
                .find_member_mut(&payment.member_id)
                .ok_or_else(|| LedgerError::not_found(OP, Entity::Member, payment.member_id))?;
            member.total_paid -= payment.amount;
            if !period_still_covered(&payment, &same_period) {
                member.paid_periods.remove(&payment.period);
            }

            let expected = Self::stamp(&mut group);
            let batch = WriteBatch::new()
                .update_group(group, expected)
                .push(Write::DeletePayment(payment_id));
            self.commit(OP, group_id, batch).await?;
            info!(%group_id, %payment_id, amount = payment.amount, "payment deleted");
            Ok(payment)
        })
        .await
    }

    /// Payment history matching `filter`, newest first.
    pub async fn list_payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, LedgerError> {
        let mut payments = self
            .store
            .list_payments(filter)
            .await
            .map_err(|e| LedgerError::storage("list_payments", e))?;
        payments.reverse();
        payments.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(payments)
    }
}
