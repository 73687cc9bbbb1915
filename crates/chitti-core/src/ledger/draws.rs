use chitti_events::EventBus;
use chitti_storage::{
    DrawFilter, DrawId, GroupId, LotteryDraw, Payment, PaymentFilter, PaymentId, PeriodId, Store,
    StoreError, Write, WriteBatch,
};
use chrono::Utc;
use tracing::{info, warn};

use super::Ledger;
use crate::eligibility::eligible_for_draw;
use crate::lottery::{Pick, SURCHARGE_DESCRIPTION};
use crate::model::ensure_active;
use crate::reconcile::period_still_covered;
use crate::{Entity, LedgerError};

impl<S, E> Ledger<S, E>
where
    S: Store + 'static,
    E: EventBus + 'static,
{
    /// Draw this period's winner among the eligible members.
    ///
    /// The winner is charged the configured surcharge for the same period
    /// and flagged as having won. The duplicate check and the write are
    /// one versioned commit, so two concurrent draws cannot both land.
    pub async fn draw_lottery(
        &self,
        group_id: GroupId,
        period: &PeriodId,
    ) -> Result<LotteryDraw, LedgerError> {
        const OP: &str = "draw_lottery";
        self.retrying(OP, move || async move {
            let mut group = self.load_group(OP, group_id).await?;
            ensure_active(OP, &group)?;

            let existing = self
                .store
                .list_draws(&DrawFilter::for_period(group_id, period.clone()))
                .await
                .map_err(|e| LedgerError::storage(OP, e))?;
            if let Some(draw) = existing.first() {
                return Err(LedgerError::DuplicateDraw {
                    group_id,
                    period: period.clone(),
                    draw_id: draw.id,
                });
            }

            let eligible = eligible_for_draw(&group, period);
            let eligible_count = eligible.len();
            let winner_id = match self.pick_winner(&eligible) {
                Pick::Winner(member) => member.id,
                Pick::NoneEligible => {
                    return Err(LedgerError::NoEligibleMembers {
                        group_id,
                        period: period.clone(),
                    })
                }
                Pick::OutOfRange { index, eligible } => {
                    return Err(LedgerError::validation(
                        OP,
                        format!("random source returned {index} for {eligible} eligible members"),
                    ))
                }
            };

            let surcharge = self.config.surcharge_amount;
            let draw_id = DrawId::new();
            let payment_id = PaymentId::new();
            let now = Utc::now();

            let winner = group
                .find_member_mut(&winner_id)
                .ok_or_else(|| LedgerError::not_found(OP, Entity::Member, winner_id))?;
            winner.total_paid = winner.total_paid.checked_add(surcharge).ok_or_else(|| {
                LedgerError::validation(OP, format!("total for member {winner_id} overflows"))
            })?;
            winner.paid_periods.insert(period.clone());
            winner.won_lottery = true;

            let payment = Payment {
                id: payment_id,
                group_id,
                member_id: winner_id,
                member_name: winner.name.clone(),
                amount: surcharge,
                period: period.clone(),
                recorded_at: now,
                description: Some(SURCHARGE_DESCRIPTION.to_string()),
                draw_id: Some(draw_id),
            };
            let draw = LotteryDraw {
                id: draw_id,
                group_id,
                period: period.clone(),
                winner_member_id: winner_id,
                winner_name: winner.name.clone(),
                surcharge_amount: surcharge,
                surcharge_payment_id: payment_id,
                drawn_at: now,
            };

            let expected = Self::stamp(&mut group);
            let batch = WriteBatch::new()
                .update_group(group, expected)
                .push(Write::InsertDraw(draw.clone()))
                .push(Write::InsertPayment(payment));
            self.commit(OP, group_id, batch).await?;
            info!(
                %group_id,
                %period,
                %draw_id,
                winner = %draw.winner_name,
                eligible = eligible_count,
                "lottery drawn"
            );
            Ok(draw)
        })
        .await
    }

    /// Delete a draw, its surcharge payment, and the winner flag unless the
    /// member won another draw.
    pub async fn delete_draw(&self, draw_id: DrawId) -> Result<LotteryDraw, LedgerError> {
        const OP: &str = "delete_draw";
        self.retrying(OP, move || async move {
            let draw = self
                .store
                .get_draw(&draw_id)
                .await
                .map_err(LedgerError::lookup(OP, Entity::Draw, draw_id))?;
            let group_id = draw.group_id;
            let mut group = self.load_group(OP, group_id).await?;

            let surcharge = match self.store.get_payment(&draw.surcharge_payment_id).await {
                Ok(p) => Some(p),
                Err(StoreError::NotFound) => {
                    warn!(%draw_id, payment_id = %draw.surcharge_payment_id, "surcharge payment already gone");
                    None
                }
                Err(e) => return Err(LedgerError::storage(OP, e)),
            };
            let same_period = self
                .store
                .list_payments(&PaymentFilter {
                    group_id: Some(group_id),
                    member_id: Some(draw.winner_member_id),
                    period: Some(draw.period.clone()),
                })
                .await
                .map_err(|e| LedgerError::storage(OP, e))?;
            let other_wins = self
                .store
                .list_draws(&DrawFilter {
                    group_id: Some(group_id),
                    period: None,
                    winner_member_id: Some(draw.winner_member_id),
                })
                .await
                .map_err(|e| LedgerError::storage(OP, e))?
                .into_iter()
                .any(|d| d.id != draw_id);

            if let Some(winner) = group.find_member_mut(&draw.winner_member_id) {
                if let Some(payment) = &surcharge {
                    winner.total_paid -= payment.amount;
                    if !period_still_covered(payment, &same_period) {
                        winner.paid_periods.remove(&payment.period);
                    }
                }
                winner.won_lottery = other_wins;
            }

            let expected = Self::stamp(&mut group);
            let mut batch = WriteBatch::new()
                .update_group(group, expected)
                .push(Write::DeleteDraw(draw_id));
            if let Some(payment) = &surcharge {
                batch = batch.push(Write::DeletePayment(payment.id));
            }
            self.commit(OP, group_id, batch).await?;
            info!(%group_id, %draw_id, period = %draw.period, "lottery draw deleted");
            Ok(draw)
        })
        .await
    }

    /// Draw history matching `filter`, newest first.
    pub async fn list_draws(&self, filter: &DrawFilter) -> Result<Vec<LotteryDraw>, LedgerError> {
        let mut draws = self
            .store
            .list_draws(filter)
            .await
            .map_err(|e| LedgerError::storage("list_draws", e))?;
        draws.reverse();
        draws.sort_by(|a, b| b.drawn_at.cmp(&a.drawn_at));
        Ok(draws)
    }
}
