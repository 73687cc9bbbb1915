use chitti_core::PaymentSelection;
use chitti_storage::{PaymentFilter, PaymentId, PeriodId};

use crate::context::{resolve_group, resolve_member, resolve_members, setup_ledger, Settings};

pub async fn cmd_payment_record(
    settings: &Settings<'_>,
    group: &str,
    member: &str,
    amount: Option<i64>,
    period: Option<PeriodId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;
    let member_id = resolve_member(&group, member)?.id;
    let period = period.unwrap_or_else(PeriodId::current);
    let amount = amount.unwrap_or(group.monthly_amount);

    let payment = ledger
        .record_payment(group.id, member_id, &period, amount)
        .await?;

    println!(
        "Recorded {} from {} for {}",
        payment.amount, payment.member_name, payment.period
    );
    println!("  ID: {}", payment.id);

    Ok(())
}

pub async fn cmd_payment_batch(
    settings: &Settings<'_>,
    group: &str,
    members: &[String],
    amount: Option<i64>,
    period: Option<PeriodId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;
    let period = period.unwrap_or_else(PeriodId::current);
    let amount = amount.unwrap_or(group.monthly_amount);
    let selections: Vec<PaymentSelection> = resolve_members(&group, members)?
        .into_iter()
        .map(|member_id| PaymentSelection { member_id, amount })
        .collect();

    let outcome = ledger
        .record_payments(group.id, &period, &selections)
        .await?;

    println!(
        "Recorded {} payment(s) for {} totalling {}",
        outcome.recorded.len(),
        period,
        outcome.total_recorded()
    );
    for payment in &outcome.recorded {
        println!("  {} - {}", payment.member_name, payment.amount);
    }
    if !outcome.failed.is_empty() {
        println!("Failed:");
        for (member_id, err) in &outcome.failed {
            let name = group
                .find_member(member_id)
                .map(|m| m.name.as_str())
                .unwrap_or("unknown");
            println!("  {name} - {err}");
        }
    }

    Ok(())
}

pub async fn cmd_payment_list(
    settings: &Settings<'_>,
    group: &str,
    member: Option<&str>,
    period: Option<PeriodId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;
    let member_id = match member {
        Some(m) => Some(resolve_member(&group, m)?.id),
        None => None,
    };

    let payments = ledger
        .list_payments(&PaymentFilter {
            group_id: Some(group.id),
            member_id,
            period,
        })
        .await?;

    if payments.is_empty() {
        println!("No payments found");
        return Ok(());
    }

    println!("Payments in {}:", group.name);
    for payment in payments {
        let note = payment.description.as_deref().unwrap_or("");
        println!(
            "  {} {} {} {} ({}) {}",
            payment.recorded_at.format("%Y-%m-%d %H:%M"),
            payment.period,
            payment.member_name,
            payment.amount,
            payment.id,
            note
        );
    }

    Ok(())
}

pub async fn cmd_payment_delete(
    settings: &Settings<'_>,
    payment_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let payment_id: PaymentId = payment_id
        .parse()
        .map_err(|_| format!("Invalid payment ID: {payment_id}"))?;

    let payment = ledger.delete_payment(payment_id).await?;

    println!(
        "Deleted payment of {} from {} for {}",
        payment.amount, payment.member_name, payment.period
    );

    Ok(())
}
