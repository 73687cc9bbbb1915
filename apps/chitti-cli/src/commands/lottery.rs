use chitti_storage::{DrawFilter, DrawId, PeriodId};

use crate::context::{resolve_group, setup_ledger, Settings};

pub async fn cmd_lottery_draw(
    settings: &Settings<'_>,
    group: &str,
    period: Option<PeriodId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;
    let period = period.unwrap_or_else(PeriodId::current);

    let draw = ledger.draw_lottery(group.id, &period).await?;

    println!("Lottery winner for {} in {}: {}", period, group.name, draw.winner_name);
    println!("  Surcharge: {}", draw.surcharge_amount);
    println!("  Draw ID: {}", draw.id);

    Ok(())
}

pub async fn cmd_lottery_list(
    settings: &Settings<'_>,
    group: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;

    let draws = ledger.list_draws(&DrawFilter::for_group(group.id)).await?;
    if draws.is_empty() {
        println!("No draws found");
        return Ok(());
    }

    println!("Draws in {}:", group.name);
    for draw in draws {
        println!(
            "  {} {} - surcharge {} ({})",
            draw.period, draw.winner_name, draw.surcharge_amount, draw.id
        );
    }

    Ok(())
}

pub async fn cmd_lottery_delete(
    settings: &Settings<'_>,
    draw_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let draw_id: DrawId = draw_id
        .parse()
        .map_err(|_| format!("Invalid draw ID: {draw_id}"))?;

    let draw = ledger.delete_draw(draw_id).await?;

    println!(
        "Deleted draw for {} (winner {}, surcharge {} reversed)",
        draw.period, draw.winner_name, draw.surcharge_amount
    );

    Ok(())
}
