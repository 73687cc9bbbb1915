use std::path::Path;

use crate::context::{resolve_group, setup_ledger, Settings};

pub async fn cmd_report_show(
    settings: &Settings<'_>,
    group: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;

    let report = ledger.group_report(group.id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Report: {} [{}]", report.name, report.status);
    println!("  Members: {}", report.total_members);
    println!("  Monthly amount: {}", report.monthly_amount);
    println!("  Expected: {}", report.total_expected);
    println!("  Collected: {}", report.total_collected);
    println!(
        "  Commission: {} ({}%)",
        report.commission_amount, report.commission_percent
    );
    println!("  Progress: {}%", report.progress_percent);
    println!("Members:");
    for member in &report.members {
        println!(
            "  {} - paid {} over {} period(s), {}{}",
            member.name,
            member.total_paid,
            member.periods_paid,
            member.status,
            if member.won_lottery { ", lottery winner" } else { "" }
        );
    }

    Ok(())
}

pub async fn cmd_report_dashboard(
    settings: &Settings<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;

    let summary = ledger.dashboard().await?;

    println!("Groups: {}", summary.total_groups);
    println!("Members: {}", summary.total_members);
    println!("Collected: {}", summary.total_collected);
    println!("Draws: {}", summary.total_draws);

    Ok(())
}

pub async fn cmd_report_export(
    settings: &Settings<'_>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;

    let csv = ledger.export_csv().await?;

    match output {
        Some(path) => {
            tokio::fs::write(path, csv).await?;
            println!("Exported to {}", path.display());
        }
        None => print!("{csv}"),
    }

    Ok(())
}
