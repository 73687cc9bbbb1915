use chitti_core::{reports, GroupChanges, NewGroup};

use crate::context::{resolve_group, resolve_member, resolve_members, setup_ledger, Settings};

pub async fn cmd_group_create(
    settings: &Settings<'_>,
    name: String,
    monthly_amount: i64,
    commission_percent: u8,
    member_names: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;

    let group = ledger
        .create_group(NewGroup {
            name,
            monthly_amount,
            commission_percent,
            member_names,
        })
        .await?;

    println!("Created group: {}", group.name);
    println!("  ID: {}", group.id);
    println!("  Monthly amount: {}", group.monthly_amount);
    println!("  Commission: {}%", group.commission_percent);
    println!("  Members: {}", group.total_members());

    Ok(())
}

pub async fn cmd_group_list(settings: &Settings<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;

    let groups = ledger.list_groups().await?;
    if groups.is_empty() {
        println!("No groups found");
        return Ok(());
    }

    println!("Groups:");
    for group in groups {
        println!(
            "  {} ({}) - {} members, {} per month, {} collected [{}]",
            group.name,
            group.id,
            group.total_members(),
            group.monthly_amount,
            group.total_collected(),
            group.status
        );
    }

    Ok(())
}

pub async fn cmd_group_show(
    settings: &Settings<'_>,
    group: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;

    println!("Group: {}", group.name);
    println!("  ID: {}", group.id);
    println!("  Status: {}", group.status);
    println!("  Monthly amount: {}", group.monthly_amount);
    println!("  Commission: {}%", group.commission_percent);
    println!("  Progress: {}%", reports::group_progress(&group));
    println!("Members:");
    for member in &group.members {
        let periods: Vec<&str> = member.paid_periods.iter().map(|p| p.as_str()).collect();
        let mut flags = Vec::new();
        if member.lottery_participant {
            flags.push("lottery");
        }
        if member.won_lottery {
            flags.push("winner");
        }
        println!(
            "  {} ({}) - paid {} [{}] {}",
            member.name,
            member.id,
            member.total_paid,
            periods.join(", "),
            flags.join(" ")
        );
    }

    Ok(())
}

pub async fn cmd_group_edit(
    settings: &Settings<'_>,
    group: &str,
    changes: GroupChanges,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;

    let updated = ledger.update_group(group.id, changes).await?;

    println!("Updated group: {}", updated.name);
    println!("  Monthly amount: {}", updated.monthly_amount);
    println!("  Commission: {}%", updated.commission_percent);

    Ok(())
}

pub async fn cmd_group_add_member(
    settings: &Settings<'_>,
    group: &str,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;

    let member = ledger.add_member(group.id, name).await?;

    println!("Added {} to {}", member.name, group.name);
    println!("  ID: {}", member.id);

    Ok(())
}

pub async fn cmd_group_remove_member(
    settings: &Settings<'_>,
    group: &str,
    member: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;
    let member_id = resolve_member(&group, member)?.id;

    let removed = ledger.remove_member(group.id, member_id).await?;

    println!("Removed {} from {}", removed.name, group.name);

    Ok(())
}

pub async fn cmd_group_participants(
    settings: &Settings<'_>,
    group: &str,
    members: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;
    let selected = resolve_members(&group, members)?;

    let updated = ledger.set_lottery_participants(group.id, &selected).await?;

    let names: Vec<&str> = updated
        .members
        .iter()
        .filter(|m| m.lottery_participant)
        .map(|m| m.name.as_str())
        .collect();
    if names.is_empty() {
        println!("No lottery participants in {}", updated.name);
    } else {
        println!("Lottery participants in {}: {}", updated.name, names.join(", "));
    }

    Ok(())
}

pub async fn cmd_group_close(
    settings: &Settings<'_>,
    group: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;

    let closed = ledger.close_group(group.id).await?;

    println!("Closed group: {}", closed.name);

    Ok(())
}

pub async fn cmd_group_delete(
    settings: &Settings<'_>,
    group: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;

    ledger.delete_group(group.id).await?;

    println!("Deleted group: {}", group.name);

    Ok(())
}

pub async fn cmd_group_reconcile(
    settings: &Settings<'_>,
    group: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = setup_ledger(settings.config, settings.data_file, settings.seed).await?;
    let group = resolve_group(&ledger, group).await?;

    let (group, changed) = ledger.reconcile_group(group.id).await?;

    if changed == 0 {
        println!("{} is consistent", group.name);
    } else {
        println!("Corrected {} member(s) in {}", changed, group.name);
    }

    Ok(())
}
