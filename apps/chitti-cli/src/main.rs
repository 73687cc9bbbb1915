mod cli;
mod commands;
mod context;

use chitti_core::GroupChanges;
use clap::Parser;
use cli::{Cli, Command, GroupCommand, LotteryCommand, PaymentCommand, ReportCommand};
use commands::*;
use context::Settings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so command output stays clean; RUST_LOG raises the level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings {
        config: cli.config.as_deref(),
        data_file: cli.data_file.as_deref(),
        seed: cli.seed,
    };

    match cli.command {
        Command::Group { group_cmd } => match group_cmd {
            GroupCommand::Create {
                name,
                monthly_amount,
                commission,
                members,
            } => {
                cmd_group_create(&settings, name, monthly_amount, commission, members).await?;
            }
            GroupCommand::List => {
                cmd_group_list(&settings).await?;
            }
            GroupCommand::Show { group } => {
                cmd_group_show(&settings, &group).await?;
            }
            GroupCommand::Edit {
                group,
                name,
                monthly_amount,
                commission,
            } => {
                let changes = GroupChanges {
                    name,
                    monthly_amount,
                    commission_percent: commission,
                };
                cmd_group_edit(&settings, &group, changes).await?;
            }
            GroupCommand::AddMember { group, name } => {
                cmd_group_add_member(&settings, &group, &name).await?;
            }
            GroupCommand::RemoveMember { group, member } => {
                cmd_group_remove_member(&settings, &group, &member).await?;
            }
            GroupCommand::Participants { group, members } => {
                cmd_group_participants(&settings, &group, &members).await?;
            }
            GroupCommand::Close { group } => {
                cmd_group_close(&settings, &group).await?;
            }
            GroupCommand::Delete { group } => {
                cmd_group_delete(&settings, &group).await?;
            }
            GroupCommand::Reconcile { group } => {
                cmd_group_reconcile(&settings, &group).await?;
            }
        },
        Command::Payment { payment_cmd } => match payment_cmd {
            PaymentCommand::Record {
                group,
                member,
                amount,
                period,
            } => {
                cmd_payment_record(&settings, &group, &member, amount, period).await?;
            }
            PaymentCommand::Batch {
                group,
                members,
                amount,
                period,
            } => {
                cmd_payment_batch(&settings, &group, &members, amount, period).await?;
            }
            PaymentCommand::List {
                group,
                member,
                period,
            } => {
                cmd_payment_list(&settings, &group, member.as_deref(), period).await?;
            }
            PaymentCommand::Delete { payment_id } => {
                cmd_payment_delete(&settings, &payment_id).await?;
            }
        },
        Command::Lottery { lottery_cmd } => match lottery_cmd {
            LotteryCommand::Draw { group, period } => {
                cmd_lottery_draw(&settings, &group, period).await?;
            }
            LotteryCommand::List { group } => {
                cmd_lottery_list(&settings, &group).await?;
            }
            LotteryCommand::Delete { draw_id } => {
                cmd_lottery_delete(&settings, &draw_id).await?;
            }
        },
        Command::Report { report_cmd } => match report_cmd {
            ReportCommand::Show { group, json } => {
                cmd_report_show(&settings, &group, json).await?;
            }
            ReportCommand::Dashboard => {
                cmd_report_dashboard(&settings).await?;
            }
            ReportCommand::Export { output } => {
                cmd_report_export(&settings, output.as_deref()).await?;
            }
        },
    }

    Ok(())
}
