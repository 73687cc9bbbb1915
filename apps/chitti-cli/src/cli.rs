use chitti_storage::PeriodId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chitti")]
#[command(about = "Chit fund ledger: payments, monthly lottery and reports")]
pub struct Cli {
    /// Path to the config file (defaults to ~/.chitti/config.json)
    #[arg(long, env = "CHITTI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Ledger document to read and write (overrides the config file)
    #[arg(long, env = "CHITTI_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Seed the lottery for a reproducible draw
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Group commands
    Group {
        #[command(subcommand)]
        group_cmd: GroupCommand,
    },
    /// Payment commands
    Payment {
        #[command(subcommand)]
        payment_cmd: PaymentCommand,
    },
    /// Lottery commands
    Lottery {
        #[command(subcommand)]
        lottery_cmd: LotteryCommand,
    },
    /// Report commands
    Report {
        #[command(subcommand)]
        report_cmd: ReportCommand,
    },
}

#[derive(Subcommand)]
pub enum GroupCommand {
    /// Create a new group
    Create {
        /// Group name
        name: String,
        /// Amount each member pays per month
        #[arg(long)]
        monthly_amount: i64,
        /// Organizer commission in percent (0-100)
        #[arg(long, default_value_t = 0)]
        commission: u8,
        /// Member names (repeat or comma separate)
        #[arg(long = "member", short = 'm', value_delimiter = ',', required = true)]
        members: Vec<String>,
    },
    /// List all groups
    List,
    /// Show a group with its members
    Show {
        /// Group name or ID
        group: String,
    },
    /// Change group settings
    Edit {
        /// Group name or ID
        group: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        monthly_amount: Option<i64>,
        #[arg(long)]
        commission: Option<u8>,
    },
    /// Add a member to a group
    AddMember {
        /// Group name or ID
        group: String,
        /// Member name
        name: String,
    },
    /// Remove a member without payments
    RemoveMember {
        /// Group name or ID
        group: String,
        /// Member name or ID
        member: String,
    },
    /// Set who takes part in the lottery (everyone else opts out)
    Participants {
        /// Group name or ID
        group: String,
        /// Member names or IDs
        #[arg(value_delimiter = ',')]
        members: Vec<String>,
    },
    /// Close a group; it stops taking payments and draws
    Close {
        /// Group name or ID
        group: String,
    },
    /// Delete a group with all its payments and draws
    Delete {
        /// Group name or ID
        group: String,
    },
    /// Recompute member totals from the payment and draw records
    Reconcile {
        /// Group name or ID
        group: String,
    },
}

#[derive(Subcommand)]
pub enum PaymentCommand {
    /// Record a payment from one member
    Record {
        /// Group name or ID
        group: String,
        /// Member name or ID
        member: String,
        /// Amount paid (defaults to the monthly amount)
        #[arg(long)]
        amount: Option<i64>,
        /// Period as YYYY-MM (defaults to the current month)
        #[arg(long)]
        period: Option<PeriodId>,
    },
    /// Record the monthly amount from several members at once
    Batch {
        /// Group name or ID
        group: String,
        /// Member names or IDs
        #[arg(value_delimiter = ',')]
        members: Vec<String>,
        /// Amount per member (defaults to the monthly amount)
        #[arg(long)]
        amount: Option<i64>,
        /// Period as YYYY-MM (defaults to the current month)
        #[arg(long)]
        period: Option<PeriodId>,
    },
    /// List payments, newest first
    List {
        /// Group name or ID
        group: String,
        /// Only this member
        #[arg(long)]
        member: Option<String>,
        /// Only this period
        #[arg(long)]
        period: Option<PeriodId>,
    },
    /// Delete a payment
    Delete {
        /// Payment ID
        payment_id: String,
    },
}

#[derive(Subcommand)]
pub enum LotteryCommand {
    /// Draw the winner for a period
    Draw {
        /// Group name or ID
        group: String,
        /// Period as YYYY-MM (defaults to the current month)
        #[arg(long)]
        period: Option<PeriodId>,
    },
    /// List draws, newest first
    List {
        /// Group name or ID
        group: String,
    },
    /// Delete a draw and its surcharge
    Delete {
        /// Draw ID
        draw_id: String,
    },
}

#[derive(Subcommand)]
pub enum ReportCommand {
    /// Progress and member status of one group
    Show {
        /// Group name or ID
        group: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Totals across all groups
    Dashboard,
    /// Write every member of every group as CSV
    Export {
        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_group_create_with_member_list() {
        let cli = Cli::try_parse_from([
            "chitti",
            "group",
            "create",
            "Friends Fund",
            "--monthly-amount",
            "5000",
            "-m",
            "A,B",
            "-m",
            "C",
        ])
        .unwrap();
        match cli.command {
            Command::Group {
                group_cmd:
                    GroupCommand::Create {
                        name,
                        monthly_amount,
                        commission,
                        members,
                    },
            } => {
                assert_eq!(name, "Friends Fund");
                assert_eq!(monthly_amount, 5000);
                assert_eq!(commission, 0);
                assert_eq!(members, vec!["A", "B", "C"]);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn rejects_malformed_period() {
        let result = Cli::try_parse_from([
            "chitti", "lottery", "draw", "Friends Fund", "--period", "2024-13",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_seeded_draw() {
        let cli = Cli::try_parse_from([
            "chitti", "--seed", "7", "lottery", "draw", "g", "--period", "2024-01",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(7));
        match cli.command {
            Command::Lottery {
                lottery_cmd: LotteryCommand::Draw { period, .. },
            } => assert_eq!(period.unwrap().as_str(), "2024-01"),
            _ => panic!("wrong command"),
        }
    }
}
