pub mod entry;
pub mod rep;
pub mod report;

use std::{fmt::Display, path::PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use chrono_english::parse_date_string;
use chrono_tz::Tz;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::{
    store::{entry_store::FsEntryStore, roster::FsRosterStore},
    utils::{clock::Clock, dir::create_application_default_path, logging::enable_logging},
};

use entry::{process_actuals_command, process_goals_command, ActualsCommand, GoalsCommand};
use rep::{process_rep_command, RepCommand};
use report::{
    process_check_command, process_dashboard_command, process_leaderboard_command,
    process_months_command, CheckCommand, DashboardCommand, LeaderboardCommand, MonthsCommand,
};

/// Zone reports resolve "today" in unless --zone overrides it.
pub const DEFAULT_TIME_ZONE: &str = "America/New_York";

#[derive(Parser, Debug)]
#[command(name = "Repday", version, long_about = None)]
#[command(about = "Daily goal and actual tracking for small sales teams", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Data directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        default_value = DEFAULT_TIME_ZONE,
        help = "IANA time zone used to resolve calendar dates"
    )]
    zone: String,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Manage the team roster")]
    Rep {
        #[command(subcommand)]
        command: RepCommand,
    },
    #[command(about = "Record a rep's goals for a date")]
    Goals {
        #[command(flatten)]
        command: GoalsCommand,
    },
    #[command(about = "Record a rep's end-of-day actuals for a date")]
    Actuals {
        #[command(flatten)]
        command: ActualsCommand,
    },
    #[command(about = "Team totals, daily trend and leaderboard for a date range")]
    Dashboard {
        #[command(flatten)]
        command: DashboardCommand,
    },
    #[command(about = "Rank reps by a chosen metric")]
    Leaderboard {
        #[command(flatten)]
        command: LeaderboardCommand,
    },
    #[command(about = "Month-over-month team summary")]
    Months {
        #[command(flatten)]
        command: MonthsCommand,
    },
    #[command(about = "List weekdays a rep has not logged yet")]
    Check {
        #[command(flatten)]
        command: CheckCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let data_dir = match &args.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            dir.clone()
        }
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&data_dir, logging_level, args.log)?;

    let zone = parse_zone(&args.zone)?;
    let roster = FsRosterStore::new(&data_dir);
    let store = FsEntryStore::new(data_dir.join("entries"))?;

    match args.commands {
        Commands::Rep { command } => process_rep_command(command, &roster, &store).await,
        Commands::Goals { command } => process_goals_command(command, &roster, &store, zone).await,
        Commands::Actuals { command } => {
            process_actuals_command(command, &roster, &store, zone).await
        }
        Commands::Dashboard { command } => {
            process_dashboard_command(command, &roster, &store, zone).await
        }
        Commands::Leaderboard { command } => {
            process_leaderboard_command(command, &roster, &store, zone).await
        }
        Commands::Months { command } => {
            process_months_command(command, &roster, &store, zone).await
        }
        Commands::Check { command } => process_check_command(command, &roster, &store, zone).await,
    }
}

fn parse_zone(value: &str) -> Result<Tz> {
    match value.parse::<Tz>() {
        Ok(zone) => Ok(zone),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate zone {value}: {e}"),
            )
            .into()),
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Parses a human date like "yesterday" or "15/03/2025" relative to the
/// configured zone.
pub(crate) fn parse_cli_date(
    value: &str,
    date_style: DateStyle,
    clock: &impl Clock,
    zone: Tz,
) -> Result<NaiveDate> {
    let now = clock.now().with_timezone(&zone);
    match parse_date_string(value, now, date_style.into()) {
        Ok(parsed) => Ok(parsed.date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {value} {e}"),
            )
            .into()),
    }
}
