//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::analytics::AnalyticsArgs;
use crate::commands::create::CreateArgs;
use crate::commands::list::ListArgs;
use crate::commands::show::ShowArgs;
use crate::commands::update::UpdateArgs;

/// Attendance tracker.
///
/// Records check-ins and leave days, classifies late arrivals and keeps
/// worked hours, calendar colors and labels up to date.
#[derive(Debug, Parser)]
#[command(name = "att", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// IANA timezone to act in (e.g., Europe/Berlin). Overrides the config.
    #[arg(long, global = true)]
    pub tz: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a new attendance.
    Create(CreateArgs),

    /// Edit an existing attendance.
    Update(UpdateArgs),

    /// Show one attendance.
    Show(ShowArgs),

    /// List attendances for the calendar.
    List(ListArgs),

    /// Break attendance down by type.
    Analytics(AnalyticsArgs),

    /// Show database and rule settings.
    Status,
}
