//! Command-line argument definitions

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::cert::CertCommands;
use crate::cli::commands::check::CheckArgs;
use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::init::InitArgs;
use crate::cli::commands::status::StatusArgs;
use crate::cli::commands::svc::SvcCommands;

/// EquipTrak - service records, retest dates and certificate numbers
/// for lifting and welding equipment
#[derive(Parser, Debug)]
#[command(name = "eqt", version, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Evaluate statuses as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true, value_name = "DATE", value_parser = parse_date_arg)]
    pub today: Option<NaiveDate>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalOpts {
    /// The injected "today", falling back to the local calendar date
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new EquipTrak project in the current directory
    Init(InitArgs),

    /// Service record management
    #[command(subcommand)]
    Svc(SvcCommands),

    /// Dashboard counts of valid, upcoming and invalid equipment
    Status(StatusArgs),

    /// Certificate numbering
    #[command(subcommand)]
    Cert(CertCommands),

    /// Check records for duplicate certificates, retest drift and stale statuses
    Check(CheckArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output formats
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for lists, details for single records
    #[default]
    Auto,
    Table,
    Tsv,
    Csv,
    Json,
    Yaml,
    /// Entity IDs only, one per line
    Id,
}

/// Parse a `YYYY-MM-DD` command-line date
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    crate::core::retest::parse_iso_date(s).map_err(|e| e.to_string())
}
