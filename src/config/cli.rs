use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "academic-period")]
#[command(about = "Inspect, repair and switch the active academic period")]
pub struct CliConfig {
    /// Path to TOML configuration file (falls back to PERIOD_STORE_URL when absent)
    #[arg(short, long, default_value = "academic-period.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print structured results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List every period ordered by start date
    Periods,
    /// Show the currently active period
    Status,
    /// Run the read-only consistency check
    Validate,
    /// Collapse multiple active periods back to one
    Repair,
    /// Validate, optionally repair, and validate again
    Diagnose {
        #[arg(long)]
        repair: bool,
    },
    /// Make the given period the only active one
    Activate { id: String },
    /// Move to a pre-created period of another academic year
    Transition {
        year: String,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=2))]
        semester: u8,
    },
    /// Move to the next semester
    Advance,
    /// Resolve the period a read or write should use
    Context {
        /// Resolve for writing instead of viewing
        #[arg(long, conflicts_with = "period")]
        input: bool,
        /// Period chosen by the user (view only)
        #[arg(long)]
        period: Option<String>,
    },
    /// Check whether data may be written to the given period today
    CheckInput { id: String },
}
