//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    ball::BallCommands, cache::CacheCommands, completions::CompletionsArgs,
    config::ConfigCommands, customer::CustomerCommands, drill::DrillCommands,
    employee::EmployeeCommands, init::InitArgs, location::LocationCommands,
    report::ReportCommands, team::TeamCommands, validate::ValidateArgs, wo::WoCommands,
};

#[derive(Parser)]
#[command(name = "proshop")]
#[command(author, version, about = "Bowling pro-shop toolkit")]
#[command(long_about = "Manage customers, balls, drill sheets and work orders for a bowling pro shop as plain YAML files.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .proshop/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new pro-shop project
    Init(InitArgs),

    /// Customer management
    #[command(subcommand)]
    Customer(CustomerCommands),

    /// Bowling ball management
    #[command(subcommand)]
    Ball(BallCommands),

    /// Drill sheet management (spans, bridge, holes)
    #[command(subcommand)]
    Drill(DrillCommands),

    /// Work order management
    #[command(subcommand)]
    Wo(WoCommands),

    /// Employee management
    #[command(subcommand)]
    Employee(EmployeeCommands),

    /// Shop location management
    #[command(subcommand)]
    Location(LocationCommands),

    /// Validate record files against schemas and form rules
    Validate(ValidateArgs),

    /// Shop activity reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Team roster and roles
    #[command(subcommand)]
    Team(TeamCommands),

    /// Manage the local report cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (pretty for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
