//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for rental-backup using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// rental-backup - Lead document export and backup service
#[derive(Parser, Debug)]
#[command(name = "rental-backup")]
#[command(version, about, long_about = None)]
#[command(author = "rental-backup Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "rental-backup.toml", env = "RB_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RB_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP export service
    Serve(commands::serve::ServeArgs),

    /// Produce one archive and write it to disk
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
