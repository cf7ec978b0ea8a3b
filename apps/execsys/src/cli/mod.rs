//! # Execution System CLI Module
//!
//! This module implements the CLI interface.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `catalog` - List capacities and interventions
//! - `diagnose` - Score a diagnostic input file
//! - `report` - Write the text report for an input file
//! - `playbook` - Record a playbook lead
//! - `config` - Show the resolved configuration

mod commands;

use crate::config::{AppConfig, CliOverrides};
use clap::{Parser, Subcommand};
use execsys_core::ExecsysError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Execution System - executive-function diagnostic
///
/// Finds the three weakest capacities, the support lever each one lacks
/// most, and the recommended service tier.
#[derive(Parser, Debug)]
#[command(name = "execsys")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML configuration file (default: execsys.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List capacities and their interventions
    Catalog,

    /// Score a diagnostic input file
    Diagnose {
        /// JSON file: {"ratings": {...}, "completions": {...}}
        #[arg(short, long)]
        file: PathBuf,

        /// Respondent name (recorded with --submit)
        #[arg(long)]
        name: Option<String>,

        /// Respondent email (required by --submit)
        #[arg(long)]
        email: Option<String>,

        /// Send the result to the spreadsheet
        #[arg(long)]
        submit: bool,
    },

    /// Write the plain-text report for a diagnostic input file
    Report {
        /// JSON file: {"ratings": {...}, "completions": {...}}
        #[arg(short, long)]
        file: PathBuf,

        /// Output path (default: the generated report filename)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Respondent name printed on the report
        #[arg(long)]
        name: Option<String>,
    },

    /// Record a playbook lead in the spreadsheet
    Playbook {
        #[arg(short, long)]
        email: String,
    },

    /// Show the resolved configuration
    Config,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ExecsysError> {
    let json_mode = cli.json_mode;

    let overrides = match &cli.command {
        Some(Commands::Server { host, port }) => CliOverrides {
            host: host.clone(),
            port: *port,
        },
        _ => CliOverrides::default(),
    };
    let config = AppConfig::load(cli.config.as_deref(), Some(&overrides))?;

    match cli.command {
        Some(Commands::Server { .. }) => cmd_server(config).await,
        Some(Commands::Catalog) => cmd_catalog(json_mode, cli.verbose),
        Some(Commands::Diagnose {
            file,
            name,
            email,
            submit,
        }) => {
            cmd_diagnose(
                &config,
                json_mode,
                cli.verbose,
                &file,
                name.as_deref(),
                email.as_deref(),
                submit,
            )
            .await
        }
        Some(Commands::Report { file, output, name }) => {
            cmd_report(&config, json_mode, &file, output.as_deref(), name.as_deref())
        }
        Some(Commands::Playbook { email }) => cmd_playbook(&config, json_mode, &email).await,
        Some(Commands::Config) => cmd_config(&config, json_mode),
        None => {
            // No subcommand - show the catalog by default
            cmd_catalog(json_mode, false)
        }
    }
}
