//! # Execution System - Diagnostic Server
//!
//! The main binary for the executive-function diagnostic.
//!
//! This application provides:
//! - HTTP REST API server (axum-based) behind the diagnostic site
//! - CLI interface for scoring, reports and lead capture
//! - Spreadsheet webhook delivery
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     apps/execsys (THE BINARY)                   │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐    │
//! │  │   CLI       │    │   HTTP API  │    │ Spreadsheet Sink │    │
//! │  │  (clap)     │    │   (axum)    │    │    (reqwest)     │    │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘    │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                    ┌───────────────┐                           │
//! │                    │ execsys-core  │                           │
//! │                    │ (THE LOGIC)   │                           │
//! │                    └───────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! execsys server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! execsys catalog --verbose
//! execsys diagnose -f answers.json
//! execsys report -f answers.json --name "Jane Doe"
//! ```

use clap::Parser;
use execsys::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // EXECSYS_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("EXECSYS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "execsys=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  WHETSTONE  |  THE EXECUTION SYSTEM

  Executive Function Diagnostic v{}

  Weakest capacities • Missing levers • Right tier
"#,
        env!("CARGO_PKG_VERSION")
    );
}
