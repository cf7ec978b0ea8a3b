//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::AppConfig;
use crate::sink::{SheetsSink, SinkOutcome};
use crate::{report_date_today, timestamp_now};
use execsys_core::{
    Catalog, DiagnosticInput, DiagnosticResult, ExecsysError, Lever, ReportInput, SinkRecord,
    calculate_results, is_complete, recommendation_text, render_report, report_filename,
    validate_name,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a diagnostic input file (1 MB).
///
/// A complete input is well under 4 KB.
const MAX_INPUT_FILE_SIZE: u64 = 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), ExecsysError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ExecsysError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(ExecsysError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize an input path and require a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, ExecsysError> {
    let canonical = path.canonicalize().map_err(|e| {
        ExecsysError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(ExecsysError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Canonicalize the parent of an output path and require a directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, ExecsysError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        ExecsysError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(ExecsysError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| ExecsysError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// Read and parse a diagnostic input file.
pub fn load_input(path: &Path) -> Result<DiagnosticInput, ExecsysError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_INPUT_FILE_SIZE)?;

    let content = std::fs::read_to_string(&path)
        .map_err(|e| ExecsysError::IoError(format!("Cannot read '{}': {}", path.display(), e)))?;

    serde_json::from_str(&content).map_err(|e| {
        ExecsysError::SerializationError(format!("Invalid input '{}': {}", path.display(), e))
    })
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Send a record and wait for the webhook's answer.
///
/// Returns `true` only when the spreadsheet accepted the record. A failed
/// delivery is logged and reported as `false`.
async fn deliver(config: &AppConfig, record: &SinkRecord) -> Result<bool, ExecsysError> {
    let sink = SheetsSink::new(&config.sheets)
        .map_err(|e| ExecsysError::ConfigError(e.to_string()))?;

    match sink.submit(record).await {
        Ok(SinkOutcome::Delivered) => Ok(true),
        Ok(SinkOutcome::Skipped) => Ok(false),
        Err(e) => {
            tracing::error!(kind = record.kind(), "Spreadsheet submission failed: {}", e);
            Ok(false)
        }
    }
}

/// Human-readable delivery status for `what`.
fn delivery_note(config: &AppConfig, submitted: bool, what: &str) -> String {
    if submitted {
        format!("{} sent to the spreadsheet.", what)
    } else if config.sheets.effective_webhook_url().is_some() {
        format!("Spreadsheet submission failed; {} not recorded.", what.to_lowercase())
    } else {
        format!("Spreadsheet not configured; {} logged only.", what.to_lowercase())
    }
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: AppConfig) -> Result<(), ExecsysError> {
    println!("Execution System Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:     {}", config.server.bind_addr());
    println!("  Rate limit:  {}/s", config.server.effective_rate_limit());
    println!(
        "  Spreadsheet: {}",
        if config.sheets.effective_webhook_url().is_some() {
            "enabled"
        } else {
            "disabled (records are logged only)"
        }
    );
    println!();
    println!("Endpoints:");
    println!("  GET  /health             - Health check");
    println!("  GET  /site               - Site settings");
    println!("  GET  /catalog            - Capacities and interventions");
    println!("  POST /diagnostic         - Score ratings");
    println!("  POST /diagnostic/submit  - Score and record a diagnostic");
    println!("  POST /diagnostic/report  - Download the report");
    println!("  POST /playbook           - Capture a playbook lead");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(config).await
}

// =============================================================================
// CATALOG COMMAND
// =============================================================================

/// List the questionnaire.
pub fn cmd_catalog(json_mode: bool, verbose: bool) -> Result<(), ExecsysError> {
    let catalog = Catalog::standard();

    if json_mode {
        let output = serde_json::to_value(api::CatalogResponse::from(catalog))
            .map_err(|e| ExecsysError::SerializationError(e.to_string()))?;
        print_json(&output);
        return Ok(());
    }

    println!("Execution System Capacities");
    println!("===========================");
    for cluster in catalog.clusters() {
        println!();
        println!("{}", cluster.name);
        for capacity in &cluster.capacities {
            println!("  {:<24} {}", capacity.id, capacity.name);
            if verbose {
                println!("    {}", capacity.question);
                for lever in Lever::ALL {
                    for intervention in capacity.interventions_for(lever) {
                        println!(
                            "    [{:<14}] {:<18} {}",
                            lever.label(),
                            intervention.id,
                            intervention.text
                        );
                    }
                }
            }
        }
    }
    println!();
    println!(
        "{} capacities, {} interventions",
        catalog.capacity_count(),
        catalog.intervention_count()
    );

    Ok(())
}

// =============================================================================
// DIAGNOSE COMMAND
// =============================================================================

/// Score an input file and optionally record it.
pub async fn cmd_diagnose(
    config: &AppConfig,
    json_mode: bool,
    verbose: bool,
    file: &Path,
    name: Option<&str>,
    email: Option<&str>,
    submit: bool,
) -> Result<(), ExecsysError> {
    let catalog = Catalog::standard();
    let input = load_input(file)?;

    let (ratings, completions) = if submit {
        input.validate_complete(catalog)?
    } else {
        input.validate(catalog)?
    };
    let result = calculate_results(&ratings, &completions, catalog);

    let submitted = if submit {
        let email = email.ok_or_else(|| {
            ExecsysError::InvalidEmail("--submit requires --email".to_string())
        })?;
        let record = SinkRecord::diagnostic(
            timestamp_now(),
            name.unwrap_or_default(),
            email,
            &ratings,
            &result,
            catalog,
        )?;
        deliver(config, &record).await?
    } else {
        false
    };

    if json_mode {
        let output = serde_json::json!({
            "complete": is_complete(&ratings, catalog),
            "rated": ratings.len(),
            "result": result,
            "submitted": submitted
        });
        print_json(&output);
        return Ok(());
    }

    print_result(&result, verbose);
    if !is_complete(&ratings, catalog) {
        println!();
        println!(
            "Note: {} of {} capacities rated",
            ratings.len(),
            catalog.capacity_count()
        );
    }
    if submit {
        println!();
        println!("{}", delivery_note(config, submitted, "Result"));
    }

    Ok(())
}

fn print_result(result: &DiagnosticResult, verbose: bool) {
    println!("Execution Diagnostic");
    println!("====================");
    println!();

    if result.weakest.is_empty() {
        println!("No capacities rated.");
    }
    for (i, score) in result.weakest.iter().enumerate() {
        println!(
            "{}. {} ({}/10) - missing lever: {}",
            i + 1,
            score.capacity.name,
            score.rating,
            score.missing_lever.label()
        );
        if verbose {
            for lever in Lever::ALL {
                println!(
                    "     {:<14} {}/{}",
                    lever.label(),
                    score.implemented_for(lever),
                    score.total_for(lever)
                );
            }
        }
    }

    println!();
    println!("Recommendation: {}", result.recommendation.tier_name());
    if verbose {
        println!("{}", recommendation_text(result.recommendation));
    }
}

// =============================================================================
// REPORT COMMAND
// =============================================================================

/// Write the text report for a complete input file.
pub fn cmd_report(
    config: &AppConfig,
    json_mode: bool,
    file: &Path,
    output: Option<&Path>,
    name: Option<&str>,
) -> Result<(), ExecsysError> {
    let catalog = Catalog::standard();
    let (ratings, completions) = load_input(file)?.validate_complete(catalog)?;
    let result = calculate_results(&ratings, &completions, catalog);

    let name = validate_name(name.unwrap_or_default())?;
    let name = Some(name.as_str()).filter(|n| !n.is_empty());

    let date = report_date_today();
    let text = render_report(&ReportInput {
        name,
        date: &date,
        ratings: &ratings,
        result: &result,
        catalog,
        booking_url: config.site.effective_booking_url(),
    });

    let default_path = PathBuf::from(report_filename(name));
    let output = validate_output_path(output.unwrap_or(&default_path))?;
    std::fs::write(&output, text.as_bytes())
        .map_err(|e| ExecsysError::IoError(format!("Cannot write '{}': {}", output.display(), e)))?;

    if json_mode {
        let out = serde_json::json!({
            "output": output.to_string_lossy(),
            "bytes": text.len(),
            "recommendation": result.recommendation
        });
        print_json(&out);
    } else {
        println!("Report written to {}", output.display());
    }

    Ok(())
}

// =============================================================================
// PLAYBOOK COMMAND
// =============================================================================

/// Record a playbook lead.
pub async fn cmd_playbook(
    config: &AppConfig,
    json_mode: bool,
    email: &str,
) -> Result<(), ExecsysError> {
    let record = SinkRecord::playbook(timestamp_now(), email)?;
    let submitted = deliver(config, &record).await?;

    if json_mode {
        print_json(&serde_json::json!({ "submitted": submitted }));
    } else {
        println!("{}", delivery_note(config, submitted, "Lead"));
    }

    Ok(())
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Print the resolved configuration with defaults filled in.
pub fn cmd_config(config: &AppConfig, json_mode: bool) -> Result<(), ExecsysError> {
    let webhook = config.sheets.effective_webhook_url();

    if json_mode {
        let output = serde_json::json!({
            "site": {
                "booking_url": config.site.effective_booking_url(),
                "contact_email": config.site.effective_contact_email(),
                "contact_phone": config.site.effective_contact_phone(),
                "founder_photo_url": config.site.effective_founder_photo_url()
            },
            "sheets": {
                "webhook_url": webhook,
                "timeout_secs": config.sheets.effective_timeout_secs()
            },
            "server": {
                "host": config.server.effective_host(),
                "port": config.server.effective_port(),
                "rate_limit": config.server.effective_rate_limit(),
                "cors_origins": config.server.cors_origins
            }
        });
        print_json(&output);
        return Ok(());
    }

    println!("Execution System Configuration");
    println!("==============================");
    println!();
    println!("[site]");
    println!("  booking_url       = {}", config.site.effective_booking_url());
    println!("  contact_email     = {}", config.site.effective_contact_email());
    println!("  contact_phone     = {}", config.site.effective_contact_phone());
    println!(
        "  founder_photo_url = {}",
        config.site.effective_founder_photo_url()
    );
    println!("[sheets]");
    println!("  webhook_url       = {}", webhook.unwrap_or("(disabled)"));
    println!(
        "  timeout_secs      = {}",
        config.sheets.effective_timeout_secs()
    );
    println!("[server]");
    println!("  host              = {}", config.server.effective_host());
    println!("  port              = {}", config.server.effective_port());
    println!(
        "  rate_limit        = {}",
        config.server.effective_rate_limit()
    );
    println!(
        "  cors_origins      = {}",
        config
            .server
            .cors_origins
            .as_deref()
            .unwrap_or("(localhost only)")
    );

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
