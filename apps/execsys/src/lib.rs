//! # execsys
//!
//! Server, CLI and spreadsheet sink for the Execution System diagnostic.
//! The scoring itself lives in `execsys-core`; this crate adds the clock,
//! the network and the process entry points.

pub mod api;
pub mod cli;
pub mod config;
pub mod sink;

/// Current UTC time as an RFC 3339 timestamp with millisecond precision,
/// e.g. `2026-10-17T14:05:00.123Z`.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Today's local date as printed on reports, e.g. `October 17, 2026`.
pub fn report_date_today() -> String {
    chrono::Local::now().format("%B %-d, %Y").to_string()
}
