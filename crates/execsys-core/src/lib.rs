//! # execsys-core
//!
//! The deterministic Diagnostic Engine for the Execution System - THE LOGIC.
//!
//! A respondent rates eleven executive-function capacities from 1 to 10 and
//! ticks the interventions they already use. The engine picks the three
//! weakest capacities, finds the support lever (training, environment,
//! accountability) each one lacks most, and maps that pattern to a service
//! tier.
//!
//! ## Architectural Constraints
//!
//! - Pure: no async, no network, no clock reads; timestamps and dates come
//!   from the caller
//! - Deterministic: `BTreeMap` everywhere, ties broken by catalog order
//! - Closed: the standard catalog is compiled in and immutable at runtime

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod engine;
pub mod input;
pub mod primitives;
pub mod record;
pub mod report;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CapacityId, CompletionSet, ExecsysError, InterventionId, Lever, Rating, Ratings,
    Recommendation,
};

// =============================================================================
// RE-EXPORTS: Catalog & Engine
// =============================================================================

pub use catalog::{Capacity, Catalog, Cluster, Intervention};
pub use engine::{
    CapacityScore, CapacitySummary, DiagnosticResult, GapTally, calculate_results, count_gaps,
    is_complete, recommend, score_capacity, select_weakest,
};
pub use input::DiagnosticInput;

// =============================================================================
// RE-EXPORTS: Outputs
// =============================================================================

pub use record::{SinkRecord, ratings_json, validate_email, validate_name};
pub use report::{ReportInput, recommendation_text, render_report, report_filename};
