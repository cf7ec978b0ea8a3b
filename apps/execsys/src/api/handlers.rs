//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        CatalogResponse, DiagnosticRequest, DiagnosticResponse, HealthResponse, PlaybookRequest,
        PlaybookResponse, ReportRequest, ReportResponse, SiteResponse, SubmitRequest,
        SubmitResponse,
    },
};
use crate::{report_date_today, timestamp_now};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use execsys_core::{
    ReportInput, SinkRecord, calculate_results, is_complete, render_report, report_filename,
};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// SITE & CATALOG HANDLERS
// =============================================================================

/// Public site settings.
pub async fn site_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(SiteResponse::from(&state.config.site)))
}

/// The questionnaire.
pub async fn catalog_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(CatalogResponse::from(state.catalog)))
}

// =============================================================================
// DIAGNOSTIC HANDLER
// =============================================================================

/// Score a possibly partial set of ratings. Nothing is recorded.
pub async fn diagnostic_handler(
    State(state): State<AppState>,
    Json(request): Json<DiagnosticRequest>,
) -> impl IntoResponse {
    let (ratings, completions) = match request.input.validate(state.catalog) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(DiagnosticResponse::error(format!("Invalid input: {}", e))),
            );
        }
    };

    let result = calculate_results(&ratings, &completions, state.catalog);
    let complete = is_complete(&ratings, state.catalog);
    (
        StatusCode::OK,
        Json(DiagnosticResponse::success(result, complete)),
    )
}

// =============================================================================
// SUBMIT HANDLER
// =============================================================================

/// Score a finished diagnostic and, when an email is given, forward it to
/// the spreadsheet without waiting for delivery.
pub async fn submit_handler(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> impl IntoResponse {
    let (ratings, completions) = match request.input.validate_complete(state.catalog) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SubmitResponse::error(format!("Invalid input: {}", e))),
            );
        }
    };
    let contact = match request.contact() {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SubmitResponse::error(format!("Invalid contact: {}", e))),
            );
        }
    };

    let result = calculate_results(&ratings, &completions, state.catalog);

    let submitted = match contact {
        Some((name, email)) => {
            match SinkRecord::diagnostic(
                timestamp_now(),
                &name,
                &email,
                &ratings,
                &result,
                state.catalog,
            ) {
                Ok(record) => {
                    // Not awaited: the response never waits on the spreadsheet.
                    drop(state.sink.dispatch(record));
                    true
                }
                Err(e) => {
                    tracing::error!("Cannot build diagnostic record: {}", e);
                    false
                }
            }
        }
        None => false,
    };

    (StatusCode::OK, Json(SubmitResponse::success(result, submitted)))
}

// =============================================================================
// REPORT HANDLER
// =============================================================================

/// Render the text report for download.
pub async fn report_handler(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> impl IntoResponse {
    let (ratings, completions) = match request.input.validate_complete(state.catalog) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ReportResponse::error(format!("Invalid input: {}", e))),
            );
        }
    };
    let name = match request.name() {
        Ok(n) => n,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ReportResponse::error(format!("Invalid name: {}", e))),
            );
        }
    };

    let result = calculate_results(&ratings, &completions, state.catalog);
    let date = report_date_today();
    let text = render_report(&ReportInput {
        name: name.as_deref(),
        date: &date,
        ratings: &ratings,
        result: &result,
        catalog: state.catalog,
        booking_url: state.config.site.effective_booking_url(),
    });

    (
        StatusCode::OK,
        Json(ReportResponse::success(
            report_filename(name.as_deref()),
            &text,
            result.recommendation,
        )),
    )
}

// =============================================================================
// PLAYBOOK HANDLER
// =============================================================================

/// Capture a playbook lead.
pub async fn playbook_handler(
    State(state): State<AppState>,
    Json(request): Json<PlaybookRequest>,
) -> impl IntoResponse {
    match SinkRecord::playbook(timestamp_now(), &request.email) {
        Ok(record) => {
            drop(state.sink.dispatch(record));
            (StatusCode::OK, Json(PlaybookResponse::success()))
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(PlaybookResponse::error(format!("Invalid email: {}", e))),
        ),
    }
}
