//! # Sink Records
//!
//! Rows forwarded to the lead-tracking spreadsheet. The JSON shape matches
//! what the spreadsheet's web-app script reads:
//!
//! ```text
//! {"type":"playbook","timestamp":"...","email":"..."}
//! {"type":"diagnostic","timestamp":"...","name":"...","email":"...",
//!  "recommendation":"full_system","weakestCapacities":"A, B, C",
//!  "missingLevers":"accountability, environment, training",
//!  "capacityRatings":"{\"response_inhibition\":7,...}"}
//! ```
//!
//! Timestamps are supplied by the caller so record construction stays pure.

use crate::catalog::Catalog;
use crate::engine::DiagnosticResult;
use crate::primitives::{MAX_EMAIL_LENGTH, MAX_NAME_LENGTH};
use crate::types::{ExecsysError, Ratings};
use serde::{Deserialize, Serialize};

/// Separator used for the joined list columns.
const LIST_SEPARATOR: &str = ", ";

/// A row for the spreadsheet sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkRecord {
    /// Email captured from the playbook offer.
    Playbook { timestamp: String, email: String },

    /// A completed diagnostic.
    #[serde(rename_all = "camelCase")]
    Diagnostic {
        timestamp: String,
        name: String,
        email: String,
        recommendation: String,
        weakest_capacities: String,
        missing_levers: String,
        /// The full rating map as JSON text, in catalog order.
        capacity_ratings: String,
    },
}

impl SinkRecord {
    /// Build a playbook lead record.
    pub fn playbook(timestamp: impl Into<String>, email: &str) -> Result<Self, ExecsysError> {
        let email = validate_email(email)?;
        Ok(SinkRecord::Playbook {
            timestamp: timestamp.into(),
            email,
        })
    }

    /// Build a diagnostic record from a computed result.
    pub fn diagnostic(
        timestamp: impl Into<String>,
        name: &str,
        email: &str,
        ratings: &Ratings,
        result: &DiagnosticResult,
        catalog: &Catalog,
    ) -> Result<Self, ExecsysError> {
        let email = validate_email(email)?;
        let name = validate_name(name)?;

        let weakest_capacities = result
            .weakest_names()
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);
        let missing_levers = result
            .missing_levers()
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);

        Ok(SinkRecord::Diagnostic {
            timestamp: timestamp.into(),
            name,
            email,
            recommendation: result.recommendation.as_str().to_string(),
            weakest_capacities,
            missing_levers,
            capacity_ratings: ratings_json(ratings, catalog)?,
        })
    }

    /// The `type` tag of this record.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SinkRecord::Playbook { .. } => "playbook",
            SinkRecord::Diagnostic { .. } => "diagnostic",
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        match self {
            SinkRecord::Playbook { email, .. } | SinkRecord::Diagnostic { email, .. } => email,
        }
    }
}

/// Serialize ratings as a JSON object in catalog order. Ratings for ids
/// outside the catalog are not included.
pub fn ratings_json(ratings: &Ratings, catalog: &Catalog) -> Result<String, ExecsysError> {
    let map: serde_json::Map<String, serde_json::Value> = catalog
        .capacities()
        .filter_map(|c| {
            ratings
                .get(c.id.as_str())
                .map(|r| (c.id.as_str().to_string(), serde_json::Value::from(r.value())))
        })
        .collect();

    serde_json::to_string(&map).map_err(|e| ExecsysError::SerializationError(e.to_string()))
}

/// Lead-capture email check: trimmed, non-empty, contains `@`, bounded.
/// Returns the trimmed address.
pub fn validate_email(email: &str) -> Result<String, ExecsysError> {
    let trimmed = email.trim();
    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ExecsysError::FieldTooLong {
            field: "email",
            len: trimmed.len(),
            max: MAX_EMAIL_LENGTH,
        });
    }
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(ExecsysError::InvalidEmail(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Respondent name check: trimmed and bounded. Empty is allowed.
pub fn validate_name(name: &str) -> Result<String, ExecsysError> {
    let trimmed = name.trim();
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ExecsysError::FieldTooLong {
            field: "name",
            len: trimmed.len(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(trimmed.to_string())
}
