//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use crate::config::SiteConfig;
use execsys_core::{
    Catalog, DiagnosticInput, DiagnosticResult, ExecsysError, Lever, Recommendation,
    validate_email, validate_name,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// SITE RESPONSE
// =============================================================================

/// Public site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteResponse {
    pub booking_url: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub founder_photo_url: String,
}

impl From<&SiteConfig> for SiteResponse {
    fn from(site: &SiteConfig) -> Self {
        Self {
            booking_url: site.effective_booking_url().to_string(),
            contact_email: site.effective_contact_email().to_string(),
            contact_phone: site.effective_contact_phone().to_string(),
            founder_photo_url: site.effective_founder_photo_url().to_string(),
        }
    }
}

// =============================================================================
// CATALOG RESPONSE
// =============================================================================

/// The questionnaire: clusters, capacities, and interventions by lever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub clusters: Vec<ClusterJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterJson {
    pub name: String,
    pub capacities: Vec<CapacityJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityJson {
    pub id: String,
    pub name: String,
    pub question: String,
    pub low_label: String,
    pub high_label: String,
    pub interventions: BTreeMap<Lever, Vec<InterventionJson>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterventionJson {
    pub id: String,
    pub text: String,
}

impl From<&Catalog> for CatalogResponse {
    fn from(catalog: &Catalog) -> Self {
        let clusters = catalog
            .clusters()
            .iter()
            .map(|cluster| ClusterJson {
                name: cluster.name.clone(),
                capacities: cluster
                    .capacities
                    .iter()
                    .map(|c| CapacityJson {
                        id: c.id.as_str().to_string(),
                        name: c.name.clone(),
                        question: c.question.clone(),
                        low_label: c.low_label.clone(),
                        high_label: c.high_label.clone(),
                        interventions: Lever::ALL
                            .into_iter()
                            .map(|lever| {
                                let items = c
                                    .interventions_for(lever)
                                    .map(|i| InterventionJson {
                                        id: i.id.as_str().to_string(),
                                        text: i.text.clone(),
                                    })
                                    .collect();
                                (lever, items)
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self { clusters }
    }
}

// =============================================================================
// DIAGNOSTIC REQUEST/RESPONSE
// =============================================================================

/// Ratings and completions for a live preview.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticRequest {
    #[serde(flatten)]
    pub input: DiagnosticInput,
}

/// Diagnostic result response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticResponse {
    pub success: bool,
    /// Whether every capacity has been rated.
    pub complete: bool,
    pub result: Option<DiagnosticResult>,
    pub error: Option<String>,
}

impl DiagnosticResponse {
    pub fn success(result: DiagnosticResult, complete: bool) -> Self {
        Self {
            success: true,
            complete,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            complete: false,
            result: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// SUBMIT REQUEST/RESPONSE
// =============================================================================

/// A finished diagnostic, with optional contact details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub input: DiagnosticInput,
}

impl SubmitRequest {
    /// Validated `(name, email)`. `None` when no email was supplied, in
    /// which case nothing is sent to the spreadsheet.
    pub fn contact(&self) -> Result<Option<(String, String)>, ExecsysError> {
        let name = validate_name(self.name.as_deref().unwrap_or_default())?;
        match self.email.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(email) => Ok(Some((name, validate_email(email)?))),
        }
    }
}

/// Submission response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    /// Whether a spreadsheet record was dispatched.
    pub submitted: bool,
    pub result: Option<DiagnosticResult>,
    pub error: Option<String>,
}

impl SubmitResponse {
    pub fn success(result: DiagnosticResult, submitted: bool) -> Self {
        Self {
            success: true,
            submitted,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            submitted: false,
            result: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// REPORT REQUEST/RESPONSE
// =============================================================================

/// Report download request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub input: DiagnosticInput,
}

impl ReportRequest {
    /// The trimmed name, `None` when blank.
    pub fn name(&self) -> Result<Option<String>, ExecsysError> {
        let name = validate_name(self.name.as_deref().unwrap_or_default())?;
        Ok(Some(name).filter(|n| !n.is_empty()))
    }
}

/// Report response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    pub success: bool,
    pub filename: Option<String>,
    pub data: Option<String>, // Base64 encoded
    pub recommendation: Option<Recommendation>,
    pub error: Option<String>,
}

impl ReportResponse {
    pub fn success(filename: String, text: &str, recommendation: Recommendation) -> Self {
        Self {
            success: true,
            filename: Some(filename),
            data: Some(base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                text.as_bytes(),
            )),
            recommendation: Some(recommendation),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            filename: None,
            data: None,
            recommendation: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// PLAYBOOK REQUEST/RESPONSE
// =============================================================================

/// Playbook lead capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybookRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybookResponse {
    pub success: bool,
    pub error: Option<String>,
}

impl PlaybookResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
        }
    }
}
