//! # Diagnostic Input
//!
//! Raw, untrusted ratings and completions as they arrive from a request body
//! or a CLI file, and their validation into engine snapshots.
//!
//! Validation is strict about ratings (range and capacity id) and lenient
//! about completions: unknown intervention ids are kept and later ignored by
//! the engine.

use crate::catalog::Catalog;
use crate::engine;
use crate::primitives::MAX_INPUT_ENTRIES;
use crate::types::{CapacityId, CompletionSet, ExecsysError, InterventionId, Rating, Ratings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire form of one diagnostic attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticInput {
    /// Capacity id -> rating. Values are range-checked by [`DiagnosticInput::validate`].
    #[serde(default)]
    pub ratings: BTreeMap<String, i64>,
    /// Intervention id -> completed.
    #[serde(default)]
    pub completions: BTreeMap<String, bool>,
}

impl DiagnosticInput {
    /// Validate into engine snapshots.
    ///
    /// # Errors
    /// - `UnknownCapacity` when a rating names a capacity not in `catalog`
    /// - `InvalidRating` when a value is outside `1..=10`
    /// - `SerializationError` when either map exceeds `MAX_INPUT_ENTRIES`
    pub fn validate(&self, catalog: &Catalog) -> Result<(Ratings, CompletionSet), ExecsysError> {
        if self.ratings.len() > MAX_INPUT_ENTRIES || self.completions.len() > MAX_INPUT_ENTRIES {
            return Err(ExecsysError::SerializationError(format!(
                "input has {} ratings and {} completions, maximum is {} each",
                self.ratings.len(),
                self.completions.len(),
                MAX_INPUT_ENTRIES
            )));
        }

        let ratings = self
            .ratings
            .iter()
            .map(|(id, value)| {
                if catalog.capacity(id).is_none() {
                    return Err(ExecsysError::UnknownCapacity(id.clone()));
                }
                let rating = Rating::new(*value).ok_or_else(|| ExecsysError::InvalidRating {
                    capacity: id.clone(),
                    value: *value,
                })?;
                Ok((CapacityId::new(id.as_str()), rating))
            })
            .collect::<Result<Ratings, ExecsysError>>()?;

        let completions = self
            .completions
            .iter()
            .map(|(id, done)| (InterventionId::new(id.as_str()), *done))
            .collect::<CompletionSet>();

        Ok((ratings, completions))
    }

    /// Validate and additionally require every catalog capacity to be rated.
    ///
    /// # Errors
    /// Everything [`DiagnosticInput::validate`] returns, plus
    /// `IncompleteRatings`.
    pub fn validate_complete(
        &self,
        catalog: &Catalog,
    ) -> Result<(Ratings, CompletionSet), ExecsysError> {
        let (ratings, completions) = self.validate(catalog)?;
        if !engine::is_complete(&ratings, catalog) {
            return Err(ExecsysError::IncompleteRatings {
                rated: ratings.len(),
                required: catalog.capacity_count(),
            });
        }
        Ok((ratings, completions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(ratings: &[(&str, i64)]) -> DiagnosticInput {
        DiagnosticInput {
            ratings: ratings.iter().map(|(k, v)| ((*k).to_string(), *v)).collect(),
            completions: BTreeMap::new(),
        }
    }

    #[test]
    fn accepts_partial_ratings() {
        let (ratings, completions) = input(&[("planning", 4)])
            .validate(Catalog::standard())
            .expect("valid");
        assert_eq!(ratings.len(), 1);
        assert_eq!(completions.completed_count(), 0);
    }

    #[test]
    fn rejects_out_of_range_rating() {
        let err = input(&[("planning", 11)]).validate(Catalog::standard());
        assert!(matches!(
            err,
            Err(ExecsysError::InvalidRating { value: 11, .. })
        ));
    }

    #[test]
    fn rejects_unknown_capacity() {
        let err = input(&[("telepathy", 5)]).validate(Catalog::standard());
        assert!(matches!(err, Err(ExecsysError::UnknownCapacity(id)) if id == "telepathy"));
    }

    #[test]
    fn keeps_unknown_interventions() {
        let mut raw = input(&[("planning", 4)]);
        raw.completions.insert("made_up".to_string(), true);
        let (_, completions) = raw.validate(Catalog::standard()).expect("valid");
        assert!(completions.is_complete("made_up"));
    }

    #[test]
    fn complete_check_reports_counts() {
        let err = input(&[("planning", 4), ("organization", 6)]).validate_complete(Catalog::standard());
        assert!(matches!(
            err,
            Err(ExecsysError::IncompleteRatings {
                rated: 2,
                required: 11
            })
        ));
    }

    #[test]
    fn deserializes_with_missing_sections() {
        let parsed: DiagnosticInput =
            serde_json::from_str(r#"{"ratings":{"planning":3}}"#).expect("json");
        assert_eq!(parsed.ratings.get("planning"), Some(&3));
        assert!(parsed.completions.is_empty());
    }
}
