//! # Core Type Definitions
//!
//! This module contains the value types shared by the catalog, the engine,
//! the report renderer and the sink records:
//! - Identifiers (`CapacityId`, `InterventionId`)
//! - Levers and the tier recommendation (`Lever`, `Recommendation`)
//! - User input snapshots (`Rating`, `Ratings`, `CompletionSet`)
//! - Error types (`ExecsysError`)
//!
//! ## Determinism Guarantees
//!
//! All collections are `BTreeMap`-backed so iteration order never depends on
//! hashing or insertion history.

use crate::primitives::{RATING_MAX, RATING_MIN};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Stable short identifier of a capacity, e.g. `task_initiation`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapacityId(pub String);

impl CapacityId {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CapacityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapacityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier of an intervention, e.g. `ti_two_minute`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterventionId(pub String);

impl InterventionId {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for InterventionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterventionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// LEVER
// =============================================================================

/// One of the three intervention categories through which a capacity can be
/// strengthened.
///
/// Declaration order is significant: it is the tie-break order for the
/// missing lever, and the derived `Ord` makes `BTreeMap<Lever, _>` iterate
/// in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lever {
    Training,
    Environment,
    Accountability,
}

impl Lever {
    /// All levers in declaration order.
    pub const ALL: [Lever; 3] = [Lever::Training, Lever::Environment, Lever::Accountability];

    /// Wire tag (`training`, `environment`, `accountability`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Lever::Training => "training",
            Lever::Environment => "environment",
            Lever::Accountability => "accountability",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Lever::Training => "Training",
            Lever::Environment => "Environment",
            Lever::Accountability => "Accountability",
        }
    }
}

impl fmt::Display for Lever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// RECOMMENDATION
// =============================================================================

/// Service tier recommended by the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Tier 2: weekly coach, daily EA calls, monthly reporting.
    FullSystem,
    /// Tier 1: weekly coaching without daily EA support.
    CoachOnly,
}

impl Recommendation {
    /// Wire tag (`full_system`, `coach_only`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::FullSystem => "full_system",
            Recommendation::CoachOnly => "coach_only",
        }
    }

    /// Marketing name of the tier.
    #[must_use]
    pub fn tier_name(&self) -> &'static str {
        match self {
            Recommendation::FullSystem => "Full Execution System (Tier 2)",
            Recommendation::CoachOnly => "Coached Execution (Tier 1)",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// RATINGS
// =============================================================================

/// A self-assessment score in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Create a rating, returning `None` when the value is outside `1..=10`.
    #[must_use]
    pub fn new(value: i64) -> Option<Self> {
        if (i64::from(RATING_MIN)..=i64::from(RATING_MAX)).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::new(value)
            .ok_or_else(|| format!("rating {value} is outside {RATING_MIN}..={RATING_MAX}"))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable snapshot of the user's ratings. A capacity with no entry is
/// unrated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ratings(BTreeMap<CapacityId, Rating>);

impl Ratings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, capacity: impl Into<String>, rating: Rating) -> Self {
        self.insert(capacity, rating);
        self
    }

    pub fn insert(&mut self, capacity: impl Into<String>, rating: Rating) {
        self.0.insert(CapacityId::new(capacity), rating);
    }

    #[must_use]
    pub fn get(&self, capacity: &str) -> Option<Rating> {
        self.0.get(capacity).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CapacityId, Rating)> {
        self.0.iter().map(|(id, r)| (id, *r))
    }
}

impl FromIterator<(CapacityId, Rating)> for Ratings {
    fn from_iter<I: IntoIterator<Item = (CapacityId, Rating)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// COMPLETION SET
// =============================================================================

/// Immutable snapshot of which interventions the user already uses.
/// Any identifier not present counts as not complete.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionSet(BTreeMap<InterventionId, bool>);

impl CompletionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style mark.
    #[must_use]
    pub fn with(mut self, intervention: impl Into<String>, done: bool) -> Self {
        self.mark(intervention, done);
        self
    }

    pub fn mark(&mut self, intervention: impl Into<String>, done: bool) {
        self.0.insert(InterventionId::new(intervention), done);
    }

    /// Whether the intervention is marked complete. Unknown ids are `false`.
    #[must_use]
    pub fn is_complete(&self, intervention: &str) -> bool {
        self.0.get(intervention).copied().unwrap_or(false)
    }

    /// Number of entries marked `true`.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.0.values().filter(|done| **done).count()
    }
}

impl FromIterator<(InterventionId, bool)> for CompletionSet {
    fn from_iter<I: IntoIterator<Item = (InterventionId, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised at the boundaries of the diagnostic (input validation,
/// configuration, I/O).
///
/// The engine itself is total and never returns an error.
#[derive(Debug, Error)]
pub enum ExecsysError {
    /// A rating value was outside `1..=10`.
    #[error("Invalid rating {value} for capacity '{capacity}' (expected {min}..={max})", min = RATING_MIN, max = RATING_MAX)]
    InvalidRating { capacity: String, value: i64 },

    /// A rating referenced a capacity that is not in the catalog.
    #[error("Unknown capacity: {0}")]
    UnknownCapacity(String),

    /// Not every catalog capacity has been rated.
    #[error("Incomplete ratings: {rated} of {required} capacities rated")]
    IncompleteRatings { rated: usize, required: usize },

    /// The email address failed the lead-capture check.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// A free-text field exceeded its length limit.
    #[error("Field '{field}' is {len} bytes, maximum is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A catalog table violates its structural invariants.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert!(Rating::new(0).is_none());
        assert!(Rating::new(11).is_none());
        assert!(Rating::new(-3).is_none());
        assert_eq!(Rating::new(1).map(Rating::value), Some(1));
        assert_eq!(Rating::new(10).map(Rating::value), Some(10));
    }

    #[test]
    fn rating_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("7").is_ok());
        assert!(serde_json::from_str::<Rating>("0").is_err());
        assert!(serde_json::from_str::<Rating>("42").is_err());
    }

    #[test]
    fn lever_order_is_declaration_order() {
        let mut levers = vec![Lever::Accountability, Lever::Training, Lever::Environment];
        levers.sort();
        assert_eq!(levers, Lever::ALL.to_vec());
    }

    #[test]
    fn lever_and_recommendation_tags() {
        assert_eq!(
            serde_json::to_string(&Lever::Accountability).ok(),
            Some("\"accountability\"".to_string())
        );
        assert_eq!(
            serde_json::to_string(&Recommendation::CoachOnly).ok(),
            Some("\"coach_only\"".to_string())
        );
        assert_eq!(Recommendation::FullSystem.to_string(), "full_system");
    }

    #[test]
    fn completion_set_defaults_to_false() {
        let set = CompletionSet::new().with("ti_prep", true).with("ti_trigger", false);
        assert!(set.is_complete("ti_prep"));
        assert!(!set.is_complete("ti_trigger"));
        assert!(!set.is_complete("not_a_real_id"));
        assert_eq!(set.completed_count(), 1);
    }

    #[test]
    fn ratings_lookup_by_str() {
        let ratings = Ratings::new().with("planning", Rating::new(3).expect("valid"));
        assert_eq!(ratings.get("planning").map(Rating::value), Some(3));
        assert_eq!(ratings.get("organization"), None);
        assert_eq!(ratings.len(), 1);
    }
}
