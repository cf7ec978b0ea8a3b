//! # Innate Primitives
//!
//! Fixed constants of the diagnostic. They are compiled into the binary and
//! are immutable at runtime.

/// Lowest accepted self-assessment rating.
pub const RATING_MIN: u8 = 1;

/// Highest accepted self-assessment rating.
pub const RATING_MAX: u8 = 10;

/// Number of weakest capacities that drive the recommendation.
pub const WEAKEST_COUNT: usize = 3;

/// Number of capacities in the standard catalog.
pub const CAPACITY_COUNT: usize = 11;

/// Cluster sizes of the standard catalog, in catalog order.
pub const CLUSTER_SIZES: [usize; 4] = [3, 2, 3, 3];

/// Interventions per (capacity, lever) pair.
pub const INTERVENTIONS_PER_LEVER: usize = 2;

/// Ratings at or below this value are flagged as weak in the report.
pub const WEAK_RATING_THRESHOLD: u8 = 4;

/// Minimum `environment` gaps among the weakest capacities for the
/// coach-only downgrade.
pub const COACH_ONLY_ENVIRONMENT_GAPS: usize = 2;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for an email address (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for a respondent name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum number of entries accepted in a ratings or completions map.
///
/// Well above the catalog size; bounds the work done on hostile input.
pub const MAX_INPUT_ENTRIES: usize = 256;
