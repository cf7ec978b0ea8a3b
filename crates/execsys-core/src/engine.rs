//! # Diagnostic Engine
//!
//! Pure functions from a ratings snapshot and a completion snapshot to a
//! [`DiagnosticResult`]:
//!
//! 1. [`select_weakest`] ranks the rated capacities, weakest first.
//! 2. [`score_capacity`] tallies lever completion and finds the missing lever.
//! 3. [`recommend`] turns the missing levers into a service tier.
//!
//! [`calculate_results`] composes the three and is the entry point used by
//! the report renderer, the HTTP API and the spreadsheet records.
//!
//! ## Determinism
//!
//! No clock, no randomness, no shared state. Ties are always resolved by
//! catalog order (capacities) or lever declaration order (levers), and lever
//! fractions are compared as exact integer ratios.

use crate::catalog::{Capacity, Catalog};
use crate::primitives::{COACH_ONLY_ENVIRONMENT_GAPS, WEAKEST_COUNT};
use crate::types::{CapacityId, CompletionSet, Lever, Rating, Ratings, Recommendation};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Display fields of a scored capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacitySummary {
    pub id: CapacityId,
    pub name: String,
    pub cluster: String,
}

impl From<&Capacity> for CapacitySummary {
    fn from(capacity: &Capacity) -> Self {
        Self {
            id: capacity.id.clone(),
            name: capacity.name.clone(),
            cluster: capacity.cluster.clone(),
        }
    }
}

/// Lever breakdown of one weak capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityScore {
    pub capacity: CapacitySummary,
    pub rating: Rating,
    /// Interventions marked complete, per lever.
    pub implemented: BTreeMap<Lever, usize>,
    /// Interventions listed in the catalog, per lever.
    pub total: BTreeMap<Lever, usize>,
    /// `implemented / total` per lever, in `[0.0, 1.0]`.
    pub percentages: BTreeMap<Lever, f64>,
    /// Lever with the lowest completion fraction.
    pub missing_lever: Lever,
}

impl CapacityScore {
    #[must_use]
    pub fn implemented_for(&self, lever: Lever) -> usize {
        self.implemented.get(&lever).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_for(&self, lever: Lever) -> usize {
        self.total.get(&lever).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn percentage_for(&self, lever: Lever) -> f64 {
        self.percentages.get(&lever).copied().unwrap_or(0.0)
    }
}

/// Output of [`calculate_results`]. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    /// Up to three weakest rated capacities, weakest first.
    pub weakest: Vec<CapacityScore>,
    pub recommendation: Recommendation,
}

impl DiagnosticResult {
    /// Display names of the weakest capacities, weakest first.
    pub fn weakest_names(&self) -> impl Iterator<Item = &str> {
        self.weakest.iter().map(|s| s.capacity.name.as_str())
    }

    /// Missing levers of the weakest capacities, weakest first.
    pub fn missing_levers(&self) -> impl Iterator<Item = Lever> + '_ {
        self.weakest.iter().map(|s| s.missing_lever)
    }
}

/// Missing-lever counts that drive [`recommend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GapTally {
    pub accountability_gaps: usize,
    pub environment_gaps: usize,
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Whether every catalog capacity has a rating.
#[must_use]
pub fn is_complete(ratings: &Ratings, catalog: &Catalog) -> bool {
    catalog
        .capacities()
        .all(|c| ratings.get(c.id.as_str()).is_some())
}

/// Rank the rated capacities ascending by rating and keep the first `k`.
///
/// Unrated capacities are skipped, never treated as zero. The sort is stable
/// over catalog order, so equal ratings keep their catalog position.
#[must_use]
pub fn select_weakest<'c>(
    ratings: &Ratings,
    catalog: &'c Catalog,
    k: usize,
) -> Vec<(&'c Capacity, Rating)> {
    let mut rated: Vec<(&Capacity, Rating)> = catalog
        .capacities()
        .filter_map(|c| ratings.get(c.id.as_str()).map(|r| (c, r)))
        .collect();

    rated.sort_by_key(|(_, rating)| *rating);
    rated.truncate(k);
    rated
}

/// Tally lever completion for one capacity.
///
/// Identifiers absent from `completions` count as not implemented. A lever
/// with no catalog interventions scores a fraction of 0.
#[must_use]
pub fn score_capacity(
    capacity: &Capacity,
    rating: Rating,
    completions: &CompletionSet,
) -> CapacityScore {
    let mut implemented = BTreeMap::new();
    let mut total = BTreeMap::new();
    let mut percentages = BTreeMap::new();

    for lever in Lever::ALL {
        let (done, listed) = capacity
            .interventions_for(lever)
            .fold((0usize, 0usize), |(done, listed), i| {
                let hit = usize::from(completions.is_complete(i.id.as_str()));
                (done + hit, listed + 1)
            });
        implemented.insert(lever, done);
        total.insert(lever, listed);
        percentages.insert(lever, fraction(done, listed));
    }

    let missing_lever = lowest_lever(&implemented, &total);

    CapacityScore {
        capacity: CapacitySummary::from(capacity),
        rating,
        implemented,
        total,
        percentages,
        missing_lever,
    }
}

/// Count accountability and environment gaps among scored capacities.
#[must_use]
pub fn count_gaps(results: &[CapacityScore]) -> GapTally {
    results
        .iter()
        .fold(GapTally::default(), |mut tally, r| match r.missing_lever {
            Lever::Accountability => {
                tally.accountability_gaps += 1;
                tally
            }
            Lever::Environment => {
                tally.environment_gaps += 1;
                tally
            }
            Lever::Training => tally,
        })
}

/// Map missing levers to a service tier.
///
/// `coach_only` only when at least two environment gaps and no
/// accountability gap; `full_system` in every other case, including an
/// empty result set.
#[must_use]
pub fn recommend(results: &[CapacityScore]) -> Recommendation {
    let gaps = count_gaps(results);
    if gaps.environment_gaps >= COACH_ONLY_ENVIRONMENT_GAPS && gaps.accountability_gaps == 0 {
        Recommendation::CoachOnly
    } else {
        Recommendation::FullSystem
    }
}

/// Run the full diagnostic over immutable snapshots.
#[must_use]
pub fn calculate_results(
    ratings: &Ratings,
    completions: &CompletionSet,
    catalog: &Catalog,
) -> DiagnosticResult {
    let weakest: Vec<CapacityScore> = select_weakest(ratings, catalog, WEAKEST_COUNT)
        .into_iter()
        .map(|(capacity, rating)| score_capacity(capacity, rating, completions))
        .collect();
    let recommendation = recommend(&weakest);

    DiagnosticResult {
        weakest,
        recommendation,
    }
}

// =============================================================================
// HELPERS
// =============================================================================

// Display value only; lever comparisons go through `compare_ratio`.
#[allow(clippy::float_arithmetic)]
fn fraction(done: usize, listed: usize) -> f64 {
    if listed == 0 {
        0.0
    } else {
        done as f64 / listed as f64
    }
}

/// Compare `a_done/a_listed` with `b_done/b_listed` exactly. Empty levers
/// compare as 0.
fn compare_ratio(a_done: usize, a_listed: usize, b_done: usize, b_listed: usize) -> Ordering {
    let (a_done, a_listed) = if a_listed == 0 { (0, 1) } else { (a_done, a_listed) };
    let (b_done, b_listed) = if b_listed == 0 { (0, 1) } else { (b_done, b_listed) };
    (a_done.saturating_mul(b_listed)).cmp(&b_done.saturating_mul(a_listed))
}

/// Argmin over the levers; earlier levers win ties.
fn lowest_lever(implemented: &BTreeMap<Lever, usize>, total: &BTreeMap<Lever, usize>) -> Lever {
    let ratio = |lever: &Lever| {
        (
            implemented.get(lever).copied().unwrap_or(0),
            total.get(lever).copied().unwrap_or(0),
        )
    };

    let mut lowest = Lever::Training;
    for lever in &Lever::ALL[1..] {
        let (done, listed) = ratio(lever);
        let (best_done, best_listed) = ratio(&lowest);
        if compare_ratio(done, listed, best_done, best_listed) == Ordering::Less {
            lowest = *lever;
        }
    }
    lowest
}

// =============================================================================
// TESTS
// =============================================================================
