//! # Capacity Catalog
//!
//! Immutable reference data: capacities grouped into clusters, each capacity
//! carrying its interventions tagged by lever.
//!
//! The standard catalog is built once from a declarative table and shared
//! process-wide through [`Catalog::standard`]. Scoring never branches on a
//! particular capacity; it only walks whatever catalog it is handed, so
//! tests can build smaller catalogs with [`Catalog::new`].

mod table;

use crate::primitives::{CAPACITY_COUNT, CLUSTER_SIZES, INTERVENTIONS_PER_LEVER};
use crate::types::{CapacityId, ExecsysError, InterventionId, Lever};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static STANDARD: LazyLock<Catalog> = LazyLock::new(table::build_standard);

// =============================================================================
// CATALOG ENTRIES
// =============================================================================

/// One specific action item under a (capacity, lever) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervention {
    pub id: InterventionId,
    /// The capacity this intervention belongs to.
    pub capacity: CapacityId,
    pub lever: Lever,
    pub text: String,
}

/// A self-assessed executive-function capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub id: CapacityId,
    pub name: String,
    /// Name of the owning cluster.
    pub cluster: String,
    /// Self-assessment prompt shown next to the rating scale.
    pub question: String,
    /// Anchor label for a rating of 1.
    pub low_label: String,
    /// Anchor label for a rating of 10.
    pub high_label: String,
    pub interventions: Vec<Intervention>,
}

impl Capacity {
    /// Interventions of one lever, in table order.
    pub fn interventions_for(&self, lever: Lever) -> impl Iterator<Item = &Intervention> {
        self.interventions.iter().filter(move |i| i.lever == lever)
    }
}

/// A named group of capacities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub capacities: Vec<Capacity>,
}

// =============================================================================
// CATALOG
// =============================================================================

/// The full capacity/intervention table. Iteration order is catalog order:
/// clusters in declaration order, capacities in declaration order within
/// each cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    clusters: Vec<Cluster>,
}

impl Catalog {
    /// Build a catalog from clusters. No structural checks are made; call
    /// [`Catalog::validate`] to enforce the standard shape.
    #[must_use]
    pub fn new(clusters: Vec<Cluster>) -> Self {
        Self { clusters }
    }

    /// The standard eleven-capacity catalog, built on first use.
    #[must_use]
    pub fn standard() -> &'static Catalog {
        &STANDARD
    }

    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// All capacities in catalog order.
    pub fn capacities(&self) -> impl Iterator<Item = &Capacity> {
        self.clusters.iter().flat_map(|c| c.capacities.iter())
    }

    /// All interventions in catalog order.
    pub fn interventions(&self) -> impl Iterator<Item = &Intervention> {
        self.capacities().flat_map(|c| c.interventions.iter())
    }

    #[must_use]
    pub fn capacity(&self, id: &str) -> Option<&Capacity> {
        self.capacities().find(|c| c.id.as_str() == id)
    }

    #[must_use]
    pub fn intervention(&self, id: &str) -> Option<&Intervention> {
        self.interventions().find(|i| i.id.as_str() == id)
    }

    #[must_use]
    pub fn capacity_count(&self) -> usize {
        self.capacities().count()
    }

    #[must_use]
    pub fn intervention_count(&self) -> usize {
        self.interventions().count()
    }

    /// Check the structural invariants of the standard catalog:
    /// - exactly `CAPACITY_COUNT` capacities in clusters sized `CLUSTER_SIZES`
    /// - exactly `INTERVENTIONS_PER_LEVER` interventions per (capacity, lever)
    /// - globally unique capacity and intervention ids
    /// - every intervention points back at its owning capacity and cluster
    pub fn validate(&self) -> Result<(), ExecsysError> {
        let sizes: Vec<usize> = self.clusters.iter().map(|c| c.capacities.len()).collect();
        if sizes != CLUSTER_SIZES {
            return Err(ExecsysError::InvalidCatalog(format!(
                "cluster sizes {:?}, expected {:?}",
                sizes, CLUSTER_SIZES
            )));
        }
        if self.capacity_count() != CAPACITY_COUNT {
            return Err(ExecsysError::InvalidCatalog(format!(
                "{} capacities, expected {}",
                self.capacity_count(),
                CAPACITY_COUNT
            )));
        }

        let mut capacity_ids = BTreeSet::new();
        let mut intervention_ids = BTreeSet::new();

        for cluster in &self.clusters {
            for capacity in &cluster.capacities {
                if !capacity_ids.insert(capacity.id.as_str()) {
                    return Err(ExecsysError::InvalidCatalog(format!(
                        "duplicate capacity id '{}'",
                        capacity.id
                    )));
                }
                if capacity.cluster != cluster.name {
                    return Err(ExecsysError::InvalidCatalog(format!(
                        "capacity '{}' names cluster '{}' but is listed under '{}'",
                        capacity.id, capacity.cluster, cluster.name
                    )));
                }

                for lever in Lever::ALL {
                    let count = capacity.interventions_for(lever).count();
                    if count != INTERVENTIONS_PER_LEVER {
                        return Err(ExecsysError::InvalidCatalog(format!(
                            "capacity '{}' has {} {} interventions, expected {}",
                            capacity.id, count, lever, INTERVENTIONS_PER_LEVER
                        )));
                    }
                }

                for intervention in &capacity.interventions {
                    if intervention.capacity != capacity.id {
                        return Err(ExecsysError::InvalidCatalog(format!(
                            "intervention '{}' points at '{}' but belongs to '{}'",
                            intervention.id, intervention.capacity, capacity.id
                        )));
                    }
                    if !intervention_ids.insert(intervention.id.as_str()) {
                        return Err(ExecsysError::InvalidCatalog(format!(
                            "duplicate intervention id '{}'",
                            intervention.id
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
