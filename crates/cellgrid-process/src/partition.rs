//! Boundary/internal partition of a network's species.

use cellgrid_core::ConfigError;
use indexmap::IndexSet;

/// Disjoint split of all network species into `boundary` and `internal`.
///
/// Invariants: the two sets never overlap, and their union is exactly the
/// species list of the network the partition was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeciesPartition {
    boundary: Vec<String>,
    internal: Vec<String>,
}

impl SpeciesPartition {
    /// Split `all` given the declared `boundary` names.
    ///
    /// Boundary species keep their declared order; internal species keep
    /// the network's order.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::DuplicateSpecies`] if a name repeats in either list.
    /// - [`ConfigError::UnknownBoundarySpecies`] if a boundary name is not
    ///   one of `all`.
    pub fn new(all: &[String], boundary: &[String]) -> Result<Self, ConfigError> {
        let mut known: IndexSet<&str> = IndexSet::with_capacity(all.len());
        for species in all {
            if !known.insert(species.as_str()) {
                return Err(ConfigError::DuplicateSpecies {
                    species: species.clone(),
                });
            }
        }

        let mut declared: IndexSet<&str> = IndexSet::with_capacity(boundary.len());
        for species in boundary {
            if !known.contains(species.as_str()) {
                return Err(ConfigError::UnknownBoundarySpecies {
                    species: species.clone(),
                });
            }
            if !declared.insert(species.as_str()) {
                return Err(ConfigError::DuplicateSpecies {
                    species: species.clone(),
                });
            }
        }

        let internal = all
            .iter()
            .filter(|s| !declared.contains(s.as_str()))
            .cloned()
            .collect();

        Ok(Self {
            boundary: boundary.to_vec(),
            internal,
        })
    }

    /// Exchangeable species, in declared order.
    pub fn boundary(&self) -> &[String] {
        &self.boundary
    }

    /// Private species, in network order.
    pub fn internal(&self) -> &[String] {
        &self.internal
    }

    /// Total species count across both sets.
    pub fn len(&self) -> usize {
        self.boundary.len() + self.internal.len()
    }

    /// Whether the network had no species at all.
    pub fn is_empty(&self) -> bool {
        self.boundary.is_empty() && self.internal.is_empty()
    }
}
