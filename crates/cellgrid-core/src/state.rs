//! Per-cell chemical state partitioned by [`Port`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::id::Port;

/// Species name to concentration, in declaration order.
pub type SpeciesValues = IndexMap<String, f64>;

/// The `{boundary, internal}` pair of species values for one cell.
///
/// This is the unit exchanged between the store and a process: the
/// engine resolves a process's inputs into a `PortState`, and the
/// process returns its update as a `PortState`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortState {
    /// Values of the exchangeable species.
    pub boundary: SpeciesValues,
    /// Values of the cell-private species.
    pub internal: SpeciesValues,
}

impl PortState {
    /// An empty state with no species on either port.
    pub fn new() -> Self {
        Self::default()
    }

    /// Values on one port.
    pub fn port(&self, port: Port) -> &SpeciesValues {
        match port {
            Port::Boundary => &self.boundary,
            Port::Internal => &self.internal,
        }
    }

    /// Mutable values on one port.
    pub fn port_mut(&mut self, port: Port) -> &mut SpeciesValues {
        match port {
            Port::Boundary => &mut self.boundary,
            Port::Internal => &mut self.internal,
        }
    }

    /// Look up a single species value on a port.
    pub fn get(&self, port: Port, species: &str) -> Option<f64> {
        self.port(port).get(species).copied()
    }

    /// Total number of species across both ports.
    pub fn len(&self) -> usize {
        self.boundary.len() + self.internal.len()
    }

    /// Whether neither port carries any species.
    pub fn is_empty(&self) -> bool {
        self.boundary.is_empty() && self.internal.is_empty()
    }
}
