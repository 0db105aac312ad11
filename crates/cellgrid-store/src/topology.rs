//! Static binding of process ports to store paths.

use cellgrid_core::{CellId, ConfigError, Port};
use indexmap::IndexMap;

use crate::path::StorePath;
use crate::store::Store;

/// The store paths one process reads from and writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortBindings {
    /// Path bound to the process's `boundary` port.
    pub boundary: StorePath,
    /// Path bound to the process's `internal` port.
    pub internal: StorePath,
}

impl PortBindings {
    /// The default wiring: both ports into the process's own namespace.
    pub const fn own(cell: CellId) -> Self {
        Self {
            boundary: StorePath::new(cell, Port::Boundary),
            internal: StorePath::new(cell, Port::Internal),
        }
    }

    /// Path bound to `port`.
    pub fn path(&self, port: Port) -> &StorePath {
        match port {
            Port::Boundary => &self.boundary,
            Port::Internal => &self.internal,
        }
    }
}

/// Process key to [`PortBindings`], one entry per process.
///
/// Cross-cell bindings are representable (a port may point into another
/// cell's namespace); nothing in the default composition creates them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Topology {
    entries: IndexMap<CellId, PortBindings>,
}

impl Topology {
    /// An empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a process. Returns the previous bindings if it was already bound.
    pub fn bind(&mut self, process: CellId, bindings: PortBindings) -> Option<PortBindings> {
        self.entries.insert(process, bindings)
    }

    /// Bindings of one process.
    pub fn bindings(&self, process: &CellId) -> Option<&PortBindings> {
        self.entries.get(process)
    }

    /// Iterate over `(process, bindings)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellId, &PortBindings)> {
        self.entries.iter()
    }

    /// Number of bound processes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no process is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the topology against a process list and a store.
    ///
    /// Every process must have exactly one entry, no entry may name an
    /// unknown process, and every bound path must resolve in `store`.
    pub fn validate<'a>(
        &self,
        processes: impl IntoIterator<Item = &'a CellId>,
        store: &Store,
    ) -> Result<(), ConfigError> {
        let mut seen = 0usize;
        for process in processes {
            seen += 1;
            let bindings = self
                .entries
                .get(process)
                .ok_or_else(|| ConfigError::MalformedTopology {
                    reason: format!("process {process} has no topology entry"),
                })?;
            for port in Port::ALL {
                let path = bindings.path(port);
                if !store.contains(path) {
                    return Err(ConfigError::MalformedTopology {
                        reason: format!(
                            "port '{port}' of process {process} is bound to missing path {path}"
                        ),
                    });
                }
            }
        }
        if seen != self.entries.len() {
            return Err(ConfigError::MalformedTopology {
                reason: format!(
                    "topology has {} entries for {seen} processes",
                    self.entries.len()
                ),
            });
        }
        Ok(())
    }
}
