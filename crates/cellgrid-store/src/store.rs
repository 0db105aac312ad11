//! The hierarchical state store.

use cellgrid_core::{CellId, Port, PortState, SpeciesValues};
use indexmap::IndexMap;

use crate::path::StorePath;

/// How an incoming value is combined with the stored one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// The new value replaces the old one. No merging or accumulation.
    #[default]
    Overwrite,
}

impl UpdatePolicy {
    /// Combine `current` with `incoming` under this policy.
    pub fn combine(&self, _current: Option<f64>, incoming: f64) -> f64 {
        match self {
            Self::Overwrite => incoming,
        }
    }
}

/// Tree of per-cell branches, `cell → {boundary, internal} → species → value`.
///
/// Branches are kept in insertion order, which the grid composer makes
/// row-major. Cloning a store is a deep copy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Store {
    cells: IndexMap<CellId, PortState>,
}

impl Store {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the namespace of one cell.
    ///
    /// Returns the previous branch if the cell was already present.
    pub fn insert_cell(&mut self, cell: CellId, state: PortState) -> Option<PortState> {
        self.cells.insert(cell, state)
    }

    /// The whole namespace of one cell.
    pub fn cell(&self, cell: &CellId) -> Option<&PortState> {
        self.cells.get(cell)
    }

    /// Mutable namespace of one cell.
    pub fn cell_mut(&mut self, cell: &CellId) -> Option<&mut PortState> {
        self.cells.get_mut(cell)
    }

    /// Whether `path` names an existing branch.
    pub fn contains(&self, path: &StorePath) -> bool {
        self.cells.contains_key(&path.cell)
    }

    /// Resolve a path to the species values stored under it.
    pub fn resolve(&self, path: &StorePath) -> Option<&SpeciesValues> {
        self.cells.get(&path.cell).map(|state| state.port(path.port))
    }

    /// Resolve a path for writing.
    pub fn resolve_mut(&mut self, path: &StorePath) -> Option<&mut SpeciesValues> {
        self.cells
            .get_mut(&path.cell)
            .map(|state| state.port_mut(path.port))
    }

    /// Read one species value.
    pub fn get(&self, cell: &CellId, port: Port, species: &str) -> Option<f64> {
        self.cells.get(cell)?.get(port, species)
    }

    /// Write `update` into the branch at `path`, combining each species
    /// under the policy `policy_for` returns for it.
    ///
    /// Species present in `update` but not yet in the branch are added.
    /// Returns `false` (and writes nothing) if the path does not resolve.
    pub fn apply<F>(&mut self, path: &StorePath, update: &SpeciesValues, policy_for: F) -> bool
    where
        F: Fn(&str) -> UpdatePolicy,
    {
        let Some(branch) = self.resolve_mut(path) else {
            return false;
        };
        for (species, &value) in update {
            let current = branch.get(species).copied();
            let combined = policy_for(species).combine(current, value);
            branch.insert(species.clone(), combined);
        }
        true
    }

    /// Iterate over `(cell, state)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellId, &PortState)> {
        self.cells.iter()
    }

    /// All cell ids in insertion order.
    pub fn cell_ids(&self) -> impl Iterator<Item = &CellId> {
        self.cells.keys()
    }

    /// Number of cell namespaces.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the store holds no namespaces.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Deep copy of every branch, for snapshotting.
    pub fn clone_cells(&self) -> IndexMap<CellId, PortState> {
        self.cells.clone()
    }
}
