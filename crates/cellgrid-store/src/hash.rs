//! Hashing utilities for snapshot and store comparison.
//!
//! Uses FNV-1a for fast, deterministic hashing of simulation state.
//! These hashes are not cryptographically secure; they exist so that
//! reproducibility checks can compare whole grids in one number.

use cellgrid_core::{CellId, Port, PortState};

use crate::snapshot::Snapshot;
use crate::store::Store;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

fn hash_cells<'a>(cells: impl Iterator<Item = (&'a CellId, &'a PortState)>) -> u64 {
    let mut hash = FNV_OFFSET;
    for (cell, state) in cells {
        hash = fnv1a_bytes(hash, &cell.row.to_le_bytes());
        hash = fnv1a_bytes(hash, &cell.col.to_le_bytes());
        for port in Port::ALL {
            // Port tag separates boundary from internal species.
            hash = fnv1a_bytes(hash, &[port as u8]);
            for (species, value) in state.port(port) {
                hash = fnv1a_bytes(hash, species.as_bytes());
                hash = fnv1a_bytes(hash, &value.to_bits().to_le_bytes());
            }
        }
    }
    hash
}

/// Hash every cell, species name, and value bit pattern in a snapshot.
///
/// Cell order matters; the engine always records cells in row-major order.
pub fn snapshot_hash(snapshot: &Snapshot) -> u64 {
    hash_cells(snapshot.cells.iter())
}

/// Hash the current contents of a store, as [`snapshot_hash`] would.
pub fn store_hash(store: &Store) -> u64 {
    hash_cells(store.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::EmitFilter;
    use cellgrid_core::StepId;

    fn store(x: f64) -> Store {
        let mut store = Store::new();
        let mut state = PortState::new();
        state.boundary.insert("Xex".into(), x);
        store.insert_cell(CellId::new(0, 0), state);
        store
    }

    #[test]
    fn empty_store_hashes_to_offset() {
        assert_eq!(store_hash(&Store::new()), FNV_OFFSET);
    }

    #[test]
    fn snapshot_and_store_hash_agree() {
        let s = store(0.5);
        let snap = Snapshot::capture(&s, StepId(3), 3.0, &EmitFilter::new());
        assert_eq!(snapshot_hash(&snap), store_hash(&s));
    }

    #[test]
    fn value_change_changes_hash() {
        assert_ne!(store_hash(&store(0.5)), store_hash(&store(0.5000001)));
    }

    #[test]
    fn port_placement_changes_hash() {
        let mut a = Store::new();
        let mut sa = PortState::new();
        sa.boundary.insert("X".into(), 1.0);
        a.insert_cell(CellId::new(0, 0), sa);

        let mut b = Store::new();
        let mut sb = PortState::new();
        sb.internal.insert("X".into(), 1.0);
        b.insert_cell(CellId::new(0, 0), sb);

        assert_ne!(store_hash(&a), store_hash(&b));
    }
}
