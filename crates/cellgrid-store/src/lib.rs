//! Hierarchical state store, topology, and run history for cellgrid.
//!
//! The [`Store`] is the single source of truth shared by the engine and
//! its processes. Each cell owns one branch, `"[r,c]_store"`, with a
//! `boundary` and an `internal` sub-branch. A [`Topology`] binds every
//! process port to a typed [`StorePath`] and is validated against the
//! store's shape before the first step. Committed states are captured as
//! immutable [`Snapshot`]s in a [`History`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod hash;
pub mod path;
pub mod snapshot;
pub mod store;
pub mod topology;

pub use hash::{snapshot_hash, store_hash};
pub use path::{ParseStorePathError, StorePath};
pub use snapshot::{EmitFilter, History, Snapshot};
pub use store::{Store, UpdatePolicy};
pub use topology::{PortBindings, Topology};
