//! Process trait and the reaction-network cell process for cellgrid.
//!
//! The [`Process`] trait is the only contract the engine relies on: a
//! process describes its ports once and then turns an input
//! [`PortState`](cellgrid_core::PortState) into an update each step.
//! [`CellProcess`] is the implementation that wraps one reaction network.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod noise;
pub mod partition;
pub mod process;
pub mod schema;

pub use cell::{CellConfig, CellProcess};
pub use noise::NoiseSpec;
pub use partition::SpeciesPartition;
pub use process::Process;
pub use schema::{PortSchema, VariableSchema};
