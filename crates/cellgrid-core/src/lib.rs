//! Core types and traits for the cellgrid tissue simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the workspace: cell
//! identifiers, port state, the error taxonomy, and the reaction-network
//! collaborator traits.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod network;
pub mod state;

pub use error::{ConfigError, NetworkError, ProcessError, StepError};
pub use id::{CellId, ParseCellIdError, Port, StepId};
pub use network::{NetworkTemplate, ReactionNetwork};
pub use state::{PortState, SpeciesValues};
