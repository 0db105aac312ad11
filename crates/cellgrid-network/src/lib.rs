//! Reference mass-action reaction networks for cellgrid.
//!
//! The engine treats chemistry as an opaque
//! [`ReactionNetwork`](cellgrid_core::ReactionNetwork). This crate
//! provides a self-contained implementation so grids can be run without
//! an external solver:
//!
//! - [`MassActionModel`]: species, parameters, and mass-action reactions
//!   integrated with fixed-step RK4.
//! - [`glycolysis_oscillator`]: the default single-cell model, an
//!   autocatalytic glycolytic oscillator with external `Xex`/`Yex` pools.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod integrator;
pub mod mass_action;
pub mod presets;

pub use mass_action::{MassActionBuilder, MassActionModel};
pub use presets::{glycolysis_oscillator, preset, PRESETS};
