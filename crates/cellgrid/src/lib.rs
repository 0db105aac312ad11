//! cellgrid: a lattice of identical reaction-network cells.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all cellgrid sub-crates. It also ships the `cellgrid` command-line
//! runner.
//!
//! # Quick start
//!
//! ```rust
//! use cellgrid::prelude::*;
//!
//! let template = glycolysis_oscillator().unwrap();
//! let composite = GridComposer::build(&GridConfig::new(3, 3), &template).unwrap();
//! let mut engine = SimulationEngine::new(composite, EngineConfig::default()).unwrap();
//!
//! let history = engine.run_for(2.0).unwrap();
//! assert_eq!(history.len(), 3);
//! assert_eq!(history.frames()[2].cells.len(), 9);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cellgrid-core` | Cell ids, port state, errors, reaction-network traits |
//! | [`store`] | `cellgrid-store` | Store, topology, snapshots, history, hashing |
//! | [`process`] | `cellgrid-process` | `Process` trait, schemas, `CellProcess` |
//! | [`network`] | `cellgrid-network` | Mass-action reference network and presets |
//! | [`engine`] | `cellgrid-engine` | Grid composer and simulation engine |
//! | [`obs`] | `cellgrid-obs` | Heatmap extraction |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, errors, and collaborator traits (`cellgrid-core`).
pub use cellgrid_core as types;

/// Store, topology, and history (`cellgrid-store`).
///
/// [`store::History`] serializes to the time → cell → port → species
/// shape consumed by external renderers.
pub use cellgrid_store as store;

/// Processes (`cellgrid-process`).
///
/// Implement [`process::Process`] to put something other than a reaction
/// network on the grid.
pub use cellgrid_process as process;

/// Reference reaction networks (`cellgrid-network`).
pub use cellgrid_network as network;

/// Composition and stepping (`cellgrid-engine`).
pub use cellgrid_engine as engine;

/// Heatmap extraction (`cellgrid-obs`).
pub use cellgrid_obs as obs;

/// Common imports for typical cellgrid usage.
///
/// ```rust
/// use cellgrid::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use cellgrid_core::{CellId, NetworkTemplate, Port, PortState, ReactionNetwork, StepId};

    // Errors
    pub use cellgrid_core::{ConfigError, NetworkError, ProcessError, StepError};

    // Store
    pub use cellgrid_store::{snapshot_hash, History, Snapshot, Store, Topology};

    // Processes
    pub use cellgrid_process::{CellConfig, CellProcess, NoiseSpec, Process};

    // Networks
    pub use cellgrid_network::{glycolysis_oscillator, MassActionModel};

    // Engine
    pub use cellgrid_engine::{
        Composite, EngineConfig, EngineState, GridComposer, GridConfig, Parallelism,
        SimulationEngine, StepMetrics,
    };

    // Observation
    pub use cellgrid_obs::{extract_heatmaps, Heatmap};
}
