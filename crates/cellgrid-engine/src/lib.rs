//! Grid composition and the simulation engine for cellgrid.
//!
//! [`GridComposer`] turns a [`GridConfig`] and a network template into a
//! [`Composite`]: one [`CellProcess`](cellgrid_process::CellProcess) per
//! lattice site, a [`Topology`](cellgrid_store::Topology) binding each
//! process to its own store namespace, and the initial store.
//!
//! [`SimulationEngine`] drives a composite in fixed increments. Every
//! increment runs in two separated phases: a compute phase in which each
//! process sees only the store as committed at the previous barrier, and a
//! commit phase that writes all staged outputs in canonical order and
//! records a [`Snapshot`](cellgrid_store::Snapshot).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod composer;
pub mod config;
pub mod engine;
pub mod metrics;

pub use composer::{Composite, GridComposer};
pub use config::{EngineConfig, GridConfig, Parallelism};
pub use engine::{EngineState, SimulationEngine};
pub use metrics::StepMetrics;
