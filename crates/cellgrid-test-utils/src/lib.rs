//! Test utilities and mock types for cellgrid development.
//!
//! Provides mock implementations of the reaction-network collaborator
//! ([`MockNetwork`], [`FailingNetwork`]) and a [`RecordingProcess`] that
//! records what it observes, for engine scheduling tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod network;
mod recording;

pub use network::{FailingNetwork, MockNetwork, MockNetworkBuilder};
pub use recording::{Observations, RecordingProcess};
