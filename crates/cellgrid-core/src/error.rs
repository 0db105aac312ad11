//! Error types for the cellgrid simulator.
//!
//! Organized by subsystem: the reaction-network collaborator, composition
//! and configuration, process stepping, and the engine loop.
//!
//! Propagation policy: configuration errors fail fast before any
//! simulation work; unknown species are absorbed where they occur and
//! logged; integration failures abort the run.

use std::error::Error;
use std::fmt;

use crate::id::CellId;

/// Errors raised by a [`ReactionNetwork`](crate::ReactionNetwork).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkError {
    /// A named species is not part of the network.
    SpeciesNotFound {
        /// The unknown species name.
        species: String,
    },
    /// A named parameter is not part of the network.
    ParameterNotFound {
        /// The unknown parameter name.
        parameter: String,
    },
    /// The solver could not complete an `integrate` call.
    IntegrationFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A network instance could not be loaded from its template.
    LoadFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpeciesNotFound { species } => write!(f, "species '{species}' not found"),
            Self::ParameterNotFound { parameter } => {
                write!(f, "parameter '{parameter}' not found")
            }
            Self::IntegrationFailed { reason } => write!(f, "integration failed: {reason}"),
            Self::LoadFailed { reason } => write!(f, "network load failed: {reason}"),
        }
    }
}

impl Error for NetworkError {}

/// Errors detected while configuring processes, composing a grid, or
/// constructing an engine. Always raised before any stepping.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The lattice has zero rows or zero columns.
    InvalidDimensions {
        /// Requested row count.
        rows: u32,
        /// Requested column count.
        cols: u32,
    },
    /// A declared boundary species does not exist in the network.
    UnknownBoundarySpecies {
        /// The missing species name.
        species: String,
    },
    /// A species name was declared more than once.
    DuplicateSpecies {
        /// The repeated species name.
        species: String,
    },
    /// A parameter named in the noise specification does not exist.
    UnknownParameter {
        /// The missing parameter name.
        parameter: String,
    },
    /// A noise half-width is negative or not finite.
    InvalidNoiseWidth {
        /// The parameter the width applies to.
        parameter: String,
        /// The invalid width.
        width: f64,
    },
    /// A time step is NaN, infinite, zero, or negative.
    InvalidTimeStep {
        /// The invalid value.
        value: f64,
    },
    /// Processes in one composite declare different time steps.
    NonUniformTimeStep {
        /// Time step of the first process.
        expected: f64,
        /// The differing time step.
        found: f64,
        /// The process that differs.
        cell: CellId,
    },
    /// A sampling range is empty, inverted, or not finite.
    InvalidRange {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
    },
    /// The topology does not match the processes or the store.
    MalformedTopology {
        /// Description of the mismatch.
        reason: String,
    },
    /// A composite with no processes was handed to the engine.
    EmptyComposite,
    /// The network template failed to produce an instance.
    NetworkLoad(NetworkError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { rows, cols } => {
                write!(f, "grid dimensions must be positive, got {rows}x{cols}")
            }
            Self::UnknownBoundarySpecies { species } => {
                write!(f, "boundary species '{species}' is not in the network")
            }
            Self::DuplicateSpecies { species } => {
                write!(f, "species '{species}' declared more than once")
            }
            Self::UnknownParameter { parameter } => {
                write!(f, "noise parameter '{parameter}' is not in the network")
            }
            Self::InvalidNoiseWidth { parameter, width } => {
                write!(
                    f,
                    "noise width for '{parameter}' must be finite and >= 0, got {width}"
                )
            }
            Self::InvalidTimeStep { value } => {
                write!(f, "time_step must be finite and positive, got {value}")
            }
            Self::NonUniformTimeStep {
                expected,
                found,
                cell,
            } => {
                write!(
                    f,
                    "process {cell} has time_step {found}, expected uniform {expected}"
                )
            }
            Self::InvalidRange { low, high } => {
                write!(f, "invalid sampling range [{low}, {high})")
            }
            Self::MalformedTopology { reason } => write!(f, "malformed topology: {reason}"),
            Self::EmptyComposite => write!(f, "composite has no processes"),
            Self::NetworkLoad(e) => write!(f, "network template: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NetworkLoad(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NetworkError> for ConfigError {
    fn from(e: NetworkError) -> Self {
        Self::NetworkLoad(e)
    }
}

/// Errors from a single process step.
///
/// Returned by `Process::step()` and wrapped in
/// [`StepError::ProcessFailed`] by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessError {
    /// The underlying solver could not complete the integration.
    IntegrationFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntegrationFailed { reason } => write!(f, "integration failed: {reason}"),
        }
    }
}

impl Error for ProcessError {}

/// Errors from the engine while stepping.
///
/// [`StepError::ProcessFailed`] is unrecoverable for the run: the engine
/// moves to its aborted state and keeps the history up to the last
/// committed increment. The other variants reject a request without
/// touching engine state.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A process failed during the compute phase.
    ProcessFailed {
        /// The failing cell.
        cell: CellId,
        /// The underlying process error.
        reason: ProcessError,
    },
    /// A run duration was NaN, infinite, or negative. Nothing was stepped.
    InvalidDuration {
        /// The rejected duration.
        value: f64,
    },
    /// An increment is too small to move the clock at its current
    /// magnitude. Nothing was stepped.
    TimeStalled {
        /// Elapsed time when the increment was attempted.
        elapsed: f64,
        /// The increment that failed to advance it.
        increment: f64,
    },
    /// The engine already aborted and refuses further steps.
    Aborted,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProcessFailed { cell, reason } => write!(f, "process {cell} failed: {reason}"),
            Self::InvalidDuration { value } => {
                write!(f, "run duration must be finite and >= 0, got {value}")
            }
            Self::TimeStalled { elapsed, increment } => write!(
                f,
                "increment {increment} does not advance time past {elapsed}"
            ),
            Self::Aborted => write!(f, "run was aborted by an earlier failure"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ProcessFailed { reason, .. } => Some(reason),
            Self::InvalidDuration { .. } | Self::TimeStalled { .. } | Self::Aborted => None,
        }
    }
}
