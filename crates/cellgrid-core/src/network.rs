//! The reaction-network collaborator: [`ReactionNetwork`] and
//! [`NetworkTemplate`].
//!
//! The orchestration layer treats the chemistry as a black box that can
//! be read, written, and advanced in time. Nothing in the engine depends
//! on how `integrate` is computed.

use crate::error::NetworkError;

/// One loaded, independently mutable instance of a reaction network.
///
/// # Contract
///
/// - `set_concentrations()` is atomic: either every assignment in the
///   batch is applied, or none is and an error names the first unknown
///   species.
/// - `integrate(duration)` advances the transient state by exactly
///   `duration` time units and is deterministic for identical state and
///   parameters.
/// - Instances never share mutable state with each other.
///
/// # Examples
///
/// A single species that decays exponentially:
///
/// ```
/// use cellgrid_core::{NetworkError, ReactionNetwork};
///
/// struct Decay {
///     names: Vec<String>,
///     params: Vec<String>,
///     value: f64,
///     rate: f64,
/// }
///
/// impl ReactionNetwork for Decay {
///     fn species(&self) -> &[String] { &self.names }
///     fn parameters(&self) -> &[String] { &self.params }
///     fn concentration(&self, species: &str) -> Result<f64, NetworkError> {
///         if species == "A" { Ok(self.value) } else {
///             Err(NetworkError::SpeciesNotFound { species: species.into() })
///         }
///     }
///     fn set_concentrations(&mut self, changes: &[(&str, f64)]) -> Result<(), NetworkError> {
///         if let Some((name, _)) = changes.iter().find(|(n, _)| *n != "A") {
///             return Err(NetworkError::SpeciesNotFound { species: name.to_string() });
///         }
///         if let Some((_, v)) = changes.last() { self.value = *v; }
///         Ok(())
///     }
///     fn parameter(&self, name: &str) -> Result<f64, NetworkError> {
///         if name == "k" { Ok(self.rate) } else {
///             Err(NetworkError::ParameterNotFound { parameter: name.into() })
///         }
///     }
///     fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), NetworkError> {
///         self.parameter(name)?;
///         self.rate = value;
///         Ok(())
///     }
///     fn integrate(&mut self, duration: f64) -> Result<(), NetworkError> {
///         self.value *= (-self.rate * duration).exp();
///         Ok(())
///     }
/// }
///
/// let mut net = Decay { names: vec!["A".into()], params: vec!["k".into()], value: 1.0, rate: 0.0 };
/// net.integrate(5.0).unwrap();
/// assert_eq!(net.concentration("A").unwrap(), 1.0);
/// ```
pub trait ReactionNetwork: Send {
    /// All species names known to the network, in declaration order.
    fn species(&self) -> &[String];

    /// All parameter names known to the network, in declaration order.
    fn parameters(&self) -> &[String];

    /// Current transient concentration of a species.
    fn concentration(&self, species: &str) -> Result<f64, NetworkError>;

    /// Assign new concentrations as one atomic batch.
    fn set_concentrations(&mut self, changes: &[(&str, f64)]) -> Result<(), NetworkError>;

    /// Current value of a parameter.
    fn parameter(&self, name: &str) -> Result<f64, NetworkError>;

    /// Assign a parameter value.
    fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), NetworkError>;

    /// Advance the transient state by `duration` time units.
    fn integrate(&mut self, duration: f64) -> Result<(), NetworkError>;

    /// Whether the network declares a species with this name.
    fn has_species(&self, species: &str) -> bool {
        self.species().iter().any(|s| s == species)
    }
}

/// A read-only model that can stamp out independent network instances.
///
/// The grid composer holds one template and calls
/// [`instantiate()`](NetworkTemplate::instantiate) once per cell, so no
/// two cells ever mutate one another's chemical state.
pub trait NetworkTemplate: Sync {
    /// Load a fresh network instance.
    fn instantiate(&self) -> Result<Box<dyn ReactionNetwork>, NetworkError>;
}
