//! Mock reaction networks.

use cellgrid_core::{NetworkError, NetworkTemplate, ReactionNetwork};

/// A trivially predictable network.
///
/// `integrate(d)` adds `d` to every species, so after `n` steps of size
/// `d` each concentration has grown by `n * d`. Parameters are stored
/// but do not influence the dynamics.
#[derive(Clone, Debug)]
pub struct MockNetwork {
    species: Vec<String>,
    values: Vec<f64>,
    parameters: Vec<String>,
    parameter_values: Vec<f64>,
    integrations: usize,
}

/// Builder for [`MockNetwork`].
#[derive(Default)]
pub struct MockNetworkBuilder {
    species: Vec<(String, f64)>,
    parameters: Vec<(String, f64)>,
}

impl MockNetworkBuilder {
    pub fn species(mut self, name: &str, initial: f64) -> Self {
        self.species.push((name.to_string(), initial));
        self
    }

    pub fn parameter(mut self, name: &str, value: f64) -> Self {
        self.parameters.push((name.to_string(), value));
        self
    }

    pub fn build(self) -> MockNetwork {
        let (species, values) = self.species.into_iter().unzip();
        let (parameters, parameter_values) = self.parameters.into_iter().unzip();
        MockNetwork {
            species,
            values,
            parameters,
            parameter_values,
            integrations: 0,
        }
    }
}

impl MockNetwork {
    pub fn builder() -> MockNetworkBuilder {
        MockNetworkBuilder::default()
    }

    /// The four-species layout used across engine tests:
    /// `Xex, X, Y, Yex` with a single parameter `k`.
    pub fn four_species() -> Self {
        Self::builder()
            .species("Xex", 0.0)
            .species("X", 1.0)
            .species("Y", 1.0)
            .species("Yex", 0.0)
            .parameter("k", 1.0)
            .build()
    }

    /// Number of completed `integrate` calls.
    pub fn integrations(&self) -> usize {
        self.integrations
    }

    fn species_index(&self, name: &str) -> Result<usize, NetworkError> {
        self.species
            .iter()
            .position(|s| s == name)
            .ok_or_else(|| NetworkError::SpeciesNotFound {
                species: name.to_string(),
            })
    }

    fn parameter_index(&self, name: &str) -> Result<usize, NetworkError> {
        self.parameters
            .iter()
            .position(|p| p == name)
            .ok_or_else(|| NetworkError::ParameterNotFound {
                parameter: name.to_string(),
            })
    }
}

impl ReactionNetwork for MockNetwork {
    fn species(&self) -> &[String] {
        &self.species
    }

    fn parameters(&self) -> &[String] {
        &self.parameters
    }

    fn concentration(&self, species: &str) -> Result<f64, NetworkError> {
        Ok(self.values[self.species_index(species)?])
    }

    fn set_concentrations(&mut self, changes: &[(&str, f64)]) -> Result<(), NetworkError> {
        let indices = changes
            .iter()
            .map(|(name, _)| self.species_index(name))
            .collect::<Result<Vec<_>, _>>()?;
        for (idx, (_, value)) in indices.into_iter().zip(changes) {
            self.values[idx] = *value;
        }
        Ok(())
    }

    fn parameter(&self, name: &str) -> Result<f64, NetworkError> {
        Ok(self.parameter_values[self.parameter_index(name)?])
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), NetworkError> {
        let idx = self.parameter_index(name)?;
        self.parameter_values[idx] = value;
        Ok(())
    }

    fn integrate(&mut self, duration: f64) -> Result<(), NetworkError> {
        for v in &mut self.values {
            *v += duration;
        }
        self.integrations += 1;
        Ok(())
    }
}

impl NetworkTemplate for MockNetwork {
    fn instantiate(&self) -> Result<Box<dyn ReactionNetwork>, NetworkError> {
        Ok(Box::new(self.clone()))
    }
}

/// Wraps a network and fails every `integrate` after the first `succeed`.
#[derive(Clone, Debug)]
pub struct FailingNetwork<N> {
    inner: N,
    succeed: usize,
    calls: usize,
}

impl<N> FailingNetwork<N> {
    pub fn new(inner: N, succeed: usize) -> Self {
        Self {
            inner,
            succeed,
            calls: 0,
        }
    }
}

impl<N: ReactionNetwork> ReactionNetwork for FailingNetwork<N> {
    fn species(&self) -> &[String] {
        self.inner.species()
    }

    fn parameters(&self) -> &[String] {
        self.inner.parameters()
    }

    fn concentration(&self, species: &str) -> Result<f64, NetworkError> {
        self.inner.concentration(species)
    }

    fn set_concentrations(&mut self, changes: &[(&str, f64)]) -> Result<(), NetworkError> {
        self.inner.set_concentrations(changes)
    }

    fn parameter(&self, name: &str) -> Result<f64, NetworkError> {
        self.inner.parameter(name)
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), NetworkError> {
        self.inner.set_parameter(name, value)
    }

    fn integrate(&mut self, duration: f64) -> Result<(), NetworkError> {
        self.calls += 1;
        if self.calls > self.succeed {
            return Err(NetworkError::IntegrationFailed {
                reason: format!("scripted failure on call {}", self.calls),
            });
        }
        self.inner.integrate(duration)
    }
}

impl<N: ReactionNetwork + Clone + Sync + 'static> NetworkTemplate for FailingNetwork<N> {
    fn instantiate(&self) -> Result<Box<dyn ReactionNetwork>, NetworkError> {
        Ok(Box::new(self.clone()))
    }
}
