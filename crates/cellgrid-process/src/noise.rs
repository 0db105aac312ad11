//! Per-instance parameter noise.
//!
//! A [`NoiseSpec`] maps parameter names to the half-width of a symmetric
//! uniform perturbation. Sampling happens once, when a process is built;
//! the perturbed values then stay fixed for the process's lifetime.

use cellgrid_core::{ConfigError, ReactionNetwork};
use indexmap::IndexMap;
use rand::Rng;

/// Parameter name to perturbation half-width.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoiseSpec {
    widths: IndexMap<String, f64>,
}

impl NoiseSpec {
    /// No noise on any parameter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, parameter: impl Into<String>, width: f64) -> Self {
        self.insert(parameter, width);
        self
    }

    /// Perturb `parameter` by `U(-width, width)`.
    pub fn insert(&mut self, parameter: impl Into<String>, width: f64) {
        self.widths.insert(parameter.into(), width);
    }

    /// Whether no parameter is perturbed.
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Number of perturbed parameters.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    /// Iterate over `(parameter, width)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.widths.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Check that every width is finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (parameter, &width) in &self.widths {
            if !width.is_finite() || width < 0.0 {
                return Err(ConfigError::InvalidNoiseWidth {
                    parameter: parameter.clone(),
                    width,
                });
            }
        }
        Ok(())
    }

    /// Draw one perturbed value per parameter from `rng`.
    ///
    /// Each value is `nominal + width * u` with `u` uniform on `[-1, 1)`,
    /// where `nominal` is read from `network`. Exactly one draw is taken
    /// per parameter, in insertion order, so a seeded `rng` reproduces the
    /// same overrides.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidNoiseWidth`] for a bad width, and
    /// [`ConfigError::UnknownParameter`] if the network lacks a parameter.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        network: &dyn ReactionNetwork,
        rng: &mut R,
    ) -> Result<IndexMap<String, f64>, ConfigError> {
        self.validate()?;
        let mut sampled = IndexMap::with_capacity(self.widths.len());
        for (parameter, &width) in &self.widths {
            let nominal =
                network
                    .parameter(parameter)
                    .map_err(|_| ConfigError::UnknownParameter {
                        parameter: parameter.clone(),
                    })?;
            let u: f64 = rng.random::<f64>() * 2.0 - 1.0;
            sampled.insert(parameter.clone(), nominal + width * u);
        }
        Ok(sampled)
    }
}
