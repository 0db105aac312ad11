//! Mass-action kinetics integrated with fixed-step RK4.
//!
//! Each reaction fires at `k * Π [reactant]^stoich`. `integrate(d)` splits
//! `d` into `ceil(d / max_substep)` equal sub-steps, clamps negative
//! concentrations to zero after each one, and commits the result only if
//! every value is finite. A failed integration leaves the state untouched.

use cellgrid_core::{NetworkError, NetworkTemplate, ReactionNetwork};
use smallvec::SmallVec;

use crate::integrator::Rk4;

/// Species index and stoichiometric coefficient.
type Term = (usize, u32);

#[derive(Clone, Debug, PartialEq)]
struct Reaction {
    reactants: SmallVec<[Term; 3]>,
    products: SmallVec<[Term; 3]>,
    rate: usize,
}

/// A reaction network with mass-action kinetics.
#[derive(Clone, Debug, PartialEq)]
pub struct MassActionModel {
    name: String,
    species: Vec<String>,
    state: Vec<f64>,
    parameters: Vec<String>,
    parameter_values: Vec<f64>,
    reactions: Vec<Reaction>,
    max_substep: f64,
}

/// Builder for [`MassActionModel`].
///
/// Names are resolved at [`build()`](MassActionBuilder::build) time, so
/// species and parameters may be declared in any order relative to the
/// reactions that use them.
///
/// # Examples
///
/// ```
/// use cellgrid_core::ReactionNetwork;
/// use cellgrid_network::MassActionModel;
///
/// // A -> B at rate k.
/// let mut model = MassActionModel::builder("conversion")
///     .species("A", 1.0)
///     .species("B", 0.0)
///     .parameter("k", 0.5)
///     .reaction(&[("A", 1)], &[("B", 1)], "k")
///     .build()
///     .unwrap();
///
/// model.integrate(2.0).unwrap();
/// let a = model.concentration("A").unwrap();
/// let b = model.concentration("B").unwrap();
/// assert!((a - (-1.0f64).exp()).abs() < 1e-6);
/// assert!((a + b - 1.0).abs() < 1e-9);
/// ```
#[derive(Clone, Debug)]
pub struct MassActionBuilder {
    name: String,
    species: Vec<(String, f64)>,
    parameters: Vec<(String, f64)>,
    reactions: Vec<(Vec<(String, u32)>, Vec<(String, u32)>, String)>,
    max_substep: f64,
}

impl MassActionBuilder {
    /// Declare a species with its initial concentration.
    pub fn species(mut self, name: &str, initial: f64) -> Self {
        self.species.push((name.to_string(), initial));
        self
    }

    /// Declare a parameter with its nominal value.
    pub fn parameter(mut self, name: &str, value: f64) -> Self {
        self.parameters.push((name.to_string(), value));
        self
    }

    /// Add a reaction `reactants -> products` whose rate constant is the
    /// parameter named `rate`. Either side may be empty.
    pub fn reaction(mut self, reactants: &[(&str, u32)], products: &[(&str, u32)], rate: &str) -> Self {
        let own = |side: &[(&str, u32)]| -> Vec<(String, u32)> {
            side.iter().map(|(s, n)| (s.to_string(), *n)).collect()
        };
        self.reactions
            .push((own(reactants), own(products), rate.to_string()));
        self
    }

    /// Upper bound on the internal RK4 step (default 0.01).
    pub fn max_substep(mut self, max_substep: f64) -> Self {
        self.max_substep = max_substep;
        self
    }

    /// Resolve names and build the model.
    ///
    /// # Errors
    ///
    /// [`NetworkError::LoadFailed`] on duplicate names, negative or
    /// non-finite initial values, a non-positive `max_substep`, or a
    /// reaction that names an undeclared species or parameter.
    pub fn build(self) -> Result<MassActionModel, NetworkError> {
        let fail = |reason: String| NetworkError::LoadFailed {
            reason: format!("model '{}': {reason}", self.name),
        };

        if !self.max_substep.is_finite() || self.max_substep <= 0.0 {
            return Err(fail(format!(
                "max_substep must be finite and positive, got {}",
                self.max_substep
            )));
        }

        let mut species = Vec::with_capacity(self.species.len());
        let mut state = Vec::with_capacity(self.species.len());
        for (name, initial) in &self.species {
            if species.contains(name) {
                return Err(fail(format!("duplicate species '{name}'")));
            }
            if !initial.is_finite() || *initial < 0.0 {
                return Err(fail(format!(
                    "initial concentration of '{name}' must be finite and >= 0, got {initial}"
                )));
            }
            species.push(name.clone());
            state.push(*initial);
        }

        let mut parameters = Vec::with_capacity(self.parameters.len());
        let mut parameter_values = Vec::with_capacity(self.parameters.len());
        for (name, value) in &self.parameters {
            if parameters.contains(name) {
                return Err(fail(format!("duplicate parameter '{name}'")));
            }
            parameters.push(name.clone());
            parameter_values.push(*value);
        }

        let resolve_side = |side: &[(String, u32)]| -> Result<SmallVec<[Term; 3]>, NetworkError> {
            side.iter()
                .map(|(name, stoich)| {
                    species
                        .iter()
                        .position(|s| s == name)
                        .map(|idx| (idx, *stoich))
                        .ok_or_else(|| fail(format!("reaction uses undeclared species '{name}'")))
                })
                .collect()
        };

        let mut reactions = Vec::with_capacity(self.reactions.len());
        for (reactants, products, rate) in &self.reactions {
            let rate_idx = parameters
                .iter()
                .position(|p| p == rate)
                .ok_or_else(|| fail(format!("reaction uses undeclared parameter '{rate}'")))?;
            reactions.push(Reaction {
                reactants: resolve_side(reactants)?,
                products: resolve_side(products)?,
                rate: rate_idx,
            });
        }

        Ok(MassActionModel {
            name: self.name.clone(),
            species,
            state,
            parameters,
            parameter_values,
            reactions,
            max_substep: self.max_substep,
        })
    }
}

impl MassActionModel {
    /// Start building a model called `name`.
    pub fn builder(name: &str) -> MassActionBuilder {
        MassActionBuilder {
            name: name.to_string(),
            species: Vec::new(),
            parameters: Vec::new(),
            reactions: Vec::new(),
            max_substep: 0.01,
        }
    }

    /// Model name, for diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of reactions.
    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    /// Current state vector, in species order.
    pub fn state(&self) -> &[f64] {
        &self.state
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

    /// Write `d[y]/dt` for state `y` into `out`.
    fn derivatives(&self, y: &[f64], out: &mut [f64]) {
        out.fill(0.0);
        for r in &self.reactions {
            let mut flux = self.parameter_values[r.rate];
            for &(i, n) in &r.reactants {
                flux *= y[i].powi(n as i32);
            }
            for &(i, n) in &r.reactants {
                out[i] -= n as f64 * flux;
            }
            for &(i, n) in &r.products {
                out[i] += n as f64 * flux;
            }
        }
    }
}

impl ReactionNetwork for MassActionModel {
    fn species(&self) -> &[String] {
        &self.species
    }

    fn parameters(&self) -> &[String] {
        &self.parameters
    }

    fn concentration(&self, species: &str) -> Result<f64, NetworkError> {
        Ok(self.state[self.species_index(species)?])
    }

    fn set_concentrations(&mut self, changes: &[(&str, f64)]) -> Result<(), NetworkError> {
        let mut resolved: SmallVec<[(usize, f64); 8]> = SmallVec::with_capacity(changes.len());
        for &(name, value) in changes {
            resolved.push((self.species_index(name)?, value));
        }
        for (idx, value) in resolved {
            self.state[idx] = value;
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
        if !duration.is_finite() || duration < 0.0 {
            return Err(NetworkError::IntegrationFailed {
                reason: format!("duration must be finite and >= 0, got {duration}"),
            });
        }
        if duration == 0.0 {
            return Ok(());
        }

        let substeps = (duration / self.max_substep).ceil().max(1.0) as usize;
        let h = duration / substeps as f64;

        let mut y = self.state.clone();
        let mut rk = Rk4::new(y.len());
        for _ in 0..substeps {
            rk.step(&mut y, h, 0.0, |state, dydt| self.derivatives(state, dydt))
                .map_err(|i| NetworkError::IntegrationFailed {
                    reason: format!(
                        "model '{}': species '{}' became non-finite",
                        self.name, self.species[i]
                    ),
                })?;
        }

        self.state = y;
        Ok(())
    }
}

impl NetworkTemplate for MassActionModel {
    fn instantiate(&self) -> Result<Box<dyn ReactionNetwork>, NetworkError> {
        Ok(Box::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decay(k: f64) -> MassActionModel {
        MassActionModel::builder("decay")
            .species("A", 1.0)
            .parameter("k", k)
            .reaction(&[("A", 1)], &[], "k")
            .build()
            .unwrap()
    }

    #[test]
    fn first_order_decay_matches_closed_form() {
        let mut m = decay(0.7);
        m.integrate(3.0).unwrap();
        let expected = (-0.7f64 * 3.0).exp();
        assert!((m.concentration("A").unwrap() - expected).abs() < 1e-8);
    }

    #[test]
    fn zero_order_supply_is_linear() {
        let mut m = MassActionModel::builder("supply")
            .species("S", 0.0)
            .parameter("v", 0.25)
            .reaction(&[], &[("S", 1)], "v")
            .build()
            .unwrap();
        m.integrate(4.0).unwrap();
        assert!((m.concentration("S").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn dimerisation_uses_stoichiometry() {
        // 2A -> B: A + 2B is conserved.
        let mut m = MassActionModel::builder("dimer")
            .species("A", 2.0)
            .species("B", 0.0)
            .parameter("k", 0.3)
            .reaction(&[("A", 2)], &[("B", 1)], "k")
            .build()
            .unwrap();
        m.integrate(1.5).unwrap();
        let a = m.concentration("A").unwrap();
        let b = m.concentration("B").unwrap();
        assert!(a < 2.0);
        assert!((a + 2.0 * b - 2.0).abs() < 1e-9);
    }

    #[test]
    fn set_concentrations_is_atomic() {
        let mut m = decay(1.0);
        let err = m
            .set_concentrations(&[("A", 5.0), ("Missing", 1.0)])
            .unwrap_err();
        assert_eq!(
            err,
            NetworkError::SpeciesNotFound {
                species: "Missing".into()
            }
        );
        assert_eq!(m.concentration("A").unwrap(), 1.0);
    }

    #[test]
    fn parameter_change_affects_dynamics() {
        let mut slow = decay(0.1);
        let mut fast = decay(0.1);
        fast.set_parameter("k", 1.0).unwrap();
        slow.integrate(1.0).unwrap();
        fast.integrate(1.0).unwrap();
        assert!(fast.concentration("A").unwrap() < slow.concentration("A").unwrap());
    }

    #[test]
    fn blow_up_is_integration_failure_and_state_is_kept() {
        // 2A -> 3A explodes in finite time.
        let mut m = MassActionModel::builder("explosive")
            .species("A", 10.0)
            .parameter("k", 1e6)
            .reaction(&[("A", 2)], &[("A", 3)], "k")
            .max_substep(0.5)
            .build()
            .unwrap();
        let err = m.integrate(10.0).unwrap_err();
        assert!(matches!(err, NetworkError::IntegrationFailed { .. }));
        assert_eq!(m.concentration("A").unwrap(), 10.0);
    }

    #[test]
    fn negative_duration_is_rejected() {
        assert!(decay(1.0).integrate(-1.0).is_err());
        assert!(decay(1.0).integrate(f64::NAN).is_err());
        assert!(decay(1.0).integrate(0.0).is_ok());
    }

    #[test]
    fn build_rejects_undeclared_names() {
        let err = MassActionModel::builder("bad")
            .species("A", 1.0)
            .parameter("k", 1.0)
            .reaction(&[("A", 1)], &[("Z", 1)], "k")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("undeclared species 'Z'"));

        let err = MassActionModel::builder("bad")
            .species("A", 1.0)
            .reaction(&[("A", 1)], &[], "k")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("undeclared parameter 'k'"));
    }

    #[test]
    fn build_rejects_duplicates_and_negative_initials() {
        assert!(MassActionModel::builder("dup")
            .species("A", 1.0)
            .species("A", 2.0)
            .build()
            .is_err());
        assert!(MassActionModel::builder("neg")
            .species("A", -1.0)
            .build()
            .is_err());
        assert!(MassActionModel::builder("step")
            .max_substep(0.0)
            .build()
            .is_err());
    }

    proptest! {
        #[test]
        fn integration_is_deterministic_and_non_negative(
            a0 in 0.0f64..5.0,
            k in 0.0f64..3.0,
            d in 0.0f64..5.0,
        ) {
            let build = || MassActionModel::builder("rev")
                .species("A", a0)
                .species("B", 0.0)
                .parameter("k", k)
                .parameter("kr", 0.5)
                .reaction(&[("A", 1)], &[("B", 1)], "k")
                .reaction(&[("B", 1)], &[("A", 1)], "kr")
                .build()
                .unwrap();
            let mut x = build();
            let mut y = build();
            x.integrate(d).unwrap();
            y.integrate(d).unwrap();
            prop_assert_eq!(x.state(), y.state());
            prop_assert!(x.state().iter().all(|&v| v >= 0.0));
            let total: f64 = x.state().iter().sum();
            prop_assert!((total - a0).abs() < 1e-9 * (1.0 + a0));
        }
    }
}
