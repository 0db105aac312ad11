//! [`CellProcess`]: one reaction network wrapped as a [`Process`].
//!
//! # Step semantics
//!
//! 1. Apply the input `boundary` values (and `internal` values when
//!    [`CellConfig::apply_internal`] is set) to the network as one atomic
//!    batch. Species unknown to the network are logged and skipped.
//! 2. Re-apply the fixed sampled parameter overrides, if any.
//! 3. Integrate the network for exactly `duration`.
//! 4. Read back every declared species, partitioned by port.

use cellgrid_core::{
    ConfigError, NetworkTemplate, Port, PortState, ProcessError, ReactionNetwork,
};
use indexmap::IndexMap;
use log::warn;
use rand::Rng;
use smallvec::SmallVec;

use crate::noise::NoiseSpec;
use crate::partition::SpeciesPartition;
use crate::process::Process;
use crate::schema::{PortSchema, VariableSchema};

/// Configuration shared by every cell of a grid.
#[derive(Clone, Debug, PartialEq)]
pub struct CellConfig {
    /// Species exchanged through the `boundary` port. Default: `["Xex"]`.
    pub boundary_species: Vec<String>,
    /// Parameter perturbations sampled once per cell. Default: none.
    pub parameter_noise: NoiseSpec,
    /// Increment the process is stepped by. Default: 1.0.
    pub time_step: f64,
    /// Also apply `internal` inputs to the network before integrating.
    /// Default: false (only boundary values flow in).
    pub apply_internal: bool,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            boundary_species: vec!["Xex".to_string()],
            parameter_noise: NoiseSpec::new(),
            time_step: 1.0,
            apply_internal: false,
        }
    }
}

impl CellConfig {
    /// Check the parts of the configuration that need no network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(ConfigError::InvalidTimeStep {
                value: self.time_step,
            });
        }
        self.parameter_noise.validate()
    }
}

/// A cell of the tissue: an exclusively owned reaction network plus its
/// species partition and fixed parameter overrides.
pub struct CellProcess {
    name: String,
    network: Box<dyn ReactionNetwork>,
    partition: SpeciesPartition,
    defaults: PortState,
    overrides: IndexMap<String, f64>,
    time_step: f64,
    apply_internal: bool,
    skipped_species: u64,
}

impl CellProcess {
    /// Wrap `network`, partitioning its species and sampling noise from `rng`.
    ///
    /// Schema defaults are the network's transient concentrations at this
    /// moment.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from validation, partitioning, or noise
    /// sampling. No process is created on error.
    pub fn new<R: Rng + ?Sized>(
        name: impl Into<String>,
        network: Box<dyn ReactionNetwork>,
        config: &CellConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let partition = SpeciesPartition::new(network.species(), &config.boundary_species)?;

        let mut defaults = PortState::new();
        for (port, names) in [
            (Port::Boundary, partition.boundary()),
            (Port::Internal, partition.internal()),
        ] {
            for species in names {
                let value = network.concentration(species)?;
                defaults.port_mut(port).insert(species.clone(), value);
            }
        }

        let overrides = config.parameter_noise.sample(network.as_ref(), rng)?;

        Ok(Self {
            name: name.into(),
            network,
            partition,
            defaults,
            overrides,
            time_step: config.time_step,
            apply_internal: config.apply_internal,
            skipped_species: 0,
        })
    }

    /// Load a fresh network from `template` and wrap it.
    pub fn from_template<R: Rng + ?Sized>(
        name: impl Into<String>,
        template: &dyn NetworkTemplate,
        config: &CellConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let network = template.instantiate()?;
        Self::new(name, network, config, rng)
    }

    /// The boundary/internal split of this cell's species.
    pub fn partition(&self) -> &SpeciesPartition {
        &self.partition
    }

    /// The sampled parameter values applied on every step.
    pub fn parameter_overrides(&self) -> &IndexMap<String, f64> {
        &self.overrides
    }

    /// The wrapped network.
    pub fn network(&self) -> &dyn ReactionNetwork {
        self.network.as_ref()
    }

    /// How many unknown-species assignments or reads were skipped so far.
    pub fn skipped_species(&self) -> u64 {
        self.skipped_species
    }

    fn apply_inputs(&mut self, inputs: &PortState) {
        let ports: &[Port] = if self.apply_internal {
            &Port::ALL
        } else {
            &[Port::Boundary]
        };

        let mut changes: SmallVec<[(&str, f64); 8]> = SmallVec::new();
        for &port in ports {
            for (species, &value) in inputs.port(port) {
                if self.network.has_species(species) {
                    changes.push((species.as_str(), value));
                } else {
                    self.skipped_species += 1;
                    warn!(
                        "{}: species '{species}' not found in network, {port} assignment skipped",
                        self.name
                    );
                }
            }
        }

        if changes.is_empty() {
            return;
        }
        if let Err(e) = self.network.set_concentrations(&changes) {
            warn!("{}: concentration batch rejected: {e}", self.name);
        }
    }

    fn apply_overrides(&mut self) {
        for (parameter, &value) in &self.overrides {
            if let Err(e) = self.network.set_parameter(parameter, value) {
                warn!("{}: {e}", self.name);
            }
        }
    }

    fn read_back(&mut self) -> PortState {
        let mut result = PortState::new();
        for (port, names) in [
            (Port::Boundary, self.partition.boundary()),
            (Port::Internal, self.partition.internal()),
        ] {
            for species in names {
                match self.network.concentration(species) {
                    Ok(value) => {
                        result.port_mut(port).insert(species.clone(), value);
                    }
                    Err(e) => {
                        self.skipped_species += 1;
                        warn!("{}: read-back skipped: {e}", self.name);
                    }
                }
            }
        }
        result
    }
}

impl Process for CellProcess {
    fn name(&self) -> &str {
        &self.name
    }

    fn describe_ports(&self) -> PortSchema {
        let mut schema = PortSchema::default();
        for port in Port::ALL {
            let vars = match port {
                Port::Boundary => &mut schema.boundary,
                Port::Internal => &mut schema.internal,
            };
            for (species, &value) in self.defaults.port(port) {
                vars.insert(species.clone(), VariableSchema::emitted(value));
            }
        }
        schema
    }

    fn time_step(&self) -> f64 {
        self.time_step
    }

    fn step(&mut self, duration: f64, inputs: &PortState) -> Result<PortState, ProcessError> {
        self.apply_inputs(inputs);
        self.apply_overrides();
        self.network
            .integrate(duration)
            .map_err(|e| ProcessError::IntegrationFailed {
                reason: e.to_string(),
            })?;
        Ok(self.read_back())
    }
}

impl std::fmt::Debug for CellProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellProcess")
            .field("name", &self.name)
            .field("boundary", &self.partition.boundary())
            .field("internal", &self.partition.internal())
            .field("overrides", &self.overrides)
            .field("time_step", &self.time_step)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgrid_core::NetworkError;
    use cellgrid_test_utils::{FailingNetwork, MockNetwork};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Mutex;

    fn glycolysis_like() -> MockNetwork {
        MockNetwork::builder()
            .species("Xex", 0.5)
            .species("X", 1.0)
            .species("Y", 2.0)
            .parameter("k", 0.1)
            .build()
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0)
    }

    fn boundary_input(species: &str, value: f64) -> PortState {
        let mut state = PortState::new();
        state.boundary.insert(species.to_string(), value);
        state
    }

    #[test]
    fn construction_partitions_species() {
        let cell =
            CellProcess::new("c", Box::new(glycolysis_like()), &CellConfig::default(), &mut rng())
                .unwrap();
        assert_eq!(cell.partition().boundary().to_vec(), vec!["Xex".to_string()]);
        assert_eq!(
            cell.partition().internal().to_vec(),
            vec!["X".to_string(), "Y".to_string()]
        );
    }

    #[test]
    fn unknown_boundary_species_fails_construction() {
        let config = CellConfig {
            boundary_species: vec!["Nope".into()],
            ..CellConfig::default()
        };
        let err = CellProcess::new("c", Box::new(glycolysis_like()), &config, &mut rng())
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBoundarySpecies { .. }));
    }

    #[test]
    fn invalid_time_step_fails_construction() {
        let config = CellConfig {
            time_step: 0.0,
            ..CellConfig::default()
        };
        assert!(matches!(
            CellProcess::new("c", Box::new(glycolysis_like()), &config, &mut rng()),
            Err(ConfigError::InvalidTimeStep { .. })
        ));
    }

    #[test]
    fn schema_defaults_are_construction_time_concentrations() {
        let cell =
            CellProcess::new("c", Box::new(glycolysis_like()), &CellConfig::default(), &mut rng())
                .unwrap();
        let schema = cell.describe_ports();
        assert_eq!(schema.boundary["Xex"].default, 0.5);
        assert_eq!(schema.internal["Y"].default, 2.0);
        assert!(schema.internal.values().all(|v| v.emit));
        assert!(schema
            .boundary
            .values()
            .all(|v| v.updater == cellgrid_store::UpdatePolicy::Overwrite));
    }

    #[test]
    fn step_applies_boundary_then_integrates() {
        let mut cell =
            CellProcess::new("c", Box::new(glycolysis_like()), &CellConfig::default(), &mut rng())
                .unwrap();
        let out = cell.step(1.0, &boundary_input("Xex", 4.0)).unwrap();
        // MockNetwork adds `duration` to every species on integrate.
        assert_eq!(out.get(Port::Boundary, "Xex"), Some(5.0));
        assert_eq!(out.get(Port::Internal, "X"), Some(2.0));
        assert_eq!(out.boundary.len(), 1);
        assert_eq!(out.internal.len(), 2);
    }

    #[test]
    fn fresh_processes_step_identically() {
        let template = glycolysis_like();
        let mut outputs = Vec::new();
        for seed in [1, 2] {
            let mut cell = CellProcess::from_template(
                "c",
                &template,
                &CellConfig::default(),
                &mut ChaCha8Rng::seed_from_u64(seed),
            )
            .unwrap();
            outputs.push(cell.step(0.5, &boundary_input("Xex", 0.25)).unwrap());
        }
        assert_eq!(outputs[0], outputs[1]);
    }

    #[test]
    fn internal_inputs_ignored_unless_enabled() {
        let mut input = PortState::new();
        input.internal.insert("X".into(), 10.0);

        let mut plain =
            CellProcess::new("c", Box::new(glycolysis_like()), &CellConfig::default(), &mut rng())
                .unwrap();
        assert_eq!(plain.step(1.0, &input).unwrap().get(Port::Internal, "X"), Some(2.0));

        let config = CellConfig {
            apply_internal: true,
            ..CellConfig::default()
        };
        let mut variant =
            CellProcess::new("c", Box::new(glycolysis_like()), &config, &mut rng()).unwrap();
        assert_eq!(
            variant.step(1.0, &input).unwrap().get(Port::Internal, "X"),
            Some(11.0)
        );
    }

    #[test]
    fn unknown_input_species_is_skipped_not_fatal() {
        let mut cell =
            CellProcess::new("c", Box::new(glycolysis_like()), &CellConfig::default(), &mut rng())
                .unwrap();
        let mut input = boundary_input("Xex", 3.0);
        input.boundary.insert("Ghost".into(), 99.0);

        let out = cell.step(1.0, &input).unwrap();
        assert_eq!(out.get(Port::Boundary, "Xex"), Some(4.0));
        assert_eq!(out.get(Port::Boundary, "Ghost"), None);
        assert_eq!(cell.skipped_species(), 1);
    }

    // ── Log capture ──────────────────────────────────────────────────

    struct CaptureLogger {
        records: Mutex<Vec<(log::Level, String)>>,
    }

    impl log::Log for CaptureLogger {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if let Ok(mut records) = self.records.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: CaptureLogger = CaptureLogger {
        records: Mutex::new(Vec::new()),
    };

    fn captured_warnings(needle: &str) -> Vec<String> {
        CAPTURE
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, msg)| *level == log::Level::Warn && msg.contains(needle))
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    #[test]
    fn unknown_input_species_is_logged_at_warn() {
        // Only this test installs a logger in this binary.
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Warn);

        let mut cell = CellProcess::new(
            "warn-cell",
            Box::new(glycolysis_like()),
            &CellConfig::default(),
            &mut rng(),
        )
        .unwrap();
        let mut input = boundary_input("Xex", 1.0);
        input.boundary.insert("Phantom".into(), 2.0);
        cell.step(1.0, &input).unwrap();

        let warnings = captured_warnings("warn-cell");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'Phantom' not found"));
    }

    #[test]
    fn noise_overrides_are_fixed_and_reapplied() {
        let config = CellConfig {
            parameter_noise: NoiseSpec::new().with("k", 0.05),
            ..CellConfig::default()
        };
        let mut cell =
            CellProcess::new("c", Box::new(glycolysis_like()), &config, &mut rng()).unwrap();
        let sampled = cell.parameter_overrides()["k"];
        assert!((sampled - 0.1).abs() <= 0.05);

        cell.step(1.0, &PortState::new()).unwrap();
        cell.step(1.0, &PortState::new()).unwrap();
        assert_eq!(cell.parameter_overrides()["k"], sampled);
        assert_eq!(cell.network().parameter("k").unwrap(), sampled);
    }

    #[test]
    fn integration_failure_is_process_error() {
        let network = FailingNetwork::new(glycolysis_like(), 1);
        let mut cell =
            CellProcess::new("c", Box::new(network), &CellConfig::default(), &mut rng()).unwrap();
        assert!(cell.step(1.0, &PortState::new()).is_ok());
        let err = cell.step(1.0, &PortState::new()).unwrap_err();
        assert!(matches!(err, ProcessError::IntegrationFailed { .. }));
    }

    #[test]
    fn template_load_failure_propagates() {
        struct Broken;
        impl NetworkTemplate for Broken {
            fn instantiate(&self) -> Result<Box<dyn ReactionNetwork>, NetworkError> {
                Err(NetworkError::LoadFailed {
                    reason: "no model".into(),
                })
            }
        }
        let err = CellProcess::from_template("c", &Broken, &CellConfig::default(), &mut rng())
            .unwrap_err();
        assert!(matches!(err, ConfigError::NetworkLoad(_)));
    }
}
