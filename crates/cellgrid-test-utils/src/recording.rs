//! A process that records its inputs, for scheduling tests.

use std::sync::{Arc, Mutex};

use cellgrid_core::{PortState, ProcessError};
use cellgrid_process::{PortSchema, Process, VariableSchema};
use cellgrid_store::UpdatePolicy;

/// Shared log of every input a [`RecordingProcess`] was stepped with.
pub type Observations = Arc<Mutex<Vec<PortState>>>;

/// Owns one boundary species and couples to whatever its `internal` port
/// is bound to.
///
/// Each step outputs `own + sum(internal inputs) + duration` for its
/// species. With the default wiring the internal port is empty and the
/// recorder just counts time. Binding the internal port to another cell's
/// boundary branch builds a coupling whose result depends on whether the
/// neighbour's same-step output was visible.
///
/// The recorder declares no internal variables, so its (empty) internal
/// output never writes into the branch it reads from.
pub struct RecordingProcess {
    name: String,
    species: String,
    initial: f64,
    time_step: f64,
    emit: bool,
    observed: Observations,
}

impl RecordingProcess {
    pub fn new(name: impl Into<String>, species: impl Into<String>, initial: f64) -> Self {
        Self {
            name: name.into(),
            species: species.into(),
            initial,
            time_step: 1.0,
            emit: true,
            observed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    /// Declare the species with `emit = false`.
    pub fn hidden(mut self) -> Self {
        self.emit = false;
        self
    }

    /// Handle to the observation log; stays valid after the recorder is boxed.
    pub fn observations(&self) -> Observations {
        Arc::clone(&self.observed)
    }
}

impl Process for RecordingProcess {
    fn name(&self) -> &str {
        &self.name
    }

    fn describe_ports(&self) -> PortSchema {
        let mut schema = PortSchema::default();
        schema.boundary.insert(
            self.species.clone(),
            VariableSchema {
                default: self.initial,
                emit: self.emit,
                updater: UpdatePolicy::Overwrite,
            },
        );
        schema
    }

    fn time_step(&self) -> f64 {
        self.time_step
    }

    fn step(&mut self, duration: f64, inputs: &PortState) -> Result<PortState, ProcessError> {
        self.observed
            .lock()
            .map_err(|_| ProcessError::IntegrationFailed {
                reason: "observation log poisoned".into(),
            })?
            .push(inputs.clone());

        let own = inputs.boundary.get(&self.species).copied().unwrap_or(0.0);
        let coupled: f64 = inputs.internal.values().sum();
        let mut out = PortState::new();
        out.boundary
            .insert(self.species.clone(), own + coupled + duration);
        Ok(out)
    }
}
