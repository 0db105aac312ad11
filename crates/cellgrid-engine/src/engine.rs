//! The barrier-staged simulation engine.
//!
//! [`SimulationEngine`] owns the processes, the store, and the history of
//! a composite, and advances them in fixed increments.
//!
//! # Increment pipeline
//!
//! 1. **Compute.** Every process's bound branches are copied out of the
//!    store, then every process is stepped against those copies. Outputs
//!    are staged, never written. With
//!    [`Parallelism::Threads`](crate::Parallelism::Threads) the
//!    processes are split into contiguous chunks over scoped workers and
//!    the outputs come back over a channel.
//! 2. **Commit.** Staged outputs are written into the store in canonical
//!    (row-major) order under each variable's update policy.
//! 3. **Record.** A snapshot of the committed store, filtered by the
//!    schemas' emit flags, is appended to the history.
//!
//! If any process fails in step 1, nothing is committed, the engine moves
//! to [`EngineState::Aborted`], and the history up to the last committed
//! increment stays readable.

use std::time::Instant;

use cellgrid_core::{CellId, ConfigError, Port, PortState, StepError, StepId};
use cellgrid_process::{PortSchema, Process};
use cellgrid_store::{EmitFilter, History, PortBindings, Snapshot, Store};
use indexmap::IndexMap;
use log::{debug, error, info};

use crate::composer::Composite;
use crate::config::EngineConfig;
use crate::metrics::StepMetrics;

/// Remaining durations shorter than this fraction of the time step are
/// treated as zero.
const STEP_TOLERANCE: f64 = 1e-9;

/// Lifecycle of a [`SimulationEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Store populated from the initial state; nothing committed yet.
    Initial,
    /// At least one increment committed outside a completed run.
    Stepping,
    /// The last [`run_for()`](SimulationEngine::run_for) reached its end
    /// time. Further runs continue from here.
    Terminal,
    /// A process failed; the engine refuses to step again.
    Aborted,
}

/// Drives a [`Composite`] through time.
///
/// # Example
///
/// ```ignore
/// let composite = GridComposer::build(&GridConfig::new(2, 2), &template)?;
/// let mut engine = SimulationEngine::new(composite, EngineConfig::default())?;
/// let history = engine.run_for(10.0)?;
/// assert_eq!(history.len(), 11);
/// ```
pub struct SimulationEngine {
    processes: IndexMap<CellId, Box<dyn Process>>,
    bindings: Vec<PortBindings>,
    schemas: Vec<PortSchema>,
    store: Store,
    history: History,
    filter: EmitFilter,
    config: EngineConfig,
    time_step: f64,
    elapsed: f64,
    current_step: StepId,
    state: EngineState,
    last_metrics: StepMetrics,
}

// Compile-time assertion: the engine can be moved to another thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<SimulationEngine>();
    }
};

impl SimulationEngine {
    /// Validate a composite and record its initial state.
    ///
    /// Schema defaults are filled into any bound branch that lacks them;
    /// values already in `initial_state` win. The initial snapshot is
    /// recorded at `t = 0`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyComposite`] if there are no processes.
    /// - [`ConfigError::MalformedTopology`] if the topology does not have
    ///   exactly one entry per process or a bound path is missing.
    /// - [`ConfigError::InvalidTimeStep`] or
    ///   [`ConfigError::NonUniformTimeStep`] if the processes' time steps
    ///   are unusable or differ.
    pub fn new(composite: Composite, config: EngineConfig) -> Result<Self, ConfigError> {
        let Composite {
            processes,
            topology,
            initial_state: mut store,
        } = composite;

        if processes.is_empty() {
            return Err(ConfigError::EmptyComposite);
        }
        topology.validate(processes.keys(), &store)?;
        let time_step = uniform_time_step(&processes)?;

        let mut bindings = Vec::with_capacity(processes.len());
        let mut schemas = Vec::with_capacity(processes.len());
        let mut filter = EmitFilter::new();
        for (cell, process) in &processes {
            let bound = *topology
                .bindings(cell)
                .ok_or_else(|| ConfigError::MalformedTopology {
                    reason: format!("process {cell} has no topology entry"),
                })?;
            let schema = process.describe_ports();

            for port in Port::ALL {
                let path = bound.path(port);
                if let Some(branch) = store.resolve_mut(path) {
                    for (species, var) in schema.port(port) {
                        branch.entry(species.clone()).or_insert(var.default);
                    }
                }
            }
            for (port, species) in schema.hidden() {
                let path = bound.path(port);
                filter.hide(path.cell, path.port, species);
            }

            bindings.push(bound);
            schemas.push(schema);
        }

        let history = History::starting_with(Snapshot::capture(&store, StepId(0), 0.0, &filter));

        info!(
            "engine ready: {} processes, time_step {time_step}, {:?}",
            processes.len(),
            config.parallelism
        );

        Ok(Self {
            processes,
            bindings,
            schemas,
            store,
            history,
            filter,
            config,
            time_step,
            elapsed: 0.0,
            current_step: StepId(0),
            state: EngineState::Initial,
            last_metrics: StepMetrics::default(),
        })
    }

    /// Advance by one full time step.
    ///
    /// # Errors
    ///
    /// [`StepError::ProcessFailed`] if any process fails (the engine then
    /// aborts), [`StepError::Aborted`] if it already had, or
    /// [`StepError::TimeStalled`] if the time step is too small to move
    /// the clock at the current elapsed time.
    pub fn step_once(&mut self) -> Result<&Snapshot, StepError> {
        let next = self.elapsed + self.time_step;
        self.advance(self.time_step, next)
    }

    /// Advance simulated time by `duration`, continuing from the current
    /// elapsed time.
    ///
    /// Steps in increments of the uniform time step; if `duration` is not
    /// a multiple of it, the final increment is shortened so the last
    /// snapshot lands exactly on `elapsed + duration`. A zero duration
    /// records nothing.
    ///
    /// # Errors
    ///
    /// - [`StepError::InvalidDuration`] for a NaN, infinite, or negative
    ///   duration. Nothing is stepped.
    /// - [`StepError::ProcessFailed`] if a process fails. Increments
    ///   committed before the failure remain in the history.
    /// - [`StepError::TimeStalled`] if an increment no longer moves the
    ///   clock. Increments committed before it remain in the history.
    /// - [`StepError::Aborted`] if the engine had already aborted.
    pub fn run_for(&mut self, duration: f64) -> Result<&History, StepError> {
        if self.state == EngineState::Aborted {
            return Err(StepError::Aborted);
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(StepError::InvalidDuration { value: duration });
        }

        let start = self.elapsed;
        let target = self.elapsed + duration;
        let eps = self.time_step * STEP_TOLERANCE;
        info!("running from t={start} to t={target}");
        while target - self.elapsed > eps {
            let remaining = target - self.elapsed;
            let (increment, next) = if remaining <= self.time_step + eps {
                (remaining, target)
            } else {
                (self.time_step, self.elapsed + self.time_step)
            };
            self.advance(increment, next)?;
        }

        self.state = EngineState::Terminal;
        info!(
            "run complete: t={}, {} snapshots recorded",
            self.elapsed,
            self.history.len()
        );
        Ok(&self.history)
    }

    /// Run one increment of `increment` time units ending at `next`.
    fn advance(&mut self, increment: f64, next: f64) -> Result<&Snapshot, StepError> {
        if self.state == EngineState::Aborted {
            return Err(StepError::Aborted);
        }
        if next.is_nan() || next <= self.elapsed {
            return Err(StepError::TimeStalled {
                elapsed: self.elapsed,
                increment,
            });
        }
        let started = Instant::now();
        let workers = self.config.parallelism.workers_for(self.processes.len());

        // 1. Compute: every process reads the store as of the last barrier.
        let inputs: Vec<PortState> = self
            .bindings
            .iter()
            .map(|bound| read_inputs(&self.store, bound))
            .collect();
        let staged = if workers > 1 {
            compute_parallel(&mut self.processes, &inputs, increment, workers)
        } else {
            compute_sequential(&mut self.processes, &inputs, increment)
        };
        let staged = match staged {
            Ok(staged) => staged,
            Err(e) => {
                self.state = EngineState::Aborted;
                error!(
                    "aborting at t={} (step {}): {e}",
                    self.elapsed,
                    self.current_step.0 + 1
                );
                return Err(e);
            }
        };
        let compute_us = started.elapsed().as_micros() as u64;

        // 2. Commit, in canonical order.
        let commit_start = Instant::now();
        for ((output, bound), schema) in staged.iter().zip(&self.bindings).zip(&self.schemas) {
            commit(&mut self.store, bound, schema, output);
        }
        self.elapsed = next;
        self.current_step = StepId(self.current_step.0 + 1);
        self.state = EngineState::Stepping;
        let commit_us = commit_start.elapsed().as_micros() as u64;

        // 3. Record.
        let snapshot_start = Instant::now();
        let snapshot = Snapshot::capture(&self.store, self.current_step, self.elapsed, &self.filter);
        let snapshot_us = snapshot_start.elapsed().as_micros() as u64;

        self.last_metrics = StepMetrics {
            total_us: started.elapsed().as_micros() as u64,
            compute_us,
            commit_us,
            snapshot_us,
            cell_count: self.processes.len(),
            workers,
        };
        debug!(
            "step {} committed: t={} (+{increment}), compute {}us, commit {}us",
            self.current_step.0, self.elapsed, compute_us, commit_us
        );

        let elapsed = self.elapsed;
        self.history
            .push(snapshot)
            .map_err(|_| StepError::TimeStalled { elapsed, increment })
    }

    /// Every snapshot recorded so far, starting with `t = 0`.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Consume the engine, keeping only its history.
    pub fn into_history(self) -> History {
        self.history
    }

    /// The store as of the last commit.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Simulated time elapsed so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// The uniform time step of the composite.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Number of committed increments.
    pub fn current_step(&self) -> StepId {
        self.current_step
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Metrics from the most recent committed increment.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Number of processes.
    pub fn cell_count(&self) -> usize {
        self.processes.len()
    }

    /// Look up a process by cell.
    pub fn process(&self, cell: &CellId) -> Option<&dyn Process> {
        self.processes.get(cell).map(|p| p.as_ref())
    }
}

impl std::fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("processes", &self.processes.len())
            .field("elapsed", &self.elapsed)
            .field("current_step", &self.current_step)
            .field("state", &self.state)
            .field("parallelism", &self.config.parallelism)
            .finish()
    }
}

/// The time step shared by every process.
fn uniform_time_step(processes: &IndexMap<CellId, Box<dyn Process>>) -> Result<f64, ConfigError> {
    let mut expected: Option<f64> = None;
    for (cell, process) in processes {
        let found = process.time_step();
        if !found.is_finite() || found <= 0.0 {
            return Err(ConfigError::InvalidTimeStep { value: found });
        }
        match expected {
            None => expected = Some(found),
            Some(expected) if expected != found => {
                return Err(ConfigError::NonUniformTimeStep {
                    expected,
                    found,
                    cell: *cell,
                });
            }
            Some(_) => {}
        }
    }
    expected.ok_or(ConfigError::EmptyComposite)
}

/// Copy the branches bound to a process out of the store.
fn read_inputs(store: &Store, bound: &PortBindings) -> PortState {
    let mut inputs = PortState::new();
    for port in Port::ALL {
        if let Some(values) = store.resolve(bound.path(port)) {
            inputs.port_mut(port).clone_from(values);
        }
    }
    inputs
}

/// Write one process's staged output into its bound branches.
fn commit(store: &mut Store, bound: &PortBindings, schema: &PortSchema, output: &PortState) {
    for port in Port::ALL {
        store.apply(bound.path(port), output.port(port), |species| {
            schema.updater(port, species)
        });
    }
}

fn compute_sequential(
    processes: &mut IndexMap<CellId, Box<dyn Process>>,
    inputs: &[PortState],
    increment: f64,
) -> Result<Vec<PortState>, StepError> {
    processes
        .iter_mut()
        .zip(inputs)
        .map(|((cell, process), input)| {
            process
                .step(increment, input)
                .map_err(|reason| StepError::ProcessFailed {
                    cell: *cell,
                    reason,
                })
        })
        .collect()
}

/// Step processes on `workers` scoped threads, one contiguous chunk each.
///
/// A worker stops at its first failure. The error reported is the one
/// with the lowest canonical index, which is the one sequential execution
/// would have hit first.
fn compute_parallel(
    processes: &mut IndexMap<CellId, Box<dyn Process>>,
    inputs: &[PortState],
    increment: f64,
    workers: usize,
) -> Result<Vec<PortState>, StepError> {
    let count = processes.len();
    let chunk_size = count.div_ceil(workers);
    let mut slots: Vec<(CellId, &mut Box<dyn Process>)> =
        processes.iter_mut().map(|(cell, p)| (*cell, p)).collect();

    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::scope(|scope| {
        for (chunk_idx, chunk) in slots.chunks_mut(chunk_size).enumerate() {
            let tx = tx.clone();
            scope.spawn(move || {
                let base = chunk_idx * chunk_size;
                for (offset, (cell, process)) in chunk.iter_mut().enumerate() {
                    let idx = base + offset;
                    let result = process
                        .step(increment, &inputs[idx])
                        .map_err(|reason| StepError::ProcessFailed {
                            cell: *cell,
                            reason,
                        });
                    let failed = result.is_err();
                    if tx.send((idx, result)).is_err() || failed {
                        return;
                    }
                }
            });
        }
    });
    drop(tx);

    let mut staged: Vec<Option<PortState>> = vec![None; count];
    let mut first_error: Option<(usize, StepError)> = None;
    for (idx, result) in rx.iter() {
        match result {
            Ok(output) => staged[idx] = Some(output),
            Err(e) => {
                if first_error.as_ref().is_none_or(|(seen, _)| idx < *seen) {
                    first_error = Some((idx, e));
                }
            }
        }
    }
    if let Some((_, e)) = first_error {
        return Err(e);
    }
    Ok(staged.into_iter().flatten().collect())
}
