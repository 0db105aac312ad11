//! Grid composition: processes, topology, and initial store.

use cellgrid_core::{CellId, ConfigError, NetworkTemplate};
use cellgrid_process::{CellProcess, Process};
use cellgrid_store::{PortBindings, Store, Topology};
use indexmap::IndexMap;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::GridConfig;

/// Everything a [`SimulationEngine`](crate::SimulationEngine) needs to run.
///
/// Produced by [`GridComposer::build()`], or assembled by hand for custom
/// wirings. The engine validates the topology against the processes and
/// the store before accepting it.
#[derive(Default)]
pub struct Composite {
    /// Processes keyed by cell, in canonical (row-major) order.
    pub processes: IndexMap<CellId, Box<dyn Process>>,
    /// Port bindings, one entry per process.
    pub topology: Topology,
    /// Store contents at `t = 0`.
    pub initial_state: Store,
}

impl Composite {
    /// An empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a process bound to its own namespace, seeding the store with
    /// its schema defaults.
    pub fn insert_own(&mut self, cell: CellId, process: Box<dyn Process>) {
        self.initial_state
            .insert_cell(cell, process.describe_ports().defaults());
        self.topology.bind(cell, PortBindings::own(cell));
        self.processes.insert(cell, process);
    }

    /// Number of processes.
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Whether there are no processes.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

impl std::fmt::Debug for Composite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composite")
            .field("processes", &self.processes.len())
            .field("topology", &self.topology.len())
            .field("store_cells", &self.initial_state.len())
            .finish()
    }
}

/// Builds an R×C lattice of [`CellProcess`]es from one network template.
///
/// # Randomness
///
/// A master `ChaCha8Rng` seeded with [`GridConfig::seed`] draws one `u64`
/// per cell in row-major order; that value seeds the cell's own generator,
/// which then samples the cell's parameter noise followed by its boundary
/// values. Each cell's draws depend only on the seed and its position.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridComposer;

impl GridComposer {
    /// Compose the grid.
    ///
    /// Every cell gets a fresh network from `template`, named `"[r,c]"`,
    /// and both of its ports bound into `"[r,c]_store"`. With
    /// [`GridConfig::randomize_boundary`] set, each boundary species starts
    /// at an independent uniform draw from
    /// [`GridConfig::boundary_init_range`]; every other value starts at
    /// the process's schema default.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from validating `config`, loading a network, or
    /// constructing a cell. Composition stops at the first error and no
    /// partial grid is returned.
    pub fn build(config: &GridConfig, template: &dyn NetworkTemplate) -> Result<Composite, ConfigError> {
        config.validate()?;

        let mut master = ChaCha8Rng::seed_from_u64(config.seed);
        let (low, high) = config.boundary_init_range;
        let mut composite = Composite::new();
        composite.processes.reserve(config.cell_count());

        for row in 0..config.rows {
            for col in 0..config.cols {
                let cell = CellId::new(row, col);
                let mut rng = ChaCha8Rng::seed_from_u64(master.random::<u64>());
                let process =
                    CellProcess::from_template(cell.to_string(), template, &config.cell, &mut rng)?;

                let mut state = process.describe_ports().defaults();
                if config.randomize_boundary {
                    for value in state.boundary.values_mut() {
                        *value = rng.random_range(low..high);
                    }
                }
                debug!("composed cell {cell}: {process:?}");

                composite.initial_state.insert_cell(cell, state);
                composite.topology.bind(cell, PortBindings::own(cell));
                composite.processes.insert(cell, Box::new(process));
            }
        }

        info!(
            "composed {}x{} grid ({} cells), boundary species {:?}, seed {}",
            config.rows,
            config.cols,
            composite.len(),
            config.cell.boundary_species,
            config.seed
        );
        Ok(composite)
    }
}
