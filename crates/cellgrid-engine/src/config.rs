//! Grid and engine configuration.
//!
//! [`GridConfig`] is the input to [`GridComposer::build()`](crate::GridComposer::build);
//! [`EngineConfig`] controls how [`SimulationEngine`](crate::SimulationEngine)
//! schedules the compute phase. Both are plain structs with defaults and a
//! `validate()` that runs before any work begins.

use std::num::NonZeroUsize;

use cellgrid_core::ConfigError;
use cellgrid_process::CellConfig;

// ── GridConfig ──────────────────────────────────────────────────

/// Shape and initialisation of an R×C lattice of identical cells.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Number of lattice rows. Default: 49.
    pub rows: u32,
    /// Number of lattice columns. Default: 49.
    pub cols: u32,
    /// Configuration shared by every cell.
    pub cell: CellConfig,
    /// Draw each cell's boundary species from
    /// [`boundary_init_range`](Self::boundary_init_range) instead of
    /// using the network's transient values. Default: true.
    pub randomize_boundary: bool,
    /// Half-open range `[low, high)` for randomised boundary values.
    /// Default: `(0.0, 0.1)`.
    pub boundary_init_range: (f64, f64),
    /// Master seed for parameter noise and boundary randomisation.
    /// Default: 0.
    pub seed: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 49,
            cols: 49,
            cell: CellConfig::default(),
            randomize_boundary: true,
            boundary_init_range: (0.0, 0.1),
            seed: 0,
        }
    }
}

impl GridConfig {
    /// A `rows`×`cols` grid with every other field at its default.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    /// Number of cells, `rows * cols`.
    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidDimensions`] if either axis is zero.
    /// - [`ConfigError::InvalidRange`] if randomisation is enabled and the
    ///   range is not finite, starts below zero, or is empty.
    /// - Anything [`CellConfig::validate()`] reports.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.randomize_boundary {
            let (low, high) = self.boundary_init_range;
            if !low.is_finite() || !high.is_finite() || low < 0.0 || low >= high {
                return Err(ConfigError::InvalidRange { low, high });
            }
        }
        self.cell.validate()
    }
}

// ── EngineConfig ────────────────────────────────────────────────

/// How the compute phase of an increment is scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Parallelism {
    /// Step every process on the calling thread, in canonical order.
    #[default]
    Sequential,
    /// Split processes into contiguous chunks over this many scoped
    /// worker threads. Outputs are still committed in canonical order.
    Threads(NonZeroUsize),
}

impl Parallelism {
    /// One worker per available CPU, or sequential if that is unknown.
    pub fn available() -> Self {
        match std::thread::available_parallelism() {
            Ok(n) if n.get() > 1 => Self::Threads(n),
            _ => Self::Sequential,
        }
    }

    /// Worker count actually used for `cells` processes.
    ///
    /// Never more workers than processes, and never zero.
    pub fn workers_for(&self, cells: usize) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Threads(n) => n.get().min(cells).max(1),
        }
    }
}

/// Engine scheduling options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Compute-phase scheduling. Default: sequential.
    pub parallelism: Parallelism,
}
