//! Per-increment performance metrics.

/// Timing data collected during a single increment.
///
/// All durations are in microseconds. The engine replaces these after
/// every committed increment; read them from
/// [`SimulationEngine::last_metrics()`](crate::SimulationEngine::last_metrics).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the whole increment.
    pub total_us: u64,
    /// Time spent gathering inputs and running every process.
    pub compute_us: u64,
    /// Time spent writing staged outputs into the store.
    pub commit_us: u64,
    /// Time spent capturing the history snapshot.
    pub snapshot_us: u64,
    /// Number of processes stepped.
    pub cell_count: usize,
    /// Worker threads used for the compute phase (1 when sequential).
    pub workers: usize,
}

