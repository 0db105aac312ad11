//! Integration test: composing and running whole grids.
//!
//! Covers the end-to-end scenarios: history length and shape, snapshot
//! timing, noise reproducibility by seed, sequential/threaded agreement,
//! and unknown-species tolerance at the engine level.

use std::num::NonZeroUsize;

use cellgrid_core::{CellId, ConfigError, Port};
use cellgrid_engine::{
    EngineConfig, EngineState, GridComposer, GridConfig, Parallelism, SimulationEngine,
};
use cellgrid_network::glycolysis_oscillator;
use cellgrid_process::NoiseSpec;
use cellgrid_store::snapshot_hash;
use cellgrid_test_utils::MockNetwork;
use proptest::prelude::*;

fn grid(rows: u32, cols: u32, seed: u64) -> GridConfig {
    GridConfig {
        seed,
        ..GridConfig::new(rows, cols)
    }
}

fn threads(n: usize) -> EngineConfig {
    EngineConfig {
        parallelism: Parallelism::Threads(NonZeroUsize::new(n).unwrap()),
    }
}

// ── Scenarios ────────────────────────────────────────────────────────

#[test]
fn two_by_two_for_two_time_units() {
    let composite = GridComposer::build(&grid(2, 2, 0), &MockNetwork::four_species()).unwrap();
    let mut engine = SimulationEngine::new(composite, EngineConfig::default()).unwrap();
    let history = engine.run_for(2.0).unwrap();

    assert_eq!(history.len(), 3);
    assert_eq!(history.times(), vec![0.0, 1.0, 2.0]);
    for frame in history {
        let keys: Vec<String> = frame.cells.keys().map(|c| c.to_string()).collect();
        assert_eq!(keys, vec!["[0,0]", "[0,1]", "[1,0]", "[1,1]"]);
        for state in frame.cells.values() {
            assert!(state.boundary.contains_key("Xex"));
            assert_eq!(state.boundary.len(), 1);
            let internal: Vec<&str> = state.internal.keys().map(String::as_str).collect();
            assert_eq!(internal, vec!["X", "Y", "Yex"]);
        }
    }
    assert_eq!(engine.state(), EngineState::Terminal);
}

#[test]
fn mock_dynamics_visible_in_history() {
    let composite = GridComposer::build(&grid(2, 2, 5), &MockNetwork::four_species()).unwrap();
    let mut engine = SimulationEngine::new(composite, EngineConfig::default()).unwrap();
    engine.run_for(2.0).unwrap();

    let history = engine.history();
    let cell = CellId::new(1, 0);
    let x0 = history.frames()[0].get(&cell, Port::Boundary, "Xex").unwrap();
    let x2 = history.frames()[2].get(&cell, Port::Boundary, "Xex").unwrap();
    // The mock adds the step duration to every species, starting from the
    // randomised boundary value fed back each step.
    assert!((x2 - (x0 + 2.0)).abs() < 1e-12);
    assert_eq!(history.frames()[2].get(&cell, Port::Internal, "Y"), Some(3.0));
}

#[test]
fn ten_unit_steps_give_eleven_frames() {
    let composite = GridComposer::build(&grid(3, 3, 1), &MockNetwork::four_species()).unwrap();
    let mut engine = SimulationEngine::new(composite, EngineConfig::default()).unwrap();
    let history = engine.run_for(10.0).unwrap();

    assert_eq!(history.len(), 11);
    let times = history.times();
    assert!(times.windows(2).all(|w| w[1] > w[0]));
    assert_eq!(times.last().copied(), Some(10.0));
    assert_eq!(engine.current_step().0, 10);
}

#[test]
fn history_serializes_to_time_then_cell_keys() {
    let composite = GridComposer::build(&grid(1, 2, 0), &MockNetwork::four_species()).unwrap();
    let mut engine = SimulationEngine::new(composite, EngineConfig::default()).unwrap();
    let history = engine.run_for(1.0).unwrap();

    let json = serde_json::to_value(history).unwrap();
    let frame = &json["1"];
    assert!(frame["[0,0]"]["boundary"]["Xex"].is_number());
    assert!(frame["[0,1]"]["internal"]["X"].is_number());
    assert!(json["0"].is_object());
}

#[test]
fn zero_rows_fail_before_any_work() {
    let err = GridComposer::build(&grid(0, 3, 0), &MockNetwork::four_species()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDimensions { rows: 0, cols: 3 }));
}

#[test]
fn unknown_species_in_store_is_skipped() {
    let mut composite =
        GridComposer::build(&grid(1, 2, 0), &MockNetwork::four_species()).unwrap();
    let cell = CellId::new(0, 1);
    composite
        .initial_state
        .cell_mut(&cell)
        .unwrap()
        .boundary
        .insert("Bogus".into(), 5.0);

    let mut engine = SimulationEngine::new(composite, EngineConfig::default()).unwrap();
    engine.run_for(3.0).unwrap();
    assert_eq!(engine.store().get(&cell, Port::Boundary, "Bogus"), Some(5.0));
    assert_eq!(engine.store().get(&cell, Port::Internal, "X"), Some(4.0));
}

// ── Reproducibility ──────────────────────────────────────────────────

fn noisy_run(seed: u64, config: EngineConfig) -> Vec<u64> {
    let mut cfg = grid(4, 4, seed);
    cfg.cell.parameter_noise = NoiseSpec::new().with("k_auto", 0.05).with("v_supply", 0.05);
    let template = glycolysis_oscillator().unwrap();
    let composite = GridComposer::build(&cfg, &template).unwrap();
    let mut engine = SimulationEngine::new(composite, config).unwrap();
    engine.run_for(5.0).unwrap();
    engine.history().iter().map(snapshot_hash).collect()
}

#[test]
fn same_seed_same_history() {
    assert_eq!(
        noisy_run(42, EngineConfig::default()),
        noisy_run(42, EngineConfig::default())
    );
}

#[test]
fn different_seed_different_history() {
    let a = noisy_run(1, EngineConfig::default());
    let b = noisy_run(2, EngineConfig::default());
    assert_ne!(a.last(), b.last());
}

#[test]
fn threaded_matches_sequential() {
    let sequential = noisy_run(7, EngineConfig::default());
    assert_eq!(sequential, noisy_run(7, threads(2)));
    assert_eq!(sequential, noisy_run(7, threads(5)));
    assert_eq!(sequential, noisy_run(7, threads(64)));
}

#[test]
fn noise_free_cells_evolve_identically() {
    let cfg = GridConfig {
        randomize_boundary: false,
        ..grid(2, 3, 9)
    };
    let template = glycolysis_oscillator().unwrap();
    let composite = GridComposer::build(&cfg, &template).unwrap();
    let mut engine = SimulationEngine::new(composite, EngineConfig::default()).unwrap();
    engine.run_for(4.0).unwrap();

    let first = engine.store().cell(&CellId::new(0, 0)).unwrap().clone();
    for (_, state) in engine.store().iter() {
        assert_eq!(*state, first);
    }
}

// ── Properties ───────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn grid_has_one_process_and_entry_per_cell(rows in 1u32..7, cols in 1u32..7) {
        let composite = GridComposer::build(&grid(rows, cols, 0), &MockNetwork::four_species()).unwrap();
        let expected = (rows * cols) as usize;

        prop_assert_eq!(composite.processes.len(), expected);
        prop_assert_eq!(composite.topology.len(), expected);
        let mut names: Vec<&str> = composite.processes.values().map(|p| p.name()).collect();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(names.len(), expected);
        for cell in composite.processes.keys() {
            prop_assert!(cell.row < rows && cell.col < cols);
            prop_assert!(composite.topology.bindings(cell).is_some());
        }
        prop_assert!(composite
            .topology
            .validate(composite.processes.keys(), &composite.initial_state)
            .is_ok());
    }
}
