//! Benchmark profiles for the cellgrid tissue simulator.
//!
//! - [`reference_profile`]: 49x49 glycolysis grid with parameter noise
//! - [`small_profile`]: 9x9 grid, the CLI default

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cellgrid_core::ConfigError;
use cellgrid_engine::{Composite, GridComposer, GridConfig};
use cellgrid_network::glycolysis_oscillator;
use cellgrid_process::NoiseSpec;

/// A 49x49 grid (2401 cells) with 5% noise on the autocatalytic rate.
pub fn reference_profile(seed: u64) -> GridConfig {
    let mut config = GridConfig {
        seed,
        ..GridConfig::new(49, 49)
    };
    config.cell.parameter_noise = NoiseSpec::new().with("k_auto", 0.05);
    config
}

/// A 9x9 grid (81 cells) without noise.
pub fn small_profile(seed: u64) -> GridConfig {
    GridConfig {
        seed,
        ..GridConfig::new(9, 9)
    }
}

/// Compose `config` against the glycolysis preset.
pub fn compose(config: &GridConfig) -> Result<Composite, ConfigError> {
    let template = glycolysis_oscillator()?;
    GridComposer::build(config, &template)
}
