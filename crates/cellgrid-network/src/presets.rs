//! Named, ready-to-use models.

use cellgrid_core::NetworkError;

use crate::mass_action::MassActionModel;

/// Names accepted by [`preset()`].
pub const PRESETS: &[&str] = &["glycolysis"];

/// Look up a preset model by name.
///
/// # Errors
///
/// [`NetworkError::LoadFailed`] if `name` is not in [`PRESETS`].
pub fn preset(name: &str) -> Result<MassActionModel, NetworkError> {
    match name {
        "glycolysis" => glycolysis_oscillator(),
        other => Err(NetworkError::LoadFailed {
            reason: format!(
                "unknown model '{other}' (available: {})",
                PRESETS.join(", ")
            ),
        }),
    }
}

/// Autocatalytic glycolytic oscillator with external substrate and
/// product pools.
///
/// Species, in order: `Xex` (external substrate), `X` (substrate),
/// `Y` (autocatalytic product), `Yex` (external product).
///
/// | reaction        | rate constant |
/// |-----------------|---------------|
/// | `∅ -> Xex`      | `v_supply`    |
/// | `Xex -> X`      | `k_in`        |
/// | `X -> Y`        | `k_basal`     |
/// | `X + 2Y -> 3Y`  | `k_auto`      |
/// | `Y -> Yex`      | `k_out`       |
/// | `Yex -> ∅`      | `k_drain`     |
///
/// The `X`/`Y` core is the Sel'kov scheme; with the defaults below it sits
/// on a limit cycle once `Xex` has relaxed towards `v_supply / k_in`.
pub fn glycolysis_oscillator() -> Result<MassActionModel, NetworkError> {
    MassActionModel::builder("glycolysis")
        .species("Xex", 0.5)
        .species("X", 1.0)
        .species("Y", 0.5)
        .species("Yex", 0.0)
        .parameter("v_supply", 0.6)
        .parameter("k_in", 1.0)
        .parameter("k_basal", 0.08)
        .parameter("k_auto", 1.0)
        .parameter("k_out", 1.0)
        .parameter("k_drain", 0.1)
        .reaction(&[], &[("Xex", 1)], "v_supply")
        .reaction(&[("Xex", 1)], &[("X", 1)], "k_in")
        .reaction(&[("X", 1)], &[("Y", 1)], "k_basal")
        .reaction(&[("X", 1), ("Y", 2)], &[("Y", 3)], "k_auto")
        .reaction(&[("Y", 1)], &[("Yex", 1)], "k_out")
        .reaction(&[("Yex", 1)], &[], "k_drain")
        .build()
}
