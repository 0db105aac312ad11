//! The [`Process`] trait.

use cellgrid_core::{PortState, ProcessError};

use crate::schema::PortSchema;

/// A steppable unit owned by the engine.
///
/// # Contract
///
/// - `describe_ports()` is called once at engine construction; the schema
///   fixes which species live on which port.
/// - `step()` receives the current values of its bound store branches and
///   returns the new values. It must not observe any other process's
///   output from the same increment; the engine guarantees this by
///   committing all updates only after every process has stepped.
/// - `time_step()` is the increment the process expects; the engine
///   requires it to be uniform across a composite.
///
/// # Object safety
///
/// This trait is object-safe; the engine stores processes as
/// `Box<dyn Process>`. It is `Send` so the compute phase can run on
/// worker threads.
pub trait Process: Send {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Species owned by each port, with defaults and update policy.
    fn describe_ports(&self) -> PortSchema;

    /// The increment this process expects to be stepped by.
    fn time_step(&self) -> f64;

    /// Advance by `duration` starting from `inputs` and return the update.
    fn step(&mut self, duration: f64, inputs: &PortState) -> Result<PortState, ProcessError>;
}
