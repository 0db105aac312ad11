//! Port schemas: what each port owns and how updates are applied.

use cellgrid_core::{Port, PortState};
use cellgrid_store::UpdatePolicy;
use indexmap::IndexMap;

/// Declaration of one species on one port.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariableSchema {
    /// Initial store value.
    pub default: f64,
    /// Whether the value is recorded in every history snapshot.
    pub emit: bool,
    /// How a step's output is combined with the stored value.
    pub updater: UpdatePolicy,
}

impl VariableSchema {
    /// An emitted, overwritten variable with the given default.
    pub fn emitted(default: f64) -> Self {
        Self {
            default,
            emit: true,
            updater: UpdatePolicy::Overwrite,
        }
    }
}

/// Schema of both ports of a process.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortSchema {
    /// Variables on the `boundary` port.
    pub boundary: IndexMap<String, VariableSchema>,
    /// Variables on the `internal` port.
    pub internal: IndexMap<String, VariableSchema>,
}

impl PortSchema {
    /// Variables declared on `port`.
    pub fn port(&self, port: Port) -> &IndexMap<String, VariableSchema> {
        match port {
            Port::Boundary => &self.boundary,
            Port::Internal => &self.internal,
        }
    }

    /// The declared defaults as a store branch.
    pub fn defaults(&self) -> PortState {
        let mut state = PortState::new();
        for port in Port::ALL {
            let values = state.port_mut(port);
            for (species, var) in self.port(port) {
                values.insert(species.clone(), var.default);
            }
        }
        state
    }

    /// Variables declared with `emit = false`.
    pub fn hidden(&self) -> impl Iterator<Item = (Port, &str)> + '_ {
        Port::ALL.into_iter().flat_map(move |port| {
            self.port(port)
                .iter()
                .filter(|(_, var)| !var.emit)
                .map(move |(species, _)| (port, species.as_str()))
        })
    }

    /// Update policy of one variable; `Overwrite` if undeclared.
    pub fn updater(&self, port: Port, species: &str) -> UpdatePolicy {
        self.port(port)
            .get(species)
            .map(|var| var.updater)
            .unwrap_or_default()
    }
}
