//! Typed store paths.

use cellgrid_core::{CellId, Port};
use std::fmt;
use std::str::FromStr;

/// Address of one port branch inside the [`Store`](crate::Store).
///
/// The store is two levels deep: the cell namespace, then the port.
/// Because both levels are typed, a path can only ever name a branch
/// that the store layout allows; whether the branch actually exists is
/// checked by [`Topology::validate`](crate::Topology::validate).
///
/// Renders as `"[r,c]_store/boundary"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorePath {
    /// The cell namespace.
    pub cell: CellId,
    /// The branch within the namespace.
    pub port: Port,
}

impl StorePath {
    /// Path of `port` inside `cell`'s namespace.
    pub const fn new(cell: CellId, port: Port) -> Self {
        Self { cell, port }
    }

    /// The two path segments, `("[r,c]_store", "boundary")`.
    pub fn segments(&self) -> (String, &'static str) {
        (self.cell.store_key(), self.port.as_str())
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_store/{}", self.cell, self.port)
    }
}

/// Error returned when a string is not a valid `"[r,c]_store/<port>"` path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseStorePathError {
    input: String,
}

impl fmt::Display for ParseStorePathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid store path '{}', expected \"[row,col]_store/boundary|internal\"",
            self.input
        )
    }
}

impl std::error::Error for ParseStorePathError {}

impl FromStr for StorePath {
    type Err = ParseStorePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseStorePathError {
            input: s.to_string(),
        };
        let (namespace, branch) = s.split_once('/').ok_or_else(err)?;
        let cell: CellId = namespace
            .strip_suffix("_store")
            .ok_or_else(err)?
            .parse()
            .map_err(|_| err())?;
        let port = Port::ALL
            .into_iter()
            .find(|port| port.as_str() == branch)
            .ok_or_else(err)?;
        Ok(Self { cell, port })
    }
}
