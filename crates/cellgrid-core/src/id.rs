//! Strongly-typed identifiers: [`CellId`], [`Port`], and [`StepId`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lattice coordinate of a cell, `(row, col)`, 0-indexed.
///
/// The canonical string form is `"[r,c]"`. It is used both as the process
/// key and, suffixed with `_store`, as the store namespace of the cell.
/// Ordering is row-major, so sorting a set of ids yields lattice order.
///
/// # Examples
///
/// ```
/// use cellgrid_core::CellId;
///
/// let id = CellId::new(2, 7);
/// assert_eq!(id.to_string(), "[2,7]");
/// assert_eq!("[2,7]".parse::<CellId>().unwrap(), id);
/// assert_eq!(id.store_key(), "[2,7]_store");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CellId {
    /// Row index.
    pub row: u32,
    /// Column index.
    pub col: u32,
}

impl CellId {
    /// Create a cell id from its lattice coordinate.
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Name of the store namespace owned by this cell.
    pub fn store_key(&self) -> String {
        format!("{self}_store")
    }

    /// Row-major linear index of this cell in a lattice with `cols` columns.
    pub fn linear_index(&self, cols: u32) -> usize {
        self.row as usize * cols as usize + self.col as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.row, self.col)
    }
}

/// Error returned when a string is not a valid `"[r,c]"` cell id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseCellIdError {
    input: String,
}

impl fmt::Display for ParseCellIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cell id '{}', expected \"[row,col]\"", self.input)
    }
}

impl std::error::Error for ParseCellIdError {}

impl FromStr for CellId {
    type Err = ParseCellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCellIdError {
            input: s.to_string(),
        };
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(err)?;
        let (row, col) = inner.split_once(',').ok_or_else(err)?;
        Ok(Self {
            row: row.trim().parse().map_err(|_| err())?,
            col: col.trim().parse().map_err(|_| err())?,
        })
    }
}

impl From<CellId> for String {
    fn from(id: CellId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for CellId {
    type Error = ParseCellIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A logical port of a cell process.
///
/// Every cell exposes exactly two ports: the `boundary` species that are
/// exchangeable with the tissue, and the `internal` species private to
/// the cell's own network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Port {
    /// Externally observable/settable species.
    Boundary,
    /// Species private to the cell.
    Internal,
}

impl Port {
    /// Both ports, in canonical order.
    pub const ALL: [Port; 2] = [Port::Boundary, Port::Internal];

    /// The port name as used in store paths and emitted data.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boundary => "boundary",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonically increasing count of committed global increments.
///
/// `StepId(0)` is the initial state; each committed increment adds one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepId(pub u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
