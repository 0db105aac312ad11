//! Immutable snapshots of the store and the run [`History`].

use cellgrid_core::{CellId, Port, PortState, StepId};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::store::Store;

/// Species that stay in the store but are left out of snapshots.
///
/// Built from process schemas whose variables are declared with
/// `emit = false`. An empty filter lets every species through.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmitFilter {
    hidden: IndexMap<CellId, Vec<(Port, String)>>,
}

impl EmitFilter {
    /// A filter that hides nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide one species of one cell from emitted snapshots.
    pub fn hide(&mut self, cell: CellId, port: Port, species: impl Into<String>) {
        self.hidden
            .entry(cell)
            .or_default()
            .push((port, species.into()));
    }

    /// Whether the filter hides nothing.
    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty()
    }

    fn strip(&self, cell: &CellId, state: &mut PortState) {
        if let Some(hidden) = self.hidden.get(cell) {
            for (port, species) in hidden {
                state.port_mut(*port).shift_remove(species);
            }
        }
    }
}

/// A deep copy of the store taken right after a commit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    /// Number of increments committed when the snapshot was taken.
    pub step: StepId,
    /// Elapsed simulated time.
    pub time: f64,
    /// Per-cell state, keyed `"[r,c]"` when serialized.
    pub cells: IndexMap<CellId, PortState>,
}

impl Snapshot {
    /// Capture the current store contents.
    pub fn capture(store: &Store, step: StepId, time: f64, filter: &EmitFilter) -> Self {
        let mut cells = store.clone_cells();
        if !filter.is_empty() {
            for (cell, state) in cells.iter_mut() {
                filter.strip(cell, state);
            }
        }
        Self { step, time, cells }
    }

    /// State of one cell at this time.
    pub fn cell(&self, cell: &CellId) -> Option<&PortState> {
        self.cells.get(cell)
    }

    /// Read one species value.
    pub fn get(&self, cell: &CellId, port: Port, species: &str) -> Option<f64> {
        self.cells.get(cell)?.get(port, species)
    }
}

/// Time-ordered sequence of snapshots. Append-only.
///
/// Serializes to the emitted data shape: a map from the time value
/// (rendered as a string) to the per-cell map of the snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct History {
    frames: Vec<Snapshot>,
}

/// Relative distance below which two times are the same time slice.
const TIME_TOLERANCE: f64 = 1e-9;

fn same_time(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIME_TOLERANCE * a.abs().max(b.abs())
}

impl History {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// A history holding just `frame`.
    pub fn starting_with(frame: Snapshot) -> Self {
        Self {
            frames: vec![frame],
        }
    }

    /// Append a snapshot and return a reference to it.
    ///
    /// # Errors
    ///
    /// Hands `frame` back unrecorded if its time does not strictly exceed
    /// the last time already recorded.
    pub fn push(&mut self, frame: Snapshot) -> Result<&Snapshot, Snapshot> {
        if let Some(last) = self.frames.last() {
            if frame.time.is_nan() || frame.time <= last.time {
                return Err(frame);
            }
        }
        self.frames.push(frame);
        Ok(&self.frames[self.frames.len() - 1])
    }

    /// All snapshots, oldest first.
    pub fn frames(&self) -> &[Snapshot] {
        &self.frames
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The most recent snapshot.
    pub fn last(&self) -> Option<&Snapshot> {
        self.frames.last()
    }

    /// Recorded time values, oldest first.
    pub fn times(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.time).collect()
    }

    /// The snapshot recorded at `time`, if any.
    pub fn at_time(&self, time: f64) -> Option<&Snapshot> {
        let idx = self
            .frames
            .partition_point(|f| f.time < time && !same_time(f.time, time));
        self.frames.get(idx).filter(|f| same_time(f.time, time))
    }

    /// Iterate over snapshots, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.frames.iter()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

impl Serialize for History {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.frames.len()))?;
        for frame in &self.frames {
            map.serialize_entry(&frame.time.to_string(), &frame.cells)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        let mut store = Store::new();
        for (r, c) in [(0, 0), (0, 1)] {
            let mut state = PortState::new();
            state.boundary.insert("Xex".into(), 0.1);
            state.internal.insert("X".into(), 1.0);
            store.insert_cell(CellId::new(r, c), state);
        }
        store
    }

    fn frame(step: u64, time: f64) -> Snapshot {
        Snapshot::capture(&store(), StepId(step), time, &EmitFilter::new())
    }

    #[test]
    fn capture_is_independent_of_later_writes() {
        let mut s = store();
        let snap = Snapshot::capture(&s, StepId(0), 0.0, &EmitFilter::new());
        s.cell_mut(&CellId::new(0, 0))
            .unwrap()
            .boundary
            .insert("Xex".into(), 5.0);
        assert_eq!(snap.get(&CellId::new(0, 0), Port::Boundary, "Xex"), Some(0.1));
    }

    #[test]
    fn filter_hides_only_named_species() {
        let mut filter = EmitFilter::new();
        filter.hide(CellId::new(0, 1), Port::Internal, "X");
        let snap = Snapshot::capture(&store(), StepId(0), 0.0, &filter);
        assert_eq!(snap.get(&CellId::new(0, 1), Port::Internal, "X"), None);
        assert_eq!(snap.get(&CellId::new(0, 0), Port::Internal, "X"), Some(1.0));
        assert_eq!(snap.get(&CellId::new(0, 1), Port::Boundary, "Xex"), Some(0.1));
    }

    #[test]
    fn at_time_finds_exact_and_near_matches() {
        let mut h = History::new();
        h.push(frame(0, 0.0)).unwrap();
        h.push(frame(1, 0.1)).unwrap();
        h.push(frame(2, 0.1 + 0.1)).unwrap();
        assert_eq!(h.at_time(0.2).unwrap().step, StepId(2));
        assert_eq!(h.at_time(0.0).unwrap().step, StepId(0));
        assert!(h.at_time(0.15).is_none());
        assert!(h.at_time(3.0).is_none());
        assert_eq!(h.times().len(), 3);
    }

    #[test]
    fn push_rejects_non_increasing_time() {
        let mut h = History::starting_with(frame(0, 1.0));
        let rejected = h.push(frame(1, 1.0)).unwrap_err();
        assert_eq!(rejected.step, StepId(1));
        assert!(h.push(frame(2, 0.5)).is_err());
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn at_time_tolerance_scales_with_magnitude() {
        let mut h = History::new();
        for (i, t) in [0.0, 1e-10, 2e-10, 3e-10].into_iter().enumerate() {
            h.push(frame(i as u64, t)).unwrap();
        }
        assert_eq!(h.at_time(2e-10).unwrap().step, StepId(2));
        assert_eq!(h.at_time(1e-10 + 1e-10).unwrap().step, StepId(2));
        assert!(h.at_time(1.5e-10).is_none());
        assert_eq!(h.at_time(0.0).unwrap().step, StepId(0));
    }

    #[test]
    fn serializes_time_then_cell_then_port() {
        let mut h = History::new();
        h.push(frame(0, 0.0)).unwrap();
        h.push(frame(1, 1.5)).unwrap();
        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["0"]["[0,1]"]["boundary"]["Xex"], 0.1);
        assert_eq!(json["1.5"]["[0,0]"]["internal"]["X"], 1.0);
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
