//! Heatmap assembly from history snapshots.

use std::fmt::Write as _;

use cellgrid_core::Port;
use cellgrid_store::{History, Snapshot};
use log::debug;

/// One species on one port across the whole lattice at one time.
///
/// `values` is row-major, `rows * cols` long. Cells that do not carry the
/// species hold `0.0`.
#[derive(Clone, Debug, PartialEq)]
pub struct Heatmap {
    /// Time of the snapshot the grid was taken from.
    pub time: f64,
    /// Species name.
    pub species: String,
    /// Which partition the values come from.
    pub port: Port,
    /// Lattice rows.
    pub rows: usize,
    /// Lattice columns.
    pub cols: usize,
    /// Row-major values.
    pub values: Vec<f64>,
}

impl Heatmap {
    /// Value at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.values.get(row * self.cols + col).copied()
    }

    /// Smallest and largest value, for colour scaling.
    pub fn range(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Render as CSV: one line per row, comma-separated columns.
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(self.values.len() * 12);
        for row in self.values.chunks(self.cols.max(1)) {
            for (i, v) in row.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{v}");
            }
            out.push('\n');
        }
        out
    }

    /// File name for this heatmap, `"{prefix}_{port}_{species}_time_{time}.csv"`.
    pub fn file_name(&self, prefix: &str) -> String {
        format!(
            "{prefix}_{}_{}_time_{}.csv",
            self.port, self.species, self.time
        )
    }
}

/// Assemble heatmaps for every requested `(time, species)` pair.
///
/// Times with no matching snapshot are skipped. For each species the
/// internal grid comes before the boundary grid, and a grid is only
/// returned if at least one cell carries the species on that port. Grid
/// dimensions are one more than the largest row and column present in the
/// snapshot.
pub fn extract_heatmaps(history: &History, times: &[f64], species: &[&str]) -> Vec<Heatmap> {
    let mut maps = Vec::new();
    for &time in times {
        let Some(frame) = history.at_time(time) else {
            debug!("no snapshot at t={time}, skipping");
            continue;
        };
        let (rows, cols) = dimensions(frame);
        for &name in species {
            for port in [Port::Internal, Port::Boundary] {
                if let Some(map) = assemble(frame, name, port, rows, cols) {
                    maps.push(map);
                }
            }
        }
    }
    maps
}

fn dimensions(frame: &Snapshot) -> (usize, usize) {
    frame
        .cells
        .keys()
        .fold((0, 0), |(rows, cols), cell| {
            (
                rows.max(cell.row as usize + 1),
                cols.max(cell.col as usize + 1),
            )
        })
}

fn assemble(frame: &Snapshot, species: &str, port: Port, rows: usize, cols: usize) -> Option<Heatmap> {
    let mut values = vec![0.0; rows * cols];
    let mut found = false;
    for (cell, state) in &frame.cells {
        if let Some(v) = state.get(port, species) {
            values[cell.linear_index(cols as u32)] = v;
            found = true;
        }
    }
    found.then(|| Heatmap {
        time: frame.time,
        species: species.to_string(),
        port,
        rows,
        cols,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgrid_core::{CellId, PortState, StepId};
    use cellgrid_store::{EmitFilter, Store};

    fn frame(time: f64, step: u64, rows: u32, cols: u32) -> Snapshot {
        let mut store = Store::new();
        for r in 0..rows {
            for c in 0..cols {
                let mut state = PortState::new();
                state
                    .boundary
                    .insert("Xex".into(), time + (r * 10 + c) as f64);
                if (r + c) % 2 == 0 {
                    state.internal.insert("X".into(), 1.0);
                }
                store.insert_cell(CellId::new(r, c), state);
            }
        }
        Snapshot::capture(&store, StepId(step), time, &EmitFilter::new())
    }

    fn history() -> History {
        let mut h = History::new();
        h.push(frame(0.0, 0, 2, 3)).unwrap();
        h.push(frame(1.0, 1, 2, 3)).unwrap();
        h
    }

    #[test]
    fn grids_follow_cell_coordinates() {
        let maps = extract_heatmaps(&history(), &[1.0], &["Xex"]);
        assert_eq!(maps.len(), 1);
        let m = &maps[0];
        assert_eq!((m.rows, m.cols), (2, 3));
        assert_eq!(m.port, Port::Boundary);
        assert_eq!(m.get(0, 0), Some(1.0));
        assert_eq!(m.get(1, 2), Some(13.0));
        assert_eq!(m.get(2, 0), None);
    }

    #[test]
    fn missing_cells_are_zero() {
        let maps = extract_heatmaps(&history(), &[0.0], &["X"]);
        assert_eq!(maps.len(), 1);
        let m = &maps[0];
        assert_eq!(m.port, Port::Internal);
        assert_eq!(m.values, vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn internal_before_boundary_and_absent_species_skipped() {
        let mut h = History::new();
        let mut store = Store::new();
        let mut state = PortState::new();
        state.boundary.insert("S".into(), 2.0);
        state.internal.insert("S".into(), 3.0);
        store.insert_cell(CellId::new(0, 0), state);
        h.push(Snapshot::capture(&store, StepId(0), 0.0, &EmitFilter::new()))
            .unwrap();

        let maps = extract_heatmaps(&h, &[0.0], &["S", "Nope"]);
        let ports: Vec<Port> = maps.iter().map(|m| m.port).collect();
        assert_eq!(ports, vec![Port::Internal, Port::Boundary]);
    }

    #[test]
    fn unknown_time_is_skipped() {
        let maps = extract_heatmaps(&history(), &[0.5, 1.0], &["Xex"]);
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0].time, 1.0);
    }

    #[test]
    fn csv_has_one_line_per_row() {
        let maps = extract_heatmaps(&history(), &[0.0], &["Xex"]);
        assert_eq!(maps[0].to_csv(), "0,1,2\n10,11,12\n");
        assert_eq!(maps[0].file_name("grid"), "grid_boundary_Xex_time_0.csv");
        assert_eq!(maps[0].range(), (0.0, 12.0));
    }
}
