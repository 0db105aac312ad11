//! Observation of cellgrid histories.
//!
//! Turns recorded snapshots back into 2D grids: one [`Heatmap`] per
//! (time slice, species, port). Rendering the grids is left to the
//! caller; [`Heatmap::to_csv()`] gives a plain-text form.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod heatmap;

pub use heatmap::{extract_heatmaps, Heatmap};
