//! Export functionality for simulation results.

mod csv_export;

pub use csv_export::{CsvExporter, SweepRecord};
