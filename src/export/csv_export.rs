//! CSV export of parameter-sweep summary statistics.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

/// One row of sweep output: the swept parameter plus the monolayer summary
/// statistics at the end of the run
#[derive(Debug, Clone, Serialize)]
pub struct SweepRecord {
    /// Simulation identifier (also the RNG seed)
    pub simulation_id: u64,
    /// Membrane spring constant used for this run
    pub spring_constant: f64,
    /// Tortuosity of the cell centroid path
    pub tortuosity: f64,
    /// Mean basal lamina height, if a lamina was present
    pub lamina_height: Option<f64>,
    /// Number of steps run
    pub num_steps: u64,
    /// Final simulation time
    pub end_time: f64,
}

/// CSV writer for sweep records
pub struct CsvExporter {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl CsvExporter {
    /// Create an exporter writing into the given directory, with a
    /// timestamped filename. Creates the directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("results_{}.csv", timestamp));

        let file = File::create(&path)?;
        let writer = csv::Writer::from_writer(file);

        log::info!("CSV export started: {}", path.display());

        Ok(Self { writer, path })
    }

    /// Create an exporter writing to an exact file path
    pub fn at_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        let writer = csv::Writer::from_writer(file);
        Ok(Self { writer, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&mut self, record: &SweepRecord) -> Result<()> {
        self.writer.serialize(record)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_record() {
        let dir = std::env::temp_dir().join("palisade_csv_test");
        let path = dir.join("results.csv");

        {
            let mut exporter = CsvExporter::at_path(&path).unwrap();
            exporter
                .record(&SweepRecord {
                    simulation_id: 3,
                    spring_constant: 2.5e6,
                    tortuosity: 1.07,
                    lamina_height: Some(0.21),
                    num_steps: 500,
                    end_time: 2.5,
                })
                .unwrap();
            exporter.flush().unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("simulation_id"));
        assert!(contents.contains("1.07"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
