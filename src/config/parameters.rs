//! Parameter structures for the monolayer simulation.
//!
//! Lengths are expressed in units of the periodic domain width, which is 1.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level parameters container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameters {
    /// Palisade mesh generation parameters
    pub mesh: MeshParameters,
    /// Membrane elasticity parameters
    pub membrane: MembraneParameters,
    /// Time-stepping and fluid grid parameters
    pub simulation: SimulationParameters,
}

impl Parameters {
    /// Load parameters from JSON files, or use defaults if files don't exist
    pub fn load_or_default() -> Self {
        Self::load_from_dir("data/parameters")
    }

    /// Load parameters from a specific directory
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let mesh = MeshParameters::load_or_default(dir.join("mesh.json"));
        let membrane = MembraneParameters::load_or_default(dir.join("membrane.json"));
        let simulation = SimulationParameters::load_or_default(dir.join("simulation.json"));

        Self {
            mesh,
            membrane,
            simulation,
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            mesh: MeshParameters::default(),
            membrane: MembraneParameters::default(),
            simulation: SimulationParameters::default(),
        }
    }
}

fn load_json_or_default<T, P>(path: P, what: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
    P: AsRef<Path>,
{
    match std::fs::read_to_string(path.as_ref()) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(params) => {
                log::info!("Loaded {} parameters from {:?}", what, path.as_ref());
                params
            }
            Err(e) => {
                log::warn!("Failed to parse {} parameters: {}, using defaults", what, e);
                T::default()
            }
        },
        Err(_) => {
            log::info!("{} parameters file not found, using defaults", what);
            T::default()
        }
    }
}

/// Palisade mesh generation parameters
///
/// Cells are superellipses arranged side by side across the periodic domain,
/// optionally sitting on a flat basal lamina element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshParameters {
    /// Number of epithelial cells in the palisade
    pub num_cells: usize,
    /// Number of boundary nodes per cell
    pub nodes_per_cell: usize,
    /// Superellipse exponent: 1 gives an ellipse, values near 0 give a
    /// rounded rectangle
    pub superellipse_exponent: f64,
    /// Cell height / cell width
    pub aspect_ratio: f64,
    /// Amplitude of random vertical jitter applied to each cell centre,
    /// as a fraction of cell height
    pub random_y_variation: f64,
    /// Whether to generate the basal lamina element
    pub include_lamina: bool,
}

impl MeshParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "mesh")
    }
}

impl Default for MeshParameters {
    fn default() -> Self {
        Self {
            num_cells: 9,
            nodes_per_cell: 128,
            superellipse_exponent: 0.1,
            aspect_ratio: 3.0,
            random_y_variation: 0.0,
            include_lamina: true,
        }
    }
}

/// Membrane elasticity parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembraneParameters {
    /// Spring constant of the boundary springs, normalised against the
    /// population intrinsic spacing
    pub spring_constant: f64,
    /// Rest length as a fraction of the local node spacing
    pub rest_length_multiplier: f64,
    /// Spring-constant multiplier for the basal lamina element
    pub basement_spring_constant_modifier: f64,
    /// Rest-length multiplier for the basal lamina element
    pub basement_rest_length_modifier: f64,
}

impl MembraneParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "membrane")
    }
}

impl Default for MembraneParameters {
    fn default() -> Self {
        Self {
            spring_constant: 1e6,
            rest_length_multiplier: 0.5,
            basement_spring_constant_modifier: 5.0,
            basement_rest_length_modifier: 0.5,
        }
    }
}

/// Time-stepping and fluid grid parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Timestep
    pub dt: f64,
    /// Number of steps to run
    pub num_steps: usize,
    /// Log a sample every this many steps
    pub sampling_multiple: usize,
    /// Number of fluid grid points per side
    pub grid_pts: usize,
    /// Drag coefficient relating grid force density to grid velocity
    pub drag_coefficient: f64,
}

impl SimulationParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "simulation")
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            dt: 0.005,
            num_steps: 100,
            sampling_multiple: 10,
            grid_pts: 64,
            drag_coefficient: 1e8,
        }
    }
}
