//! Palisade - immersed boundary simulation of epithelial cell monolayers
//!
//! This library models a two-dimensional "palisade" of epithelial cells, each
//! represented as a closed ring of boundary-tracking nodes in a periodic
//! domain, together with an optional basal lamina element. Membrane
//! elasticity is modelled as a ring of linear springs whose stiffness is
//! normalised to be independent of how finely each cell boundary is sampled.

pub mod config;
pub mod export;
pub mod fluid;
pub mod geometry;
pub mod physics;
pub mod simulation;
pub mod state;

pub use config::Parameters;
pub use fluid::FluidGrids;
pub use geometry::{Element, IbMesh, Node, NodeRegion, PalisadeMeshGenerator};
pub use physics::{ForceError, ImmersedBoundaryForce, MembraneElasticityForce};
pub use simulation::Simulation;
pub use state::{CellPopulation, MonolayerMetrics};
