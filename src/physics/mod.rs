//! Force laws acting on the immersed boundaries.
//!
//! Each force law follows an explicit two-phase lifecycle: it is bound to a
//! population exactly once (performing any one-time mesh tagging), and is
//! then evaluated once per timestep. Evaluation returns per-node force
//! deltas; the simulation loop owns the reduction into the nodes' shared
//! force accumulators, so independent force laws never write to the mesh
//! concurrently with each other.

mod elasticity;

pub use elasticity::MembraneElasticityForce;

use std::io;

use glam::DVec2;
use thiserror::Error;

use crate::state::CellPopulation;

/// Fatal force configuration and evaluation errors
#[derive(Debug, Error)]
pub enum ForceError {
    #[error(
        "all elements must have the same number of corners to use this force \
         (element {element} has {found}, expected {expected})"
    )]
    InconsistentCornerCount {
        element: usize,
        expected: usize,
        found: usize,
    },
    #[error(
        "all elements must have the same number of attributes to use this force \
         (element {element} has {found}, expected {expected})"
    )]
    InconsistentAttributeCount {
        element: usize,
        expected: usize,
        found: usize,
    },
    #[error("corner node is not part of element {element}")]
    CornerNotInElement { element: usize },
    #[error("force has not been bound to a population")]
    NotBound,
    #[error("force is already bound to a population")]
    AlreadyBound,
    #[error("zero-length segment between nodes {node} and {next} of element {element}")]
    DegenerateSegment {
        element: usize,
        node: usize,
        next: usize,
    },
    #[error("element {element} has no stored apical/basal baseline length")]
    MissingBaselineLength { element: usize },
}

/// A force law contributing to the immersed boundary update
pub trait ImmersedBoundaryForce {
    /// One-time setup against the population this force will act on. May
    /// validate the mesh configuration and tag nodes or element attributes.
    /// Must be called exactly once, before any call to
    /// [`compute_forces`](Self::compute_forces).
    fn bind(&mut self, population: &mut CellPopulation) -> Result<(), ForceError>;

    /// Per-timestep evaluation: returns one force delta per mesh node.
    /// Pure with respect to the mesh; deltas are summed into the node
    /// accumulators by the caller.
    fn compute_forces(&self, population: &CellPopulation) -> Result<Vec<DVec2>, ForceError>;

    /// Emit the force parameters as indented key-value text lines
    fn output_parameters(&self, writer: &mut dyn io::Write) -> io::Result<()>;
}
