//! Mesh data structures and palisade mesh generation.

mod mesh;
mod palisade;

pub use mesh::{Element, IbMesh, Node, NodeRegion};
pub use palisade::PalisadeMeshGenerator;
