//! Fluid grid storage and node/grid transfer operators.

mod grids;

pub use grids::FluidGrids;
