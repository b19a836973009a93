//! Preallocated fluid grids and the node/grid transfer operators.
//!
//! The grids are large and reused every timestep, so they are allocated once
//! up front rather than rebuilt as needed. Forces are spread from boundary
//! nodes onto the force grid, and grid velocities are interpolated back to
//! the nodes, both with the four-point cosine delta kernel
//! phi(r) = (1 + cos(pi r / 2)) / 4 on |r| < 2 (Peskin, Acta Numerica 2002).

use glam::DVec2;

use crate::geometry::IbMesh;

/// Half-width of the delta kernel support, in grid cells
const KERNEL_SUPPORT: i64 = 2;

/// Storage for the per-step fluid grids: a 2 x N x N force grid and a
/// 2 x N x N velocity grid, one layer per coordinate direction
pub struct FluidGrids {
    num_grid_pts: usize,
    force_grid: Vec<f64>,
    velocity_grid: Vec<f64>,
}

impl FluidGrids {
    pub fn new(num_grid_pts: usize) -> Self {
        let layer = num_grid_pts * num_grid_pts;
        Self {
            num_grid_pts,
            force_grid: vec![0.0; 2 * layer],
            velocity_grid: vec![0.0; 2 * layer],
        }
    }

    pub fn num_grid_pts(&self) -> usize {
        self.num_grid_pts
    }

    /// Grid spacing
    pub fn mesh_width(&self) -> f64 {
        1.0 / self.num_grid_pts as f64
    }

    fn index(&self, dim: usize, x: usize, y: usize) -> usize {
        (dim * self.num_grid_pts + x) * self.num_grid_pts + y
    }

    pub fn force(&self, dim: usize, x: usize, y: usize) -> f64 {
        self.force_grid[self.index(dim, x, y)]
    }

    pub fn velocity(&self, dim: usize, x: usize, y: usize) -> f64 {
        self.velocity_grid[self.index(dim, x, y)]
    }

    /// Zero both grids ready for the next step
    pub fn clear(&mut self) {
        self.force_grid.fill(0.0);
        self.velocity_grid.fill(0.0);
    }

    /// Cosine delta kernel in grid units
    fn delta_1d(r: f64) -> f64 {
        if r.abs() < KERNEL_SUPPORT as f64 {
            0.25 * (1.0 + (std::f64::consts::FRAC_PI_2 * r).cos())
        } else {
            0.0
        }
    }

    /// Visit the kernel support around a point: calls f(gx, gy, weight) for
    /// each grid point with the product of the 1-d kernel weights
    fn for_kernel_support<F: FnMut(usize, usize, f64)>(&self, point: DVec2, mut f: F) {
        let n = self.num_grid_pts as i64;
        let h = self.mesh_width();
        let gx0 = (point.x / h).floor() as i64;
        let gy0 = (point.y / h).floor() as i64;

        for dx in (1 - KERNEL_SUPPORT)..=KERNEL_SUPPORT {
            let gx = gx0 + dx;
            let wx = Self::delta_1d(point.x / h - gx as f64);
            if wx == 0.0 {
                continue;
            }
            for dy in (1 - KERNEL_SUPPORT)..=KERNEL_SUPPORT {
                let gy = gy0 + dy;
                let wy = Self::delta_1d(point.y / h - gy as f64);
                if wy == 0.0 {
                    continue;
                }
                f(gx.rem_euclid(n) as usize, gy.rem_euclid(n) as usize, wx * wy);
            }
        }
    }

    /// Spread each node's accumulated force onto the force grid as a force
    /// density (contribution F * phi * phi / h^2)
    pub fn spread_applied_forces(&mut self, mesh: &IbMesh) {
        let n = self.num_grid_pts;
        let inv_cell_area = (n * n) as f64;

        // Collect per-node writes first: for_kernel_support borrows self
        let mut writes: Vec<(usize, f64)> = Vec::new();
        for node in mesh.nodes() {
            let force = node.applied_force();
            if force == DVec2::ZERO {
                continue;
            }
            self.for_kernel_support(node.location(), |gx, gy, weight| {
                let density = weight * inv_cell_area;
                writes.push((gx * n + gy, force.x * density));
                writes.push(((n + gx) * n + gy, force.y * density));
            });
        }

        for (index, value) in writes {
            self.force_grid[index] += value;
        }
    }

    /// Local drag closure standing in for the fluid solve: grid velocity is
    /// force density divided by the drag coefficient
    pub fn compute_drag_velocities(&mut self, drag_coefficient: f64) {
        for (u, f) in self.velocity_grid.iter_mut().zip(self.force_grid.iter()) {
            *u = f / drag_coefficient;
        }
    }

    /// Interpolate the grid velocity at a boundary point
    /// (sum of u * phi * phi over the kernel support)
    pub fn interpolate_velocity(&self, point: DVec2) -> DVec2 {
        let n = self.num_grid_pts;
        let mut velocity = DVec2::ZERO;

        self.for_kernel_support(point, |gx, gy, weight| {
            velocity.x += self.velocity_grid[gx * n + gy] * weight;
            velocity.y += self.velocity_grid[(n + gx) * n + gy] * weight;
        });

        velocity
    }
}
