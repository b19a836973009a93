//! Palisade mesh generation.
//!
//! Builds a row of superellipse-shaped cells side by side across the periodic
//! unit square, with four corner nodes tagged per cell and an optional flat
//! basal lamina element underneath the row.

use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::mesh::{Element, IbMesh, Node};
use crate::config::MeshParameters;

/// Generates an [`IbMesh`] holding a palisade of epithelial cells
pub struct PalisadeMeshGenerator {
    params: MeshParameters,
    seed: u64,
}

impl PalisadeMeshGenerator {
    pub fn new(params: MeshParameters) -> Self {
        Self { params, seed: 0 }
    }

    /// Seed for the random vertical jitter of cell centres
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the mesh. The lamina, when requested, is element 0.
    pub fn generate(&self) -> IbMesh {
        let p = &self.params;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let slot_width = 1.0 / p.num_cells as f64;
        let half_width = 0.4 * slot_width;
        // Cap the half-height so tall cells still fit in the unit square
        let half_height = (half_width * p.aspect_ratio).min(0.35);
        let centre_y = 0.5;

        // Characteristic spacing of the cell boundaries, used to size the
        // lamina discretisation consistently
        let cell_perimeter = 4.0 * (half_width + half_height);
        let target_spacing = cell_perimeter / p.nodes_per_cell as f64;

        let mut nodes: Vec<Node> = Vec::new();
        let mut elements: Vec<Element> = Vec::new();

        let lamina_index = if p.include_lamina {
            let lamina_top = centre_y - half_height - target_spacing;
            self.build_lamina(&mut nodes, &mut elements, lamina_top, target_spacing);
            Some(0)
        } else {
            None
        };

        for cell in 0..p.num_cells {
            let centre_x = (cell as f64 + 0.5) * slot_width;
            let jitter = p.random_y_variation * half_height * (2.0 * rng.gen::<f64>() - 1.0);
            let centre = DVec2::new(centre_x, centre_y + jitter);

            self.build_cell(&mut nodes, &mut elements, centre, half_width, half_height);
        }

        log::debug!(
            "Generated palisade mesh: {} elements, {} nodes, lamina: {}",
            elements.len(),
            nodes.len(),
            lamina_index.is_some()
        );

        IbMesh::new(nodes, elements, lamina_index)
    }

    /// One superellipse cell ring, sampled anti-clockwise starting from the
    /// right lateral midpoint
    fn build_cell(
        &self,
        nodes: &mut Vec<Node>,
        elements: &mut Vec<Element>,
        centre: DVec2,
        half_width: f64,
        half_height: f64,
    ) {
        let n = self.params.nodes_per_cell;
        let e = self.params.superellipse_exponent;
        let first_index = nodes.len();

        let mut ring = Vec::with_capacity(n);
        for k in 0..n {
            let t = 2.0 * std::f64::consts::PI * k as f64 / n as f64;
            let (s, c) = t.sin_cos();
            let x = centre.x + half_width * c.signum() * c.abs().powf(e);
            let y = centre.y + half_height * s.signum() * s.abs().powf(e);

            let global = nodes.len();
            nodes.push(Node::new(global, DVec2::new(x.rem_euclid(1.0), y.rem_euclid(1.0))));
            ring.push(global);
        }

        // Corner nodes sit at the superellipse shoulders (t = pi/4, 3pi/4,
        // 5pi/4, 7pi/4), stored apical-left, apical-right, basal-right,
        // basal-left
        let shoulder = |eighths: usize| first_index + (eighths * n) / 8;
        let corners = vec![shoulder(3), shoulder(1), shoulder(7), shoulder(5)];

        let mut element = Element::new(elements.len(), ring);
        element.set_corner_nodes(corners);
        elements.push(element);
    }

    /// Flat closed loop spanning the full domain width: bottom row left to
    /// right, top row right to left, anti-clockwise overall
    fn build_lamina(
        &self,
        nodes: &mut Vec<Node>,
        elements: &mut Vec<Element>,
        top_y: f64,
        target_spacing: f64,
    ) {
        let n_half = ((1.0 / target_spacing).round() as usize).max(4);
        let thickness = 2.0 * target_spacing;
        let bottom_y = top_y - thickness;
        let first_index = nodes.len();

        let mut ring = Vec::with_capacity(2 * n_half);
        for k in 0..n_half {
            let x = k as f64 / n_half as f64;
            let global = nodes.len();
            nodes.push(Node::new(global, DVec2::new(x, bottom_y)));
            ring.push(global);
        }
        for k in 0..n_half {
            let x = 1.0 - (k as f64 + 0.5) / n_half as f64;
            let global = nodes.len();
            nodes.push(Node::new(global, DVec2::new(x.rem_euclid(1.0), top_y)));
            ring.push(global);
        }

        // The lamina carries four corner tags purely so every element reports
        // the same corner count; its nodes are all tagged basal regardless
        let corners = vec![
            first_index + 2 * n_half - 1, // apical-left (top row end)
            first_index + n_half,         // apical-right (top row start)
            first_index + n_half - 1,     // basal-right
            first_index,                  // basal-left
        ];

        let mut element = Element::new(elements.len(), ring);
        element.set_corner_nodes(corners);
        elements.push(element);
    }
}
