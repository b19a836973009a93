//! Membrane elasticity of the immersed boundaries.
//!
//! Every element boundary is a closed ring of linear springs between cyclic
//! neighbour nodes. The discretised spring constant is normalised by
//! (intrinsic spacing / local node spacing)^2 so that the user-facing
//! stiffness is independent of how finely a boundary is sampled: one factor
//! keeps the elastic energy of a given deformation constant under refinement,
//! the other accounts for the spacing factor used in discretising the force
//! relation.
//!
//! When every element carries four tagged corner nodes, binding additionally
//! classifies each node as basal, apical or lateral and freezes the initial
//! apical and basal widths of each cell as element attributes. These widths
//! feed an optional corner-to-corner surface tension which is disabled by
//! default.

use std::io;

use glam::DVec2;

use super::{ForceError, ImmersedBoundaryForce};
use crate::config::MembraneParameters;
use crate::geometry::{IbMesh, NodeRegion};
use crate::state::CellPopulation;

/// One-time setup recorded at bind time
#[derive(Debug, Clone, Copy)]
struct BoundState {
    /// True when every element carries four corner tags
    elements_have_corners: bool,
    /// Position in each element's attribute list where the frozen apical and
    /// basal lengths were appended
    attribute_offset: usize,
}

/// Hookean spring-network force over each element's boundary polygon
pub struct MembraneElasticityForce {
    spring_constant: f64,
    rest_length_multiplier: f64,
    basement_spring_constant_modifier: f64,
    basement_rest_length_modifier: f64,
    /// Apply the apical/basal corner-to-corner springs. Off by default; the
    /// tagging and baseline lengths are computed regardless so the feature
    /// can be toggled without a rebind.
    surface_tension_enabled: bool,
    bound: Option<BoundState>,
}

impl Default for MembraneElasticityForce {
    fn default() -> Self {
        Self {
            spring_constant: 1e6,
            rest_length_multiplier: 0.5,
            basement_spring_constant_modifier: 5.0,
            basement_rest_length_modifier: 0.5,
            surface_tension_enabled: false,
            bound: None,
        }
    }
}

impl MembraneElasticityForce {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parameters(params: &MembraneParameters) -> Self {
        Self {
            spring_constant: params.spring_constant,
            rest_length_multiplier: params.rest_length_multiplier,
            basement_spring_constant_modifier: params.basement_spring_constant_modifier,
            basement_rest_length_modifier: params.basement_rest_length_modifier,
            ..Self::default()
        }
    }

    pub fn spring_constant(&self) -> f64 {
        self.spring_constant
    }

    pub fn set_spring_constant(&mut self, spring_constant: f64) {
        self.spring_constant = spring_constant;
    }

    pub fn rest_length_multiplier(&self) -> f64 {
        self.rest_length_multiplier
    }

    pub fn set_rest_length_multiplier(&mut self, multiplier: f64) {
        self.rest_length_multiplier = multiplier;
    }

    pub fn set_surface_tension_enabled(&mut self, enabled: bool) {
        self.surface_tension_enabled = enabled;
    }

    /// Frozen apical width of an element, recorded at bind time
    pub fn apical_length_of_element(&self, elem_index: usize, mesh: &IbMesh) -> Result<f64, ForceError> {
        self.baseline_length(elem_index, mesh, 0)
    }

    /// Frozen basal width of an element, recorded at bind time
    pub fn basal_length_of_element(&self, elem_index: usize, mesh: &IbMesh) -> Result<f64, ForceError> {
        self.baseline_length(elem_index, mesh, 1)
    }

    fn baseline_length(
        &self,
        elem_index: usize,
        mesh: &IbMesh,
        which: usize,
    ) -> Result<f64, ForceError> {
        let bound = self.bound.ok_or(ForceError::NotBound)?;
        let attributes = mesh.element(elem_index).attributes();

        attributes
            .get(bound.attribute_offset + which)
            .copied()
            .ok_or(ForceError::MissingBaselineLength {
                element: elem_index,
            })
    }

    /// Classify every node of every element as basal, apical or lateral.
    ///
    /// Nodes are ordered anti-clockwise, so walking from local index 0 the
    /// regions are: lateral up to the apical-right corner, apical through
    /// the apical-left corner, lateral down to the basal-left corner, basal
    /// through the basal-right corner, then lateral back to the start. The
    /// lamina, modelling the supporting tissue layer, is all basal.
    fn tag_node_regions(mesh: &mut IbMesh) -> Result<(), ForceError> {
        for elem_index in 0..mesh.num_elements() {
            let num_nodes = mesh.element(elem_index).num_nodes();

            if Some(elem_index) == mesh.lamina_index() {
                for local in 0..num_nodes {
                    let node_index = mesh.element(elem_index).node_index(local);
                    mesh.node_mut(node_index).set_region(NodeRegion::Basal);
                }
                continue;
            }

            let elem = mesh.element(elem_index);
            let corners = elem.corner_nodes();
            let local_of = |global: usize| {
                elem.node_local_index(global)
                    .ok_or(ForceError::CornerNotInElement {
                        element: elem_index,
                    })
            };

            // Region boundaries in the cyclic order; corners are stored
            // apical-left, apical-right, basal-right, basal-left
            let change_1 = local_of(corners[1])?;
            let change_2 = local_of(corners[0])? + 1;
            let change_3 = local_of(corners[3])?;
            let change_4 = local_of(corners[2])? + 1;

            let region_of = |local: usize| {
                if local < change_1 {
                    NodeRegion::Lateral
                } else if local < change_2 {
                    NodeRegion::Apical
                } else if local < change_3 {
                    NodeRegion::Lateral
                } else if local < change_4 {
                    NodeRegion::Basal
                } else {
                    NodeRegion::Lateral
                }
            };

            for local in 0..num_nodes {
                let node_index = mesh.element(elem_index).node_index(local);
                let region = region_of(local);
                mesh.node_mut(node_index).set_region(region);
            }
        }

        Ok(())
    }

    /// Freeze the starting apical and basal widths of each element as two
    /// appended attributes. Elements start roughly rectangular, so both are
    /// the element width: the horizontal distance from node 0 to the node
    /// half way around the ring. The lamina gets two zero attributes purely
    /// to keep the attribute count uniform.
    fn tag_apical_and_basal_lengths(mesh: &mut IbMesh) {
        for elem_index in 0..mesh.num_elements() {
            if Some(elem_index) == mesh.lamina_index() {
                let elem = mesh.element_mut(elem_index);
                elem.add_attribute(0.0);
                elem.add_attribute(0.0);
                continue;
            }

            let elem = mesh.element(elem_index);
            let half_way = elem.num_nodes() / 2;
            let a = mesh.node(elem.node_index(0)).location();
            let b = mesh.node(elem.node_index(half_way)).location();
            let width = mesh.vector_from_a_to_b(a, b).x.abs();

            let elem = mesh.element_mut(elem_index);
            elem.add_attribute(width);
            elem.add_attribute(width);
        }
    }
}

impl ImmersedBoundaryForce for MembraneElasticityForce {
    fn bind(&mut self, population: &mut CellPopulation) -> Result<(), ForceError> {
        if self.bound.is_some() {
            return Err(ForceError::AlreadyBound);
        }

        let mesh = population.mesh_mut();

        let num_corners = match mesh.elements().first() {
            Some(first) => first.corner_nodes().len(),
            None => 0,
        };
        for elem in mesh.elements().iter().skip(1) {
            if elem.corner_nodes().len() != num_corners {
                return Err(ForceError::InconsistentCornerCount {
                    element: elem.index(),
                    expected: num_corners,
                    found: elem.corner_nodes().len(),
                });
            }
        }

        let elements_have_corners = num_corners == 4;
        let mut attribute_offset = 0;

        if elements_have_corners {
            attribute_offset = mesh.element(0).num_attributes();
            for elem in mesh.elements().iter().skip(1) {
                if elem.num_attributes() != attribute_offset {
                    return Err(ForceError::InconsistentAttributeCount {
                        element: elem.index(),
                        expected: attribute_offset,
                        found: elem.num_attributes(),
                    });
                }
            }

            Self::tag_node_regions(mesh)?;
            Self::tag_apical_and_basal_lengths(mesh);
        }

        self.bound = Some(BoundState {
            elements_have_corners,
            attribute_offset,
        });

        log::debug!(
            "Membrane elasticity bound: {} elements, corners tagged: {}",
            population.mesh().num_elements(),
            elements_have_corners
        );

        Ok(())
    }

    fn compute_forces(&self, population: &CellPopulation) -> Result<Vec<DVec2>, ForceError> {
        let bound = self.bound.ok_or(ForceError::NotBound)?;
        let mesh = population.mesh();

        let intrinsic_spacing_squared =
            population.intrinsic_spacing() * population.intrinsic_spacing();

        let mut deltas = vec![DVec2::ZERO; mesh.num_nodes()];

        for elem in mesh.elements() {
            let elem_index = elem.index();
            let num_nodes = elem.num_nodes();
            let is_lamina = Some(elem_index) == mesh.lamina_index();

            // Rest length and spring constant derive from this element's own
            // node spacing; normalising by the intrinsic spacing keeps the
            // user-defined stiffness independent of the discretisation
            let spacing_ratio = mesh.average_node_spacing_of_element(elem_index);

            let mut spring_constant =
                self.spring_constant * intrinsic_spacing_squared / (spacing_ratio * spacing_ratio);
            let mut rest_length = self.rest_length_multiplier * spacing_ratio;

            // The basal lamina is stiffer and shorter than the cell membranes
            if is_lamina {
                spring_constant *= self.basement_spring_constant_modifier;
                rest_length *= self.basement_rest_length_modifier;
            }

            // Force exerted on node i+1 by the spring from node i
            let mut elastic_force_to_next_node = vec![DVec2::ZERO; num_nodes];
            for node_idx in 0..num_nodes {
                let next_idx = (node_idx + 1) % num_nodes;
                let a = mesh.node(elem.node_index(node_idx)).location();
                let b = mesh.node(elem.node_index(next_idx)).location();

                let displacement = mesh.vector_from_a_to_b(a, b);
                let normed_dist = displacement.length();
                if normed_dist == 0.0 {
                    return Err(ForceError::DegenerateSegment {
                        element: elem_index,
                        node: node_idx,
                        next: next_idx,
                    });
                }

                elastic_force_to_next_node[node_idx] =
                    displacement * (spring_constant * (normed_dist - rest_length) / normed_dist);
            }

            // Each node feels the two springs adjacent to it
            for node_idx in 0..num_nodes {
                let prev_idx = (node_idx + num_nodes - 1) % num_nodes;
                deltas[elem.node_index(node_idx)] +=
                    elastic_force_to_next_node[node_idx] - elastic_force_to_next_node[prev_idx];
            }

            // Optional apical/basal surface tension between corner pairs,
            // pulling each pair back towards its frozen baseline width
            if self.surface_tension_enabled && bound.elements_have_corners && !is_lamina {
                let corners = elem.corner_nodes();
                let apical_len = self.apical_length_of_element(elem_index, mesh)?;
                let basal_len = self.basal_length_of_element(elem_index, mesh)?;

                for (from, to, baseline) in [
                    (corners[0], corners[1], apical_len),
                    (corners[3], corners[2], basal_len),
                ] {
                    let a = mesh.node(from).location();
                    let b = mesh.node(to).location();
                    let displacement = mesh.vector_from_a_to_b(a, b);
                    let normed_dist = displacement.length();
                    if normed_dist == 0.0 {
                        continue;
                    }

                    let force = displacement
                        * (self.spring_constant * (normed_dist - baseline) / normed_dist);
                    deltas[from] += force;
                    deltas[to] -= force;
                }
            }
        }

        Ok(deltas)
    }

    fn output_parameters(&self, writer: &mut dyn io::Write) -> io::Result<()> {
        writeln!(writer, "\tSpringConstant: {}", self.spring_constant)?;
        writeln!(writer, "\tRestLengthMultiplier: {}", self.rest_length_multiplier)?;
        writeln!(
            writer,
            "\tBasementSpringConstantModifier: {}",
            self.basement_spring_constant_modifier
        )?;
        writeln!(
            writer,
            "\tBasementRestLengthModifier: {}",
            self.basement_rest_length_modifier
        )?;
        writeln!(
            writer,
            "\tSurfaceTensionEnabled: {}",
            self.surface_tension_enabled
        )?;
        Ok(())
    }
}
