//! Immersed boundary mesh on the periodic unit square.
//!
//! Cell boundaries are closed rings of nodes. All point-to-point geometry
//! goes through [`IbMesh::vector_from_a_to_b`], which applies the minimum
//! image convention so that elements may straddle the domain seam.

use glam::DVec2;

/// Classification of a boundary node within its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRegion {
    /// Facing the basal lamina
    Basal,
    /// Facing the free surface
    Apical,
    /// Cell-cell interface
    Lateral,
}

/// A boundary-tracking node
#[derive(Debug, Clone)]
pub struct Node {
    /// Global node index
    index: usize,
    /// Position in the periodic unit square
    position: DVec2,
    /// Accumulated force applied this timestep. Contributions are additive:
    /// several force laws may write to the same node within one step.
    applied_force: DVec2,
    /// Region tag, set once during force setup when corners are present
    region: Option<NodeRegion>,
}

impl Node {
    pub fn new(index: usize, position: DVec2) -> Self {
        Self {
            index,
            position,
            applied_force: DVec2::ZERO,
            region: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn location(&self) -> DVec2 {
        self.position
    }

    pub fn set_location(&mut self, position: DVec2) {
        self.position = position;
    }

    /// Add a force contribution. Never overwrites existing contributions.
    pub fn add_applied_force_contribution(&mut self, force: DVec2) {
        self.applied_force += force;
    }

    pub fn applied_force(&self) -> DVec2 {
        self.applied_force
    }

    pub fn clear_applied_force(&mut self) {
        self.applied_force = DVec2::ZERO;
    }

    pub fn set_region(&mut self, region: NodeRegion) {
        self.region = Some(region);
    }

    pub fn region(&self) -> Option<NodeRegion> {
        self.region
    }
}

/// A closed polygonal boundary: an ordered cyclic ring of node indices, plus
/// a growing list of scalar attributes and an optional set of four tagged
/// corner nodes.
#[derive(Debug, Clone)]
pub struct Element {
    index: usize,
    /// Global node indices, ordered anti-clockwise
    node_indices: Vec<usize>,
    /// Corner node global indices, ordered apical-left, apical-right,
    /// basal-right, basal-left. Empty when no corners are tagged.
    corner_nodes: Vec<usize>,
    /// Append-only scalar attributes
    attributes: Vec<f64>,
}

impl Element {
    pub fn new(index: usize, node_indices: Vec<usize>) -> Self {
        Self {
            index,
            node_indices,
            corner_nodes: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn num_nodes(&self) -> usize {
        self.node_indices.len()
    }

    /// Global index of the node at the given local (cyclic) position
    pub fn node_index(&self, local_index: usize) -> usize {
        self.node_indices[local_index]
    }

    pub fn node_indices(&self) -> &[usize] {
        &self.node_indices
    }

    /// Local position of a node within the cyclic order, by global index
    pub fn node_local_index(&self, global_index: usize) -> Option<usize> {
        self.node_indices.iter().position(|&i| i == global_index)
    }

    pub fn set_corner_nodes(&mut self, corners: Vec<usize>) {
        self.corner_nodes = corners;
    }

    pub fn corner_nodes(&self) -> &[usize] {
        &self.corner_nodes
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn add_attribute(&mut self, value: f64) {
        self.attributes.push(value);
    }

    pub fn attributes(&self) -> &[f64] {
        &self.attributes
    }
}

/// Immersed boundary mesh: nodes and elements on the periodic unit square
#[derive(Debug, Clone)]
pub struct IbMesh {
    nodes: Vec<Node>,
    elements: Vec<Element>,
    /// Index of the basal lamina element, if present
    lamina_index: Option<usize>,
}

impl IbMesh {
    pub fn new(nodes: Vec<Node>, elements: Vec<Element>, lamina_index: Option<usize>) -> Self {
        Self {
            nodes,
            elements,
            lamina_index,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: usize) -> &mut Node {
        &mut self.nodes[index]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn element(&self, index: usize) -> &Element {
        &self.elements[index]
    }

    pub fn element_mut(&mut self, index: usize) -> &mut Element {
        &mut self.elements[index]
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Index of the basal lamina ("membrane") element, if one was generated
    pub fn lamina_index(&self) -> Option<usize> {
        self.lamina_index
    }

    /// Shortest displacement from point a to point b under the periodic
    /// minimum image convention
    pub fn vector_from_a_to_b(&self, a: DVec2, b: DVec2) -> DVec2 {
        let mut d = b - a;
        if d.x > 0.5 {
            d.x -= 1.0;
        } else if d.x < -0.5 {
            d.x += 1.0;
        }
        if d.y > 0.5 {
            d.y -= 1.0;
        } else if d.y < -0.5 {
            d.y += 1.0;
        }
        d
    }

    /// Wrap a point back into the unit square
    pub fn wrap_point(&self, p: DVec2) -> DVec2 {
        DVec2::new(p.x.rem_euclid(1.0), p.y.rem_euclid(1.0))
    }

    /// Average distance between adjacent nodes of an element
    /// (perimeter / node count)
    pub fn average_node_spacing_of_element(&self, elem_index: usize) -> f64 {
        let elem = &self.elements[elem_index];
        let n = elem.num_nodes();
        let mut perimeter = 0.0;

        for local in 0..n {
            let a = self.nodes[elem.node_index(local)].location();
            let b = self.nodes[elem.node_index((local + 1) % n)].location();
            perimeter += self.vector_from_a_to_b(a, b).length();
        }

        perimeter / n as f64
    }

    /// Centroid of an element's nodes, computed relative to the first node so
    /// that elements straddling the periodic seam are handled correctly
    pub fn centroid_of_element(&self, elem_index: usize) -> DVec2 {
        let elem = &self.elements[elem_index];
        let origin = self.nodes[elem.node_index(0)].location();
        let mut sum = DVec2::ZERO;

        for &node_index in elem.node_indices() {
            sum += self.vector_from_a_to_b(origin, self.nodes[node_index].location());
        }

        self.wrap_point(origin + sum / elem.num_nodes() as f64)
    }

    /// Clear every node's force accumulator
    pub fn clear_applied_forces(&mut self) {
        for node in &mut self.nodes {
            node.clear_applied_force();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_mesh() -> IbMesh {
        // Unit-spacing square of side 0.2 centred at (0.5, 0.5)
        let positions = [
            DVec2::new(0.4, 0.4),
            DVec2::new(0.6, 0.4),
            DVec2::new(0.6, 0.6),
            DVec2::new(0.4, 0.6),
        ];
        let nodes = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| Node::new(i, p))
            .collect();
        let elements = vec![Element::new(0, vec![0, 1, 2, 3])];
        IbMesh::new(nodes, elements, None)
    }

    #[test]
    fn test_minimum_image_displacement() {
        let mesh = square_mesh();

        // Direct displacement
        let d = mesh.vector_from_a_to_b(DVec2::new(0.2, 0.5), DVec2::new(0.3, 0.5));
        assert!((d.x - 0.1).abs() < 1e-12);
        assert!(d.y.abs() < 1e-12);

        // Displacement across the seam should wrap
        let d = mesh.vector_from_a_to_b(DVec2::new(0.95, 0.5), DVec2::new(0.05, 0.5));
        assert!((d.x - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_average_node_spacing() {
        let mesh = square_mesh();
        let spacing = mesh.average_node_spacing_of_element(0);
        // Perimeter 0.8 over four nodes
        assert!((spacing - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_centroid() {
        let mesh = square_mesh();
        let c = mesh.centroid_of_element(0);
        assert!((c.x - 0.5).abs() < 1e-12);
        assert!((c.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_force_accumulation_is_additive() {
        let mut mesh = square_mesh();
        mesh.node_mut(0)
            .add_applied_force_contribution(DVec2::new(1.0, 0.0));
        mesh.node_mut(0)
            .add_applied_force_contribution(DVec2::new(0.5, 2.0));

        let f = mesh.node(0).applied_force();
        assert!((f.x - 1.5).abs() < 1e-12);
        assert!((f.y - 2.0).abs() < 1e-12);

        mesh.clear_applied_forces();
        assert_eq!(mesh.node(0).applied_force(), DVec2::ZERO);
    }
}
