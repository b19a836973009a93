//! Validation tests for membrane elasticity on generated palisade meshes.
//!
//! These exercise the full generate-bind-compute pipeline: region tagging
//! across a realistic monolayer, frozen apical/basal baselines, and the
//! spacing-ratio normalisation that keeps forces comparable across mesh
//! refinements.

use palisade::config::{MembraneParameters, MeshParameters};
use palisade::geometry::{NodeRegion, PalisadeMeshGenerator};
use palisade::physics::{ImmersedBoundaryForce, MembraneElasticityForce};
use palisade::state::CellPopulation;

/// Small palisade for fast tests
fn test_mesh_params() -> MeshParameters {
    MeshParameters {
        num_cells: 4,
        nodes_per_cell: 64,
        superellipse_exponent: 0.1,
        aspect_ratio: 2.0,
        random_y_variation: 0.0,
        include_lamina: true,
    }
}

fn bound_population(mesh_params: MeshParameters) -> (CellPopulation, MembraneElasticityForce) {
    let mesh = PalisadeMeshGenerator::new(mesh_params).generate();
    let mut population = CellPopulation::new(mesh);
    let mut force = MembraneElasticityForce::from_parameters(&MembraneParameters::default());
    force.bind(&mut population).unwrap();
    (population, force)
}

// ============================================================================
// Region tagging across a full monolayer
// ============================================================================

#[test]
fn test_every_node_is_tagged_after_bind() {
    let (population, _) = bound_population(test_mesh_params());
    let mesh = population.mesh();

    for node in mesh.nodes() {
        assert!(
            node.region().is_some(),
            "node {} left untagged after setup",
            node.index()
        );
    }
}

#[test]
fn test_lamina_nodes_are_all_basal() {
    let (population, _) = bound_population(test_mesh_params());
    let mesh = population.mesh();
    let lamina = mesh.lamina_index().unwrap();

    for &node_index in mesh.element(lamina).node_indices() {
        assert_eq!(mesh.node(node_index).region(), Some(NodeRegion::Basal));
    }
}

#[test]
fn test_cells_have_all_three_regions() {
    let (population, _) = bound_population(test_mesh_params());
    let mesh = population.mesh();
    let lamina = mesh.lamina_index().unwrap();

    for elem_index in 0..mesh.num_elements() {
        if elem_index == lamina {
            continue;
        }
        let elem = mesh.element(elem_index);

        let mut basal = 0;
        let mut apical = 0;
        let mut lateral = 0;
        for &node_index in elem.node_indices() {
            match mesh.node(node_index).region() {
                Some(NodeRegion::Basal) => basal += 1,
                Some(NodeRegion::Apical) => apical += 1,
                Some(NodeRegion::Lateral) => lateral += 1,
                None => panic!("untagged node in element {elem_index}"),
            }
        }

        // Corners sit at the eighth points. Each face runs from one corner
        // through the opposite corner inclusive, so it owns a quarter of the
        // ring plus one node
        let n = elem.num_nodes();
        assert_eq!(apical, n / 4 + 1, "element {elem_index} apical count");
        assert_eq!(basal, n / 4 + 1, "element {elem_index} basal count");
        assert_eq!(lateral, n / 2 - 2, "element {elem_index} lateral count");
    }
}

#[test]
fn test_apical_nodes_sit_above_basal_nodes() {
    let (population, _) = bound_population(test_mesh_params());
    let mesh = population.mesh();
    let lamina = mesh.lamina_index().unwrap();

    for elem_index in 0..mesh.num_elements() {
        if elem_index == lamina {
            continue;
        }
        let elem = mesh.element(elem_index);

        let mean_y = |region: NodeRegion| -> f64 {
            let ys: Vec<f64> = elem
                .node_indices()
                .iter()
                .filter(|&&i| mesh.node(i).region() == Some(region))
                .map(|&i| mesh.node(i).location().y)
                .collect();
            ys.iter().sum::<f64>() / ys.len() as f64
        };

        assert!(
            mean_y(NodeRegion::Apical) > mean_y(NodeRegion::Basal),
            "element {elem_index}: apical face should be above the basal face"
        );
    }
}

// ============================================================================
// Frozen baselines
// ============================================================================

#[test]
fn test_baseline_widths_match_cell_geometry() {
    let params = test_mesh_params();
    let num_cells = params.num_cells;
    let (population, force) = bound_population(params);
    let mesh = population.mesh();
    let lamina = mesh.lamina_index().unwrap();

    // Each cell occupies 80% of its slot, so the span between opposing
    // lateral midpoints is 0.8 / num_cells
    let expected = 0.8 / num_cells as f64;

    for elem_index in 0..mesh.num_elements() {
        if elem_index == lamina {
            continue;
        }
        let apical = force.apical_length_of_element(elem_index, mesh).unwrap();
        let basal = force.basal_length_of_element(elem_index, mesh).unwrap();

        assert!(
            (apical - expected).abs() < 0.15 * expected,
            "element {elem_index}: apical baseline {apical} vs expected {expected}"
        );
        assert!(
            (basal - expected).abs() < 0.15 * expected,
            "element {elem_index}: basal baseline {basal} vs expected {expected}"
        );
    }
}

#[test]
fn test_lamina_baselines_are_zero() {
    let (population, force) = bound_population(test_mesh_params());
    let mesh = population.mesh();
    let lamina = mesh.lamina_index().unwrap();

    assert_eq!(force.apical_length_of_element(lamina, mesh).unwrap(), 0.0);
    assert_eq!(force.basal_length_of_element(lamina, mesh).unwrap(), 0.0);
}

// ============================================================================
// Discretisation invariance
// ============================================================================

/// Doubling the node count should not change the force scale: the
/// spacing-ratio normalisation absorbs the refinement.
#[test]
fn test_force_scale_invariant_under_refinement() {
    let max_force = |nodes_per_cell: usize| -> f64 {
        let params = MeshParameters {
            nodes_per_cell,
            ..test_mesh_params()
        };
        let (population, force) = bound_population(params);

        force
            .compute_forces(&population)
            .unwrap()
            .iter()
            .map(|f| f.length())
            .fold(0.0, f64::max)
    };

    let coarse = max_force(64);
    let fine = max_force(128);

    assert!(coarse > 0.0);
    // Within a factor of four is close enough given the superellipse's
    // uneven node spacing near the shoulders
    let ratio = coarse / fine;
    assert!(
        (0.25..4.0).contains(&ratio),
        "refinement changed force scale by {ratio}"
    );
}

// ============================================================================
// Error paths
// ============================================================================

#[test]
fn test_compute_before_bind_is_an_error() {
    let mesh = PalisadeMeshGenerator::new(test_mesh_params()).generate();
    let population = CellPopulation::new(mesh);
    let force = MembraneElasticityForce::from_parameters(&MembraneParameters::default());

    assert!(force.compute_forces(&population).is_err());
}

#[test]
fn test_forces_are_finite_on_generated_mesh() {
    let (population, force) = bound_population(test_mesh_params());

    for f in force.compute_forces(&population).unwrap() {
        assert!(f.is_finite());
    }
}
