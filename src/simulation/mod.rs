//! Simulation loop coupling the boundary forces to node motion.
//!
//! Each step clears the node force accumulators, sums the per-node deltas of
//! every registered force law into them, spreads the accumulated forces onto
//! the fluid force grid, forms a grid velocity through a local drag closure,
//! and advects every node with the velocity interpolated at its position.
//! The incompressible Navier-Stokes pressure projection of the full immersed
//! boundary method is an external concern and is not performed here.

use std::io;

use crate::config::SimulationParameters;
use crate::fluid::FluidGrids;
use crate::physics::{ForceError, ImmersedBoundaryForce};
use crate::state::{CellPopulation, MonolayerMetrics};

/// Orchestrates a monolayer simulation
pub struct Simulation {
    population: CellPopulation,
    forces: Vec<Box<dyn ImmersedBoundaryForce>>,
    grids: FluidGrids,
    params: SimulationParameters,
    initialised: bool,
    step_count: u64,
    time: f64,
}

impl Simulation {
    pub fn new(population: CellPopulation, params: SimulationParameters) -> Self {
        let grids = FluidGrids::new(params.grid_pts);
        Self {
            population,
            forces: Vec::new(),
            grids,
            params,
            initialised: false,
            step_count: 0,
            time: 0.0,
        }
    }

    /// Register a force law. Must happen before [`initialise`](Self::initialise).
    pub fn add_force(&mut self, force: Box<dyn ImmersedBoundaryForce>) {
        self.forces.push(force);
    }

    pub fn population(&self) -> &CellPopulation {
        &self.population
    }

    pub fn population_mut(&mut self) -> &mut CellPopulation {
        &mut self.population
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Bind every registered force to the population. Called once;
    /// [`solve`](Self::solve) calls it automatically on first use.
    pub fn initialise(&mut self) -> Result<(), ForceError> {
        if self.initialised {
            return Ok(());
        }
        for force in &mut self.forces {
            force.bind(&mut self.population)?;
        }
        self.initialised = true;
        Ok(())
    }

    /// Advance one timestep
    pub fn step(&mut self) -> Result<(), ForceError> {
        self.initialise()?;

        let dt = self.params.dt;

        // Reduction of all force contributions into the node accumulators
        self.population.mesh_mut().clear_applied_forces();
        for force in &self.forces {
            let deltas = force.compute_forces(&self.population)?;
            let mesh = self.population.mesh_mut();
            for (node_index, delta) in deltas.into_iter().enumerate() {
                mesh.node_mut(node_index).add_applied_force_contribution(delta);
            }
        }

        // Node forces -> grid force density -> grid velocity
        self.grids.clear();
        self.grids.spread_applied_forces(self.population.mesh());
        self.grids.compute_drag_velocities(self.params.drag_coefficient);

        // Advect nodes with the interpolated velocity
        let mesh = self.population.mesh_mut();
        for node_index in 0..mesh.num_nodes() {
            let position = mesh.node(node_index).location();
            let velocity = self.grids.interpolate_velocity(position);
            let new_position = mesh.wrap_point(position + velocity * dt);
            mesh.node_mut(node_index).set_location(new_position);
        }

        self.step_count += 1;
        self.time += dt;
        Ok(())
    }

    /// Run the given number of steps, logging a sample every
    /// `sampling_multiple` steps
    pub fn solve(&mut self, num_steps: usize) -> Result<(), ForceError> {
        self.initialise()?;

        for _ in 0..num_steps {
            self.step()?;

            if self.params.sampling_multiple > 0
                && self.step_count % self.params.sampling_multiple as u64 == 0
            {
                let metrics = self.metrics();
                log::info!(
                    "step {}: t = {:.4}, tortuosity = {:.4}, lamina height = {:?}",
                    self.step_count,
                    self.time,
                    metrics.tortuosity,
                    metrics.lamina_height
                );
            }
        }

        Ok(())
    }

    /// Current monolayer summary statistics
    pub fn metrics(&self) -> MonolayerMetrics {
        MonolayerMetrics::from_mesh(self.population.mesh())
    }

    /// Emit the parameters of every registered force as key-value text
    pub fn output_force_parameters(&self, writer: &mut dyn io::Write) -> io::Result<()> {
        for force in &self.forces {
            force.output_parameters(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MeshParameters, Parameters};
    use crate::geometry::PalisadeMeshGenerator;
    use crate::physics::MembraneElasticityForce;

    fn test_simulation() -> Simulation {
        let params = Parameters {
            mesh: MeshParameters {
                num_cells: 2,
                nodes_per_cell: 32,
                superellipse_exponent: 0.3,
                aspect_ratio: 2.0,
                random_y_variation: 0.0,
                include_lamina: false,
            },
            simulation: SimulationParameters {
                dt: 1e-5,
                num_steps: 10,
                sampling_multiple: 0,
                grid_pts: 32,
                drag_coefficient: 1e6,
            },
            ..Parameters::default()
        };

        let mesh = PalisadeMeshGenerator::new(params.mesh.clone()).generate();
        let population = CellPopulation::new(mesh);

        let mut simulation = Simulation::new(population, params.simulation.clone());
        simulation.add_force(Box::new(MembraneElasticityForce::from_parameters(
            &params.membrane,
        )));
        simulation
    }

    #[test]
    fn test_initialise_is_idempotent() {
        let mut simulation = test_simulation();
        simulation.initialise().unwrap();
        simulation.initialise().unwrap();
    }

    #[test]
    fn test_step_advances_time() {
        let mut simulation = test_simulation();
        simulation.step().unwrap();
        simulation.step().unwrap();

        assert_eq!(simulation.step_count(), 2);
        assert!((simulation.time() - 2e-5).abs() < 1e-12);
    }

    #[test]
    fn test_positions_stay_finite_and_wrapped() {
        let mut simulation = test_simulation();
        simulation.solve(10).unwrap();

        for node in simulation.population().mesh().nodes() {
            let p = node.location();
            assert!(p.x.is_finite() && p.y.is_finite());
            assert!((0.0..1.0).contains(&p.x));
            assert!((0.0..1.0).contains(&p.y));
        }
    }

    #[test]
    fn test_springs_contract_toward_rest_length() {
        // Rest length is half the spacing, so the boundary under tension
        // must shrink as the simulation relaxes
        let mut simulation = test_simulation();
        simulation.initialise().unwrap();

        let before = simulation
            .population()
            .mesh()
            .average_node_spacing_of_element(0);
        simulation.solve(50).unwrap();
        let after = simulation
            .population()
            .mesh()
            .average_node_spacing_of_element(0);

        assert!(after < before, "spacing {} -> {}", before, after);
    }

    #[test]
    fn test_output_force_parameters() {
        let simulation = test_simulation();
        let mut buffer = Vec::new();
        simulation.output_force_parameters(&mut buffer).unwrap();
        assert!(String::from_utf8(buffer).unwrap().contains("SpringConstant"));
    }
}
