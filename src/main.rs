//! Palisade - parameter sweep entry point
//!
//! Runs one realisation of the monolayer simulation for a given membrane
//! spring constant and writes the end-of-run summary statistics to CSV.
//!
//! CLI Usage:
//!   cargo run --release                        # Defaults
//!   cargo run --release -- --id 3 --spring 2e6 # One sweep point
//!   cargo run --release -- --steps 1000

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use palisade::config::Parameters;
use palisade::export::{CsvExporter, SweepRecord};
use palisade::geometry::PalisadeMeshGenerator;
use palisade::physics::MembraneElasticityForce;
use palisade::simulation::Simulation;
use palisade::state::CellPopulation;

/// Parsed CLI arguments
struct Args {
    /// Realisation identifier; seeds the mesh jitter and the kick
    simulation_id: u64,
    /// Membrane spring constant for this sweep point
    spring_constant: f64,
    /// Steps for the main phase (settle phase is one tenth)
    num_steps: usize,
}

fn parse_args() -> Args {
    let argv: Vec<String> = std::env::args().collect();
    let mut args = Args {
        simulation_id: 0,
        spring_constant: 1e6,
        num_steps: 0,
    };

    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "--id" => {
                i += 1;
                if i < argv.len() {
                    args.simulation_id = argv[i].parse().unwrap_or(0);
                }
            }
            "--spring" | "-k" => {
                i += 1;
                if i < argv.len() {
                    args.spring_constant = argv[i].parse().unwrap_or(1e6);
                }
            }
            "--steps" | "-n" => {
                i += 1;
                if i < argv.len() {
                    args.num_steps = argv[i].parse().unwrap_or(0);
                }
            }
            "--help" | "-h" => {
                println!("Palisade - immersed boundary monolayer sweep");
                println!();
                println!("Usage: palisade [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --id N          Simulation ID / RNG seed (default: 0)");
                println!("  -k, --spring K  Membrane spring constant (default: 1e6)");
                println!("  -n, --steps N   Main-phase step count (default: from parameters)");
                println!("  --help, -h      Show this help");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    args
}

/// Scale every cell's node heights about the lamina height by a random
/// factor, one factor per cell, to perturb the settled monolayer
fn kick_cells(simulation: &mut Simulation, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mesh = simulation.population_mut().mesh_mut();

    let Some(lamina) = mesh.lamina_index() else {
        return;
    };

    let lamina_height: f64 = {
        let elem = mesh.element(lamina);
        elem.node_indices()
            .iter()
            .map(|&i| mesh.node(i).location().y)
            .sum::<f64>()
            / elem.num_nodes() as f64
    };

    for elem_index in 0..mesh.num_elements() {
        if elem_index == lamina {
            continue;
        }
        let kick = 1.1 - 0.2 * rng.gen::<f64>();

        for local in 0..mesh.element(elem_index).num_nodes() {
            let node_index = mesh.element(elem_index).node_index(local);
            let mut position = mesh.node(node_index).location();
            position.y = lamina_height + kick * (position.y - lamina_height);
            let wrapped = mesh.wrap_point(position);
            mesh.node_mut(node_index).set_location(wrapped);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args();
    let params = Parameters::load_or_default();
    let num_steps = if args.num_steps > 0 {
        args.num_steps
    } else {
        params.simulation.num_steps
    };

    log::info!(
        "Starting simulation {} with spring constant {:.3e}",
        args.simulation_id,
        args.spring_constant
    );

    let mesh = PalisadeMeshGenerator::new(params.mesh.clone())
        .with_seed(args.simulation_id)
        .generate();
    let population = CellPopulation::new(mesh);

    let mut force = MembraneElasticityForce::from_parameters(&params.membrane);
    force.set_spring_constant(args.spring_constant);

    let mut simulation = Simulation::new(population, params.simulation.clone());
    simulation.add_force(Box::new(force));

    // Record the force configuration alongside the results
    let mut parameter_text = Vec::new();
    simulation.output_force_parameters(&mut parameter_text)?;
    log::info!(
        "Force parameters:\n{}",
        String::from_utf8_lossy(&parameter_text)
    );

    // Settle, perturb, then run the main phase
    let settle_steps = (num_steps / 10).max(1);
    simulation
        .solve(settle_steps)
        .context("settle phase failed")?;

    kick_cells(&mut simulation, args.simulation_id);

    simulation.solve(num_steps).context("main phase failed")?;

    let metrics = simulation.metrics();
    log::info!(
        "Finished: tortuosity = {:.4}, lamina height = {:?}",
        metrics.tortuosity,
        metrics.lamina_height
    );

    let output_dir = format!(
        "results/VaryMembraneStiffness/{}_{}",
        args.spring_constant as u64, args.simulation_id
    );
    let mut exporter = CsvExporter::new(&output_dir)?;
    exporter.record(&SweepRecord {
        simulation_id: args.simulation_id,
        spring_constant: args.spring_constant,
        tortuosity: metrics.tortuosity,
        lamina_height: metrics.lamina_height,
        num_steps: simulation.step_count(),
        end_time: simulation.time(),
    })?;
    exporter.flush()?;

    println!(
        "Completed simulation with spring constant {:.3e} and ID {}",
        args.spring_constant, args.simulation_id
    );

    Ok(())
}
