//! Circuit Lab - DC schematic solver
//!
//! Solves a schematic and prints the values on every component.
//!
//! # Usage
//!
//! ```bash
//! circuit-lab lamp.cir --toggle SW1 --ticks 2 --paths
//! CIRCUIT_LAB_LOG=debug circuit-lab divider.json --export solved.json
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use circuit_lab::{
    circuit::Circuit,
    dsl,
    error::Result,
    schematic,
    solver::{SimulationConfig, MAX_PASSES, MAX_PATHS, MAX_VISITS, TOLERANCE},
    Simulator,
};

/// DC circuit solver for series/parallel schematics
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the schematic (.json, or DSL text for any other extension)
    #[arg(value_name = "SCHEMATIC_FILE")]
    schematic_file: PathBuf,

    /// Flip a switch by name before solving (repeatable)
    #[arg(short, long, value_name = "NAME")]
    toggle: Vec<String>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 1)]
    ticks: usize,

    /// Maximum propagation passes per tick
    #[arg(long, default_value_t = MAX_PASSES)]
    max_passes: usize,

    /// Tolerance for the Ohm's law and power law checks
    #[arg(long, default_value_t = TOLERANCE)]
    tolerance: f64,

    /// Maximum number of loops to enumerate
    #[arg(long, default_value_t = MAX_PATHS)]
    max_paths: usize,

    /// Maximum number of components entered while enumerating loops
    #[arg(long, default_value_t = MAX_VISITS)]
    max_visits: usize,

    /// Write the schematic as JSON after solving
    #[arg(short, long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Print every discovered loop
    #[arg(long)]
    paths: bool,
}

fn load(path: &Path) -> Result<Circuit> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        schematic::load(path)
    } else {
        Circuit::from_ast(dsl::parse_file(path)?)
    }
}

fn main() -> Result<()> {
    let env = env_logger::Env::default()
        .filter("CIRCUIT_LAB_LOG")
        .write_style("CIRCUIT_LAB_LOG_STYLE");
    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(log::LevelFilter::Warn)
        .parse_env(env)
        .init();

    let args = Args::parse();

    // Load the schematic
    let mut circuit = load(&args.schematic_file)?;

    for name in &args.toggle {
        let id = circuit.id_of(name)?;
        let closed = circuit.toggle_switch(id)?;
        log::info!("{} is now {}", name, if closed { "closed" } else { "open" });
    }

    let config = SimulationConfig::new()
        .with_max_passes(args.max_passes)
        .with_tolerance(args.tolerance)
        .with_max_paths(args.max_paths)
        .with_max_visits(args.max_visits);
    let mut simulator = Simulator::with_config(circuit, config);

    for tick in 1..=args.ticks.max(1) {
        let report = simulator.tick();
        if args.ticks > 1 {
            println!("== tick {} ({} value(s) changed)", tick, report.changed);
        }
        if args.paths {
            for path in &report.paths {
                let state = match report.blocked.iter().find(|(p, _)| p == path) {
                    Some((_, reason)) => reason.describe(simulator.circuit()),
                    None => "active".to_string(),
                };
                println!("loop {} ({})", path.label(simulator.circuit()), state);
            }
        }
        println!("{}", report.summary(simulator.circuit()));
    }

    if let Some(path) = &args.export {
        schematic::save(simulator.circuit(), path)?;
    }

    Ok(())
}
