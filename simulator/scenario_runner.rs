// Scenario Runner - Load and execute scenario YAML files
//
// Usage:
//   cargo run --bin scenario_runner simulator/scenarios/ring_panic.yaml
//   cargo run --bin scenario_runner simulator/scenarios/  (runs all .yaml files in directory)
//   cargo run --bin scenario_runner simulator/scenarios/randomized_network.yaml --seed 0x1234...

mod contagion;

use contagion::{
    build_graph,
    parse_seed_hex,
    ConsoleEventSink,
    ScenarioFile,
    StressSummary,
    SweepComparison,
};
use std::env;
use std::fs;
use std::path::Path;

use simple_logger::SimpleLogger;

use bc_rust::{stress_test, sweep, CascadePolicy, Coefficients, ParamRange};

fn main() {
    SimpleLogger::new().init().unwrap();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scenario.yaml | directory/> [--seed SEED_HEX]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} simulator/scenarios/ring_panic.yaml", args[0]);
        eprintln!("  {} simulator/scenarios/", args[0]);
        eprintln!("  {} simulator/scenarios/randomized_network.yaml --seed 0x123456...", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);

    // Parse optional seed (randomised topologies only)
    let seed: Option<[u8; 32]> = if args.len() >= 4 && args[2] == "--seed" {
        Some(parse_seed_hex(&args[3]))
    } else {
        None
    };

    if path.is_file() {
        run_scenario_file(path, seed);
    } else if path.is_dir() {
        run_scenario_directory(path, seed);
    } else {
        eprintln!("Error: Path does not exist: {}", path.display());
        std::process::exit(1);
    }
}

fn run_scenario_directory(dir: &Path, seed: Option<[u8; 32]>) {
    let mut scenarios = Vec::new();

    // Find all .yaml files
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("yaml")
                || path.extension().and_then(|s| s.to_str()) == Some("yml")
            {
                scenarios.push(path);
            }
        }
    }

    scenarios.sort();

    if scenarios.is_empty() {
        eprintln!("No .yaml files found in {}", dir.display());
        std::process::exit(1);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  SCENARIO RUNNER - Multiple Scenarios                 ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
    println!("Found {} scenario(s) to run\n", scenarios.len());

    for (i, scenario_path) in scenarios.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, scenarios.len(), scenario_path.display());
        run_scenario_file(scenario_path, seed);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  All scenarios complete!                               ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
}

fn run_scenario_file(path: &Path, seed: Option<[u8; 32]>) {
    println!("Loading scenario from: {}", path.display());

    // Load and parse YAML
    let yaml_content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let scenario: ScenarioFile = serde_yaml::from_str(&yaml_content).unwrap_or_else(|e| {
        eprintln!("Failed to parse {}: {}", path.display(), e);
        std::process::exit(1);
    });

    // Print scenario header
    println!("\n╔════════════════════════════════════════════════════════╗");
    if let Some(ref name) = scenario.meta.name {
        println!("║  {}  {}", name, " ".repeat(54_usize.saturating_sub(name.len())));
    } else {
        println!("║  Scenario: {}  ", path.file_stem().unwrap().to_str().unwrap());
    }
    println!("╚════════════════════════════════════════════════════════╝\n");

    if let Some(ref desc) = scenario.meta.description {
        println!("{}\n", desc);
    }

    if let Some(ref hypothesis) = scenario.meta.hypothesis {
        println!("Hypothesis:");
        println!("  {}\n", hypothesis);
    }

    // Build the network
    let scenario_label = scenario
        .meta
        .name
        .clone()
        .unwrap_or_else(|| path.file_stem().unwrap().to_str().unwrap().to_string());

    let graph = build_graph(&scenario.graph, seed).unwrap_or_else(|e| {
        eprintln!("Invalid graph in {}: {:?}", path.display(), e);
        std::process::exit(1);
    });

    let coefficients = Coefficients::from(scenario.coefficients);
    let policy = CascadePolicy::from(scenario.policy);

    println!("Configuration:");
    println!("  Banks: {}", graph.len());
    println!("  Initial Default: {}", scenario.initial_default);
    println!(
        "  Coefficients: lambda_c = {:.2}, lambda_f = {:.2}, panic = {} (p = {:.2})",
        coefficients.lambda_c, coefficients.lambda_f, coefficients.panic_enabled, coefficients.panic_rate
    );
    println!("\nStarting simulation...\n");

    match scenario.sweep {
        Some(ref sweep_spec) => {
            // Sweep mode: the scenario graph is template A, the alternative
            // is template B
            let alternative = build_graph(&sweep_spec.alternative, seed).unwrap_or_else(|e| {
                eprintln!("Invalid alternative graph in {}: {:?}", path.display(), e);
                std::process::exit(1);
            });

            let p_range = ParamRange::from(sweep_spec.p_range);
            let lambda_range = ParamRange::from(sweep_spec.lambda_range);

            let report = sweep(&graph, &alternative, &p_range, &lambda_range, &scenario.initial_default)
                .unwrap_or_else(|e| {
                    eprintln!("Sweep failed: {:?}", e);
                    std::process::exit(1);
                });

            SweepComparison::new("scenario", "alternative", report).print_summary();
        }
        None => {
            // Single stress test, narrated to console unless turned off
            let mut sink = ConsoleEventSink::new(scenario.narrate);
            let outcome = stress_test(graph, coefficients, policy, &scenario.initial_default, &mut sink)
                .unwrap_or_else(|e| {
                    eprintln!("Stress test failed: {:?}", e);
                    std::process::exit(1);
                });

            StressSummary::from_outcome(scenario_label, &outcome).print_summary();
        }
    }

    println!("\n✓ Scenario complete!\n");
}
