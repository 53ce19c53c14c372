// Scenario: Network Topology Impact on Contagion
//
// This scenario sweeps the same stress test over TWO networks with identical
// aggregate exposure per bank but different shape, demonstrating how
// topology affects how far a cascade spreads.
//
// Topology A: fully connected mesh of 5 banks
// Topology B: ring of 5 banks
//
// Both start with the same balances and the same total exposure per bank

mod contagion;

use contagion::SweepComparison;

use bc_rust::{sweep, BankGraph, ParamRange};

fn main() {
    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  SCENARIO: Topology Impact Analysis                   ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    println!("Hypothesis:");
    println!("  A ring spreads a default to two partners at a time, so at");
    println!("  some shock strengths the far side survives; a mesh links");
    println!("  every bank to the failure and should collapse more often.\n");

    println!("Setup:");
    println!("  - 5 banks, balance 1000 each, 10000 total exposure per bank");
    println!("  - Topology A: fully connected mesh (2500 per counterparty)");
    println!("  - Topology B: ring (5000 per neighbour)");
    println!("  - Bank 1 defaults; p and lambda swept over 0.1..1.0 by 0.1");
    println!("  - Panic withdrawals enabled at every cell\n");

    let balance = 1000.0;
    let total_exposure = 10000.0;

    let mesh = BankGraph::complete(5, balance, total_exposure).expect("mesh is a valid graph");
    let ring = BankGraph::ring(5, balance, total_exposure).expect("ring is a valid graph");

    let p_range = ParamRange::new(0.1, 1.0, 0.1);
    let lambda_range = ParamRange::new(0.1, 1.0, 0.1);

    let report = sweep(&mesh, &ring, &p_range, &lambda_range, "1")
        .expect("bank 1 exists in both topologies");

    let comparison = SweepComparison::new("mesh", "ring", report);
    comparison.print_summary();

    // Findings
    let qualifying = comparison.report.b_contained().len();
    let cells = comparison.report.points.len();

    println!("Findings:\n");
    if qualifying > 0 {
        println!(
            "✓ The ring contained the cascade strictly better in {} of {} cells",
            qualifying, cells
        );
        println!("  Sparse connectivity can shield banks that are far from the");
        println!("  initial failure, at the price of larger per-neighbour exposure.");
    } else {
        println!("⚠ No cell favoured the ring; at these balances the doubled");
        println!("  per-neighbour exposure outweighs the sparser topology.");
    }

    println!("\n✓ Scenario complete!\n");
}
