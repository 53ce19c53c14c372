use log::info;
use simple_logger::SimpleLogger;

use bc_rust::{stress_test, BankGraph, CascadePolicy, Coefficients, NoOpSink};

// Reference run: five banks in a ring with panic withdrawals enabled, the
// configuration the interactive demo ships with.
fn main() {
    SimpleLogger::new().init().unwrap();

    info!("starting");

    let balance = 1000.0; // starting balance of each bank
    let total_exposure = 5000.0; // aggregate exposure per bank, split over neighbours
    let panic_rate = 0.7;
    let lambda = 0.5;

    let graph = BankGraph::ring(5, balance, total_exposure).expect("reference ring is valid");
    let coefficients = Coefficients {
        lambda_c: lambda,
        lambda_f: lambda,
        panic_enabled: true,
        panic_rate,
    };

    println!(
        "stress test: bank 1 declared bankrupt (lambda_c = {:.2}, lambda_f = {:.2}, p = {:.2}, panic = {})",
        coefficients.lambda_c, coefficients.lambda_f, coefficients.panic_rate, coefficients.panic_enabled
    );

    let outcome = stress_test(
        graph,
        coefficients,
        CascadePolicy::default(),
        "1",
        &mut NoOpSink,
    )
    .expect("bank 1 exists in the reference ring");

    for record in &outcome.events {
        println!("{:>3}  {}", record.round, record.event);
    }

    println!("stress test complete");

    info!(
        "done. {} of {} banks failed in {} rounds, {} events, {:.2} total balance remaining",
        outcome.bankrupt_count,
        outcome.graph.len(),
        outcome.rounds,
        outcome.events.len(),
        outcome.graph.total_balance()
    );
}
