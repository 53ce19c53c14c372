//! # bcRust - Interbank Contagion Simulation
//!
//! A simulation of financial distress spreading through a small network of
//! interdependent banks. One bankruptcy propagates through funding shocks,
//! credit shocks and panic-driven withdrawals until no further bank fails.
//!
//! ## Core Components
//!
//! - **BankGraph**: the data model - a fixed set of named banks and their
//!   directed exposures, validated at construction
//! - **ContagionEngine**: runs one cascade over one graph, breadth-first and
//!   round-synchronous, emitting an ordered event log
//! - **Shock model**: pure functions for funding-shock, credit-shock and
//!   panic-withdrawal magnitudes
//! - **Driver**: single stress tests and `(panic rate, lambda)` parameter
//!   sweeps comparing two network topologies
//!
//! ## Usage
//!
//! ```
//! use bc_rust::{stress_test, BankGraph, CascadePolicy, Coefficients, NoOpSink};
//!
//! let graph = BankGraph::ring(5, 1000.0, 5000.0).unwrap();
//! let coefficients = Coefficients::uniform(0.5, 0.7);
//!
//! let outcome = stress_test(
//!     graph,
//!     coefficients,
//!     CascadePolicy::default(),
//!     "1",
//!     &mut NoOpSink,
//! )
//! .unwrap();
//!
//! for record in &outcome.events {
//!     println!("round {}: {}", record.round, record.event);
//! }
//! println!("{} of {} banks failed", outcome.bankrupt_count, outcome.graph.len());
//! ```
//!
//! ## Scenario Programs
//!
//! The cascade never suspends for outside input; pacing a replay is the
//! consumer's job, working off the returned event log. The `simulator/`
//! directory holds the scenario programs built on that contract: a YAML
//! scenario runner and the topology / panic comparison studies.

// Core simulation modules
pub mod bc_driver;
pub mod bc_engine;
pub mod bc_graph;
pub mod bc_interface;
pub mod bc_shocks;

// Re-export commonly used types
pub use bc_driver::{stress_test, sweep, ParamRange, StressOutcome, SweepPoint, SweepReport};
pub use bc_engine::{ContagionEngine, SimError};
pub use bc_graph::{Bank, BankGraph, GraphBuilder, GraphError};
pub use bc_interface::{
    BankId, CascadePolicy, Coefficients, DefaultDetection, EventSink, NoOpSink, RecordedEvent,
    RoundIndex, RuinThreshold, ShockEvent, RUIN_SENTINEL_BALANCE,
};
