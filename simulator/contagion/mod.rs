// Contagion Scenario Support Module

pub mod config;
pub mod event_sinks;
pub mod stats;

// Re-export commonly used types
pub use config::{
    build_graph,
    parse_seed_hex,
    CoefficientsSpec,
    GraphSpec,
    PolicySpec,
    ScenarioFile,
    SweepSpec,
};

pub use event_sinks::{
    CascadeReplay,
    CollectorEventSink,
    ConsoleEventSink,
    CsvEventSink,
    MultiEventSink,
};

pub use stats::{StressSummary, SweepComparison};
