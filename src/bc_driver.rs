// Simulation driver
//
// Orchestrates single stress tests (declare one bank bankrupt, run the
// cascade to completion, report the outcome) and parameter sweeps over a
// (panic rate, lambda) grid comparing two network topologies. Every sweep
// trial runs on its own deep clone, so grid points are independent and a
// caller may farm them out to worker threads if it wants to.

use crate::bc_engine::{ContagionEngine, SimError};
use crate::bc_graph::BankGraph;
use crate::bc_interface::{
    CascadePolicy, Coefficients, EventSink, NoOpSink, RecordedEvent, RUIN_SENTINEL_BALANCE,
};

/// Result of one stress test run to termination
#[derive(Debug, Clone, PartialEq)]
pub struct StressOutcome {
    /// The graph in its terminal state
    pub graph: BankGraph,

    /// Complete ordered audit trail of the run
    pub events: Vec<RecordedEvent>,

    /// Banks bankrupt at termination, the initial default included
    pub bankrupt_count: usize,

    /// Propagation rounds the cascade needed
    pub rounds: usize,
}

/// Force the named bank under and run the cascade to completion.
///
/// The bank's balance is set to the ruin sentinel before the cascade starts,
/// matching how a stress test seeds the initial default. The graph is
/// consumed; callers that want to keep their template pass a clone.
pub fn stress_test(
    graph: BankGraph,
    coefficients: Coefficients,
    policy: CascadePolicy,
    initial: &str,
    sink: &mut dyn EventSink,
) -> Result<StressOutcome, SimError> {
    let mut graph = graph;
    match graph.bank_mut(initial) {
        Some(bank) => bank.balance = RUIN_SENTINEL_BALANCE,
        None => {
            return Err(SimError::UnknownBank {
                bank: initial.to_string(),
            })
        }
    }

    let mut engine = ContagionEngine::with_policy(graph, coefficients, policy);
    engine.run_cascade(initial, sink)?;

    let rounds = engine.rounds();
    let (graph, events) = engine.into_parts();
    Ok(StressOutcome {
        bankrupt_count: graph.bankrupt_count(),
        graph,
        events,
        rounds,
    })
}

/// Inclusive parameter grid axis.
///
/// Values are computed as `start + i * step` per index rather than by
/// accumulation, so float drift cannot drop the final grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl ParamRange {
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    pub fn values(&self) -> Vec<f64> {
        if self.step <= 0.0 || self.end < self.start {
            return vec![self.start];
        }

        let count = ((self.end - self.start) / self.step + 1e-9).floor() as usize + 1;
        (0..count).map(|i| self.start + i as f64 * self.step).collect()
    }
}

/// One sweep grid cell: both topologies stress-tested under the same
/// coefficients
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    pub panic_rate: f64,
    pub lambda: f64,
    pub count_a: usize,
    pub count_b: usize,
}

/// All grid cells of one topology-comparison sweep
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub points: Vec<SweepPoint>,
}

impl SweepReport {
    /// Cells where topology B contained the cascade strictly better than
    /// topology A. Equal counts never qualify.
    pub fn b_contained(&self) -> Vec<&SweepPoint> {
        self.points
            .iter()
            .filter(|point| point.count_b < point.count_a)
            .collect()
    }
}

/// Stress-test two graph templates over every `(panic_rate, lambda)` grid
/// point and report both bankrupt counts per cell.
///
/// Each trial gets a fresh deep clone of its template and coefficients with
/// `lambda_c = lambda_f = lambda`, panic enabled at the cell's rate, under
/// the canonical cascade policy.
pub fn sweep(
    template_a: &BankGraph,
    template_b: &BankGraph,
    p_range: &ParamRange,
    lambda_range: &ParamRange,
    initial: &str,
) -> Result<SweepReport, SimError> {
    let mut points = Vec::new();

    for p in p_range.values() {
        for lambda in lambda_range.values() {
            let coefficients = Coefficients::uniform(lambda, p);

            let outcome_a = stress_test(
                template_a.clone(),
                coefficients,
                CascadePolicy::default(),
                initial,
                &mut NoOpSink,
            )?;
            let outcome_b = stress_test(
                template_b.clone(),
                coefficients,
                CascadePolicy::default(),
                initial,
                &mut NoOpSink,
            )?;

            points.push(SweepPoint {
                panic_rate: p,
                lambda,
                count_a: outcome_a.bankrupt_count,
                count_b: outcome_b.bankrupt_count,
            });
        }
    }

    Ok(SweepReport { points })
}
