// Contagion Scenario Statistics

use bc_rust::{StressOutcome, SweepReport};

// ============================================================================
// Stress Test Summary
// ============================================================================

/// Headline numbers of one stress test run to termination
#[derive(Debug, Clone)]
pub struct StressSummary {
    /// Scenario label for the report header
    pub scenario: String,

    /// Banks in the network
    pub total_banks: usize,

    /// Banks bankrupt at termination, the initial default included
    pub bankrupt_count: usize,

    /// Propagation rounds the cascade needed
    pub rounds: usize,

    /// Events in the audit trail
    pub event_count: usize,

    /// Total balance left in the system at termination
    pub surviving_balance: f64,
}

impl StressSummary {
    pub fn from_outcome(scenario: impl Into<String>, outcome: &StressOutcome) -> Self {
        Self {
            scenario: scenario.into(),
            total_banks: outcome.graph.len(),
            bankrupt_count: outcome.bankrupt_count,
            rounds: outcome.rounds,
            event_count: outcome.events.len(),
            surviving_balance: outcome.graph.total_balance(),
        }
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║    STRESS TEST RESULTS                                 ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Scenario: {}", self.scenario);
        println!();

        println!("═══ Final State ═══");
        println!(
            "  Banks: {} total, {} bankrupt, {} solvent",
            self.total_banks,
            self.bankrupt_count,
            self.total_banks - self.bankrupt_count
        );
        println!("  Rounds: {}", self.rounds);
        println!("  Events: {}", self.event_count);
        println!("  Surviving Balance: {:.2}", self.surviving_balance);

        if self.total_banks > 0 {
            let failure_rate = (self.bankrupt_count as f64 / self.total_banks as f64) * 100.0;
            println!("  Failure Rate: {:.1}%", failure_rate);
        }
        println!();
    }
}

// ============================================================================
// Sweep Comparison
// ============================================================================

/// A full (p, lambda) sweep over two topologies, ready for reporting
pub struct SweepComparison {
    pub label_a: String,
    pub label_b: String,
    pub report: SweepReport,
}

impl SweepComparison {
    pub fn new(
        label_a: impl Into<String>,
        label_b: impl Into<String>,
        report: SweepReport,
    ) -> Self {
        Self {
            label_a: label_a.into(),
            label_b: label_b.into(),
            report,
        }
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║  SWEEP COMPARISON                                      ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        let qualifying = self.report.b_contained();
        let equal = self
            .report
            .points
            .iter()
            .filter(|point| point.count_a == point.count_b)
            .count();
        let b_worse = self
            .report
            .points
            .iter()
            .filter(|point| point.count_b > point.count_a)
            .count();

        println!("═══ Grid ═══");
        println!("  Cells: {}", self.report.points.len());
        println!("  {} contained better: {}", self.label_b, qualifying.len());
        println!("  Equal outcomes: {}", equal);
        println!("  {} contained better: {}", self.label_a, b_worse);
        println!();

        if qualifying.is_empty() {
            println!(
                "No cell where {} fails fewer banks than {}.\n",
                self.label_b, self.label_a
            );
            return;
        }

        println!(
            "═══ Cells where {} beats {} ═══\n",
            self.label_b, self.label_a
        );
        println!("┌──────────┬──────────┬──────────┬──────────┐");
        println!(
            "│    p     │  lambda  │ {:>8} │ {:>8} │",
            truncate(&self.label_a, 8),
            truncate(&self.label_b, 8)
        );
        println!("├──────────┼──────────┼──────────┼──────────┤");

        for point in &qualifying {
            println!(
                "│   {:.2}   │   {:.2}   │ {:>8} │ {:>8} │",
                point.panic_rate, point.lambda, point.count_a, point.count_b
            );
        }

        println!("└──────────┴──────────┴──────────┴──────────┘\n");
    }
}

fn truncate(label: &str, width: usize) -> &str {
    &label[..label.len().min(width)]
}
