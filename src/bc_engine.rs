// Contagion cascade engine
//
// Drives one cascade over one bank graph: breadth-first, round-synchronous
// frontier processing. Within a round, panic withdrawals run first, then
// funding shocks, then credit shocks; shock selection reads exposures (fixed
// for the run), never balances, so intra-round ordering cannot change which
// shocks fire. New defaults are collected by a single end-of-round scan
// under the canonical policy. The bankrupt set only grows and is bounded by
// the bank count, so a cascade terminates in at most N rounds.

use indexmap::IndexSet;
use log::debug;

use crate::bc_graph::BankGraph;
use crate::bc_interface::{
    BankId, CascadePolicy, Coefficients, DefaultDetection, EventSink, RecordedEvent, RoundIndex,
    ShockEvent,
};
use crate::bc_shocks::{credit_shock_amount, funding_shock_amount, withdrawal_amount};

/// Errors raised when driving a simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The named bank is not part of the graph
    UnknownBank { bank: BankId },
}

/// Owns one graph and one coefficient set for the duration of exactly one
/// cascade. Every event is appended to the internal ordered log and forwarded
/// to the caller's sink as it happens.
pub struct ContagionEngine {
    graph: BankGraph,
    coefficients: Coefficients,
    policy: CascadePolicy,
    log: Vec<RecordedEvent>,
    round: RoundIndex,
}

impl ContagionEngine {
    pub fn new(graph: BankGraph, coefficients: Coefficients) -> Self {
        Self::with_policy(graph, coefficients, CascadePolicy::default())
    }

    pub fn with_policy(graph: BankGraph, coefficients: Coefficients, policy: CascadePolicy) -> Self {
        Self {
            graph,
            coefficients,
            policy,
            log: Vec::new(),
            round: 0,
        }
    }

    pub fn graph(&self) -> &BankGraph {
        &self.graph
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// The ordered audit trail so far
    pub fn events(&self) -> &[RecordedEvent] {
        &self.log
    }

    /// Number of propagation rounds the cascade ran
    pub fn rounds(&self) -> usize {
        self.round
    }

    pub fn into_parts(self) -> (BankGraph, Vec<RecordedEvent>) {
        (self.graph, self.log)
    }

    /// Run the cascade triggered by declaring `initial` bankrupt.
    ///
    /// Declaring an already-bankrupt bank changes nothing and emits nothing;
    /// the cascade then has an empty frontier and ends immediately.
    pub fn run_cascade(&mut self, initial: &str, sink: &mut dyn EventSink) -> Result<(), SimError> {
        if !self.graph.contains(initial) {
            return Err(SimError::UnknownBank {
                bank: initial.to_string(),
            });
        }

        self.round = 0;
        let mut frontier: Vec<BankId> = Vec::new();
        if self.declare_default(initial, sink) {
            frontier.push(initial.to_string());
        }

        while !frontier.is_empty() {
            self.round += 1;
            frontier = self.run_round(&frontier, sink);
        }

        Ok(())
    }

    /// One synchronous pass over the frontier; returns the next frontier.
    fn run_round(&mut self, frontier: &[BankId], sink: &mut dyn EventSink) -> Vec<BankId> {
        let mut next = Vec::new();

        if self.coefficients.panic_enabled {
            for failed in frontier {
                self.panic_withdrawal(failed, &mut next, sink);
            }
        }

        self.apply_funding_shocks(frontier, &mut next, sink);
        self.apply_credit_shocks(frontier, &mut next, sink);

        if self.policy.detection == DefaultDetection::EndOfRound {
            next = self.scan_for_defaults(sink);
        }

        next
    }

    /// Debit the counterparties a newly-bankrupt bank had extended funding to
    fn apply_funding_shocks(
        &mut self,
        frontier: &[BankId],
        next: &mut Vec<BankId>,
        sink: &mut dyn EventSink,
    ) {
        let lambda_f = self.coefficients.lambda_f;

        for failed in frontier {
            let exposures: Vec<(BankId, f64)> = match self.graph.exposures_of(failed) {
                Some(iter) => iter.map(|(target, amount)| (target.clone(), amount)).collect(),
                None => continue,
            };

            for (counterparty, exposure) in exposures {
                if self.is_bankrupt(&counterparty) {
                    continue;
                }

                let amount = funding_shock_amount(exposure, lambda_f);
                self.emit(
                    ShockEvent::FundingShock {
                        from: failed.clone(),
                        to: counterparty.clone(),
                        amount,
                    },
                    sink,
                );
                self.debit(&counterparty, amount, next, sink);
            }
        }
    }

    /// Debit every bank still holding an exposure to a newly-bankrupt bank
    fn apply_credit_shocks(
        &mut self,
        frontier: &[BankId],
        next: &mut Vec<BankId>,
        sink: &mut dyn EventSink,
    ) {
        let lambda_c = self.coefficients.lambda_c;

        for failed in frontier {
            let holders: Vec<(BankId, f64)> = self
                .graph
                .banks()
                .filter(|(_, bank)| !bank.bankrupt)
                .filter_map(|(id, bank)| bank.exposures.get(failed).map(|amount| (id.clone(), *amount)))
                .collect();

            for (holder, exposure) in holders {
                if self.is_bankrupt(&holder) {
                    // failed earlier in this pass under Immediate detection
                    continue;
                }

                let amount = credit_shock_amount(exposure, lambda_c);
                self.emit(
                    ShockEvent::CreditShock {
                        from: holder.clone(),
                        to: failed.clone(),
                        amount,
                    },
                    sink,
                );
                self.debit(&holder, amount, next, sink);
            }
        }
    }

    /// Counterparty flight triggered by one bank's default.
    ///
    /// Partners are the failed bank's creditors and debtors; every other
    /// solvent bank with a deposit at a partner pulls its share out. Each
    /// pull is a zero-sum transfer and may push the partner negative ahead
    /// of the round's formal shocks.
    fn panic_withdrawal(&mut self, failed: &BankId, next: &mut Vec<BankId>, sink: &mut dyn EventSink) {
        let panic_rate = self.coefficients.panic_rate;

        let mut partners: IndexSet<BankId> = IndexSet::new();
        for (id, bank) in self.graph.banks() {
            if bank.exposures.contains_key(failed) {
                partners.insert(id.clone());
            }
        }
        if let Some(bank) = self.graph.bank(failed) {
            for target in bank.exposures.keys() {
                partners.insert(target.clone());
            }
        }

        for partner in partners {
            if self.is_bankrupt(&partner) {
                continue;
            }

            let withdrawers: Vec<(BankId, f64)> = self
                .graph
                .banks()
                .filter(|(_, bank)| !bank.bankrupt)
                .filter_map(|(id, bank)| bank.exposures.get(&partner).map(|amount| (id.clone(), *amount)))
                .collect();

            for (withdrawer, exposure) in withdrawers {
                if self.is_bankrupt(&partner) {
                    // partner failed mid-run under Immediate detection
                    break;
                }
                if self.is_bankrupt(&withdrawer) {
                    continue;
                }

                let amount = withdrawal_amount(exposure, panic_rate);
                self.emit(
                    ShockEvent::PanicWithdrawal {
                        from: withdrawer.clone(),
                        to: partner.clone(),
                        amount,
                    },
                    sink,
                );
                if let Some(bank) = self.graph.bank_mut(&withdrawer) {
                    bank.balance += amount;
                }
                self.debit(&partner, amount, next, sink);
            }
        }
    }

    /// End-of-round scan: every solvent bank past the ruin threshold is
    /// newly bankrupt and forms the next frontier.
    fn scan_for_defaults(&mut self, sink: &mut dyn EventSink) -> Vec<BankId> {
        let ruined: Vec<BankId> = self
            .graph
            .banks()
            .filter(|(_, bank)| !bank.bankrupt && self.policy.ruin.ruined(bank.balance))
            .map(|(id, _)| id.clone())
            .collect();

        let mut next = Vec::new();
        for id in ruined {
            if self.declare_default(&id, sink) {
                next.push(id);
            }
        }

        next
    }

    /// Transition a bank to bankrupt. Returns false (and emits nothing) if
    /// it already was, or if the id is unknown.
    fn declare_default(&mut self, id: &str, sink: &mut dyn EventSink) -> bool {
        let transitioned = match self.graph.bank_mut(id) {
            Some(bank) => {
                if bank.bankrupt {
                    false
                } else {
                    bank.bankrupt = true;
                    true
                }
            }
            None => false,
        };

        if transitioned {
            self.emit(ShockEvent::Defaulted { bank: id.to_string() }, sink);
        } else if self.graph.contains(id) {
            debug!("bank {} is already bankrupt, nothing to declare", id);
        }

        transitioned
    }

    /// Apply a loss to a bank. Under Immediate detection the bank is marked
    /// as soon as the debit crosses the threshold, so the rest of the round
    /// skips it; it still joins the next frontier.
    fn debit(&mut self, id: &str, amount: f64, next: &mut Vec<BankId>, sink: &mut dyn EventSink) {
        if let Some(bank) = self.graph.bank_mut(id) {
            bank.balance -= amount;
        }

        if self.policy.detection == DefaultDetection::Immediate {
            let ruined = match self.graph.bank(id) {
                Some(bank) => !bank.bankrupt && self.policy.ruin.ruined(bank.balance),
                None => false,
            };
            if ruined && self.declare_default(id, sink) {
                next.push(id.to_string());
            }
        }
    }

    fn is_bankrupt(&self, id: &str) -> bool {
        self.graph.bank(id).map(|bank| bank.bankrupt).unwrap_or(false)
    }

    fn emit(&mut self, event: ShockEvent, sink: &mut dyn EventSink) {
        sink.record(self.round, &event);
        self.log.push(RecordedEvent {
            round: self.round,
            event,
        });
    }
}
