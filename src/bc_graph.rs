// Bank network data model
//
// A fixed set of named banks and their directed exposure relationships.
// The id set is frozen at construction and every graph is validated before
// use; all cascade behavior lives in bc_engine. Maps are insertion-ordered
// so that enumeration, and therefore the event log, is reproducible.

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bc_interface::BankId;

/// Errors detected while assembling a bank graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An exposure references a bank that is not part of the graph
    DanglingExposure { bank: BankId, target: BankId },

    /// A bank holds an exposure to itself
    SelfExposure { bank: BankId },
}

/// One node of the network
#[derive(Debug, Clone, PartialEq)]
pub struct Bank {
    /// Signed balance; starts positive, may go negative transiently while
    /// shocks are applied before bankruptcy is declared
    pub balance: f64,

    /// Directed exposures: key is the counterparty this bank has extended
    /// credit or funding to, value is the nonnegative amount
    pub exposures: IndexMap<BankId, f64>,

    /// Monotonic per run: once true, never reset
    pub bankrupt: bool,
}

impl Bank {
    pub fn new(balance: f64) -> Self {
        Self {
            balance,
            exposures: IndexMap::new(),
            bankrupt: false,
        }
    }

    pub fn with_exposures(balance: f64, exposures: IndexMap<BankId, f64>) -> Self {
        Self {
            balance,
            exposures,
            bankrupt: false,
        }
    }
}

/// The full network: bank id -> bank, id set fixed at construction.
///
/// `clone()` produces a fully independent deep copy (balances, bankruptcy
/// flags and exposure maps are all copied by value), so sweep trials never
/// share mutable state.
#[derive(Debug, Clone, PartialEq)]
pub struct BankGraph {
    banks: IndexMap<BankId, Bank>,
}

impl BankGraph {
    /// Validate and wrap an assembled bank map.
    ///
    /// Every exposure target must exist in the graph and no bank may be
    /// exposed to itself.
    pub fn from_banks(banks: IndexMap<BankId, Bank>) -> Result<Self, GraphError> {
        for (id, bank) in &banks {
            for target in bank.exposures.keys() {
                if target == id {
                    return Err(GraphError::SelfExposure { bank: id.clone() });
                }
                if !banks.contains_key(target) {
                    return Err(GraphError::DanglingExposure {
                        bank: id.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        Ok(Self { banks })
    }

    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Ring of `n` banks named "1".."n", each splitting `total_exposure`
    /// over its two ring neighbours.
    pub fn ring(n: usize, balance: f64, total_exposure: f64) -> Result<Self, GraphError> {
        let mut banks = IndexMap::new();
        let share = total_exposure / 2.0;

        for i in 0..n {
            let mut exposures = IndexMap::new();
            let prev = (i + n - 1) % n;
            let next = (i + 1) % n;
            *exposures.entry(name_of(next)).or_insert(0.0) += share;
            *exposures.entry(name_of(prev)).or_insert(0.0) += share;
            banks.insert(name_of(i), Bank::with_exposures(balance, exposures));
        }

        Self::from_banks(banks)
    }

    /// Fully connected mesh of `n` banks named "1".."n", each splitting
    /// `total_exposure` evenly over the `n - 1` others.
    pub fn complete(n: usize, balance: f64, total_exposure: f64) -> Result<Self, GraphError> {
        let mut banks = IndexMap::new();

        for i in 0..n {
            let mut exposures = IndexMap::new();
            if n > 1 {
                let share = total_exposure / (n - 1) as f64;
                for j in 0..n {
                    if j != i {
                        exposures.insert(name_of(j), share);
                    }
                }
            }
            banks.insert(name_of(i), Bank::with_exposures(balance, exposures));
        }

        Self::from_banks(banks)
    }

    /// Randomised network of `n` banks named "1".."n". Each bank draws its
    /// balance and its aggregate exposure from the given inclusive ranges
    /// and splits the exposure evenly over `neighbors` distinct random
    /// counterparties. `neighbors` is capped at `n - 1`. A fixed seed makes
    /// generation reproducible.
    pub fn randomized(
        n: usize,
        balance_range: (f64, f64),
        exposure_range: (f64, f64),
        neighbors: usize,
        seed: Option<[u8; 32]>,
    ) -> Result<Self, GraphError> {
        let mut rng = match seed {
            Some(seed) => StdRng::from_seed(seed),
            None => StdRng::from_entropy(),
        };

        let neighbors = neighbors.min(n.saturating_sub(1));
        let mut banks = IndexMap::new();

        for i in 0..n {
            let balance = rng.gen_range(balance_range.0..=balance_range.1);
            let total_exposure = rng.gen_range(exposure_range.0..=exposure_range.1);

            let mut exposures = IndexMap::new();
            if neighbors > 0 {
                let share = total_exposure / neighbors as f64;
                while exposures.len() < neighbors {
                    let j = rng.gen_range(0..n);
                    if j != i {
                        exposures.entry(name_of(j)).or_insert(share);
                    }
                }
            }
            banks.insert(name_of(i), Bank::with_exposures(balance, exposures));
        }

        Self::from_banks(banks)
    }

    pub fn bank(&self, id: &str) -> Option<&Bank> {
        self.banks.get(id)
    }

    pub(crate) fn bank_mut(&mut self, id: &str) -> Option<&mut Bank> {
        self.banks.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.banks.contains_key(id)
    }

    /// All banks in insertion order
    pub fn banks(&self) -> impl Iterator<Item = (&BankId, &Bank)> {
        self.banks.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &BankId> {
        self.banks.keys()
    }

    /// A bank's directed exposures in insertion order
    pub fn exposures_of(&self, id: &str) -> Option<impl Iterator<Item = (&BankId, f64)>> {
        self.banks
            .get(id)
            .map(|bank| bank.exposures.iter().map(|(target, amount)| (target, *amount)))
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }

    pub fn bankrupt_count(&self) -> usize {
        self.banks.values().filter(|bank| bank.bankrupt).count()
    }

    /// Sum of all balances, bankrupt banks included
    pub fn total_balance(&self) -> f64 {
        self.banks.values().map(|bank| bank.balance).sum()
    }
}

fn name_of(index: usize) -> BankId {
    (index + 1).to_string()
}

/// Fluent assembly of a bank graph, validated on `build`.
///
/// Both endpoints of an exposure must have been declared with `bank` before
/// `build` is called.
pub struct GraphBuilder {
    banks: IndexMap<BankId, Bank>,
    exposures: Vec<(BankId, BankId, f64)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            banks: IndexMap::new(),
            exposures: Vec::new(),
        }
    }

    pub fn bank(mut self, id: impl Into<BankId>, balance: f64) -> Self {
        self.banks.insert(id.into(), Bank::new(balance));
        self
    }

    pub fn exposure(mut self, from: impl Into<BankId>, to: impl Into<BankId>, amount: f64) -> Self {
        self.exposures.push((from.into(), to.into(), amount));
        self
    }

    pub fn build(mut self) -> Result<BankGraph, GraphError> {
        for (from, to, amount) in self.exposures {
            match self.banks.get_mut(&from) {
                Some(bank) => {
                    *bank.exposures.entry(to).or_insert(0.0) += amount;
                }
                None => {
                    return Err(GraphError::DanglingExposure { bank: from, target: to });
                }
            }
        }

        BankGraph::from_banks(self.banks)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bank_graph() -> BankGraph {
        BankGraph::builder()
            .bank("a", 1000.0)
            .bank("b", 1500.0)
            .exposure("a", "b", 400.0)
            .build()
            .unwrap()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    #[test]
    fn test_dangling_exposure_rejected() {
        let result = BankGraph::builder()
            .bank("a", 1000.0)
            .exposure("a", "missing", 100.0)
            .build();

        assert_eq!(
            result,
            Err(GraphError::DanglingExposure {
                bank: "a".to_string(),
                target: "missing".to_string(),
            })
        );
    }

    #[test]
    fn test_exposure_from_undeclared_bank_rejected() {
        let result = BankGraph::builder()
            .bank("a", 1000.0)
            .exposure("ghost", "a", 100.0)
            .build();

        assert!(matches!(result, Err(GraphError::DanglingExposure { .. })));
    }

    #[test]
    fn test_self_exposure_rejected() {
        let result = BankGraph::builder()
            .bank("a", 1000.0)
            .exposure("a", "a", 100.0)
            .build();

        assert_eq!(result, Err(GraphError::SelfExposure { bank: "a".to_string() }));
    }

    #[test]
    fn test_repeated_exposure_accumulates() {
        let graph = BankGraph::builder()
            .bank("a", 1000.0)
            .bank("b", 1000.0)
            .exposure("a", "b", 100.0)
            .exposure("a", "b", 250.0)
            .build()
            .unwrap();

        assert_eq!(graph.bank("a").unwrap().exposures["b"], 350.0);
    }

    // ========================================================================
    // Topologies
    // ========================================================================

    #[test]
    fn test_ring_topology() {
        let graph = BankGraph::ring(5, 1000.0, 5000.0).unwrap();

        assert_eq!(graph.len(), 5);
        for (id, bank) in graph.banks() {
            assert_eq!(bank.balance, 1000.0);
            assert_eq!(bank.exposures.len(), 2, "bank {} should have 2 neighbours", id);
            assert_eq!(bank.exposures.values().sum::<f64>(), 5000.0);
        }

        // bank "1" is exposed to its ring neighbours "2" and "5"
        let one = graph.bank("1").unwrap();
        assert_eq!(one.exposures["2"], 2500.0);
        assert_eq!(one.exposures["5"], 2500.0);
    }

    #[test]
    fn test_two_bank_ring_collapses_to_pair() {
        // both neighbour slots point at the single other bank
        let graph = BankGraph::ring(2, 1000.0, 5000.0).unwrap();
        assert_eq!(graph.bank("1").unwrap().exposures["2"], 5000.0);
        assert_eq!(graph.bank("2").unwrap().exposures["1"], 5000.0);
    }

    #[test]
    fn test_one_bank_ring_is_invalid() {
        assert_eq!(
            BankGraph::ring(1, 1000.0, 5000.0),
            Err(GraphError::SelfExposure { bank: "1".to_string() })
        );
    }

    #[test]
    fn test_complete_topology() {
        let graph = BankGraph::complete(5, 1000.0, 10000.0).unwrap();

        assert_eq!(graph.len(), 5);
        for (_, bank) in graph.banks() {
            assert_eq!(bank.exposures.len(), 4);
            for amount in bank.exposures.values() {
                assert_eq!(*amount, 2500.0);
            }
        }
    }

    #[test]
    fn test_randomized_topology_is_seed_reproducible() {
        let seed = Some([7u8; 32]);
        let first =
            BankGraph::randomized(8, (1000.0, 2000.0), (2000.0, 10000.0), 3, seed).unwrap();
        let second =
            BankGraph::randomized(8, (1000.0, 2000.0), (2000.0, 10000.0), 3, seed).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_randomized_topology_respects_ranges() {
        let graph =
            BankGraph::randomized(8, (1000.0, 2000.0), (2000.0, 10000.0), 3, Some([1u8; 32]))
                .unwrap();

        assert_eq!(graph.len(), 8);
        for (id, bank) in graph.banks() {
            assert!(bank.balance >= 1000.0 && bank.balance <= 2000.0);
            assert_eq!(bank.exposures.len(), 3);
            assert!(!bank.exposures.contains_key(id));

            let total: f64 = bank.exposures.values().sum();
            assert!(total >= 2000.0 - 1e-6 && total <= 10000.0 + 1e-6);
        }
    }

    #[test]
    fn test_randomized_neighbor_count_capped_at_n_minus_one() {
        let graph =
            BankGraph::randomized(3, (1000.0, 1000.0), (5000.0, 5000.0), 10, Some([2u8; 32]))
                .unwrap();

        for (_, bank) in graph.banks() {
            assert_eq!(bank.exposures.len(), 2);
        }
    }

    #[test]
    fn test_enumeration_is_insertion_ordered() {
        let graph = BankGraph::ring(5, 1000.0, 5000.0).unwrap();
        let ids: Vec<&BankId> = graph.ids().collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    // ========================================================================
    // Clone isolation
    // ========================================================================

    #[test]
    fn test_clone_is_deeply_independent() {
        let source = two_bank_graph();
        let mut cloned = source.clone();

        {
            let bank = cloned.bank_mut("a").unwrap();
            bank.balance = -500.0;
            bank.bankrupt = true;
            bank.exposures.insert("b".to_string(), 9999.0);
        }

        let original = source.bank("a").unwrap();
        assert_eq!(original.balance, 1000.0);
        assert!(!original.bankrupt);
        assert_eq!(original.exposures["b"], 400.0);
    }

    #[test]
    fn test_totals() {
        let graph = two_bank_graph();
        assert_eq!(graph.total_balance(), 2500.0);
        assert_eq!(graph.bankrupt_count(), 0);
    }
}
