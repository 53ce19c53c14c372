// Contagion Scenario Configuration
//
// YAML scenario schema, parsed with serde. A scenario names a network (an
// explicit bank map or a generated topology), the shock coefficients, the
// initially-defaulted bank, optional cascade policy overrides and an
// optional sweep section that switches the run into grid-comparison mode.

use indexmap::IndexMap;

use bc_rust::{
    Bank, BankGraph, BankId, CascadePolicy, Coefficients, DefaultDetection, GraphError,
    ParamRange, RuinThreshold,
};

/// Scenario file format
#[derive(Debug, serde::Deserialize)]
pub struct ScenarioFile {
    /// Scenario metadata
    #[serde(default)]
    pub meta: ScenarioMeta,

    /// The network the stress test runs over
    pub graph: GraphSpec,

    /// Shock transmission parameters
    pub coefficients: CoefficientsSpec,

    /// Cascade policy overrides (optional)
    #[serde(default)]
    pub policy: PolicySpec,

    /// The bank declared bankrupt at the start of the run
    pub initial_default: BankId,

    /// Narrate every event to the console during a single stress test
    #[serde(default = "default_narrate")]
    pub narrate: bool,

    /// Present switches the run into sweep mode
    #[serde(default)]
    pub sweep: Option<SweepSpec>,
}

fn default_narrate() -> bool {
    true
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ScenarioMeta {
    pub name: Option<String>,
    pub description: Option<String>,
    pub hypothesis: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct GraphSpec {
    pub topology: TopologySpec,
}

/// How the scenario's bank network is assembled
#[derive(Debug, Clone, serde::Deserialize)]
pub enum TopologySpec {
    /// Bank-by-bank balances and exposure maps
    Explicit { banks: IndexMap<BankId, BankSpec> },

    /// Banks "1".."n" in a cycle, total exposure split over the two
    /// ring neighbours
    Ring {
        banks: usize,
        balance: f64,
        total_exposure: f64,
    },

    /// Fully connected mesh, total exposure split over all others
    Complete {
        banks: usize,
        balance: f64,
        total_exposure: f64,
    },

    /// Balances and exposures drawn from ranges, counterparties picked at
    /// random. A seed (hex string) makes generation reproducible.
    Randomized {
        banks: usize,
        balance_range: (f64, f64),
        exposure_range: (f64, f64),
        neighbors: usize,
        #[serde(default)]
        seed: Option<String>,
    },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct BankSpec {
    pub balance: f64,

    #[serde(default)]
    pub exposures: IndexMap<BankId, f64>,
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct CoefficientsSpec {
    pub lambda_c: f64,
    pub lambda_f: f64,

    #[serde(default)]
    pub panic_enabled: bool,

    #[serde(default)]
    pub panic_rate: f64,
}

impl From<CoefficientsSpec> for Coefficients {
    fn from(spec: CoefficientsSpec) -> Self {
        Self {
            lambda_c: spec.lambda_c,
            lambda_f: spec.lambda_f,
            panic_enabled: spec.panic_enabled,
            panic_rate: spec.panic_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
pub struct PolicySpec {
    #[serde(default)]
    pub ruin: RuinSpec,

    #[serde(default)]
    pub detection: DetectionSpec,
}

#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuinSpec {
    #[default]
    Strict,
    Inclusive,
}

#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSpec {
    #[default]
    EndOfRound,
    Immediate,
}

impl From<PolicySpec> for CascadePolicy {
    fn from(spec: PolicySpec) -> Self {
        Self {
            ruin: match spec.ruin {
                RuinSpec::Strict => RuinThreshold::Strict,
                RuinSpec::Inclusive => RuinThreshold::Inclusive,
            },
            detection: match spec.detection {
                DetectionSpec::EndOfRound => DefaultDetection::EndOfRound,
                DetectionSpec::Immediate => DefaultDetection::Immediate,
            },
        }
    }
}

/// Grid-comparison section: stress both the scenario graph and the
/// alternative over every (p, lambda) cell
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SweepSpec {
    /// Template B of the comparison; the scenario's graph is template A
    pub alternative: GraphSpec,

    pub p_range: RangeSpec,
    pub lambda_range: RangeSpec,
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct RangeSpec {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl From<RangeSpec> for ParamRange {
    fn from(spec: RangeSpec) -> Self {
        ParamRange::new(spec.start, spec.end, spec.step)
    }
}

/// Turn a graph spec into a validated graph. A command-line seed override
/// beats the seed embedded in a randomised spec.
pub fn build_graph(
    spec: &GraphSpec,
    seed_override: Option<[u8; 32]>,
) -> Result<BankGraph, GraphError> {
    match &spec.topology {
        TopologySpec::Explicit { banks } => {
            let mut map = IndexMap::new();
            for (id, bank) in banks {
                map.insert(
                    id.clone(),
                    Bank::with_exposures(bank.balance, bank.exposures.clone()),
                );
            }
            BankGraph::from_banks(map)
        }
        TopologySpec::Ring {
            banks,
            balance,
            total_exposure,
        } => BankGraph::ring(*banks, *balance, *total_exposure),
        TopologySpec::Complete {
            banks,
            balance,
            total_exposure,
        } => BankGraph::complete(*banks, *balance, *total_exposure),
        TopologySpec::Randomized {
            banks,
            balance_range,
            exposure_range,
            neighbors,
            seed,
        } => {
            let seed = seed_override.or_else(|| seed.as_deref().map(parse_seed_hex));
            BankGraph::randomized(*banks, *balance_range, *exposure_range, *neighbors, seed)
        }
    }
}

pub fn parse_seed_hex(hex: &str) -> [u8; 32] {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    let mut seed = [0u8; 32];

    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        if i >= 32 {
            break;
        }
        let byte_str = std::str::from_utf8(chunk).unwrap();
        seed[i] = u8::from_str_radix(byte_str, 16).unwrap_or_else(|e| {
            eprintln!("Invalid hex seed: {}", e);
            std::process::exit(1);
        });
    }

    seed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_scenario_round_trips_into_a_graph() {
        let yaml = r#"
meta:
  name: Ring under panic
graph:
  topology: !Ring { banks: 5, balance: 1000.0, total_exposure: 5000.0 }
coefficients:
  lambda_c: 0.5
  lambda_f: 0.5
  panic_enabled: true
  panic_rate: 0.7
initial_default: "1"
"#;
        let scenario: ScenarioFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenario.meta.name.as_deref(), Some("Ring under panic"));
        assert_eq!(scenario.initial_default, "1");
        assert!(scenario.narrate, "narration is on unless turned off");
        assert!(scenario.sweep.is_none());

        let coefficients = Coefficients::from(scenario.coefficients);
        assert!(coefficients.panic_enabled);
        assert_eq!(coefficients.panic_rate, 0.7);

        let graph = build_graph(&scenario.graph, None).unwrap();
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.bank("1").unwrap().exposures["2"], 2500.0);
    }

    #[test]
    fn test_explicit_scenario_with_policy_overrides() {
        let yaml = r#"
graph:
  topology: !Explicit
    banks:
      a: { balance: 1000.0, exposures: { b: 400.0 } }
      b: { balance: 1500.0 }
coefficients:
  lambda_c: 0.4
  lambda_f: 0.6
policy:
  ruin: inclusive
  detection: immediate
initial_default: a
narrate: false
"#;
        let scenario: ScenarioFile = serde_yaml::from_str(yaml).unwrap();

        let policy = CascadePolicy::from(scenario.policy);
        assert_eq!(policy.ruin, RuinThreshold::Inclusive);
        assert_eq!(policy.detection, DefaultDetection::Immediate);
        assert!(!scenario.narrate);

        // panic fields default off when omitted
        let coefficients = Coefficients::from(scenario.coefficients);
        assert!(!coefficients.panic_enabled);
        assert_eq!(coefficients.panic_rate, 0.0);

        let graph = build_graph(&scenario.graph, None).unwrap();
        assert_eq!(graph.bank("a").unwrap().exposures["b"], 400.0);
        assert!(graph.bank("b").unwrap().exposures.is_empty());
    }

    #[test]
    fn test_explicit_scenario_validation_failure_surfaces() {
        let yaml = r#"
graph:
  topology: !Explicit
    banks:
      a: { balance: 1000.0, exposures: { ghost: 400.0 } }
coefficients:
  lambda_c: 0.5
  lambda_f: 0.5
initial_default: a
"#;
        let scenario: ScenarioFile = serde_yaml::from_str(yaml).unwrap();
        let result = build_graph(&scenario.graph, None);
        assert_eq!(
            result,
            Err(GraphError::DanglingExposure {
                bank: "a".to_string(),
                target: "ghost".to_string(),
            })
        );
    }

    #[test]
    fn test_sweep_scenario() {
        let yaml = r#"
graph:
  topology: !Complete { banks: 5, balance: 1000.0, total_exposure: 10000.0 }
coefficients:
  lambda_c: 0.5
  lambda_f: 0.5
  panic_enabled: true
  panic_rate: 0.5
initial_default: "1"
sweep:
  alternative:
    topology: !Ring { banks: 5, balance: 1000.0, total_exposure: 10000.0 }
  p_range: { start: 0.1, end: 1.0, step: 0.1 }
  lambda_range: { start: 0.1, end: 1.0, step: 0.1 }
"#;
        let scenario: ScenarioFile = serde_yaml::from_str(yaml).unwrap();
        let sweep = scenario.sweep.unwrap();

        let p_range = ParamRange::from(sweep.p_range);
        assert_eq!(p_range.values().len(), 10);

        let alternative = build_graph(&sweep.alternative, None).unwrap();
        assert_eq!(alternative.bank("1").unwrap().exposures.len(), 2);
    }

    #[test]
    fn test_randomized_scenario_seed_override_wins() {
        let yaml = r#"
graph:
  topology: !Randomized
    banks: 6
    balance_range: [1000.0, 2000.0]
    exposure_range: [2000.0, 10000.0]
    neighbors: 2
    seed: "0x11"
coefficients:
  lambda_c: 0.3
  lambda_f: 0.3
initial_default: "1"
"#;
        let scenario: ScenarioFile = serde_yaml::from_str(yaml).unwrap();

        let embedded = build_graph(&scenario.graph, None).unwrap();
        let embedded_again = build_graph(&scenario.graph, None).unwrap();
        assert_eq!(embedded, embedded_again);

        let overridden = build_graph(&scenario.graph, Some([9u8; 32])).unwrap();
        let expected = BankGraph::randomized(
            6,
            (1000.0, 2000.0),
            (2000.0, 10000.0),
            2,
            Some([9u8; 32]),
        )
        .unwrap();
        assert_eq!(overridden, expected);
    }

    #[test]
    fn test_parse_seed_hex() {
        let seed = parse_seed_hex("0xdeadbeef");
        assert_eq!(&seed[..4], &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(&seed[4..], &[0u8; 28]);
    }
}
