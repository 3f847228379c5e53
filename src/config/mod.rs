//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (applied by the binary on top of the above)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::group::MAX_MODULUS_BITS;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Group parameter generation
    #[serde(default)]
    pub group: GroupConfig,

    /// Parameter sweep ranges
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Simulation driver settings
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Report output
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| SimError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| SimError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `CYCLESIM_*` environment variables on top of this config
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(seed) = std::env::var("CYCLESIM_SEED") {
            if let Ok(seed) = seed.parse() {
                self.simulation.seed = Some(seed);
            }
        }
        if let Ok(limit) = std::env::var("CYCLESIM_MAX_QUEUE") {
            if let Ok(limit) = limit.parse() {
                self.simulation.max_queue_len = limit;
            }
        }
        if let Ok(reset) = std::env::var("CYCLESIM_RESET_NODES") {
            if let Ok(true) = reset.parse::<bool>() {
                self.simulation.node_state = NodeStatePolicy::ResetPerRun;
            }
        }
        if let Ok(dir) = std::env::var("CYCLESIM_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }

        self
    }

    /// Check ranges and sizes before any simulation starts
    pub fn validate(&self) -> Result<()> {
        let group = &self.group;
        if group.q_bits < 3 || group.r_bits == 0 || group.q_bits + group.r_bits > MAX_MODULUS_BITS {
            return Err(SimError::Config(format!(
                "group sizes q_bits={}, r_bits={} out of range",
                group.q_bits, group.r_bits
            )));
        }

        let sweep = &self.sweep;
        if sweep.nodes_min > sweep.nodes_max
            || sweep.degree_min > sweep.degree_max
            || sweep.ttl_min > sweep.ttl_max
        {
            return Err(SimError::Config(
                "sweep ranges must have min <= max".to_string(),
            ));
        }
        if sweep.ttl_min == 0 {
            return Err(SimError::Config("ttl_min must be at least 1".to_string()));
        }
        if sweep.edge_list.is_none() {
            if sweep.nodes_min < 2 {
                return Err(SimError::Config("nodes_min must be at least 2".to_string()));
            }
            if sweep.model == GraphModel::ScaleFree
                && (sweep.degree_min == 0 || sweep.degree_max > sweep.nodes_min)
            {
                return Err(SimError::Config(format!(
                    "scale-free degrees must lie in 1..={} (nodes_min)",
                    sweep.nodes_min
                )));
            }
            if sweep.model == GraphModel::Uniform && sweep.degree_max > sweep.nodes_min - 2 {
                return Err(SimError::Config(format!(
                    "uniform degrees must not exceed {} (nodes_min - 2)",
                    sweep.nodes_min - 2
                )));
            }
        }

        if self.simulation.max_queue_len == 0 {
            return Err(SimError::Config("max_queue_len must be positive".to_string()));
        }
        Ok(())
    }
}

/// Group parameter sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Bits of the subgroup order q
    pub q_bits: u32,

    /// Cofactor r is drawn from [2, 2^r_bits]
    pub r_bits: u32,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            q_bits: 20,
            r_bits: 8,
        }
    }
}

/// Random graph model used by the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphModel {
    /// Barabási–Albert growth with m0 = m = degree
    #[default]
    ScaleFree,
    /// Uniform out-degree in [degree, degree + uniform_spread]
    Uniform,
}

/// Edge-list input replacing the generated graphs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeListConfig {
    /// File of `u,v` lines
    pub path: PathBuf,

    /// Out-degree cap per vertex
    pub max_neighbours: usize,

    /// Largest vertex id kept
    pub max_node: usize,
}

/// Parameter sweep ranges (all inclusive)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Smallest graph size
    pub nodes_min: usize,

    /// Largest graph size
    pub nodes_max: usize,

    /// Smallest degree parameter
    pub degree_min: usize,

    /// Largest degree parameter
    pub degree_max: usize,

    /// Smallest ttl (search depth)
    pub ttl_min: u32,

    /// Largest ttl
    pub ttl_max: u32,

    /// Repetitions of the whole sweep
    pub iterations: usize,

    /// Graph model
    #[serde(default)]
    pub model: GraphModel,

    /// Extra out-degree range for the uniform model
    #[serde(default)]
    pub uniform_spread: usize,

    /// Use an edge list instead of generated graphs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_list: Option<EdgeListConfig>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            nodes_min: 50,
            nodes_max: 50,
            degree_min: 3,
            degree_max: 9,
            ttl_min: 2,
            ttl_max: 4,
            iterations: 1,
            model: GraphModel::ScaleFree,
            uniform_spread: 0,
            edge_list: None,
        }
    }
}

impl SweepConfig {
    /// Number of `RunRecord`s a full sweep produces
    pub fn record_count(&self) -> usize {
        let ttls = if self.ttl_min > self.ttl_max {
            0
        } else {
            (self.ttl_max - self.ttl_min) as usize + 1
        };
        if self.edge_list.is_some() {
            return self.iterations * ttls;
        }
        let sizes = inclusive_len(self.nodes_min, self.nodes_max);
        let degrees = inclusive_len(self.degree_min, self.degree_max);
        self.iterations * sizes * degrees * ttls
    }
}

fn inclusive_len(min: usize, max: usize) -> usize {
    if min > max {
        0
    } else {
        max - min + 1
    }
}

/// What happens to node state between successive runs on the same nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatePolicy {
    /// Keys, initiations and routes carry over to the next ttl
    #[default]
    Accumulate,
    /// Every run starts from empty node state
    ResetPerRun,
}

/// Simulation driver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Live message queue limit per root
    pub max_queue_len: usize,

    /// Node state between runs
    #[serde(default)]
    pub node_state: NodeStatePolicy,

    /// RNG seed (entropy when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_queue_len: 5_000_000,
            node_state: NodeStatePolicy::Accumulate,
            seed: None,
        }
    }
}

/// Report file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// One JSON object per line
    Json,
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for report files
    pub dir: PathBuf,

    /// File format
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: dirs::data_local_dir()
                .map(|p| p.join("cyclesim"))
                .unwrap_or_else(|| PathBuf::from("output")),
            format: OutputFormat::Csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.group.q_bits, 20);
        assert_eq!(config.sweep.ttl_min, 2);
        assert_eq!(config.sweep.ttl_max, 4);
        assert_eq!(config.simulation.node_state, NodeStatePolicy::Accumulate);
        assert_eq!(config.output.format, OutputFormat::Csv);
        config.validate().unwrap();
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [group]
            q_bits = 30
            r_bits = 10

            [sweep]
            nodes_min = 10
            nodes_max = 12
            degree_min = 2
            degree_max = 3
            ttl_min = 1
            ttl_max = 3
            iterations = 2
            model = "uniform"
            uniform_spread = 2

            [simulation]
            max_queue_len = 1000
            node_state = "reset_per_run"
            seed = 7

            [output]
            dir = "/tmp/cyclesim"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.group.q_bits, 30);
        assert_eq!(config.sweep.model, GraphModel::Uniform);
        assert_eq!(config.sweep.record_count(), 2 * 3 * 2 * 3);
        assert_eq!(config.simulation.node_state, NodeStatePolicy::ResetPerRun);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.output.format, OutputFormat::Json);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[simulation]\nmax_queue_len = 10\n").unwrap();
        assert_eq!(config.simulation.max_queue_len, 10);
        assert_eq!(config.simulation.node_state, NodeStatePolicy::Accumulate);
        assert_eq!(config.sweep.nodes_min, 50);
    }

    #[test]
    fn test_edge_list_section() {
        let toml = r#"
            [sweep]
            nodes_min = 0
            nodes_max = 0
            degree_min = 0
            degree_max = 0
            ttl_min = 2
            ttl_max = 4
            iterations = 1

            [sweep.edge_list]
            path = "transaction_data.csv"
            max_neighbours = 1
            max_node = 1000
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.sweep.record_count(), 3);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut config = Config::default();
        config.sweep.ttl_min = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sweep.degree_max = 60;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.group.q_bits = 60;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sweep.model = GraphModel::Uniform;
        config.sweep.nodes_min = 5;
        config.sweep.nodes_max = 5;
        config.sweep.degree_min = 3;
        config.sweep.degree_max = 4;
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
        config.sweep.degree_max = 3;
        config.validate().unwrap();

        let mut config = Config::default();
        config.simulation.max_queue_len = 0;
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
    }

    #[test]
    fn test_record_count_of_empty_ranges() {
        let mut config = Config::default();
        config.sweep.ttl_min = 5;
        config.sweep.ttl_max = 4;
        assert_eq!(config.sweep.record_count(), 0);

        let mut config = Config::default();
        config.sweep.nodes_min = 60;
        assert_eq!(config.sweep.record_count(), 0);

        let mut config = Config::default();
        config.sweep.degree_min = 10;
        assert_eq!(config.sweep.record_count(), 0);
    }

    #[test]
    fn test_from_file_reports_missing_file() {
        let err = Config::from_file("/nonexistent/cyclesim.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
