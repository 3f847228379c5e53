//! # Cyclesim - Cycle Collisions in Onion-Relayed Circuit Establishment
//!
//! Simulates a Diffie-Hellman style, onion-relayed circuit-establishment
//! protocol over random directed graphs and measures how often a node ends up
//! sharing the same key along two different legs, i.e. how often a handshake
//! closes a cycle back through its initiator.
//!
//! ## Architecture
//!
//! ```text
//!   Config ──> GroupParams::generate ──> Sweep
//!                                          │  for (n, degree)
//!                                          v
//!                 Topology::{scale_free, uniform, read_edge_list}
//!                                          │
//!                                          v
//!                  Simulator ── for ttl ──> RunSummary ──> RunRecord ──> ReportWriter
//!                     │
//!                     └─ per root: FIFO cascade of Forward / Backward / Publish / Broadcast
//! ```
//!
//! ## Modules
//!
//! | Module       | Purpose                                             |
//! |--------------|-----------------------------------------------------|
//! | [`group`]    | Prime-order subgroup generation and mod-exp         |
//! | [`graph`]    | Directed topologies and their generators            |
//! | [`protocol`] | Messages, per-node tables and the node automaton    |
//! | [`sim`]      | Per-root cascades, counters and cycle dedup         |
//! | [`sweep`]    | Parameter sweep producing one record per run        |
//! | [`report`]   | CSV / JSON-lines result files                       |
//! | [`config`]   | TOML + environment configuration                    |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cyclesim::{GroupParams, SimulationConfig, Simulator, Topology};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let params = GroupParams::generate(20, 8, &mut rng)?;
//! let graph = Topology::scale_free(3, 3, 50, &mut rng)?;
//!
//! let mut sim = Simulator::new(&graph.topology, params, SimulationConfig::default(), rng);
//! let summary = sim.run(3)?;
//! println!("{} cycles over {} messages", summary.distinct_cycles(), summary.total_messages());
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod group;
pub mod protocol;
pub mod report;
pub mod sim;
pub mod sweep;

// Re-exports for convenience
pub use config::{Config, NodeStatePolicy, OutputFormat, SimulationConfig};
pub use error::{Result, SimError};
pub use graph::{GeneratedTopology, NodeId, Topology};
pub use group::GroupParams;
pub use protocol::{Message, MessageKind, Node};
pub use report::{ReportWriter, CSV_HEADER};
pub use sim::{CycleSet, MessageCounts, RunSummary, Simulator};
pub use sweep::{RunRecord, Sweep};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
