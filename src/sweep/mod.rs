//! Parameter sweep over graph size, degree and ttl.
//!
//! ```text
//! for iteration in 0..iterations
//!   for n in nodes_min..=nodes_max
//!     for degree in degree_min..=degree_max
//!       topology  = generate(n, degree)          one simulator per (n, degree)
//!       for ttl in ttl_min..=ttl_max
//!         record  = simulator.run(ttl)           nodes reused across ttl
//! ```
//!
//! With an edge-list source the two graph loops collapse into a single
//! topology read once per iteration.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{Config, GraphModel};
use crate::error::Result;
use crate::graph::{GeneratedTopology, Topology};
use crate::group::GroupParams;
use crate::sim::{RunSummary, Simulator};

/// Result of one (graph, ttl) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Graph size
    pub n: usize,
    /// Edge-weight parameter of the generator
    pub edge_param: usize,
    /// Mean degree
    pub avg_degree: f64,
    /// ttl (search depth)
    pub ttl: u32,
    /// Distinct cycles
    pub distinct_cycles: usize,
    /// Edges over distinct cycles
    pub cycle_edge_count: usize,
    /// All messages processed
    pub total_messages: u64,
    /// Forward messages
    pub forward_count: u64,
    /// Backward messages
    pub backward_count: u64,
    /// Publish messages
    pub publish_count: u64,
    /// Broadcast messages
    pub broadcast_count: u64,
    /// Wall-clock time of the run
    pub elapsed_millis: u64,
}

impl RunRecord {
    /// Build a record from a run over `graph`.
    pub fn new(graph: &GeneratedTopology, summary: &RunSummary) -> Self {
        Self {
            n: graph.topology.len(),
            edge_param: graph.edge_param,
            avg_degree: graph.avg_degree,
            ttl: summary.ttl,
            distinct_cycles: summary.distinct_cycles(),
            cycle_edge_count: summary.cycle_edge_count,
            total_messages: summary.total_messages(),
            forward_count: summary.counts.forward,
            backward_count: summary.counts.backward,
            publish_count: summary.counts.publish,
            broadcast_count: summary.counts.broadcast,
            elapsed_millis: summary.elapsed.as_millis() as u64,
        }
    }
}

/// A configured sweep.
#[derive(Debug, Clone)]
pub struct Sweep {
    config: Config,
    params: GroupParams,
}

impl Sweep {
    /// Validate `config` and bind it to group parameters.
    pub fn new(config: Config, params: GroupParams) -> Result<Self> {
        config.validate()?;
        params.validate()?;
        Ok(Self { config, params })
    }

    /// Group parameters used by every simulator
    pub fn params(&self) -> &GroupParams {
        &self.params
    }

    /// Run the sweep, handing each record to `sink` as soon as it exists.
    pub fn run<R, F>(&self, rng: &mut R, mut sink: F) -> Result<Vec<RunRecord>>
    where
        R: Rng + ?Sized,
        F: FnMut(&RunRecord) -> Result<()>,
    {
        let sweep = &self.config.sweep;
        let mut records = Vec::with_capacity(sweep.record_count());

        for iteration in 0..sweep.iterations {
            tracing::debug!(iteration, "sweep iteration");

            if let Some(edge_list) = &sweep.edge_list {
                let topology = Topology::read_edge_list_file(
                    &edge_list.path,
                    edge_list.max_neighbours,
                    edge_list.max_node,
                )?;
                let graph = GeneratedTopology::from_topology(topology);
                self.run_graph(&graph, rng, &mut records, &mut sink)?;
                continue;
            }

            for n in sweep.nodes_min..=sweep.nodes_max {
                for degree in sweep.degree_min..=sweep.degree_max {
                    let graph = match sweep.model {
                        GraphModel::ScaleFree => Topology::scale_free(degree, degree, n, rng)?,
                        GraphModel::Uniform => {
                            Topology::uniform(n, degree, degree + sweep.uniform_spread, rng)?
                        },
                    };
                    self.run_graph(&graph, rng, &mut records, &mut sink)?;
                }
            }
        }

        Ok(records)
    }

    /// Run every ttl on one topology, reusing its nodes.
    fn run_graph<R, F>(
        &self,
        graph: &GeneratedTopology,
        rng: &mut R,
        records: &mut Vec<RunRecord>,
        sink: &mut F,
    ) -> Result<()>
    where
        R: Rng + ?Sized,
        F: FnMut(&RunRecord) -> Result<()>,
    {
        tracing::debug!(
            graph = ?graph.summary(),
            cyclic = graph.topology.has_directed_cycle(),
            max_degree = graph.topology.max_out_degree(),
            "topology ready"
        );

        let mut simulator = Simulator::new(
            &graph.topology,
            self.params,
            self.config.simulation.clone(),
            StdRng::seed_from_u64(rng.gen()),
        );

        let sweep = &self.config.sweep;
        for ttl in sweep.ttl_min..=sweep.ttl_max {
            let summary = simulator.run(ttl)?;
            let record = RunRecord::new(graph, &summary);
            tracing::info!(
                n = record.n,
                m = record.edge_param,
                d_avg = format_args!("{:.2}", record.avg_degree),
                l = record.ttl,
                n_cyc = record.distinct_cycles,
                c_edge = record.cycle_edge_count,
                n_msg = record.total_messages,
                n_for = record.forward_count,
                n_echo = record.backward_count,
                n_pub = record.publish_count,
                n_brd = record.broadcast_count,
                t_ms = record.elapsed_millis,
                "run complete"
            );
            sink(&record)?;
            records.push(record);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EdgeListConfig, NodeStatePolicy};
    use crate::error::SimError;
    use rand_chacha::ChaCha8Rng;
    use std::io::Write;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.sweep.nodes_min = 8;
        config.sweep.nodes_max = 9;
        config.sweep.degree_min = 1;
        config.sweep.degree_max = 2;
        config.sweep.ttl_min = 1;
        config.sweep.ttl_max = 3;
        config
    }

    fn params(rng: &mut ChaCha8Rng) -> GroupParams {
        GroupParams::generate(40, 8, rng).unwrap()
    }

    #[test]
    fn test_sweep_emits_one_record_per_configuration() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let sweep = Sweep::new(small_config(), params(&mut rng)).unwrap();

        let mut streamed = 0;
        let records = sweep
            .run(&mut rng, |_| {
                streamed += 1;
                Ok(())
            })
            .unwrap();

        assert_eq!(records.len(), 2 * 2 * 3);
        assert_eq!(streamed, records.len());
        assert_eq!(records[0].n, 8);
        assert_eq!(records[0].ttl, 1);
        assert_eq!(records[2].ttl, 3);
        for record in &records {
            assert_eq!(
                record.total_messages,
                record.forward_count
                    + record.backward_count
                    + record.publish_count
                    + record.broadcast_count
            );
            assert!(record.forward_count > 0);
        }
    }

    #[test]
    fn test_sweep_stops_on_sink_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let sweep = Sweep::new(small_config(), params(&mut rng)).unwrap();
        let result = sweep.run(&mut rng, |_| Err(SimError::Config("disk full".to_string())));
        assert!(result.is_err());
    }

    #[test]
    fn test_sweep_rejects_invalid_config() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut config = small_config();
        config.sweep.ttl_min = 4;
        assert!(Sweep::new(config, params(&mut rng)).is_err());
    }

    #[test]
    fn test_sweep_rejects_uniform_degree_above_graph_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut config = small_config();
        config.sweep.model = GraphModel::Uniform;
        config.sweep.nodes_min = 5;
        config.sweep.nodes_max = 5;
        config.sweep.degree_min = 3;
        config.sweep.degree_max = 4;
        config.sweep.ttl_min = 1;
        config.sweep.ttl_max = 2;

        let result = Sweep::new(config, params(&mut rng));
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn test_sweep_over_edge_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0,1\n1,2\n2,0\n1,0").unwrap();

        let mut config = small_config();
        config.sweep.edge_list = Some(EdgeListConfig {
            path: file.path().to_path_buf(),
            max_neighbours: 4,
            max_node: 100,
        });
        config.simulation.node_state = NodeStatePolicy::ResetPerRun;

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let sweep = Sweep::new(config, params(&mut rng)).unwrap();
        let records = sweep.run(&mut rng, |_| Ok(())).unwrap();

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.n == 3 && r.edge_param == 4));
    }
}
