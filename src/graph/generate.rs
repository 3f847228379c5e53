//! Random topology generators.

use std::collections::HashSet;

use petgraph::graph::{DiGraph, NodeIndex};
use rand::Rng;

use super::{NodeId, Topology};
use crate::error::{Result, SimError};

/// A generated topology with the parameters reported alongside results.
#[derive(Debug, Clone)]
pub struct GeneratedTopology {
    /// The validated topology.
    pub topology: Topology,
    /// Edge-weight parameter reported as `m` (total degree or nominal edge count).
    pub edge_param: usize,
    /// Mean degree as reported by the generator.
    pub avg_degree: f64,
}

/// Summary of a generated topology for logging.
#[derive(Debug, Clone, Copy)]
pub struct GeneratedSummary {
    /// Vertex count.
    pub n: usize,
    /// Edge-weight parameter.
    pub edge_param: usize,
    /// Mean degree.
    pub avg_degree: f64,
}

impl GeneratedTopology {
    /// Summary without the adjacency.
    pub fn summary(&self) -> GeneratedSummary {
        GeneratedSummary {
            n: self.topology.len(),
            edge_param: self.edge_param,
            avg_degree: self.avg_degree,
        }
    }

    /// Wrap an externally sourced topology, reporting its real edge count.
    pub fn from_topology(topology: Topology) -> Self {
        Self {
            edge_param: topology.edge_count(),
            avg_degree: topology.average_degree(),
            topology,
        }
    }
}

impl Topology {
    /// Random digraph where every vertex draws its out-degree uniformly from
    /// `[min_degree, min(n - 2, max_degree)]` and picks that many distinct
    /// non-self targets.
    pub fn uniform<R: Rng + ?Sized>(
        n: usize,
        min_degree: usize,
        max_degree: usize,
        rng: &mut R,
    ) -> Result<GeneratedTopology> {
        let upper = max_degree.min(n.saturating_sub(2));
        if n < 2 || min_degree > upper {
            return Err(SimError::Config(format!(
                "uniform graph needs n >= 2 and min_degree <= min(n - 2, max_degree); \
                 got n={n}, min_degree={min_degree}, max_degree={max_degree}"
            )));
        }

        let mut adjacency = Vec::with_capacity(n);
        let mut degree_sum = 0;
        for id in 0..n {
            let degree = rng.gen_range(min_degree..=upper);
            degree_sum += degree;

            let mut seen = HashSet::with_capacity(degree);
            let mut neighbours = Vec::with_capacity(degree);
            while neighbours.len() < degree {
                let target = rng.gen_range(0..n);
                if target != id && seen.insert(target) {
                    neighbours.push(target);
                }
            }
            adjacency.push(neighbours);
        }

        Ok(GeneratedTopology {
            topology: Self::from_adjacency(adjacency)?,
            edge_param: degree_sum,
            avg_degree: degree_sum as f64 / n as f64,
        })
    }

    /// Barabási–Albert style growth: `m0` seed vertices form a complete
    /// digraph, then every new vertex links to `m` distinct earlier vertices,
    /// each link oriented at random.
    ///
    /// The reported edge parameter is the nominal count `m0(m0-1) + m(n-m0)`.
    pub fn scale_free<R: Rng + ?Sized>(
        m0: usize,
        m: usize,
        n: usize,
        rng: &mut R,
    ) -> Result<GeneratedTopology> {
        if m0 == 0 || m > m0 || m0 > n {
            return Err(SimError::Config(format!(
                "scale-free graph needs 0 < m <= m0 <= n; got m0={m0}, m={m}, n={n}"
            )));
        }

        let mut graph: DiGraph<NodeId, ()> = DiGraph::with_capacity(n, m0 * m0 + m * n);
        let nodes: Vec<NodeIndex> = (0..n).map(|id| graph.add_node(id)).collect();

        for i in 0..m0 {
            for j in 0..m0 {
                if i != j {
                    graph.add_edge(nodes[i], nodes[j], ());
                }
            }
        }

        for i in m0..n {
            let mut seen = HashSet::with_capacity(m);
            while seen.len() < m {
                let k = rng.gen_range(0..i);
                if !seen.insert(k) {
                    continue;
                }
                if rng.gen_bool(0.5) {
                    graph.add_edge(nodes[i], nodes[k], ());
                } else {
                    graph.add_edge(nodes[k], nodes[i], ());
                }
            }
        }

        let edge_param = m0 * (m0 - 1) + m * (n - m0);
        Ok(GeneratedTopology {
            topology: Self::from_digraph(&graph)?,
            edge_param,
            avg_degree: edge_param as f64 / n as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_uniform_degrees_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let generated = Topology::uniform(30, 2, 5, &mut rng).unwrap();

        assert_eq!(generated.topology.len(), 30);
        assert_eq!(generated.edge_param, generated.topology.edge_count());
        for (_, neighbours) in generated.topology.iter() {
            assert!((2..=5).contains(&neighbours.len()));
        }
        let expected = generated.edge_param as f64 / 30.0;
        assert!((generated.avg_degree - expected).abs() < 1e-9);
    }

    #[test]
    fn test_uniform_caps_degree_at_n_minus_two() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let generated = Topology::uniform(5, 0, 100, &mut rng).unwrap();
        assert!(generated.topology.max_out_degree() <= 3);
    }

    #[test]
    fn test_uniform_rejects_impossible_degree() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(Topology::uniform(4, 3, 3, &mut rng).is_err());
        assert!(Topology::uniform(1, 0, 0, &mut rng).is_err());
    }

    #[test]
    fn test_scale_free_edge_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let generated = Topology::scale_free(4, 3, 40, &mut rng).unwrap();

        assert_eq!(generated.topology.len(), 40);
        assert_eq!(generated.edge_param, 4 * 3 + 3 * 36);
        assert_eq!(generated.topology.edge_count(), generated.edge_param);
        // seed vertices form a complete digraph
        for i in 0..4 {
            for j in 0..4 {
                if i != j {
                    assert!(generated.topology.neighbours(i).contains(&j));
                }
            }
        }
    }

    #[test]
    fn test_scale_free_rejects_bad_parameters() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert!(Topology::scale_free(0, 0, 10, &mut rng).is_err());
        assert!(Topology::scale_free(3, 4, 10, &mut rng).is_err());
        assert!(Topology::scale_free(12, 3, 10, &mut rng).is_err());
    }

    #[test]
    fn test_from_topology_reports_real_counts() {
        let topology = Topology::from_adjacency(vec![vec![1], vec![0], vec![0, 1]]).unwrap();
        let generated = GeneratedTopology::from_topology(topology);
        assert_eq!(generated.edge_param, 4);
        assert!((generated.avg_degree - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(generated.summary().n, 3);
    }
}
