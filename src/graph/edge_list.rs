//! Reader for `u,v` edge-list files (e.g. exported transaction graphs).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{NodeId, Topology};
use crate::error::{Result, SimError};

impl Topology {
    /// Read a topology from lines of two comma-separated vertex ids.
    ///
    /// Edges touching a vertex above `max_node` are skipped, each vertex keeps
    /// at most `max_neighbours` outgoing edges (first come, first kept), and
    /// self-loops and repeated edges are dropped so the result satisfies the
    /// provider contract. Blank lines are ignored.
    pub fn read_edge_list<R: BufRead>(
        reader: R,
        max_neighbours: usize,
        max_node: NodeId,
    ) -> Result<Self> {
        let mut adjacency: Vec<Vec<NodeId>> = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (source, target) = parse_edge(line)
                .ok_or_else(|| SimError::Graph(format!("line {}: expected `u,v`, got `{line}`", line_no + 1)))?;
            if source > max_node || target > max_node {
                continue;
            }

            let needed = source.max(target) + 1;
            if adjacency.len() < needed {
                adjacency.resize_with(needed, Vec::new);
            }

            let neighbours = &mut adjacency[source];
            if source != target && neighbours.len() < max_neighbours && !neighbours.contains(&target) {
                neighbours.push(target);
            }
        }

        Self::from_adjacency(adjacency)
    }

    /// Open and read an edge-list file.
    pub fn read_edge_list_file(
        path: impl AsRef<Path>,
        max_neighbours: usize,
        max_node: NodeId,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            SimError::Graph(format!("Failed to open edge list {}: {e}", path.display()))
        })?;
        Self::read_edge_list(BufReader::new(file), max_neighbours, max_node)
    }
}

fn parse_edge(line: &str) -> Option<(NodeId, NodeId)> {
    let (source, target) = line.split_once(',')?;
    Some((source.trim().parse().ok()?, target.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_reads_edges_in_order() {
        let input = "0,1\n0,2\n1,2\n\n2,0\n";
        let topology = Topology::read_edge_list(Cursor::new(input), 10, 100).unwrap();
        assert_eq!(topology.len(), 3);
        assert_eq!(topology.neighbours(0), &[1, 2]);
        assert_eq!(topology.neighbours(2), &[0]);
    }

    #[test]
    fn test_caps_neighbours_and_node_range() {
        let input = "0,1\n0,2\n0,3\n1,9\n1,0\n";
        let topology = Topology::read_edge_list(Cursor::new(input), 2, 5).unwrap();
        assert_eq!(topology.neighbours(0), &[1, 2]);
        assert_eq!(topology.neighbours(1), &[0]);
        // vertex 3 was referenced before the cap dropped its edge
        assert_eq!(topology.len(), 4);
    }

    #[test]
    fn test_drops_self_loops_and_duplicates() {
        let input = "0,0\n0,1\n0,1\n1,0\n";
        let topology = Topology::read_edge_list(Cursor::new(input), 10, 10).unwrap();
        assert_eq!(topology.neighbours(0), &[1]);
        assert_eq!(topology.edge_count(), 2);
    }

    #[test]
    fn test_rejects_malformed_line() {
        let result = Topology::read_edge_list(Cursor::new("0,1\nbogus\n"), 10, 10);
        assert!(matches!(result, Err(SimError::Graph(msg)) if msg.contains("line 2")));
    }

    #[test]
    fn test_reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0,1").unwrap();
        writeln!(file, "1,0").unwrap();

        let topology = Topology::read_edge_list_file(file.path(), 4, 100).unwrap();
        assert_eq!(topology.edge_count(), 2);
        assert!(Topology::read_edge_list_file("/nonexistent/edges.csv", 4, 100).is_err());
    }
}
