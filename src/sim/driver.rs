//! Message-cascade driver.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::Rng;

use super::stats::{CycleSet, MessageCounts};
use crate::config::{NodeStatePolicy, SimulationConfig};
use crate::error::{Result, SimError};
use crate::graph::{NodeId, Topology};
use crate::group::GroupParams;
use crate::protocol::{Message, Node};

/// Outcome of one root's cascade.
#[derive(Debug, Clone, Default)]
pub struct RootOutcome {
    /// Root that initiated the cascade
    pub root: NodeId,
    /// Messages processed, by kind
    pub counts: MessageCounts,
    /// Cycles broadcast during this cascade
    pub cycles: CycleSet,
    /// Largest queue length observed
    pub peak_queue_len: usize,
}

/// Aggregate of one run over every root.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// ttl the run used
    pub ttl: u32,
    /// Messages processed, by kind
    pub counts: MessageCounts,
    /// Distinct cycles across all roots
    pub cycles: CycleSet,
    /// Edges over cycles that were new to the run
    pub cycle_edge_count: usize,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Number of distinct cycles
    pub fn distinct_cycles(&self) -> usize {
        self.cycles.len()
    }

    /// Total messages processed
    pub fn total_messages(&self) -> u64 {
        self.counts.total()
    }
}

/// Runs the protocol over a topology, one FIFO cascade per root.
///
/// Nodes persist across roots and, under [`NodeStatePolicy::Accumulate`],
/// across runs: later roots see the keys and routes earlier roots left behind,
/// which is what makes inter-root cycles observable.
pub struct Simulator<R> {
    nodes: Vec<Node>,
    params: GroupParams,
    config: SimulationConfig,
    rng: R,
}

impl<R: Rng> Simulator<R> {
    /// Create a simulator with one fresh node per vertex.
    pub fn new(topology: &Topology, params: GroupParams, config: SimulationConfig, rng: R) -> Self {
        let nodes = topology
            .iter()
            .map(|(id, neighbours)| Node::new(id, neighbours.to_vec(), params))
            .collect();
        Self {
            nodes,
            params,
            config,
            rng,
        }
    }

    /// Group parameters shared by every node
    pub fn params(&self) -> &GroupParams {
        &self.params
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether there are no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// A node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Clear the protocol state of every node.
    pub fn reset_nodes(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }

    /// Run one cascade per root, in id order, and aggregate the results.
    pub fn run(&mut self, ttl: u32) -> Result<RunSummary> {
        if self.config.node_state == NodeStatePolicy::ResetPerRun {
            self.reset_nodes();
        }

        let started = Instant::now();
        let mut summary = RunSummary {
            ttl,
            ..RunSummary::default()
        };

        for root in 0..self.nodes.len() {
            let outcome = self.run_root(root, ttl)?;
            tracing::debug!(
                root,
                messages = outcome.counts.total(),
                cycles = outcome.cycles.len(),
                peak_queue = outcome.peak_queue_len,
                "root cascade drained"
            );
            summary.counts += outcome.counts;
            summary.cycle_edge_count += summary.cycles.merge(outcome.cycles);
        }

        summary.elapsed = started.elapsed();
        Ok(summary)
    }

    /// Run the cascade started by `root` until its queue drains.
    pub fn run_root(&mut self, root: NodeId, ttl: u32) -> Result<RootOutcome> {
        let count = self.nodes.len();
        let node = self
            .nodes
            .get_mut(root)
            .ok_or_else(|| SimError::Config(format!("root {root} outside 0..{count}")))?;

        let mut queue: VecDeque<Message> = node.initiate(ttl, &mut self.rng).into();
        let mut outcome = RootOutcome {
            root,
            peak_queue_len: queue.len(),
            ..RootOutcome::default()
        };
        self.check_capacity(root, queue.len())?;

        while let Some(msg) = queue.pop_front() {
            outcome.counts.record(msg.kind());
            if let Message::Broadcast { path } = &msg {
                outcome.cycles.insert(path);
            }

            tracing::trace!(%msg, "dispatch");
            queue.extend(self.dispatch(&msg));

            outcome.peak_queue_len = outcome.peak_queue_len.max(queue.len());
            self.check_capacity(root, queue.len())?;
        }

        Ok(outcome)
    }

    fn check_capacity(&self, root: NodeId, queue_len: usize) -> Result<()> {
        if queue_len <= self.config.max_queue_len {
            return Ok(());
        }
        tracing::warn!(
            root,
            queue_len,
            limit = self.config.max_queue_len,
            "message queue over capacity, aborting run"
        );
        Err(SimError::Capacity {
            root,
            limit: self.config.max_queue_len,
        })
    }

    /// Deliver a message to its target's handler (or every node for a broadcast).
    fn dispatch(&mut self, msg: &Message) -> Vec<Message> {
        match msg {
            Message::Forward { target, .. } => match self.nodes.get_mut(*target) {
                Some(node) => node.on_forward(msg, &mut self.rng),
                None => Vec::new(),
            },
            Message::Backward { target, .. } => match self.nodes.get_mut(*target) {
                Some(node) => node.on_backward(msg),
                None => Vec::new(),
            },
            Message::Publish { target, .. } => match self.nodes.get(*target) {
                Some(node) => node.on_publish(msg),
                None => Vec::new(),
            },
            Message::Broadcast { .. } => {
                for node in &self.nodes {
                    node.on_broadcast(msg);
                }
                Vec::new()
            },
        }
    }
}
