//! Per-vertex protocol automaton.
//!
//! Each handler consumes one message and returns the messages it emits. None
//! of them fail: a message that matches no pending state is not meaningful to
//! this node and yields nothing.
//!
//! ## Blinding
//!
//! ```text
//!   A ── F(g^x) ──> B ── F(g^(x·kB)) ──> C          forward: each relay blinds with its key
//!   A <─ B(g^(y·kB)) ─ B <── B(g^y) ──── C          backward: each relay blinds the reply
//! ```
//!
//! `A` ends up with `(g^(y·kB))^x` and `C` learned `(g^(x·kB))^y`: the same
//! value. When the relayed Forward loops back to the initiator itself, the
//! initiator learns that value twice, once as responder and once as
//! initiator. That coincidence is a cycle.

use std::collections::HashSet;

use rand::Rng;

use super::message::Message;
use super::state::{InitiationTable, PendingInitiation, Route, RouteTable};
use crate::graph::NodeId;
use crate::group::{Element, GroupParams};

/// Protocol state of one vertex.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    params: GroupParams,
    out_neighbours: Vec<NodeId>,
    learned_keys: Vec<Element>,
    known_keys: HashSet<Element>,
    initiations: InitiationTable,
    routes: RouteTable,
}

impl Node {
    /// Create a node with empty protocol state.
    pub fn new(id: NodeId, out_neighbours: Vec<NodeId>, params: GroupParams) -> Self {
        Self {
            id,
            params,
            out_neighbours,
            learned_keys: Vec::new(),
            known_keys: HashSet::new(),
            initiations: InitiationTable::default(),
            routes: RouteTable::default(),
        }
    }

    /// Vertex id
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Outgoing neighbours, in emission order
    pub fn out_neighbours(&self) -> &[NodeId] {
        &self.out_neighbours
    }

    /// Shared values learned so far, in learning order (may repeat)
    pub fn learned_keys(&self) -> &[Element] {
        &self.learned_keys
    }

    /// Whether `key` was learned
    pub fn knows_key(&self, key: Element) -> bool {
        self.known_keys.contains(&key)
    }

    /// Handshake legs started by this node
    pub fn pending_initiations(&self) -> &[PendingInitiation] {
        self.initiations.as_slice()
    }

    /// Relay routes kept by this node
    pub fn pending_routes(&self) -> &[Route] {
        self.routes.as_slice()
    }

    /// Drop all learned keys, initiations and routes.
    pub fn reset(&mut self) {
        self.learned_keys.clear();
        self.known_keys.clear();
        self.initiations.clear();
        self.routes.clear();
    }

    /// Start one handshake leg toward every outgoing neighbour.
    ///
    /// Emitted Forwards carry `ttl - 1`; a ttl of 0 is treated as 1.
    pub fn initiate<R: Rng + ?Sized>(&mut self, ttl: u32, rng: &mut R) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.out_neighbours.len());
        for &target in &self.out_neighbours {
            let secret = self.params.sample_element(rng);
            let nonce = self.params.sample_element(rng);
            self.initiations.push(PendingInitiation { secret, nonce });

            messages.push(Message::Forward {
                source: self.id,
                target,
                nonce,
                gx: self.params.pow_g(secret),
                ttl: ttl.saturating_sub(1),
            });
        }
        messages
    }

    /// Respond to a Forward and, while ttl remains, relay it blinded to every neighbour.
    pub fn on_forward<R: Rng + ?Sized>(&mut self, msg: &Message, rng: &mut R) -> Vec<Message> {
        let Message::Forward { source, nonce, gx, ttl, .. } = *msg else {
            return Vec::new();
        };

        let y = self.params.sample_element(rng);
        self.learn(self.params.pow(gx, y));

        let mut messages = Vec::with_capacity(self.out_neighbours.len() + 1);
        messages.push(Message::Backward {
            source: self.id,
            target: source,
            nonce,
            gx: self.params.pow_g(y),
        });
        if ttl == 0 {
            return messages;
        }

        for &target in &self.out_neighbours {
            let route = Route {
                source_id: source,
                source_nonce: nonce,
                target_id: target,
                target_nonce: self.params.sample_element(rng),
                forward_gx: gx,
                backward_gx: None,
                blinding_key: self.params.sample_element(rng),
            };
            self.routes.push(route);

            messages.push(Message::Forward {
                source: self.id,
                target,
                nonce: route.target_nonce,
                gx: self.params.pow(gx, route.blinding_key),
                ttl: ttl - 1,
            });
        }
        messages
    }

    /// Complete one of our own handshakes, or pass a reply one hop back along a route.
    pub fn on_backward(&mut self, msg: &Message) -> Vec<Message> {
        let Message::Backward { source, nonce, gx, .. } = *msg else {
            return Vec::new();
        };

        if let Some(&initiation) = self.initiations.find(nonce) {
            let candidate = self.params.pow(gx, initiation.secret);
            let mut messages = Vec::new();
            if self.knows_key(candidate) {
                tracing::trace!(node = self.id, nonce, "key coincidence, publishing cycle");
                messages.push(Message::Publish {
                    source: self.id,
                    target: source,
                    nonce,
                    gx,
                    path: vec![self.id],
                });
            }
            self.learn(candidate);
            return messages;
        }

        let Some(route) = self.routes.find_by_target_nonce_mut(nonce) else {
            return Vec::new();
        };
        route.backward_gx = Some(gx);
        vec![Message::Backward {
            source: self.id,
            target: route.source_id,
            nonce: route.source_nonce,
            gx: self.params.pow(gx, route.blinding_key),
        }]
    }

    /// Extend a cycle announcement and pass it along the matching forward routes,
    /// or close it with a Broadcast once it is back at the discovering node.
    pub fn on_publish(&self, msg: &Message) -> Vec<Message> {
        let Message::Publish { nonce, gx, ref path, .. } = *msg else {
            return Vec::new();
        };

        let mut extended = Vec::with_capacity(path.len() + 1);
        extended.extend_from_slice(path);
        extended.push(self.id);

        if path.first() == Some(&self.id) {
            return vec![Message::Broadcast { path: extended }];
        }

        self.routes
            .with_source_nonce(nonce)
            .filter_map(|route| {
                let backward_gx = route.backward_gx?;
                (self.params.pow(backward_gx, route.blinding_key) == gx).then(|| {
                    Message::Publish {
                        source: self.id,
                        target: route.target_id,
                        nonce: route.target_nonce,
                        gx: backward_gx,
                        path: extended.clone(),
                    }
                })
            })
            .collect()
    }

    /// Topology-learning hook; currently ignores the record.
    pub fn on_broadcast(&self, _msg: &Message) {}

    fn learn(&mut self, key: Element) {
        self.learned_keys.push(key);
        self.known_keys.insert(key);
    }
}
