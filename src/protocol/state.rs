//! Per-node bookkeeping: pending initiations and relay routes.
//!
//! Both stores are append-only within a run. Lookups return the *first*
//! entry recorded under a nonce, which is what a front-to-back scan would
//! find; the nonce index only makes that scan O(1).

use std::collections::HashMap;

use serde::Serialize;

use super::message::Nonce;
use crate::graph::NodeId;
use crate::group::Element;

/// Secret exponent and nonce of a handshake leg this node started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingInitiation {
    /// Secret exponent `x` (the Forward carried `g^x`)
    pub secret: Element,
    /// Leg nonce
    pub nonce: Nonce,
}

/// State a relay keeps for a Forward it re-emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Node the Forward came from; the Backward returns there
    pub source_id: NodeId,
    /// Nonce of the incoming leg
    pub source_nonce: Nonce,
    /// Node the relayed Forward went to
    pub target_id: NodeId,
    /// Fresh nonce of the relayed leg
    pub target_nonce: Nonce,
    /// Unblinded `gx` received on the incoming leg
    pub forward_gx: Element,
    /// `gx` of the Backward that came back on the relayed leg, once seen
    pub backward_gx: Option<Element>,
    /// Blinding exponent applied to the relayed leg
    pub blinding_key: Element,
}

/// Pending initiations keyed by nonce.
#[derive(Debug, Clone, Default)]
pub struct InitiationTable {
    entries: Vec<PendingInitiation>,
    by_nonce: HashMap<Nonce, usize>,
}

impl InitiationTable {
    /// Record a new initiation.
    pub fn push(&mut self, initiation: PendingInitiation) {
        self.by_nonce
            .entry(initiation.nonce)
            .or_insert(self.entries.len());
        self.entries.push(initiation);
    }

    /// First initiation recorded under `nonce`.
    pub fn find(&self, nonce: Nonce) -> Option<&PendingInitiation> {
        self.by_nonce.get(&nonce).map(|&i| &self.entries[i])
    }

    /// Number of recorded initiations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn as_slice(&self) -> &[PendingInitiation] {
        &self.entries
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_nonce.clear();
    }
}

/// Relay routes, indexed by the relayed leg's nonce (Backward lookup) and by
/// the incoming leg's nonce (Publish lookup).
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    by_target_nonce: HashMap<Nonce, usize>,
    by_source_nonce: HashMap<Nonce, Vec<usize>>,
}

impl RouteTable {
    /// Record a new route.
    pub fn push(&mut self, route: Route) {
        let index = self.routes.len();
        self.by_target_nonce.entry(route.target_nonce).or_insert(index);
        self.by_source_nonce
            .entry(route.source_nonce)
            .or_default()
            .push(index);
        self.routes.push(route);
    }

    /// First route whose relayed leg used `nonce`.
    pub fn find_by_target_nonce_mut(&mut self, nonce: Nonce) -> Option<&mut Route> {
        let index = *self.by_target_nonce.get(&nonce)?;
        self.routes.get_mut(index)
    }

    /// All routes whose incoming leg used `nonce`, in insertion order.
    pub fn with_source_nonce(&self, nonce: Nonce) -> impl Iterator<Item = &Route> {
        self.by_source_nonce
            .get(&nonce)
            .into_iter()
            .flatten()
            .map(|&i| &self.routes[i])
    }

    /// Number of recorded routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes in insertion order.
    pub fn as_slice(&self) -> &[Route] {
        &self.routes
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.routes.clear();
        self.by_target_nonce.clear();
        self.by_source_nonce.clear();
    }
}
