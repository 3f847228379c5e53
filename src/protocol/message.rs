//! Protocol messages.
//!
//! Four immutable variants with distinct direction semantics:
//!
//! | Kind        | Direction                          | Carries                     |
//! |-------------|------------------------------------|-----------------------------|
//! | `Forward`   | outward, one hop per relay         | blinded `g^x`, remaining ttl|
//! | `Backward`  | toward the initiator, un-blinding  | `g^y` (blinded per hop)     |
//! | `Publish`   | along the forward path again       | discovery path so far       |
//! | `Broadcast` | to every node                      | the finished cycle path     |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;
use crate::group::Element;

/// Per-leg correlation identifier.
pub type Nonce = u64;

/// Message kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Outbound handshake leg
    Forward,
    /// Acknowledgment leg
    Backward,
    /// Cycle announcement leg
    Publish,
    /// Terminal cycle record
    Broadcast,
}

impl MessageKind {
    /// All kinds, in counter order.
    pub const ALL: [MessageKind; 4] = [
        MessageKind::Forward,
        MessageKind::Backward,
        MessageKind::Publish,
        MessageKind::Broadcast,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            MessageKind::Forward => "forward",
            MessageKind::Backward => "backward",
            MessageKind::Publish => "publish",
            MessageKind::Broadcast => "broadcast",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// Outbound handshake leg
    Forward {
        /// Sender
        source: NodeId,
        /// Recipient
        target: NodeId,
        /// Leg nonce
        nonce: Nonce,
        /// (Blinded) `g^x`
        gx: Element,
        /// Remaining relay hops
        ttl: u32,
    },
    /// Acknowledgment leg
    Backward {
        /// Sender
        source: NodeId,
        /// Recipient
        target: NodeId,
        /// Nonce of the leg being acknowledged
        nonce: Nonce,
        /// Responder's `g^y`, blinded once per relay it crossed
        gx: Element,
    },
    /// Cycle announcement leg
    Publish {
        /// Sender
        source: NodeId,
        /// Recipient
        target: NodeId,
        /// Nonce the recipient keyed its route under
        nonce: Nonce,
        /// Value the recipient un-blinds to match its route
        gx: Element,
        /// Node ids visited since discovery
        path: Vec<NodeId>,
    },
    /// Terminal cycle record, delivered to all nodes
    Broadcast {
        /// Full cycle, starting and ending at the discovering node
        path: Vec<NodeId>,
    },
}

impl Message {
    /// Kind tag
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Forward { .. } => MessageKind::Forward,
            Message::Backward { .. } => MessageKind::Backward,
            Message::Publish { .. } => MessageKind::Publish,
            Message::Broadcast { .. } => MessageKind::Broadcast,
        }
    }

    /// Human-readable kind label
    pub fn label(&self) -> &'static str {
        self.kind().label()
    }

    /// Recipient, or `None` for a broadcast.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            Message::Forward { target, .. }
            | Message::Backward { target, .. }
            | Message::Publish { target, .. } => Some(*target),
            Message::Broadcast { .. } => None,
        }
    }

    /// Carried path (empty for Forward/Backward).
    pub fn path(&self) -> &[NodeId] {
        match self {
            Message::Publish { path, .. } | Message::Broadcast { path } => path,
            Message::Forward { .. } | Message::Backward { .. } => &[],
        }
    }

    /// Space-joined path, the cycle deduplication key.
    pub fn path_key(&self) -> String {
        path_key(self.path())
    }
}

/// Space-joined node ids; empty for an empty path.
pub fn path_key(path: &[NodeId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Forward { source, target, nonce, gx, ttl } => write!(
                f,
                "[{source:02}->{target:02}] (t=f, r={nonce}, gx={gx}, l={ttl})"
            ),
            Message::Backward { source, target, nonce, gx } => {
                write!(f, "[{source:02}->{target:02}] (t=b, r={nonce}, gx={gx})")
            },
            Message::Publish { source, target, nonce, path, .. } => write!(
                f,
                "[{source:02}->{target:02}] (t=p, r={nonce}, path={{ {} }})",
                path_key(path)
            ),
            Message::Broadcast { path } => write!(f, "[BRDC] (path={{ {} }})", path_key(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_labels() {
        let forward = Message::Forward { source: 0, target: 1, nonce: 5, gx: 9, ttl: 2 };
        let broadcast = Message::Broadcast { path: vec![0, 1, 0] };

        assert_eq!(forward.kind(), MessageKind::Forward);
        assert_eq!(forward.label(), "forward");
        assert_eq!(broadcast.label(), "broadcast");
        assert_eq!(
            MessageKind::ALL.map(MessageKind::label),
            ["forward", "backward", "publish", "broadcast"]
        );
    }

    #[test]
    fn test_path_only_on_publish_and_broadcast() {
        let backward = Message::Backward { source: 1, target: 0, nonce: 5, gx: 9 };
        let publish = Message::Publish { source: 0, target: 1, nonce: 5, gx: 9, path: vec![0] };

        assert!(backward.path().is_empty());
        assert_eq!(backward.path_key(), "");
        assert_eq!(publish.path(), &[0]);
        assert_eq!(Message::Broadcast { path: vec![3, 12, 7, 3] }.path_key(), "3 12 7 3");
    }

    #[test]
    fn test_targets() {
        assert_eq!(
            Message::Backward { source: 1, target: 0, nonce: 5, gx: 9 }.target(),
            Some(0)
        );
        assert_eq!(Message::Broadcast { path: vec![1] }.target(), None);
    }

    #[test]
    fn test_display_trace_format() {
        let forward = Message::Forward { source: 3, target: 12, nonce: 5, gx: 9, ttl: 1 };
        assert_eq!(forward.to_string(), "[03->12] (t=f, r=5, gx=9, l=1)");

        let publish = Message::Publish { source: 0, target: 1, nonce: 5, gx: 9, path: vec![0, 1] };
        assert_eq!(publish.to_string(), "[00->01] (t=p, r=5, path={ 0 1 })");

        let broadcast = Message::Broadcast { path: vec![0, 1, 0] };
        assert_eq!(broadcast.to_string(), "[BRDC] (path={ 0 1 0 })");
    }

    #[test]
    fn test_json_tagging() {
        let msg = Message::Backward { source: 1, target: 0, nonce: 5, gx: 9 };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"backward\""));
        let parsed: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }
}
