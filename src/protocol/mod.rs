//! Circuit-establishment protocol: messages, bookkeeping and the node automaton.
//!
//! Every vertex runs the same automaton. A root node starts one handshake leg
//! per outgoing neighbour; every receiver answers with a Diffie-Hellman reply
//! and, while ttl remains, relays the leg onward under a fresh blinding key.
//! Replies travel back one hop at a time, each relay adding its blinding layer.
//!
//! # Message Flow
//!
//! ```text
//!  initiator            relay                 responder
//!     |                   |                       |
//!     |-- Forward(g^x) -->|                       |
//!     |<-- Backward(g^y1)-|-- Forward(g^(x·k)) -->|
//!     |                   |<---- Backward(g^y2) --|
//!     |<- Backward(g^(y2·k))                      |
//!     |                   |                       |
//!     |   (key seen before => cycle)              |
//!     |-- Publish([A]) -->|-- Publish([A,R]) ---->|  ... back to A
//!     |                                           |
//!     |=========== Broadcast([A,R,...,A]) ========|
//! ```
//!
//! # Handlers
//!
//! | Handler        | Input     | Emits                                  |
//! |----------------|-----------|----------------------------------------|
//! | `initiate`     | ttl       | one Forward per neighbour              |
//! | `on_forward`   | Forward   | one Backward, plus relays if ttl > 0   |
//! | `on_backward`  | Backward  | Publish on key coincidence, or relay   |
//! | `on_publish`   | Publish   | Broadcast at origin, or matching legs  |
//! | `on_broadcast` | Broadcast | nothing                                |

mod message;
mod node;
mod state;

pub use message::{path_key, Message, MessageKind, Nonce};
pub use node::Node;
pub use state::{InitiationTable, PendingInitiation, Route, RouteTable};
