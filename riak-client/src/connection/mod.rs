//! Connections to individual Riak nodes: the protocol engine over one
//! socket, the per-node bounded pool, and the legacy HTTP transport.

mod connection;
mod pool;
mod rest;

pub use connection::{Connection, ConnectionId};
pub use pool::{Acquire, NodePool};
pub use rest::RestTransport;
