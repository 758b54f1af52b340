//! A single cluster member: its configuration, connection pool, REST
//! transport, and health state.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use riak_core::Result;

use crate::config::NodeConfig;
use crate::connection::{Acquire, Connection, NodePool, RestTransport};

/// One Riak node as seen by the dispatcher.
///
/// Health state is a cool-down timestamp: a node marked offline is
/// skipped by node selection until the window elapses, after which it
/// becomes eligible again with no explicit recovery step.
#[derive(Debug)]
pub struct Node {
    config: NodeConfig,
    pool: NodePool,
    rest: RestTransport,
    offline_until: Mutex<Option<Instant>>,
}

impl Node {
    /// Creates a node with an empty pool.
    pub fn new(config: NodeConfig) -> Result<Self> {
        let pool = NodePool::new(config.pool_size(), config.idle_timeout());
        let rest = RestTransport::new(&config)?;
        Ok(Self {
            config,
            pool,
            rest,
            offline_until: Mutex::new(None),
        })
    }

    /// Returns the node's display name.
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// Returns the REST transport for this node.
    pub fn rest(&self) -> &RestTransport {
        &self.rest
    }

    /// Returns `true` if the node may be selected for an operation.
    ///
    /// An expired cool-down is cleared as a side effect.
    pub fn is_eligible(&self) -> bool {
        let mut offline = self.offline_until.lock().expect("node lock poisoned");
        match *offline {
            Some(until) if Instant::now() < until => false,
            Some(_) => {
                *offline = None;
                tracing::debug!(node = %self.name(), "cool-down elapsed, node eligible again");
                true
            }
            None => true,
        }
    }

    /// Marks the node offline for the given cool-down window.
    pub fn mark_offline(&self, cooldown: Duration) {
        let mut offline = self.offline_until.lock().expect("node lock poisoned");
        *offline = Some(Instant::now() + cooldown);
        tracing::warn!(node = %self.name(), cooldown = ?cooldown, "node marked offline");
    }

    /// Borrows a connection, creating one lazily under capacity.
    ///
    /// Returns `Ok(None)` when the pool is exhausted.
    pub async fn checkout(&self) -> Result<Option<Connection>> {
        match self.pool.try_acquire()? {
            Acquire::Idle(conn) => Ok(Some(conn)),
            Acquire::Permit => match Connection::connect(&self.config).await {
                Ok(conn) => {
                    self.pool.commit_new();
                    Ok(Some(conn))
                }
                Err(e) => {
                    self.pool.abort_new();
                    Err(e)
                }
            },
            Acquire::Exhausted => Ok(None),
        }
    }

    /// Returns a borrowed connection to the pool.
    pub fn give_back(&self, conn: Connection, healthy: bool) {
        self.pool.release(conn, healthy);
    }

    /// Drains the node's pool.
    pub fn drain(&self) {
        self.pool.drain();
    }

    /// Returns the number of live pooled connections.
    pub fn live_connections(&self) -> usize {
        self.pool.live_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_node() -> Node {
        let config = NodeConfig::builder("127.0.0.1")
            .pool_size(1)
            .build()
            .unwrap();
        Node::new(config).unwrap()
    }

    #[test]
    fn test_node_starts_eligible() {
        let node = test_node();
        assert!(node.is_eligible());
    }

    #[test]
    fn test_mark_offline_suppresses_eligibility() {
        let node = test_node();
        node.mark_offline(Duration::from_secs(60));
        assert!(!node.is_eligible());
    }

    #[test]
    fn test_cooldown_expires() {
        let node = test_node();
        node.mark_offline(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(20));
        assert!(node.is_eligible());
        // The expired window is cleared, not just bypassed.
        assert!(node.offline_until.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_checkout_exhausted_returns_none() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                let _ = listener.accept().await;
            }
        });

        let config = NodeConfig::builder("127.0.0.1")
            .pb_port(port)
            .pool_size(1)
            .connect_timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        let node = Node::new(config).unwrap();

        let held = node.checkout().await.unwrap().unwrap();
        assert!(node.checkout().await.unwrap().is_none());

        node.give_back(held, true);
        assert!(node.checkout().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_checkout_connect_failure_is_error() {
        let config = NodeConfig::builder("127.0.0.1")
            .pb_port(1)
            .connect_timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let node = Node::new(config).unwrap();

        let err = node.checkout().await.unwrap_err();
        assert!(err.marks_node_offline());
        assert_eq!(node.live_connections(), 0);
    }
}
