//! Cluster dispatcher: node selection, bounded retry, and connection
//! borrowing.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use riak_core::{Result, RiakError};

use super::node::Node;
use crate::config::ClusterConfig;
use crate::connection::Connection;

/// The cluster dispatcher.
///
/// Holds the immutable node list, selects an eligible node per operation
/// in round-robin order, and retries retryable failures on the next
/// eligible node (preferring nodes not yet tried by this operation)
/// until the retry budget or the candidate set runs out.
#[derive(Debug)]
pub struct Cluster {
    nodes: Vec<Arc<Node>>,
    cursor: AtomicUsize,
    retries: u32,
    cooldown: Duration,
    shutting_down: AtomicBool,
}

impl Cluster {
    /// Builds the dispatcher from a cluster configuration.
    pub fn new(config: ClusterConfig) -> Result<Self> {
        let nodes = config
            .nodes()
            .iter()
            .cloned()
            .map(|node_config| Node::new(node_config).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            nodes,
            cursor: AtomicUsize::new(0),
            retries: config.retries(),
            cooldown: config.node_cooldown(),
            shutting_down: AtomicBool::new(false),
        })
    }

    /// Returns the configured retry count.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Drains every node pool and fails subsequent operations with
    /// [`RiakError::ShuttingDown`].
    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::Release);
        for node in &self.nodes {
            node.drain();
        }
        tracing::info!("cluster dispatcher shut down");
    }

    /// Picks the next eligible node, preferring ones this operation has
    /// not tried yet. Returns `None` when no eligible node remains.
    ///
    /// The shared round-robin cursor doubles as least-recently-used
    /// tie-breaking: each selection advances it, so consecutive
    /// operations spread across the eligible nodes.
    fn next_eligible(&self, tried: &[bool]) -> Option<usize> {
        let len = self.nodes.len();
        let start = self.cursor.fetch_add(1, Ordering::Relaxed);

        let mut fallback = None;
        for offset in 0..len {
            let idx = (start + offset) % len;
            if !self.nodes[idx].is_eligible() {
                continue;
            }
            if !tried[idx] {
                return Some(idx);
            }
            if fallback.is_none() {
                fallback = Some(idx);
            }
        }
        fallback
    }

    /// Core borrow-run loop. On success returns the node, the still
    /// borrowed connection, and the operation's value; the caller decides
    /// how the connection is released.
    async fn dispatch<T, F, Fut>(&self, retries: u32, op: F) -> Result<(Arc<Node>, Connection, T)>
    where
        F: Fn(Connection) -> Fut,
        Fut: Future<Output = (Connection, Result<T>)>,
    {
        if self.is_shutting_down() {
            return Err(RiakError::ShuttingDown);
        }

        let mut tried = vec![false; self.nodes.len()];
        let mut last_err: Option<RiakError> = None;
        let mut failures = 0u32;

        loop {
            let Some(idx) = self.next_eligible(&tried) else {
                break;
            };
            tried[idx] = true;
            let node = Arc::clone(&self.nodes[idx]);

            let conn = match node.checkout().await {
                Ok(Some(conn)) => conn,
                Ok(None) => {
                    tracing::debug!(node = %node.name(), "pool exhausted");
                    last_err = Some(RiakError::NoConnections);
                    failures += 1;
                    if failures > retries {
                        break;
                    }
                    continue;
                }
                Err(e @ RiakError::ShuttingDown) => return Err(e),
                Err(e) => {
                    if e.marks_node_offline() {
                        node.mark_offline(self.cooldown);
                    }
                    tracing::debug!(node = %node.name(), error = %e, "checkout failed");
                    last_err = Some(e);
                    failures += 1;
                    if failures > retries {
                        break;
                    }
                    continue;
                }
            };

            let (conn, result) = op(conn).await;
            match result {
                Ok(value) => return Ok((node, conn, value)),
                Err(e) => {
                    node.give_back(conn, !e.marks_node_offline());
                    if e.marks_node_offline() {
                        node.mark_offline(self.cooldown);
                    }
                    if !e.is_retryable() {
                        return Err(e);
                    }
                    tracing::debug!(node = %node.name(), error = %e, "operation failed, retrying");
                    last_err = Some(e);
                    failures += 1;
                    if failures > retries {
                        break;
                    }
                }
            }
        }

        Err(last_err.unwrap_or(RiakError::NoConnections))
    }

    /// Runs a single operation on a borrowed connection, releasing it on
    /// return.
    ///
    /// The operation receives the connection by value and must hand it
    /// back alongside its result; this keeps one borrower per connection
    /// by construction.
    pub async fn use_connection<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn(Connection) -> Fut,
        Fut: Future<Output = (Connection, Result<T>)>,
    {
        let (node, conn, value) = self.dispatch(self.retries, op).await?;
        node.give_back(conn, true);
        Ok(value)
    }

    /// Borrows a connection whose release is deferred: `setup` runs on it
    /// (typically writing a streaming request), then the still-borrowed
    /// connection is returned as a [`PinnedConnection`] guard. The guard
    /// releases exactly once, on [`PinnedConnection::release`] or drop.
    pub async fn pin_connection<F, Fut>(&self, retries: u32, setup: F) -> Result<PinnedConnection>
    where
        F: Fn(Connection) -> Fut,
        Fut: Future<Output = (Connection, Result<()>)>,
    {
        let (node, conn, ()) = self.dispatch(retries, setup).await?;
        Ok(PinnedConnection {
            conn: Some(conn),
            node,
            cooldown: self.cooldown,
        })
    }

    /// Runs an operation against a node's REST transport with the same
    /// eligibility, retry, and offline-marking rules as the binary path.
    pub async fn use_rest<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn(Arc<Node>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.is_shutting_down() {
            return Err(RiakError::ShuttingDown);
        }

        let mut tried = vec![false; self.nodes.len()];
        let mut last_err: Option<RiakError> = None;
        let mut failures = 0u32;

        loop {
            let Some(idx) = self.next_eligible(&tried) else {
                break;
            };
            tried[idx] = true;
            let node = Arc::clone(&self.nodes[idx]);

            match op(Arc::clone(&node)).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if e.marks_node_offline() {
                        node.mark_offline(self.cooldown);
                    }
                    if !e.is_retryable() {
                        return Err(e);
                    }
                    last_err = Some(e);
                    failures += 1;
                    if failures > self.retries {
                        break;
                    }
                }
            }
        }

        Err(last_err.unwrap_or(RiakError::NoConnections))
    }

    #[cfg(test)]
    pub(crate) fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }
}

/// A connection held out of its pool past the dispatcher call that
/// borrowed it.
///
/// Streaming results and batch sessions own one of these; the underlying
/// connection returns to its pool exactly once — explicitly via
/// [`release`](Self::release), or on drop.
#[derive(Debug)]
pub struct PinnedConnection {
    conn: Option<Connection>,
    node: Arc<Node>,
    cooldown: Duration,
}

impl PinnedConnection {
    /// Returns the pinned connection.
    ///
    /// # Panics
    ///
    /// Panics if called after [`release`](Self::release).
    pub fn conn(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("connection already released")
    }

    /// Applies an error's node-health consequence: a failure that marks
    /// nodes offline puts this connection's node in cool-down.
    pub fn fault(&self, err: &RiakError) {
        if err.marks_node_offline() {
            self.node.mark_offline(self.cooldown);
        }
    }

    /// Returns the connection to its pool. Idempotent; also invoked on
    /// drop.
    ///
    /// A connection still mid-request (an abandoned stream, a cancelled
    /// operation) is discarded rather than reused: with no request ids
    /// on the wire, leftover response frames would desynchronize the
    /// next borrower.
    pub fn release(&mut self) {
        if let Some(conn) = self.conn.take() {
            let healthy = conn.is_reusable();
            self.node.give_back(conn, healthy);
        }
    }
}

impl Drop for PinnedConnection {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use bytes::Bytes;
    use riak_core::protocol::constants::{PING_REQ, PING_RESP};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// A server that answers every ping with a pong, forever.
    async fn spawn_ping_server() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 5];
                    while socket.read_exact(&mut buf).await.is_ok() {
                        if socket.write_all(&[0, 0, 0, 1, PING_RESP]).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        port
    }

    /// A server that accepts and immediately closes every connection.
    async fn spawn_slammer() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                drop(socket);
            }
        });

        port
    }

    fn cluster_for(ports: &[u16], retries: u32) -> Cluster {
        let config = ClusterConfig::builder()
            .nodes(ports.iter().map(|&port| {
                NodeConfig::builder("127.0.0.1")
                    .pb_port(port)
                    // Nothing listens on port 1, so REST attempts fail fast.
                    .http_port(1)
                    .pool_size(1)
                    .connect_timeout(Duration::from_millis(500))
                    .read_timeout(Duration::from_millis(500))
                    .write_timeout(Duration::from_millis(500))
                    .build()
                    .unwrap()
            }))
            .retries(retries)
            .build()
            .unwrap();
        Cluster::new(config).unwrap()
    }

    async fn ping_via(cluster: &Cluster) -> Result<()> {
        cluster
            .use_connection(|mut conn| async move {
                let result = conn.exchange(PING_REQ, PING_RESP).await;
                (conn, result)
            })
            .await
    }

    #[tokio::test]
    async fn test_use_connection_success() {
        let port = spawn_ping_server().await;
        let cluster = cluster_for(&[port], 0);

        ping_via(&cluster).await.unwrap();
        assert_eq!(cluster.nodes()[0].live_connections(), 1);
    }

    #[tokio::test]
    async fn test_connection_reused_across_operations() {
        let port = spawn_ping_server().await;
        let cluster = cluster_for(&[port], 0);

        for _ in 0..5 {
            ping_via(&cluster).await.unwrap();
        }
        assert_eq!(cluster.nodes()[0].live_connections(), 1);
    }

    #[tokio::test]
    async fn test_failure_marks_node_offline() {
        let port = spawn_slammer().await;
        let cluster = cluster_for(&[port], 3);

        let err = ping_via(&cluster).await.unwrap_err();

        // Single node: one attempt, then no eligible candidates remain.
        // The last real error is surfaced, not no-connections.
        assert!(matches!(err, RiakError::Communication(_)));
        assert!(!cluster.nodes()[0].is_eligible());
        assert_eq!(cluster.nodes()[0].live_connections(), 0);
    }

    #[tokio::test]
    async fn test_retry_moves_to_next_node() {
        let bad = spawn_slammer().await;
        let good = spawn_ping_server().await;
        let cluster = cluster_for(&[bad, good], 1);

        // Run a few operations; whichever node the cursor starts on, the
        // retry path must land every ping on the healthy node.
        for _ in 0..4 {
            ping_via(&cluster).await.unwrap();
        }
        assert_eq!(cluster.nodes()[1].live_connections(), 1);
    }

    #[tokio::test]
    async fn test_no_retry_budget_no_second_node() {
        let bad = spawn_slammer().await;
        let good = spawn_ping_server().await;
        let cluster = cluster_for(&[bad, good], 0);

        let mut successes = 0;
        let mut failures = 0;
        for _ in 0..2 {
            match ping_via(&cluster).await {
                Ok(()) => successes += 1,
                Err(_) => failures += 1,
            }
        }
        // Round-robin hits each node once; with retries = 0 the bad
        // node's failure is not retried elsewhere.
        assert_eq!(successes, 1);
        assert_eq!(failures, 1);
    }

    #[tokio::test]
    async fn test_remote_error_not_retried() {
        use riak_core::protocol::messages::RpbErrorResp;
        use prost::Message;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 5];
            socket.read_exact(&mut buf).await.unwrap();
            let body = RpbErrorResp {
                errmsg: Bytes::from_static(b"boom"),
                errcode: 1,
            }
            .encode_to_vec();
            let mut frame = Vec::new();
            frame.extend_from_slice(&((body.len() + 1) as u32).to_be_bytes());
            frame.push(0);
            frame.extend_from_slice(&body);
            socket.write_all(&frame).await.unwrap();
        });

        let cluster = cluster_for(&[port], 5);
        let err = ping_via(&cluster).await.unwrap_err();

        assert!(matches!(err, RiakError::Remote { code: 1, .. }));
        // The server error did not cost the node its health.
        assert!(cluster.nodes()[0].is_eligible());
        // The connection survived and went back to the pool.
        assert_eq!(cluster.nodes()[0].live_connections(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_fails_operations() {
        let port = spawn_ping_server().await;
        let cluster = cluster_for(&[port], 0);

        ping_via(&cluster).await.unwrap();
        cluster.shutdown();

        let err = ping_via(&cluster).await.unwrap_err();
        assert!(matches!(err, RiakError::ShuttingDown));
        assert_eq!(cluster.nodes()[0].live_connections(), 0);
    }

    #[tokio::test]
    async fn test_pinned_connection_releases_on_drop() {
        let port = spawn_ping_server().await;
        let cluster = cluster_for(&[port], 0);

        let pinned = cluster
            .pin_connection(0, |conn| async move { (conn, Ok(())) })
            .await
            .unwrap();
        assert_eq!(cluster.nodes()[0].live_connections(), 1);

        drop(pinned);

        // The connection went back to the idle set rather than being lost.
        let again = cluster.nodes()[0].checkout().await.unwrap();
        assert!(again.is_some());
        cluster.nodes()[0].give_back(again.unwrap(), true);
    }

    #[tokio::test]
    async fn test_pinned_connection_release_is_idempotent() {
        let port = spawn_ping_server().await;
        let cluster = cluster_for(&[port], 0);

        let mut pinned = cluster
            .pin_connection(0, |conn| async move { (conn, Ok(())) })
            .await
            .unwrap();
        pinned.release();
        pinned.release();
        drop(pinned);

        // Released exactly once: the slot is still accounted for and the
        // idle connection can be checked out again.
        assert_eq!(cluster.nodes()[0].live_connections(), 1);
        let again = cluster.nodes()[0].checkout().await.unwrap().unwrap();
        cluster.nodes()[0].give_back(again, true);
    }

    #[tokio::test]
    async fn test_use_rest_retries_across_nodes() {
        // No HTTP servers at all: every node fails with a communication
        // error and the dispatcher runs out of candidates.
        let cluster = cluster_for(&[1, 1], 5);

        let err = cluster
            .use_rest(|node| async move { node.rest().delete_bucket_props(None, "b").await })
            .await
            .unwrap_err();

        assert!(matches!(err, RiakError::Communication(_)));
        assert!(!cluster.nodes()[0].is_eligible());
        assert!(!cluster.nodes()[1].is_eligible());
    }
}
