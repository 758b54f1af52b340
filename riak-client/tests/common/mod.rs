//! Common test utilities: a scripted mock Riak node speaking the
//! length-prefixed binary protocol.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use prost::Message;
use riak_client::{ClusterConfig, NodeConfig, RiakClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Encodes one protocol frame.
pub fn frame(code: u8, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(5 + body.len());
    out.extend_from_slice(&((body.len() + 1) as u32).to_be_bytes());
    out.push(code);
    out.extend_from_slice(body);
    out
}

/// Encodes a typed message frame.
pub fn typed_frame<M: Message>(code: u8, message: &M) -> Vec<u8> {
    frame(code, &message.encode_to_vec())
}

/// Counters exposed by a [`spawn_server`] instance.
#[derive(Debug, Default)]
pub struct ServerStats {
    /// Connections accepted so far.
    pub accepted: AtomicUsize,
    /// Requests served so far.
    pub requests: AtomicUsize,
}

impl ServerStats {
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Spawns a mock node. The handler maps each request frame
/// `(code, body)` to the raw bytes to write back (usually one or more
/// frames built with [`frame`] / [`typed_frame`]). Each accepted
/// connection serves requests until the client hangs up.
pub async fn spawn_server<F>(handler: F) -> (u16, Arc<ServerStats>)
where
    F: Fn(u8, Bytes) -> Vec<u8> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let stats = Arc::new(ServerStats::default());
    let handler = Arc::new(handler);

    {
        let stats = Arc::clone(&stats);
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                stats.accepted.fetch_add(1, Ordering::SeqCst);

                let stats = Arc::clone(&stats);
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    loop {
                        let mut len_buf = [0u8; 4];
                        if socket.read_exact(&mut len_buf).await.is_err() {
                            break;
                        }
                        let total = u32::from_be_bytes(len_buf) as usize;
                        let mut payload = vec![0u8; total];
                        if socket.read_exact(&mut payload).await.is_err() {
                            break;
                        }

                        let code = payload[0];
                        let body = Bytes::copy_from_slice(&payload[1..]);
                        stats.requests.fetch_add(1, Ordering::SeqCst);

                        let response = (*handler)(code, body);
                        if socket.write_all(&response).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });
    }

    (port, stats)
}

/// Spawns a node that accepts and immediately closes every connection.
pub async fn spawn_slammer() -> (u16, Arc<ServerStats>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let stats = Arc::new(ServerStats::default());

    {
        let stats = Arc::clone(&stats);
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                stats.accepted.fetch_add(1, Ordering::SeqCst);
                drop(socket);
            }
        });
    }

    (port, stats)
}

/// A client for a single mock node.
pub fn client_for(port: u16, retries: u32) -> RiakClient {
    client_for_nodes(&[port], retries)
}

/// A client across several mock nodes.
pub fn client_for_nodes(ports: &[u16], retries: u32) -> RiakClient {
    let config = ClusterConfig::builder()
        .nodes(ports.iter().map(|&port| {
            NodeConfig::builder("127.0.0.1")
                .pb_port(port)
                .pool_size(2)
                .connect_timeout(Duration::from_secs(1))
                .read_timeout(Duration::from_secs(2))
                .write_timeout(Duration::from_secs(2))
                .build()
                .unwrap()
        }))
        .retries(retries)
        .node_cooldown(Duration::from_secs(30))
        .build()
        .unwrap();
    RiakClient::new(config).unwrap()
}
