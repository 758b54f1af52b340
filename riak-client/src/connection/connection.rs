//! Single connection to a Riak node.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use prost::Message;
use riak_core::protocol::constants::ERROR_RESP;
use riak_core::protocol::messages::RpbErrorResp;
use riak_core::protocol::{decode_body, encode_body, MsgCodec};
use riak_core::{Result, RiakError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::{Decoder, Encoder};

use crate::config::NodeConfig;

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generates a new unique connection ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A connection to a single Riak node's binary protocol endpoint.
///
/// All socket I/O is bounded by the read/write deadlines from the node
/// configuration. Any I/O or frame-level failure marks the connection
/// broken; broken connections are discarded on release instead of
/// returning to the pool.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    stream: TcpStream,
    codec: MsgCodec,
    read_buffer: BytesMut,
    read_timeout: Duration,
    write_timeout: Duration,
    broken: bool,
    busy: bool,
    last_used_at: Instant,
}

impl Connection {
    /// Establishes a connection to the node's binary protocol endpoint.
    pub async fn connect(config: &NodeConfig) -> Result<Self> {
        let address = config.pb_address();

        let stream = timeout(config.connect_timeout(), TcpStream::connect(&address))
            .await
            .map_err(|_| {
                RiakError::Communication(format!(
                    "connect to {} timed out after {:?}",
                    address,
                    config.connect_timeout()
                ))
            })?
            .map_err(|e| {
                RiakError::Communication(format!("failed to connect to {}: {}", address, e))
            })?;

        stream.set_nodelay(true).map_err(|e| {
            RiakError::Communication(format!("failed to set TCP_NODELAY: {}", e))
        })?;

        tracing::debug!(address = %address, "established connection");

        Ok(Self {
            id: ConnectionId::new(),
            stream,
            codec: MsgCodec::new(),
            read_buffer: BytesMut::with_capacity(8192),
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
            broken: false,
            busy: false,
            last_used_at: Instant::now(),
        })
    }

    /// Returns the connection's unique identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns `true` once an I/O or frame-level failure has occurred.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Returns `true` when the connection can safely serve another
    /// request: no failure has occurred and no request is still in
    /// flight. A connection abandoned mid-stream (or whose operation was
    /// cancelled between send and the final response frame) stays busy
    /// and is discarded on release instead of reused.
    pub fn is_reusable(&self) -> bool {
        !self.broken && !self.busy
    }

    /// Returns how long this connection has sat unused.
    pub fn idle_for(&self) -> Duration {
        self.last_used_at.elapsed()
    }

    fn mark_broken(&mut self) {
        self.broken = true;
    }

    /// Marks the current request complete: every response frame it will
    /// produce has been consumed.
    pub fn settle(&mut self) {
        self.busy = false;
    }

    /// Writes one frame, honoring the write deadline.
    pub async fn send(&mut self, code: u8, body: Bytes) -> Result<()> {
        let mut buf = BytesMut::new();
        self.codec.encode((code, body), &mut buf)?;

        match timeout(self.write_timeout, self.stream.write_all(&buf)).await {
            Err(_) => {
                self.mark_broken();
                Err(RiakError::Communication(format!(
                    "write timed out after {:?}",
                    self.write_timeout
                )))
            }
            Ok(Err(e)) => {
                self.mark_broken();
                Err(RiakError::Communication(format!("failed to write: {}", e)))
            }
            Ok(Ok(())) => {
                self.busy = true;
                self.last_used_at = Instant::now();
                Ok(())
            }
        }
    }

    /// Serializes a typed request and writes it as one frame.
    pub async fn send_typed<Req: Message>(&mut self, code: u8, request: &Req) -> Result<()> {
        self.send(code, encode_body(request)).await
    }

    /// Reads one frame, honoring the read deadline.
    pub async fn recv(&mut self) -> Result<(u8, BytesMut)> {
        loop {
            match self.codec.decode(&mut self.read_buffer) {
                Ok(Some(frame)) => {
                    self.last_used_at = Instant::now();
                    return Ok(frame);
                }
                Ok(None) => {}
                Err(e) => {
                    self.mark_broken();
                    return Err(e);
                }
            }

            let bytes_read =
                match timeout(self.read_timeout, self.stream.read_buf(&mut self.read_buffer))
                    .await
                {
                    Err(_) => {
                        self.mark_broken();
                        return Err(RiakError::Communication(format!(
                            "read timed out after {:?}",
                            self.read_timeout
                        )));
                    }
                    Ok(Err(e)) => {
                        self.mark_broken();
                        return Err(RiakError::Communication(format!("failed to read: {}", e)));
                    }
                    Ok(Ok(n)) => n,
                };

            if bytes_read == 0 {
                self.mark_broken();
                return Err(RiakError::Communication(
                    "connection closed by remote".to_string(),
                ));
            }
        }
    }

    /// Reads one frame and decodes it as the expected response type.
    ///
    /// An error response in place of the expected code surfaces as
    /// [`RiakError::Remote`]; any other code mismatch is an
    /// [`RiakError::InvalidResponse`] and breaks the connection, since the
    /// stream can no longer be trusted to be in sync.
    pub async fn recv_expected<Resp: Message + Default>(&mut self, expected: u8) -> Result<Resp> {
        let body = self.recv_expected_raw(expected).await?;
        decode_body(&body).map_err(|e| {
            self.mark_broken();
            e
        })
    }

    /// Reads one frame, checks the code, and discards the body.
    ///
    /// Used for responses that carry no payload (ping, delete, set-bucket).
    pub async fn recv_ack(&mut self, expected: u8) -> Result<()> {
        self.recv_expected_raw(expected).await.map(|_| ())
    }

    async fn recv_expected_raw(&mut self, expected: u8) -> Result<BytesMut> {
        let (code, body) = self.recv().await?;

        if code == ERROR_RESP {
            let err: RpbErrorResp = decode_body(&body).map_err(|e| {
                self.mark_broken();
                e
            })?;
            // An error response terminates the request, streaming or not.
            self.settle();
            return Err(RiakError::Remote {
                code: err.errcode,
                message: String::from_utf8_lossy(&err.errmsg).into_owned(),
            });
        }

        if code != expected {
            self.mark_broken();
            return Err(RiakError::InvalidResponse(format!(
                "expected message code {}, got {}",
                expected, code
            )));
        }

        Ok(body)
    }

    /// Bodyless request, bodyless response (ping-style).
    pub async fn exchange(&mut self, req_code: u8, resp_code: u8) -> Result<()> {
        self.send(req_code, Bytes::new()).await?;
        self.recv_ack(resp_code).await?;
        self.settle();
        Ok(())
    }

    /// Single typed round trip.
    pub async fn exchange_typed<Req, Resp>(
        &mut self,
        request: &Req,
        req_code: u8,
        resp_code: u8,
    ) -> Result<Resp>
    where
        Req: Message,
        Resp: Message + Default,
    {
        self.send_typed(req_code, request).await?;
        let resp = self.recv_expected(resp_code).await?;
        self.settle();
        Ok(resp)
    }

    /// Typed request acknowledged by a bodyless response.
    pub async fn exchange_ack<Req: Message>(
        &mut self,
        request: &Req,
        req_code: u8,
        resp_code: u8,
    ) -> Result<()> {
        self.send_typed(req_code, request).await?;
        self.recv_ack(resp_code).await?;
        self.settle();
        Ok(())
    }

    /// Writes one request, then reads response frames until `is_last`
    /// returns true on a decoded response, materializing the whole
    /// sequence eagerly. Stops at the first error.
    pub async fn exchange_streaming<Req, Resp>(
        &mut self,
        request: &Req,
        req_code: u8,
        resp_code: u8,
        is_last: fn(&Resp) -> bool,
    ) -> Result<Vec<Resp>>
    where
        Req: Message,
        Resp: Message + Default,
    {
        self.send_typed(req_code, request).await?;

        let mut responses = Vec::new();
        loop {
            let resp: Resp = self.recv_expected(resp_code).await?;
            let last = is_last(&resp);
            responses.push(resp);
            if last {
                self.settle();
                return Ok(responses);
            }
        }
    }
}
