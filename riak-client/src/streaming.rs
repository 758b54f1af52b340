//! Lazy streaming results over a pinned connection.
//!
//! A streaming operation writes one request and reads response frames
//! until the terminal frame (the one whose `done` flag is set). The
//! connection stays borrowed from its pool for the stream's lifetime and
//! is returned exactly once: after the terminal frame, after an error,
//! or when the stream is dropped mid-iteration.

use std::collections::{HashSet, VecDeque};

use bytes::Bytes;
use prost::Message;
use riak_core::protocol::messages::{
    RpbIndexResp, RpbListBucketsResp, RpbListKeysResp, RpbMapRedResp,
};
use riak_core::Result;

use crate::cluster::PinnedConnection;

/// A once-iterable lazy sequence of streamed responses.
///
/// `next` yields decoded frames in server order and stops after the
/// frame `is_last` accepts or after the first error; nothing is read
/// past either. The pinned connection is released the moment the stream
/// finishes, and by `Drop` otherwise.
#[derive(Debug)]
pub struct ResponseStream<Resp> {
    pinned: Option<PinnedConnection>,
    resp_code: u8,
    is_last: fn(&Resp) -> bool,
    done: bool,
}

impl<Resp: Message + Default> ResponseStream<Resp> {
    pub(crate) fn new(
        pinned: PinnedConnection,
        resp_code: u8,
        is_last: fn(&Resp) -> bool,
    ) -> Self {
        Self {
            pinned: Some(pinned),
            resp_code,
            is_last,
            done: false,
        }
    }

    /// Returns `true` once the stream has finished (terminal frame or
    /// error) and its connection has been released.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Reads the next response frame.
    pub async fn next(&mut self) -> Option<Result<Resp>> {
        if self.done {
            return None;
        }

        let received = match self.pinned.as_mut() {
            Some(pinned) => pinned.conn().recv_expected::<Resp>(self.resp_code).await,
            None => return None,
        };

        match received {
            Ok(resp) => {
                if (self.is_last)(&resp) {
                    if let Some(pinned) = self.pinned.as_mut() {
                        pinned.conn().settle();
                    }
                    self.finish();
                }
                Some(Ok(resp))
            }
            Err(e) => {
                if let Some(pinned) = &self.pinned {
                    pinned.fault(&e);
                }
                self.finish();
                Some(Err(e))
            }
        }
    }

    fn finish(&mut self) {
        self.done = true;
        if let Some(mut pinned) = self.pinned.take() {
            pinned.release();
        }
    }
}

/// A stream of deduplicated names (keys or buckets) flattened out of
/// multi-name frames.
#[derive(Debug)]
pub struct NameStream<Resp> {
    inner: ResponseStream<Resp>,
    extract: fn(Resp) -> Vec<Bytes>,
    pending: VecDeque<Bytes>,
    seen: HashSet<Bytes>,
}

/// Streamed keys of a bucket.
pub type KeyStream = NameStream<RpbListKeysResp>;

/// Streamed bucket names.
pub type BucketStream = NameStream<RpbListBucketsResp>;

impl<Resp: Message + Default> NameStream<Resp> {
    pub(crate) fn new(inner: ResponseStream<Resp>, extract: fn(Resp) -> Vec<Bytes>) -> Self {
        Self {
            inner,
            extract,
            pending: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// Yields the next name. Names repeated across frames are yielded
    /// once.
    pub async fn next_name(&mut self) -> Option<Result<Bytes>> {
        loop {
            if let Some(name) = self.pending.pop_front() {
                return Some(Ok(name));
            }

            match self.inner.next().await? {
                Ok(resp) => {
                    for name in (self.extract)(resp) {
                        if self.seen.insert(name.clone()) {
                            self.pending.push_back(name);
                        }
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Drains the stream into a vector.
    pub async fn collect(mut self) -> Result<Vec<Bytes>> {
        let mut names = Vec::new();
        while let Some(name) = self.next_name().await {
            names.push(name?);
        }
        Ok(names)
    }
}

/// One phase result of a streamed map-reduce job.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRedPhase {
    /// The phase that produced this result.
    pub phase: u32,
    /// The phase output, in the encoding the query asked for.
    pub response: Bytes,
}

/// Streamed map-reduce phase results.
#[derive(Debug)]
pub struct MapRedStream {
    inner: ResponseStream<RpbMapRedResp>,
}

impl MapRedStream {
    pub(crate) fn new(inner: ResponseStream<RpbMapRedResp>) -> Self {
        Self { inner }
    }

    /// Yields the next phase result. Frames without a payload (such as a
    /// bare terminal frame) are skipped.
    pub async fn next_result(&mut self) -> Option<Result<MapRedPhase>> {
        loop {
            match self.inner.next().await? {
                Ok(resp) => {
                    if let Some(response) = resp.response {
                        return Some(Ok(MapRedPhase {
                            phase: resp.phase.unwrap_or(0),
                            response,
                        }));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Drains the stream into a vector of phase results.
    pub async fn collect(mut self) -> Result<Vec<MapRedPhase>> {
        let mut results = Vec::new();
        while let Some(result) = self.next_result().await {
            results.push(result?);
        }
        Ok(results)
    }
}

/// One match of a secondary index query.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// The matched object key.
    pub key: Bytes,
    /// The matched index term, when the query asked for terms.
    pub term: Option<Bytes>,
}

/// Streamed secondary index matches.
#[derive(Debug)]
pub struct IndexStream {
    inner: ResponseStream<RpbIndexResp>,
    pending: VecDeque<IndexEntry>,
    continuation: Option<Bytes>,
}

impl IndexStream {
    pub(crate) fn new(inner: ResponseStream<RpbIndexResp>) -> Self {
        Self {
            inner,
            pending: VecDeque::new(),
            continuation: None,
        }
    }

    /// Yields the next match.
    pub async fn next_entry(&mut self) -> Option<Result<IndexEntry>> {
        loop {
            if let Some(entry) = self.pending.pop_front() {
                return Some(Ok(entry));
            }

            match self.inner.next().await? {
                Ok(resp) => {
                    if resp.continuation.is_some() {
                        self.continuation = resp.continuation.clone();
                    }
                    for key in resp.keys {
                        self.pending.push_back(IndexEntry { key, term: None });
                    }
                    for pair in resp.results {
                        self.pending.push_back(IndexEntry {
                            key: pair.value.unwrap_or_default(),
                            term: Some(pair.key),
                        });
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Returns the pagination token from the terminal frame, when the
    /// query was paginated. Meaningful once the stream is exhausted.
    pub fn continuation(&self) -> Option<&Bytes> {
        self.continuation.as_ref()
    }

    /// Drains the stream, returning the matches and any continuation.
    pub async fn collect(mut self) -> Result<(Vec<IndexEntry>, Option<Bytes>)> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next_entry().await {
            entries.push(entry?);
        }
        Ok((entries, self.continuation))
    }
}
