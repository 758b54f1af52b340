//! The Riak client façade.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use riak_core::protocol::constants::*;
use riak_core::protocol::messages::{
    MapOp, RpbBucketProps, RpbIndexReq, RpbIndexResp, RpbMapRedReq, RpbMapRedResp,
    RpbSearchDoc, RpbSearchQueryReq, RpbSearchQueryResp, IndexQueryType,
};
use riak_core::{Result, RiakError};

use crate::batch::BatchClient;
use crate::cluster::Cluster;
use crate::config::ClusterConfig;
use crate::crdt::{CounterResult, MapResult, SetResult, SetUpdate};
use crate::object::{validate_component, RiakObject, RiakObjectId};
use crate::options::{
    CounterGetOptions, CounterUpdateOptions, DeleteOptions, DtFetchOptions, DtUpdateOptions,
    GetOptions, IndexOptions, PutOptions, SearchOptions,
};
use crate::ops;
use crate::streaming::{
    BucketStream, IndexEntry, IndexStream, KeyStream, MapRedPhase, MapRedStream, NameStream,
    ResponseStream,
};

/// Identity and version of a Riak node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    /// The node's Erlang name.
    pub node: Option<String>,
    /// The server version string.
    pub server_version: Option<String>,
}

/// A map-reduce job: the query blob plus the encoding it uses.
#[derive(Debug, Clone, PartialEq)]
pub struct MapReduceQuery {
    /// The query, encoded as named by `content_type`.
    pub request: Bytes,
    /// The query encoding, typically `application/json`.
    pub content_type: Bytes,
}

impl MapReduceQuery {
    /// Creates a JSON-encoded map-reduce query.
    pub fn json(request: impl Into<Bytes>) -> Self {
        Self {
            request: request.into(),
            content_type: Bytes::from_static(b"application/json"),
        }
    }

    /// Creates an Erlang-term-encoded map-reduce query.
    pub fn erlang(request: impl Into<Bytes>) -> Self {
        Self {
            request: request.into(),
            content_type: Bytes::from_static(b"application/x-erlang-binary"),
        }
    }

    fn to_req(&self) -> RpbMapRedReq {
        RpbMapRedReq {
            request: self.request.clone(),
            content_type: self.content_type.clone(),
        }
    }
}

/// The match criterion of a secondary index query.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexSpec {
    /// Exact match on one term.
    Eq(Bytes),
    /// All terms between `min` and `max` inclusive.
    Range {
        /// Lower bound.
        min: Bytes,
        /// Upper bound.
        max: Bytes,
    },
}

/// A secondary index query.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    /// Optional bucket type.
    pub bucket_type: Option<String>,
    /// The bucket whose index is queried.
    pub bucket: String,
    /// The full index name, e.g. `age_int` or `email_bin`.
    pub index: String,
    /// The match criterion.
    pub spec: IndexSpec,
}

impl IndexQuery {
    /// Creates an exact-match query.
    pub fn eq(
        bucket: impl Into<String>,
        index: impl Into<String>,
        key: impl Into<Bytes>,
    ) -> Self {
        Self {
            bucket_type: None,
            bucket: bucket.into(),
            index: index.into(),
            spec: IndexSpec::Eq(key.into()),
        }
    }

    /// Creates a range query.
    pub fn range(
        bucket: impl Into<String>,
        index: impl Into<String>,
        min: impl Into<Bytes>,
        max: impl Into<Bytes>,
    ) -> Self {
        Self {
            bucket_type: None,
            bucket: bucket.into(),
            index: index.into(),
            spec: IndexSpec::Range {
                min: min.into(),
                max: max.into(),
            },
        }
    }

    /// Targets a bucket type.
    pub fn with_type(mut self, bucket_type: impl Into<String>) -> Self {
        self.bucket_type = Some(bucket_type.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(t) = &self.bucket_type {
            validate_component("bucket type", t)?;
        }
        validate_component("bucket", &self.bucket)?;
        if self.index.is_empty() {
            return Err(RiakError::Validation("index name cannot be empty".into()));
        }
        Ok(())
    }

    fn to_req(&self, options: &IndexOptions, stream: bool) -> RpbIndexReq {
        let mut req = RpbIndexReq {
            bucket: Bytes::copy_from_slice(self.bucket.as_bytes()),
            index: Bytes::copy_from_slice(self.index.as_bytes()),
            bucket_type: self
                .bucket_type
                .as_ref()
                .map(|t| Bytes::copy_from_slice(t.as_bytes())),
            stream: if stream { Some(true) } else { None },
            ..Default::default()
        };
        match &self.spec {
            IndexSpec::Eq(key) => {
                req.qtype = IndexQueryType::Eq as i32;
                req.key = Some(key.clone());
            }
            IndexSpec::Range { min, max } => {
                req.qtype = IndexQueryType::Range as i32;
                req.range_min = Some(min.clone());
                req.range_max = Some(max.clone());
            }
        }
        options.populate(&mut req);
        req
    }
}

/// Results of an eager secondary index query.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexResults {
    /// The matches, in server order.
    pub entries: Vec<IndexEntry>,
    /// Pagination token, present when more results remain.
    pub continuation: Option<Bytes>,
}

impl IndexResults {
    fn from_resp(resp: RpbIndexResp) -> Self {
        let mut entries: Vec<IndexEntry> = resp
            .keys
            .into_iter()
            .map(|key| IndexEntry { key, term: None })
            .collect();
        entries.extend(resp.results.into_iter().map(|pair| IndexEntry {
            key: pair.value.unwrap_or_default(),
            term: Some(pair.key),
        }));
        Self {
            entries,
            continuation: resp.continuation,
        }
    }
}

/// Results of a search query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    /// The matched documents.
    pub docs: Vec<RpbSearchDoc>,
    /// Highest score among the matches.
    pub max_score: Option<f32>,
    /// Total number of matches, which may exceed `docs.len()`.
    pub num_found: Option<u32>,
}

/// The Riak client.
///
/// A cheap `Clone` handle over the cluster dispatcher: clones share the
/// node pools and health state. The client itself is stateless and
/// re-entrant; any number of tasks may call it concurrently, each
/// operation borrowing one pooled connection for its duration.
#[derive(Debug, Clone)]
pub struct RiakClient {
    cluster: Arc<Cluster>,
}

impl RiakClient {
    /// Creates a client for the configured cluster.
    ///
    /// No connections are opened yet; they are created lazily as
    /// operations demand them.
    pub fn new(config: ClusterConfig) -> Result<Self> {
        Ok(Self {
            cluster: Arc::new(Cluster::new(config)?),
        })
    }

    /// Drains every node pool. In-flight operations surface
    /// [`RiakError::ShuttingDown`]; subsequent calls fail immediately.
    pub fn shutdown(&self) {
        self.cluster.shutdown();
    }

    async fn run<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn(crate::connection::Connection) -> Fut,
        Fut: Future<Output = (crate::connection::Connection, Result<T>)>,
    {
        self.cluster.use_connection(op).await
    }

    /// Checks liveness of some node in the cluster.
    pub async fn ping(&self) -> Result<()> {
        self.run(|mut conn| async move {
            let result = ops::ping(&mut conn).await;
            (conn, result)
        })
        .await
    }

    /// Fetches the name and version of some node in the cluster.
    pub async fn server_info(&self) -> Result<ServerInfo> {
        self.run(|mut conn| async move {
            let result = ops::server_info(&mut conn).await;
            (conn, result)
        })
        .await
        .map(|resp| ServerInfo {
            node: resp.node.map(|b| String::from_utf8_lossy(&b).into_owned()),
            server_version: resp
                .server_version
                .map(|b| String::from_utf8_lossy(&b).into_owned()),
        })
    }

    /// Fetches an object.
    ///
    /// A response without a causal vector materializes as
    /// [`RiakError::NotFound`]. When concurrent writes left several
    /// values, the returned object's `siblings` lists every one of them.
    pub async fn get(&self, id: &RiakObjectId, options: &GetOptions) -> Result<RiakObject> {
        id.validate()?;
        self.run(|mut conn| async move {
            let result = ops::get(&mut conn, id, options).await;
            (conn, result)
        })
        .await
    }

    /// Fetches several objects over one borrowed connection.
    ///
    /// Per-object failures do not fail the whole call; the returned
    /// sequence pairs every input id with its own result, in input order.
    pub async fn multi_get(
        &self,
        ids: &[RiakObjectId],
        options: &GetOptions,
    ) -> Result<Vec<(RiakObjectId, Result<RiakObject>)>> {
        self.run(|mut conn| async move {
            let mut results = Vec::with_capacity(ids.len());
            for id in ids {
                let result = match id.validate() {
                    Ok(()) => ops::get(&mut conn, id, options).await,
                    Err(e) => Err(e),
                };
                results.push((id.clone(), result));
            }
            (conn, Ok(results))
        })
        .await
    }

    /// Stores an object.
    ///
    /// With `return_body` the stored object (and any siblings) is echoed
    /// back; otherwise the input object is returned unchanged.
    pub async fn put(&self, object: &RiakObject, options: &PutOptions) -> Result<RiakObject> {
        object.id.validate()?;
        self.run(|mut conn| async move {
            let result = ops::put(&mut conn, object, options).await;
            (conn, result)
        })
        .await
    }

    /// Stores several objects over one borrowed connection, pairing every
    /// input id with its own result.
    pub async fn multi_put(
        &self,
        objects: &[RiakObject],
        options: &PutOptions,
    ) -> Result<Vec<(RiakObjectId, Result<RiakObject>)>> {
        self.run(|mut conn| async move {
            let mut results = Vec::with_capacity(objects.len());
            for object in objects {
                let result = match object.id.validate() {
                    Ok(()) => ops::put(&mut conn, object, options).await,
                    Err(e) => Err(e),
                };
                results.push((object.id.clone(), result));
            }
            (conn, Ok(results))
        })
        .await
    }

    /// Deletes an object.
    pub async fn delete(&self, id: &RiakObjectId, options: &DeleteOptions) -> Result<()> {
        id.validate()?;
        self.run(|mut conn| async move {
            let result = ops::delete(&mut conn, id, options).await;
            (conn, result)
        })
        .await
    }

    /// Deletes every key in a bucket: lists the keys, then deletes them
    /// one by one over the same borrowed connection.
    ///
    /// If the key listing fails, its error is surfaced and nothing is
    /// deleted. Like [`list_keys`](Self::list_keys), this walks the whole
    /// bucket and is expensive.
    pub async fn delete_bucket(
        &self,
        bucket_type: Option<&str>,
        bucket: &str,
        options: &DeleteOptions,
    ) -> Result<()> {
        validate_bucket(bucket_type, bucket)?;
        warn_list_keys(bucket);

        self.run(|mut conn| async move {
            let result = async {
                let keys = ops::list_keys(&mut conn, bucket_type, bucket).await?;
                for key in keys {
                    ops::delete_raw(&mut conn, bucket_type, bucket, key, options).await?;
                }
                Ok(())
            }
            .await;
            (conn, result)
        })
        .await
    }

    /// Lists all buckets.
    pub async fn list_buckets(&self, bucket_type: Option<&str>) -> Result<Vec<Bytes>> {
        if let Some(t) = bucket_type {
            validate_component("bucket type", t)?;
        }
        self.run(|mut conn| async move {
            let result = ops::list_buckets(&mut conn, bucket_type).await;
            (conn, result)
        })
        .await
    }

    /// Streams bucket names lazily, one frame at a time.
    pub async fn stream_list_buckets(&self, bucket_type: Option<&str>) -> Result<BucketStream> {
        if let Some(t) = bucket_type {
            validate_component("bucket type", t)?;
        }

        let req = ops::build_list_buckets_req(bucket_type, true);
        let req = &req;
        let pinned = self
            .cluster
            .pin_connection(self.cluster.retries(), |mut conn| async move {
                let result = conn.send_typed(LIST_BUCKETS_REQ, req).await;
                (conn, result)
            })
            .await?;

        let inner = ResponseStream::new(pinned, LIST_BUCKETS_RESP, ops::list_buckets_done);
        Ok(NameStream::new(inner, |resp| resp.buckets))
    }

    /// Lists every key in a bucket, eagerly, as the deduplicated union
    /// of all streamed frames.
    ///
    /// This walks the whole bucket on the server and is expensive; an
    /// advisory warning is logged on every call.
    pub async fn list_keys(&self, bucket_type: Option<&str>, bucket: &str) -> Result<Vec<Bytes>> {
        validate_bucket(bucket_type, bucket)?;
        warn_list_keys(bucket);

        self.run(|mut conn| async move {
            let result = ops::list_keys(&mut conn, bucket_type, bucket).await;
            (conn, result)
        })
        .await
    }

    /// Streams a bucket's keys lazily.
    ///
    /// The underlying connection stays borrowed until the stream is
    /// drained or dropped. Expensive on the server; an advisory warning
    /// is logged on every call.
    pub async fn stream_list_keys(
        &self,
        bucket_type: Option<&str>,
        bucket: &str,
    ) -> Result<KeyStream> {
        validate_bucket(bucket_type, bucket)?;
        warn_list_keys(bucket);

        let req = ops::build_list_keys_req(bucket_type, bucket);
        let req = &req;
        let pinned = self
            .cluster
            .pin_connection(self.cluster.retries(), |mut conn| async move {
                let result = conn.send_typed(LIST_KEYS_REQ, req).await;
                (conn, result)
            })
            .await?;

        let inner = ResponseStream::new(pinned, LIST_KEYS_RESP, ops::list_keys_done);
        Ok(NameStream::new(inner, |resp| resp.keys))
    }

    /// Runs a map-reduce job and materializes every phase result.
    pub async fn map_reduce(&self, query: &MapReduceQuery) -> Result<Vec<MapRedPhase>> {
        let req = query.to_req();
        let req = &req;
        self.run(|mut conn| async move {
            let result = conn
                .exchange_streaming(req, MAP_RED_REQ, MAP_RED_RESP, map_red_done)
                .await;
            (conn, result)
        })
        .await
        .map(|frames| {
            frames
                .into_iter()
                .filter_map(|frame| {
                    frame.response.map(|response| MapRedPhase {
                        phase: frame.phase.unwrap_or(0),
                        response,
                    })
                })
                .collect()
        })
    }

    /// Runs a map-reduce job, streaming phase results lazily.
    pub async fn stream_map_reduce(&self, query: &MapReduceQuery) -> Result<MapRedStream> {
        let req = query.to_req();
        let req = &req;
        let pinned = self
            .cluster
            .pin_connection(self.cluster.retries(), |mut conn| async move {
                let result = conn.send_typed(MAP_RED_REQ, req).await;
                (conn, result)
            })
            .await?;

        let inner = ResponseStream::new(pinned, MAP_RED_RESP, map_red_done);
        Ok(MapRedStream::new(inner))
    }

    /// Runs a full-text search query against an index.
    pub async fn search(
        &self,
        index: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResults> {
        if index.is_empty() {
            return Err(RiakError::Validation("index name cannot be empty".into()));
        }
        if query.is_empty() {
            return Err(RiakError::Validation("search query cannot be empty".into()));
        }

        let mut req = RpbSearchQueryReq {
            q: Bytes::copy_from_slice(query.as_bytes()),
            index: Bytes::copy_from_slice(index.as_bytes()),
            ..Default::default()
        };
        options.populate(&mut req);
        let req = &req;

        self.run(|mut conn| async move {
            let result = conn
                .exchange_typed::<_, RpbSearchQueryResp>(req, SEARCH_QUERY_REQ, SEARCH_QUERY_RESP)
                .await;
            (conn, result)
        })
        .await
        .map(|resp| SearchResults {
            docs: resp.docs,
            max_score: resp.max_score,
            num_found: resp.num_found,
        })
    }

    /// Runs a secondary index query eagerly, returning the matches and
    /// any pagination continuation.
    pub async fn index_query(
        &self,
        query: &IndexQuery,
        options: &IndexOptions,
    ) -> Result<IndexResults> {
        query.validate()?;
        let req = query.to_req(options, false);
        let req = &req;

        self.run(|mut conn| async move {
            let result = conn
                .exchange_typed::<_, RpbIndexResp>(req, INDEX_REQ, INDEX_RESP)
                .await;
            (conn, result)
        })
        .await
        .map(IndexResults::from_resp)
    }

    /// Runs a secondary index query, streaming matches lazily. The
    /// stream exposes the continuation once drained.
    pub async fn stream_index_query(
        &self,
        query: &IndexQuery,
        options: &IndexOptions,
    ) -> Result<IndexStream> {
        query.validate()?;
        let req = query.to_req(options, true);
        let req = &req;

        let pinned = self
            .cluster
            .pin_connection(self.cluster.retries(), |mut conn| async move {
                let result = conn.send_typed(INDEX_REQ, req).await;
                (conn, result)
            })
            .await?;

        let inner = ResponseStream::new(pinned, INDEX_RESP, index_done);
        Ok(IndexStream::new(inner))
    }

    /// Updates a legacy (1.4) counter. Returns the post-update value when
    /// the options asked for it.
    pub async fn increment_counter(
        &self,
        id: &RiakObjectId,
        amount: i64,
        options: &CounterUpdateOptions,
    ) -> Result<Option<i64>> {
        id.validate()?;
        self.run(|mut conn| async move {
            let result = ops::counter_update(&mut conn, id, amount, options).await;
            (conn, result)
        })
        .await
    }

    /// Reads a legacy (1.4) counter. An absent counter is
    /// [`RiakError::NotFound`].
    pub async fn get_counter(
        &self,
        id: &RiakObjectId,
        options: &CounterGetOptions,
    ) -> Result<i64> {
        id.validate()?;
        self.run(|mut conn| async move {
            let result = ops::counter_get(&mut conn, id, options).await;
            (conn, result)
        })
        .await
    }

    /// Fetches a CRDT counter. The id must carry a bucket type.
    pub async fn fetch_counter(
        &self,
        id: &RiakObjectId,
        options: &DtFetchOptions,
    ) -> Result<CounterResult> {
        validate_dt_id(id)?;
        self.run(|mut conn| async move {
            let result = ops::fetch_counter(&mut conn, id, options).await;
            (conn, result)
        })
        .await
    }

    /// Updates a CRDT counter by the given increment (negative to
    /// decrement).
    pub async fn update_counter(
        &self,
        id: &RiakObjectId,
        increment: i64,
        options: &DtUpdateOptions,
    ) -> Result<CounterResult> {
        validate_dt_id(id)?;
        self.run(|mut conn| async move {
            let result = ops::update_counter(&mut conn, id, increment, options).await;
            (conn, result)
        })
        .await
    }

    /// Fetches a CRDT set.
    pub async fn fetch_set(
        &self,
        id: &RiakObjectId,
        options: &DtFetchOptions,
    ) -> Result<SetResult> {
        validate_dt_id(id)?;
        self.run(|mut conn| async move {
            let result = ops::fetch_set(&mut conn, id, options).await;
            (conn, result)
        })
        .await
    }

    /// Applies adds and removes to a CRDT set.
    ///
    /// Removals require the causal context from the most recent fetch in
    /// the update options; omitting it is a validation error.
    pub async fn update_set(
        &self,
        id: &RiakObjectId,
        update: &SetUpdate,
        options: &DtUpdateOptions,
    ) -> Result<SetResult> {
        validate_dt_id(id)?;
        if update.has_removes() && options.context.is_none() {
            return Err(RiakError::Validation(
                "set removals require the causal context from a fetch".into(),
            ));
        }
        self.run(|mut conn| async move {
            let result = ops::update_set(&mut conn, id, update.clone(), options).await;
            (conn, result)
        })
        .await
    }

    /// Fetches a CRDT map.
    pub async fn fetch_map(
        &self,
        id: &RiakObjectId,
        options: &DtFetchOptions,
    ) -> Result<MapResult> {
        validate_dt_id(id)?;
        self.run(|mut conn| async move {
            let result = ops::fetch_map(&mut conn, id, options).await;
            (conn, result)
        })
        .await
    }

    /// Applies a map operation (nested updates and removals) to a CRDT
    /// map. Removals require an echoed causal context.
    pub async fn update_map(
        &self,
        id: &RiakObjectId,
        op: &MapOp,
        options: &DtUpdateOptions,
    ) -> Result<MapResult> {
        validate_dt_id(id)?;
        if !op.removes.is_empty() && options.context.is_none() {
            return Err(RiakError::Validation(
                "map removals require the causal context from a fetch".into(),
            ));
        }
        self.run(|mut conn| async move {
            let result = ops::update_map(&mut conn, id, op.clone(), options).await;
            (conn, result)
        })
        .await
    }

    /// Reads a bucket's properties.
    pub async fn get_bucket_properties(
        &self,
        bucket_type: Option<&str>,
        bucket: &str,
    ) -> Result<RpbBucketProps> {
        validate_bucket(bucket_type, bucket)?;
        self.run(|mut conn| async move {
            let result = ops::get_bucket_props(&mut conn, bucket_type, bucket).await;
            (conn, result)
        })
        .await
    }

    /// Stores a bucket's properties over the binary protocol.
    pub async fn set_bucket_properties(
        &self,
        bucket_type: Option<&str>,
        bucket: &str,
        props: &RpbBucketProps,
    ) -> Result<()> {
        validate_bucket(bucket_type, bucket)?;
        self.run(|mut conn| async move {
            let result = ops::set_bucket_props(&mut conn, bucket_type, bucket, props.clone()).await;
            (conn, result)
        })
        .await
    }

    /// Stores extended bucket properties as JSON over the legacy HTTP
    /// interface.
    pub async fn set_bucket_properties_http(
        &self,
        bucket_type: Option<&str>,
        bucket: &str,
        props: &serde_json::Value,
    ) -> Result<()> {
        validate_bucket(bucket_type, bucket)?;
        self.cluster
            .use_rest(|node| async move {
                node.rest().put_bucket_props(bucket_type, bucket, props).await
            })
            .await
    }

    /// Resets a bucket's properties to defaults over the legacy HTTP
    /// interface. Resetting an absent bucket is [`RiakError::NotFound`].
    pub async fn reset_bucket_properties(
        &self,
        bucket_type: Option<&str>,
        bucket: &str,
    ) -> Result<()> {
        validate_bucket(bucket_type, bucket)?;
        self.cluster
            .use_rest(|node| async move {
                node.rest().delete_bucket_props(bucket_type, bucket).await
            })
            .await
    }

    /// Runs a sequence of operations pinned to one connection.
    ///
    /// The callback receives a [`BatchClient`] owning the borrowed
    /// connection; every operation on it uses that connection, strictly
    /// in call order, with no interleaving from other callers. The
    /// connection is returned to its pool when the callback's future
    /// completes, on success and error alike.
    ///
    /// The borrow itself is retried at most once; a connection broken
    /// mid-batch fails the remaining operations rather than restarting
    /// the batch elsewhere.
    pub async fn batch<T, F, Fut>(&self, f: F) -> Result<T>
    where
        F: FnOnce(BatchClient) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let pinned = self
            .cluster
            .pin_connection(self.cluster.retries().min(1), |conn| async move {
                (conn, Ok(()))
            })
            .await?;

        f(BatchClient::new(pinned)).await
    }
}

fn validate_bucket(bucket_type: Option<&str>, bucket: &str) -> Result<()> {
    if let Some(t) = bucket_type {
        validate_component("bucket type", t)?;
    }
    validate_component("bucket", bucket)
}

fn validate_dt_id(id: &RiakObjectId) -> Result<()> {
    id.validate()?;
    if id.bucket_type.is_none() {
        return Err(RiakError::Validation(
            "data type operations require a bucket type".into(),
        ));
    }
    Ok(())
}

fn warn_list_keys(bucket: &str) {
    tracing::warn!(
        bucket = %bucket,
        "list-keys walks the whole bucket and should not be used in production"
    );
}

fn map_red_done(resp: &RpbMapRedResp) -> bool {
    resp.done.unwrap_or(false)
}

fn index_done(resp: &RpbIndexResp) -> bool {
    resp.done.unwrap_or(false)
}
