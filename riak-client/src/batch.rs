//! Batch sessions: a sequence of operations pinned to one connection.

use bytes::Bytes;
use riak_core::protocol::messages::{MapOp, RpbBucketProps, RpbGetServerInfoResp};
use riak_core::Result;

use crate::cluster::PinnedConnection;
use crate::crdt::{CounterResult, MapResult, SetResult, SetUpdate};
use crate::object::{validate_component, RiakObject, RiakObjectId};
use crate::options::{
    CounterGetOptions, CounterUpdateOptions, DeleteOptions, DtFetchOptions, DtUpdateOptions,
    GetOptions, PutOptions,
};
use crate::ops;

/// The single-connection view of the client handed to a batch callback.
///
/// Every operation drives the one pinned connection, strictly in call
/// order; nothing from other callers interleaves. The connection returns
/// to its pool when this value is dropped — normally when the batch
/// callback's future completes, whether it succeeded or bailed early
/// with `?`.
///
/// Errors are ordinary [`Result`]s, exactly as on the full client. A
/// connection broken mid-batch is not replaced: the remaining operations
/// fail rather than silently restarting the batch on another node.
#[derive(Debug)]
pub struct BatchClient {
    pinned: PinnedConnection,
}

impl BatchClient {
    pub(crate) fn new(pinned: PinnedConnection) -> Self {
        Self { pinned }
    }

    /// Checks liveness of the pinned node.
    pub async fn ping(&mut self) -> Result<()> {
        let conn = self.pinned.conn();
        let result = ops::ping(conn).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Fetches the pinned node's name and version.
    pub async fn server_info(&mut self) -> Result<RpbGetServerInfoResp> {
        let conn = self.pinned.conn();
        let result = ops::server_info(conn).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Fetches an object. Semantics match [`RiakClient::get`].
    ///
    /// [`RiakClient::get`]: crate::RiakClient::get
    pub async fn get(&mut self, id: &RiakObjectId, options: &GetOptions) -> Result<RiakObject> {
        id.validate()?;
        let conn = self.pinned.conn();
        let result = ops::get(conn, id, options).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Stores an object. Semantics match [`RiakClient::put`].
    ///
    /// [`RiakClient::put`]: crate::RiakClient::put
    pub async fn put(&mut self, object: &RiakObject, options: &PutOptions) -> Result<RiakObject> {
        object.id.validate()?;
        let conn = self.pinned.conn();
        let result = ops::put(conn, object, options).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Deletes an object.
    pub async fn delete(&mut self, id: &RiakObjectId, options: &DeleteOptions) -> Result<()> {
        id.validate()?;
        let conn = self.pinned.conn();
        let result = ops::delete(conn, id, options).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Lists all buckets.
    pub async fn list_buckets(&mut self, bucket_type: Option<&str>) -> Result<Vec<Bytes>> {
        if let Some(t) = bucket_type {
            validate_component("bucket type", t)?;
        }
        let conn = self.pinned.conn();
        let result = ops::list_buckets(conn, bucket_type).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Lists every key in a bucket, eagerly.
    pub async fn list_keys(
        &mut self,
        bucket_type: Option<&str>,
        bucket: &str,
    ) -> Result<Vec<Bytes>> {
        if let Some(t) = bucket_type {
            validate_component("bucket type", t)?;
        }
        validate_component("bucket", bucket)?;
        tracing::warn!(
            bucket = %bucket,
            "list-keys walks the whole bucket and should not be used in production"
        );
        let conn = self.pinned.conn();
        let result = ops::list_keys(conn, bucket_type, bucket).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Updates a legacy counter.
    pub async fn increment_counter(
        &mut self,
        id: &RiakObjectId,
        amount: i64,
        options: &CounterUpdateOptions,
    ) -> Result<Option<i64>> {
        id.validate()?;
        let conn = self.pinned.conn();
        let result = ops::counter_update(conn, id, amount, options).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Reads a legacy counter.
    pub async fn get_counter(
        &mut self,
        id: &RiakObjectId,
        options: &CounterGetOptions,
    ) -> Result<i64> {
        id.validate()?;
        let conn = self.pinned.conn();
        let result = ops::counter_get(conn, id, options).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Fetches a CRDT counter.
    pub async fn fetch_counter(
        &mut self,
        id: &RiakObjectId,
        options: &DtFetchOptions,
    ) -> Result<CounterResult> {
        id.validate()?;
        let conn = self.pinned.conn();
        let result = ops::fetch_counter(conn, id, options).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Updates a CRDT counter.
    pub async fn update_counter(
        &mut self,
        id: &RiakObjectId,
        increment: i64,
        options: &DtUpdateOptions,
    ) -> Result<CounterResult> {
        id.validate()?;
        let conn = self.pinned.conn();
        let result = ops::update_counter(conn, id, increment, options).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Fetches a CRDT set.
    pub async fn fetch_set(
        &mut self,
        id: &RiakObjectId,
        options: &DtFetchOptions,
    ) -> Result<SetResult> {
        id.validate()?;
        let conn = self.pinned.conn();
        let result = ops::fetch_set(conn, id, options).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Applies adds and removes to a CRDT set.
    pub async fn update_set(
        &mut self,
        id: &RiakObjectId,
        update: &SetUpdate,
        options: &DtUpdateOptions,
    ) -> Result<SetResult> {
        id.validate()?;
        let conn = self.pinned.conn();
        let result = ops::update_set(conn, id, update.clone(), options).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Fetches a CRDT map.
    pub async fn fetch_map(
        &mut self,
        id: &RiakObjectId,
        options: &DtFetchOptions,
    ) -> Result<MapResult> {
        id.validate()?;
        let conn = self.pinned.conn();
        let result = ops::fetch_map(conn, id, options).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Applies a map operation to a CRDT map.
    pub async fn update_map(
        &mut self,
        id: &RiakObjectId,
        op: &MapOp,
        options: &DtUpdateOptions,
    ) -> Result<MapResult> {
        id.validate()?;
        let conn = self.pinned.conn();
        let result = ops::update_map(conn, id, op.clone(), options).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Reads a bucket's properties.
    pub async fn get_bucket_properties(
        &mut self,
        bucket_type: Option<&str>,
        bucket: &str,
    ) -> Result<RpbBucketProps> {
        if let Some(t) = bucket_type {
            validate_component("bucket type", t)?;
        }
        validate_component("bucket", bucket)?;
        let conn = self.pinned.conn();
        let result = ops::get_bucket_props(conn, bucket_type, bucket).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }

    /// Stores a bucket's properties.
    pub async fn set_bucket_properties(
        &mut self,
        bucket_type: Option<&str>,
        bucket: &str,
        props: &RpbBucketProps,
    ) -> Result<()> {
        if let Some(t) = bucket_type {
            validate_component("bucket type", t)?;
        }
        validate_component("bucket", bucket)?;
        let conn = self.pinned.conn();
        let result = ops::set_bucket_props(conn, bucket_type, bucket, props.clone()).await;
        if let Err(e) = &result {
            self.pinned.fault(e);
        }
        result
    }
}
