//! Request building, wire driving, and response mapping for each
//! operation, shared between the client façade and batch sessions.

use bytes::Bytes;
use riak_core::protocol::constants::*;
use riak_core::protocol::messages::*;
use riak_core::{Result, RiakError};

use crate::connection::Connection;
use crate::crdt::{self, CounterResult, MapResult, SetResult, SetUpdate};
use crate::object::{RiakObject, RiakObjectId};
use crate::options::{
    CounterGetOptions, CounterUpdateOptions, DeleteOptions, DtFetchOptions, DtUpdateOptions,
    GetOptions, PutOptions,
};

pub(crate) async fn ping(conn: &mut Connection) -> Result<()> {
    conn.exchange(PING_REQ, PING_RESP).await
}

pub(crate) async fn server_info(conn: &mut Connection) -> Result<RpbGetServerInfoResp> {
    conn.send(GET_SERVER_INFO_REQ, Bytes::new()).await?;
    let resp = conn.recv_expected(GET_SERVER_INFO_RESP).await?;
    conn.settle();
    Ok(resp)
}

pub(crate) fn build_get_req(id: &RiakObjectId, options: &GetOptions) -> RpbGetReq {
    let mut req = RpbGetReq {
        bucket: id.bucket_bytes(),
        key: id.key_bytes(),
        bucket_type: id.type_bytes(),
        ..Default::default()
    };
    options.populate(&mut req);
    req
}

pub(crate) fn map_get_resp(id: &RiakObjectId, resp: RpbGetResp) -> Result<RiakObject> {
    let vclock = resp.vclock.ok_or(RiakError::NotFound)?;
    RiakObject::from_contents(id, &resp.content, vclock)
}

pub(crate) async fn get(
    conn: &mut Connection,
    id: &RiakObjectId,
    options: &GetOptions,
) -> Result<RiakObject> {
    let req = build_get_req(id, options);
    let resp: RpbGetResp = conn.exchange_typed(&req, GET_REQ, GET_RESP).await?;
    map_get_resp(id, resp)
}

pub(crate) fn build_put_req(object: &RiakObject, options: &PutOptions) -> RpbPutReq {
    let mut req = RpbPutReq {
        bucket: object.id.bucket_bytes(),
        key: Some(object.id.key_bytes()),
        bucket_type: object.id.type_bytes(),
        vclock: object.vclock.clone(),
        content: Some(object.to_content()),
        ..Default::default()
    };
    options.populate(&mut req);
    req
}

pub(crate) fn map_put_resp(
    object: &RiakObject,
    options: &PutOptions,
    resp: RpbPutResp,
) -> Result<RiakObject> {
    if options.return_body != Some(true) {
        return Ok(object.clone());
    }

    let vclock = resp.vclock.ok_or_else(|| {
        RiakError::InvalidResponse("put with return_body carried no causal vector".into())
    })?;
    RiakObject::from_contents(&object.id, &resp.content, vclock)
}

pub(crate) async fn put(
    conn: &mut Connection,
    object: &RiakObject,
    options: &PutOptions,
) -> Result<RiakObject> {
    let req = build_put_req(object, options);
    let resp: RpbPutResp = conn.exchange_typed(&req, PUT_REQ, PUT_RESP).await?;
    map_put_resp(object, options, resp)
}

pub(crate) fn build_del_req(id: &RiakObjectId, options: &DeleteOptions) -> RpbDelReq {
    let mut req = RpbDelReq {
        bucket: id.bucket_bytes(),
        key: id.key_bytes(),
        bucket_type: id.type_bytes(),
        ..Default::default()
    };
    options.populate(&mut req);
    req
}

pub(crate) async fn delete(
    conn: &mut Connection,
    id: &RiakObjectId,
    options: &DeleteOptions,
) -> Result<()> {
    let req = build_del_req(id, options);
    conn.exchange_ack(&req, DEL_REQ, DEL_RESP).await
}

/// Deletes by raw key bytes. Used by delete-bucket, whose keys come off
/// the wire and need not be valid UTF-8. The bucket type travels with
/// every delete so typed buckets are emptied correctly.
pub(crate) async fn delete_raw(
    conn: &mut Connection,
    bucket_type: Option<&str>,
    bucket: &str,
    key: Bytes,
    options: &DeleteOptions,
) -> Result<()> {
    let mut req = RpbDelReq {
        bucket: Bytes::copy_from_slice(bucket.as_bytes()),
        key,
        bucket_type: bucket_type.map(|t| Bytes::copy_from_slice(t.as_bytes())),
        ..Default::default()
    };
    options.populate(&mut req);
    conn.exchange_ack(&req, DEL_REQ, DEL_RESP).await
}

pub(crate) fn build_list_keys_req(bucket_type: Option<&str>, bucket: &str) -> RpbListKeysReq {
    RpbListKeysReq {
        bucket: Bytes::copy_from_slice(bucket.as_bytes()),
        bucket_type: bucket_type.map(|t| Bytes::copy_from_slice(t.as_bytes())),
        timeout: None,
    }
}

pub(crate) fn list_keys_done(resp: &RpbListKeysResp) -> bool {
    resp.done.unwrap_or(false)
}

/// Eagerly drains a list-keys stream into the deduplicated union of
/// every frame's keys.
pub(crate) async fn list_keys(
    conn: &mut Connection,
    bucket_type: Option<&str>,
    bucket: &str,
) -> Result<Vec<Bytes>> {
    let req = build_list_keys_req(bucket_type, bucket);
    let frames = conn
        .exchange_streaming(&req, LIST_KEYS_REQ, LIST_KEYS_RESP, list_keys_done)
        .await?;
    Ok(dedup_names(frames.into_iter().flat_map(|f| f.keys)))
}

pub(crate) fn build_list_buckets_req(bucket_type: Option<&str>, stream: bool) -> RpbListBucketsReq {
    RpbListBucketsReq {
        bucket_type: bucket_type.map(|t| Bytes::copy_from_slice(t.as_bytes())),
        stream: if stream { Some(true) } else { None },
        timeout: None,
    }
}

pub(crate) fn list_buckets_done(resp: &RpbListBucketsResp) -> bool {
    resp.done.unwrap_or(false)
}

pub(crate) async fn list_buckets(
    conn: &mut Connection,
    bucket_type: Option<&str>,
) -> Result<Vec<Bytes>> {
    let req = build_list_buckets_req(bucket_type, false);
    let resp: RpbListBucketsResp = conn
        .exchange_typed(&req, LIST_BUCKETS_REQ, LIST_BUCKETS_RESP)
        .await?;
    Ok(dedup_names(resp.buckets))
}

pub(crate) fn dedup_names(names: impl IntoIterator<Item = Bytes>) -> Vec<Bytes> {
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

pub(crate) fn build_counter_update_req(
    id: &RiakObjectId,
    amount: i64,
    options: &CounterUpdateOptions,
) -> RpbCounterUpdateReq {
    let mut req = RpbCounterUpdateReq {
        bucket: id.bucket_bytes(),
        key: id.key_bytes(),
        amount,
        ..Default::default()
    };
    options.populate(&mut req);
    req
}

pub(crate) async fn counter_update(
    conn: &mut Connection,
    id: &RiakObjectId,
    amount: i64,
    options: &CounterUpdateOptions,
) -> Result<Option<i64>> {
    let req = build_counter_update_req(id, amount, options);
    let resp: RpbCounterUpdateResp = conn
        .exchange_typed(&req, COUNTER_UPDATE_REQ, COUNTER_UPDATE_RESP)
        .await?;
    Ok(resp.value)
}

pub(crate) fn build_counter_get_req(
    id: &RiakObjectId,
    options: &CounterGetOptions,
) -> RpbCounterGetReq {
    let mut req = RpbCounterGetReq {
        bucket: id.bucket_bytes(),
        key: id.key_bytes(),
        ..Default::default()
    };
    options.populate(&mut req);
    req
}

pub(crate) async fn counter_get(
    conn: &mut Connection,
    id: &RiakObjectId,
    options: &CounterGetOptions,
) -> Result<i64> {
    let req = build_counter_get_req(id, options);
    let resp: RpbCounterGetResp = conn
        .exchange_typed(&req, COUNTER_GET_REQ, COUNTER_GET_RESP)
        .await?;
    resp.value.ok_or(RiakError::NotFound)
}

/// CRDT operations address `(bucket type, bucket, key)`; the bucket type
/// is mandatory there, unlike on the KV path.
pub(crate) fn dt_type_bytes(id: &RiakObjectId) -> Result<Bytes> {
    id.type_bytes().ok_or_else(|| {
        RiakError::Validation("data type operations require a bucket type".into())
    })
}

pub(crate) fn build_dt_fetch_req(id: &RiakObjectId, options: &DtFetchOptions) -> Result<DtFetchReq> {
    let mut req = DtFetchReq {
        bucket: id.bucket_bytes(),
        key: id.key_bytes(),
        bucket_type: dt_type_bytes(id)?,
        ..Default::default()
    };
    options.populate(&mut req);
    Ok(req)
}

pub(crate) async fn dt_fetch(
    conn: &mut Connection,
    id: &RiakObjectId,
    options: &DtFetchOptions,
) -> Result<DtFetchResp> {
    let req = build_dt_fetch_req(id, options)?;
    conn.exchange_typed(&req, DT_FETCH_REQ, DT_FETCH_RESP).await
}

pub(crate) fn build_dt_update_req(
    id: &RiakObjectId,
    op: DtOp,
    options: &DtUpdateOptions,
) -> Result<DtUpdateReq> {
    let mut req = DtUpdateReq {
        bucket: id.bucket_bytes(),
        key: Some(id.key_bytes()),
        bucket_type: dt_type_bytes(id)?,
        op: Some(op),
        ..Default::default()
    };
    options.populate(&mut req);
    Ok(req)
}

pub(crate) async fn dt_update(
    conn: &mut Connection,
    id: &RiakObjectId,
    op: DtOp,
    options: &DtUpdateOptions,
) -> Result<DtUpdateResp> {
    let req = build_dt_update_req(id, op, options)?;
    conn.exchange_typed(&req, DT_UPDATE_REQ, DT_UPDATE_RESP).await
}

pub(crate) async fn fetch_counter(
    conn: &mut Connection,
    id: &RiakObjectId,
    options: &DtFetchOptions,
) -> Result<CounterResult> {
    crdt::counter_from_fetch(dt_fetch(conn, id, options).await?)
}

pub(crate) async fn update_counter(
    conn: &mut Connection,
    id: &RiakObjectId,
    increment: i64,
    options: &DtUpdateOptions,
) -> Result<CounterResult> {
    let op = DtOp {
        counter_op: Some(crdt::counter_op(increment)),
        ..Default::default()
    };
    Ok(crdt::counter_from_update(
        dt_update(conn, id, op, options).await?,
    ))
}

pub(crate) async fn fetch_set(
    conn: &mut Connection,
    id: &RiakObjectId,
    options: &DtFetchOptions,
) -> Result<SetResult> {
    crdt::set_from_fetch(dt_fetch(conn, id, options).await?)
}

pub(crate) async fn update_set(
    conn: &mut Connection,
    id: &RiakObjectId,
    update: SetUpdate,
    options: &DtUpdateOptions,
) -> Result<SetResult> {
    if update.has_removes() && options.context.is_none() {
        return Err(RiakError::Validation(
            "set removals require the causal context from a fetch".into(),
        ));
    }
    let op = DtOp {
        set_op: Some(update.into_op()),
        ..Default::default()
    };
    Ok(crdt::set_from_update(dt_update(conn, id, op, options).await?))
}

pub(crate) async fn fetch_map(
    conn: &mut Connection,
    id: &RiakObjectId,
    options: &DtFetchOptions,
) -> Result<MapResult> {
    crdt::map_from_fetch(dt_fetch(conn, id, options).await?)
}

pub(crate) async fn update_map(
    conn: &mut Connection,
    id: &RiakObjectId,
    op: MapOp,
    options: &DtUpdateOptions,
) -> Result<MapResult> {
    if !op.removes.is_empty() && options.context.is_none() {
        return Err(RiakError::Validation(
            "map removals require the causal context from a fetch".into(),
        ));
    }
    let op = DtOp {
        map_op: Some(op),
        ..Default::default()
    };
    Ok(crdt::map_from_update(dt_update(conn, id, op, options).await?))
}

pub(crate) fn build_get_bucket_req(bucket_type: Option<&str>, bucket: &str) -> RpbGetBucketReq {
    RpbGetBucketReq {
        bucket: Bytes::copy_from_slice(bucket.as_bytes()),
        bucket_type: bucket_type.map(|t| Bytes::copy_from_slice(t.as_bytes())),
    }
}

pub(crate) async fn get_bucket_props(
    conn: &mut Connection,
    bucket_type: Option<&str>,
    bucket: &str,
) -> Result<RpbBucketProps> {
    let req = build_get_bucket_req(bucket_type, bucket);
    let resp: RpbGetBucketResp = conn
        .exchange_typed(&req, GET_BUCKET_REQ, GET_BUCKET_RESP)
        .await?;
    resp.props.ok_or_else(|| {
        RiakError::InvalidResponse("get-bucket response carried no properties".into())
    })
}

pub(crate) async fn set_bucket_props(
    conn: &mut Connection,
    bucket_type: Option<&str>,
    bucket: &str,
    props: RpbBucketProps,
) -> Result<()> {
    let req = RpbSetBucketReq {
        bucket: Bytes::copy_from_slice(bucket.as_bytes()),
        bucket_type: bucket_type.map(|t| Bytes::copy_from_slice(t.as_bytes())),
        props: Some(props),
    };
    conn.exchange_ack(&req, SET_BUCKET_REQ, SET_BUCKET_RESP).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Quorum;

    #[test]
    fn test_build_get_req_carries_id_and_options() {
        let id = RiakObjectId::with_type("t", "b", "k");
        let options = GetOptions::default().r(Quorum::One);
        let req = build_get_req(&id, &options);

        assert_eq!(req.bucket, Bytes::from_static(b"b"));
        assert_eq!(req.key, Bytes::from_static(b"k"));
        assert_eq!(req.bucket_type, Some(Bytes::from_static(b"t")));
        assert_eq!(req.r, Some(Quorum::One.as_u32()));
    }

    #[test]
    fn test_map_get_resp_missing_vclock_is_not_found() {
        let id = RiakObjectId::new("b", "k");
        let err = map_get_resp(&id, RpbGetResp::default()).unwrap_err();
        assert!(matches!(err, RiakError::NotFound));
        assert_eq!(err.to_string(), "Unable to find value in Riak");
    }

    #[test]
    fn test_map_get_resp_materializes_siblings() {
        let id = RiakObjectId::new("b", "k");
        let resp = RpbGetResp {
            content: vec![
                RpbContent {
                    value: Bytes::from_static(b"v1"),
                    ..Default::default()
                },
                RpbContent {
                    value: Bytes::from_static(b"v2"),
                    ..Default::default()
                },
            ],
            vclock: Some(Bytes::from_static(b"vc")),
            unchanged: None,
        };

        let object = map_get_resp(&id, resp).unwrap();
        assert_eq!(object.value, Bytes::from_static(b"v1"));
        assert_eq!(object.siblings.len(), 2);
    }

    #[test]
    fn test_map_put_resp_without_return_body_echoes_input() {
        let id = RiakObjectId::new("b", "k");
        let object = RiakObject::new(id, Bytes::from_static(b"v"));
        let options = PutOptions::default();

        let mapped = map_put_resp(&object, &options, RpbPutResp::default()).unwrap();
        assert_eq!(mapped, object);
    }

    #[test]
    fn test_map_put_resp_with_return_body() {
        let id = RiakObjectId::new("b", "k");
        let object = RiakObject::new(id.clone(), Bytes::from_static(b"old"));
        let options = PutOptions::default().return_body(true);
        let resp = RpbPutResp {
            content: vec![RpbContent {
                value: Bytes::from_static(b"stored"),
                ..Default::default()
            }],
            vclock: Some(Bytes::from_static(b"w")),
            key: None,
        };

        let mapped = map_put_resp(&object, &options, resp).unwrap();
        assert_eq!(mapped.id, id);
        assert_eq!(mapped.value, Bytes::from_static(b"stored"));
        assert_eq!(mapped.vclock, Some(Bytes::from_static(b"w")));
    }

    #[test]
    fn test_map_put_resp_return_body_requires_vclock() {
        let id = RiakObjectId::new("b", "k");
        let object = RiakObject::new(id, Bytes::new());
        let options = PutOptions::default().return_body(true);

        let err = map_put_resp(&object, &options, RpbPutResp::default()).unwrap_err();
        assert!(matches!(err, RiakError::InvalidResponse(_)));
    }

    #[test]
    fn test_dedup_names_preserves_first_occurrence_order() {
        let names = vec![
            Bytes::from_static(b"a"),
            Bytes::from_static(b"b"),
            Bytes::from_static(b"a"),
            Bytes::from_static(b"c"),
            Bytes::from_static(b"b"),
        ];
        let deduped = dedup_names(names);
        assert_eq!(
            deduped,
            vec![
                Bytes::from_static(b"a"),
                Bytes::from_static(b"b"),
                Bytes::from_static(b"c"),
            ]
        );
    }

    #[test]
    fn test_dt_requests_require_bucket_type() {
        let id = RiakObjectId::new("b", "k");
        let err = build_dt_fetch_req(&id, &DtFetchOptions::default()).unwrap_err();
        assert!(matches!(err, RiakError::Validation(_)));

        let typed = RiakObjectId::with_type("counters", "b", "k");
        let req = build_dt_fetch_req(&typed, &DtFetchOptions::default()).unwrap();
        assert_eq!(req.bucket_type, Bytes::from_static(b"counters"));
    }

    #[test]
    fn test_counter_update_amount_passthrough() {
        let id = RiakObjectId::new("b", "k");
        let req = build_counter_update_req(&id, -7, &CounterUpdateOptions::default());
        assert_eq!(req.amount, -7);
    }
}
