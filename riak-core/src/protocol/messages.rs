//! Typed request and response messages for the Riak binary protocol.
//!
//! Message bodies on the wire are Protocol Buffers; the structs here are
//! hand-written `prost` derives whose tags match the upstream Riak schema
//! (`riak.proto`, `riak_kv.proto`, `riak_search.proto`, `riak_dt.proto`).
//! The protocol is proto2: scalar fields the server always sends are
//! `required`, everything else is optional and omitted when unset.

// Field names mirror the upstream schema; per-field docs would only
// restate it.
#![allow(missing_docs)]

use bytes::Bytes;

// ---------------------------------------------------------------------------
// riak.proto — shared messages
// ---------------------------------------------------------------------------

/// Error response; may substitute for any expected response code.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbErrorResp {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub errmsg: Bytes,
    #[prost(uint32, required, tag = "2")]
    pub errcode: u32,
}

/// Server info response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbGetServerInfoResp {
    #[prost(bytes = "bytes", optional, tag = "1")]
    pub node: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub server_version: Option<Bytes>,
}

/// A key/value pair used by user metadata, secondary indexes, and search
/// documents.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbPair {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub key: Bytes,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub value: Option<Bytes>,
}

/// Get bucket properties request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbGetBucketReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub bucket: Bytes,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub bucket_type: Option<Bytes>,
}

/// Get bucket properties response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbGetBucketResp {
    #[prost(message, optional, tag = "1")]
    pub props: Option<RpbBucketProps>,
}

/// Set bucket properties request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbSetBucketReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub bucket: Bytes,
    #[prost(message, optional, tag = "2")]
    pub props: Option<RpbBucketProps>,
    #[prost(bytes = "bytes", optional, tag = "3")]
    pub bucket_type: Option<Bytes>,
}

/// Reset bucket properties request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbResetBucketReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub bucket: Bytes,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub bucket_type: Option<Bytes>,
}

/// An Erlang module/function reference used by commit hooks and the
/// consistent-hashing / link functions in bucket properties.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbModFun {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub module: Bytes,
    #[prost(bytes = "bytes", required, tag = "2")]
    pub function: Bytes,
}

/// A pre- or post-commit hook attached to a bucket.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbCommitHook {
    #[prost(message, optional, tag = "1")]
    pub modfun: Option<RpbModFun>,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub name: Option<Bytes>,
}

/// Bucket properties.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbBucketProps {
    #[prost(uint32, optional, tag = "1")]
    pub n_val: Option<u32>,
    #[prost(bool, optional, tag = "2")]
    pub allow_mult: Option<bool>,
    #[prost(bool, optional, tag = "3")]
    pub last_write_wins: Option<bool>,
    #[prost(message, repeated, tag = "4")]
    pub precommit: Vec<RpbCommitHook>,
    #[prost(bool, optional, tag = "5")]
    pub has_precommit: Option<bool>,
    #[prost(message, repeated, tag = "6")]
    pub postcommit: Vec<RpbCommitHook>,
    #[prost(bool, optional, tag = "7")]
    pub has_postcommit: Option<bool>,
    #[prost(message, optional, tag = "8")]
    pub chash_keyfun: Option<RpbModFun>,
    #[prost(message, optional, tag = "9")]
    pub linkfun: Option<RpbModFun>,
    #[prost(uint32, optional, tag = "10")]
    pub old_vclock: Option<u32>,
    #[prost(uint32, optional, tag = "11")]
    pub young_vclock: Option<u32>,
    #[prost(uint32, optional, tag = "12")]
    pub big_vclock: Option<u32>,
    #[prost(uint32, optional, tag = "13")]
    pub small_vclock: Option<u32>,
    #[prost(uint32, optional, tag = "14")]
    pub pr: Option<u32>,
    #[prost(uint32, optional, tag = "15")]
    pub r: Option<u32>,
    #[prost(uint32, optional, tag = "16")]
    pub w: Option<u32>,
    #[prost(uint32, optional, tag = "17")]
    pub pw: Option<u32>,
    #[prost(uint32, optional, tag = "18")]
    pub dw: Option<u32>,
    #[prost(uint32, optional, tag = "19")]
    pub rw: Option<u32>,
    #[prost(bool, optional, tag = "20")]
    pub basic_quorum: Option<bool>,
    #[prost(bool, optional, tag = "21")]
    pub notfound_ok: Option<bool>,
    #[prost(bytes = "bytes", optional, tag = "22")]
    pub backend: Option<Bytes>,
    #[prost(bool, optional, tag = "23")]
    pub search: Option<bool>,
    #[prost(bytes = "bytes", optional, tag = "25")]
    pub search_index: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "26")]
    pub datatype: Option<Bytes>,
    #[prost(bool, optional, tag = "27")]
    pub consistent: Option<bool>,
}

// ---------------------------------------------------------------------------
// riak_kv.proto — object storage
// ---------------------------------------------------------------------------

/// Fetch object request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbGetReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub bucket: Bytes,
    #[prost(bytes = "bytes", required, tag = "2")]
    pub key: Bytes,
    #[prost(uint32, optional, tag = "3")]
    pub r: Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub pr: Option<u32>,
    #[prost(bool, optional, tag = "5")]
    pub basic_quorum: Option<bool>,
    #[prost(bool, optional, tag = "6")]
    pub notfound_ok: Option<bool>,
    #[prost(bytes = "bytes", optional, tag = "7")]
    pub if_modified: Option<Bytes>,
    #[prost(bool, optional, tag = "8")]
    pub head: Option<bool>,
    #[prost(bool, optional, tag = "9")]
    pub deletedvclock: Option<bool>,
    #[prost(uint32, optional, tag = "10")]
    pub timeout: Option<u32>,
    #[prost(bool, optional, tag = "11")]
    pub sloppy_quorum: Option<bool>,
    #[prost(uint32, optional, tag = "12")]
    pub n_val: Option<u32>,
    #[prost(bytes = "bytes", optional, tag = "13")]
    pub bucket_type: Option<Bytes>,
}

/// Fetch object response. An absent `vclock` means the object does not
/// exist; more than one `content` means concurrent writes left siblings.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbGetResp {
    #[prost(message, repeated, tag = "1")]
    pub content: Vec<RpbContent>,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub vclock: Option<Bytes>,
    #[prost(bool, optional, tag = "3")]
    pub unchanged: Option<bool>,
}

/// Store object request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbPutReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub bucket: Bytes,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub key: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "3")]
    pub vclock: Option<Bytes>,
    #[prost(message, optional, tag = "4")]
    pub content: Option<RpbContent>,
    #[prost(uint32, optional, tag = "5")]
    pub w: Option<u32>,
    #[prost(uint32, optional, tag = "6")]
    pub dw: Option<u32>,
    #[prost(bool, optional, tag = "7")]
    pub return_body: Option<bool>,
    #[prost(uint32, optional, tag = "8")]
    pub pw: Option<u32>,
    #[prost(bool, optional, tag = "9")]
    pub if_not_modified: Option<bool>,
    #[prost(bool, optional, tag = "10")]
    pub if_none_match: Option<bool>,
    #[prost(bool, optional, tag = "11")]
    pub return_head: Option<bool>,
    #[prost(uint32, optional, tag = "12")]
    pub timeout: Option<u32>,
    #[prost(bool, optional, tag = "13")]
    pub asis: Option<bool>,
    #[prost(bool, optional, tag = "14")]
    pub sloppy_quorum: Option<bool>,
    #[prost(uint32, optional, tag = "15")]
    pub n_val: Option<u32>,
    #[prost(bytes = "bytes", optional, tag = "16")]
    pub bucket_type: Option<Bytes>,
}

/// Store object response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbPutResp {
    #[prost(message, repeated, tag = "1")]
    pub content: Vec<RpbContent>,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub vclock: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "3")]
    pub key: Option<Bytes>,
}

/// Delete object request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbDelReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub bucket: Bytes,
    #[prost(bytes = "bytes", required, tag = "2")]
    pub key: Bytes,
    #[prost(uint32, optional, tag = "3")]
    pub rw: Option<u32>,
    #[prost(bytes = "bytes", optional, tag = "4")]
    pub vclock: Option<Bytes>,
    #[prost(uint32, optional, tag = "5")]
    pub r: Option<u32>,
    #[prost(uint32, optional, tag = "6")]
    pub w: Option<u32>,
    #[prost(uint32, optional, tag = "7")]
    pub pr: Option<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub pw: Option<u32>,
    #[prost(uint32, optional, tag = "9")]
    pub dw: Option<u32>,
    #[prost(uint32, optional, tag = "10")]
    pub timeout: Option<u32>,
    #[prost(bool, optional, tag = "11")]
    pub sloppy_quorum: Option<bool>,
    #[prost(uint32, optional, tag = "12")]
    pub n_val: Option<u32>,
    #[prost(bytes = "bytes", optional, tag = "13")]
    pub bucket_type: Option<Bytes>,
}

/// List buckets request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbListBucketsReq {
    #[prost(uint32, optional, tag = "1")]
    pub timeout: Option<u32>,
    #[prost(bool, optional, tag = "2")]
    pub stream: Option<bool>,
    #[prost(bytes = "bytes", optional, tag = "3")]
    pub bucket_type: Option<Bytes>,
}

/// List buckets response; the terminal frame of a stream sets `done`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbListBucketsResp {
    #[prost(bytes = "bytes", repeated, tag = "1")]
    pub buckets: Vec<Bytes>,
    #[prost(bool, optional, tag = "2")]
    pub done: Option<bool>,
}

/// List keys request. Always streamed by the server.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbListKeysReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub bucket: Bytes,
    #[prost(uint32, optional, tag = "2")]
    pub timeout: Option<u32>,
    #[prost(bytes = "bytes", optional, tag = "3")]
    pub bucket_type: Option<Bytes>,
}

/// List keys response; the terminal frame of the stream sets `done`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbListKeysResp {
    #[prost(bytes = "bytes", repeated, tag = "1")]
    pub keys: Vec<Bytes>,
    #[prost(bool, optional, tag = "2")]
    pub done: Option<bool>,
}

/// Map-reduce request; `request` is a query in the encoding named by
/// `content_type` (JSON or Erlang term format).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbMapRedReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub request: Bytes,
    #[prost(bytes = "bytes", required, tag = "2")]
    pub content_type: Bytes,
}

/// Map-reduce response; one frame per phase result, terminated by `done`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbMapRedResp {
    #[prost(uint32, optional, tag = "1")]
    pub phase: Option<u32>,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub response: Option<Bytes>,
    #[prost(bool, optional, tag = "3")]
    pub done: Option<bool>,
}

/// Secondary index query type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum IndexQueryType {
    /// Exact-match query on a single index term.
    Eq = 0,
    /// Range query between `range_min` and `range_max`.
    Range = 1,
}

/// Secondary index query request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbIndexReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub bucket: Bytes,
    #[prost(bytes = "bytes", required, tag = "2")]
    pub index: Bytes,
    #[prost(enumeration = "IndexQueryType", required, tag = "3")]
    pub qtype: i32,
    #[prost(bytes = "bytes", optional, tag = "4")]
    pub key: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "5")]
    pub range_min: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "6")]
    pub range_max: Option<Bytes>,
    #[prost(bool, optional, tag = "7")]
    pub return_terms: Option<bool>,
    #[prost(bool, optional, tag = "8")]
    pub stream: Option<bool>,
    #[prost(uint32, optional, tag = "9")]
    pub max_results: Option<u32>,
    #[prost(bytes = "bytes", optional, tag = "10")]
    pub continuation: Option<Bytes>,
    #[prost(uint32, optional, tag = "11")]
    pub timeout: Option<u32>,
    #[prost(bytes = "bytes", optional, tag = "12")]
    pub bucket_type: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "13")]
    pub term_regex: Option<Bytes>,
    #[prost(bool, optional, tag = "14")]
    pub pagination_sort: Option<bool>,
}

/// Secondary index query response. `results` carries term/key pairs when
/// `return_terms` was set; `keys` otherwise.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbIndexResp {
    #[prost(bytes = "bytes", repeated, tag = "1")]
    pub keys: Vec<Bytes>,
    #[prost(message, repeated, tag = "2")]
    pub results: Vec<RpbPair>,
    #[prost(bytes = "bytes", optional, tag = "3")]
    pub continuation: Option<Bytes>,
    #[prost(bool, optional, tag = "4")]
    pub done: Option<bool>,
}

/// Object content plus metadata. A get/put response with more than one
/// content represents siblings.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbContent {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub value: Bytes,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub content_type: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "3")]
    pub charset: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "4")]
    pub content_encoding: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "5")]
    pub vtag: Option<Bytes>,
    #[prost(message, repeated, tag = "6")]
    pub links: Vec<RpbLink>,
    #[prost(uint32, optional, tag = "7")]
    pub last_mod: Option<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub last_mod_usecs: Option<u32>,
    #[prost(message, repeated, tag = "9")]
    pub usermeta: Vec<RpbPair>,
    #[prost(message, repeated, tag = "10")]
    pub indexes: Vec<RpbPair>,
    #[prost(bool, optional, tag = "11")]
    pub deleted: Option<bool>,
}

/// A link from one object to another.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbLink {
    #[prost(bytes = "bytes", optional, tag = "1")]
    pub bucket: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub key: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "3")]
    pub tag: Option<Bytes>,
}

/// Legacy (1.4) counter update request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbCounterUpdateReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub bucket: Bytes,
    #[prost(bytes = "bytes", required, tag = "2")]
    pub key: Bytes,
    #[prost(sint64, required, tag = "3")]
    pub amount: i64,
    #[prost(uint32, optional, tag = "4")]
    pub w: Option<u32>,
    #[prost(uint32, optional, tag = "5")]
    pub dw: Option<u32>,
    #[prost(uint32, optional, tag = "6")]
    pub pw: Option<u32>,
    #[prost(bool, optional, tag = "7")]
    pub returnvalue: Option<bool>,
}

/// Legacy counter update response; `value` is present only when the
/// request asked for it.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbCounterUpdateResp {
    #[prost(sint64, optional, tag = "1")]
    pub value: Option<i64>,
}

/// Legacy counter get request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbCounterGetReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub bucket: Bytes,
    #[prost(bytes = "bytes", required, tag = "2")]
    pub key: Bytes,
    #[prost(uint32, optional, tag = "3")]
    pub r: Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub pr: Option<u32>,
    #[prost(bool, optional, tag = "5")]
    pub basic_quorum: Option<bool>,
    #[prost(bool, optional, tag = "6")]
    pub notfound_ok: Option<bool>,
}

/// Legacy counter get response. An absent `value` means the counter does
/// not exist.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbCounterGetResp {
    #[prost(sint64, optional, tag = "1")]
    pub value: Option<i64>,
}

// ---------------------------------------------------------------------------
// riak_search.proto — full-text search
// ---------------------------------------------------------------------------

/// A single document in a search result.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbSearchDoc {
    #[prost(message, repeated, tag = "1")]
    pub fields: Vec<RpbPair>,
}

/// Search query request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbSearchQueryReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub q: Bytes,
    #[prost(bytes = "bytes", required, tag = "2")]
    pub index: Bytes,
    #[prost(uint32, optional, tag = "3")]
    pub rows: Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub start: Option<u32>,
    #[prost(bytes = "bytes", optional, tag = "5")]
    pub sort: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "6")]
    pub filter: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "7")]
    pub df: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "8")]
    pub op: Option<Bytes>,
    #[prost(bytes = "bytes", repeated, tag = "9")]
    pub fl: Vec<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "10")]
    pub presort: Option<Bytes>,
}

/// Search query response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpbSearchQueryResp {
    #[prost(message, repeated, tag = "1")]
    pub docs: Vec<RpbSearchDoc>,
    #[prost(float, optional, tag = "2")]
    pub max_score: Option<f32>,
    #[prost(uint32, optional, tag = "3")]
    pub num_found: Option<u32>,
}

// ---------------------------------------------------------------------------
// riak_dt.proto — CRDT data types
// ---------------------------------------------------------------------------

/// The kind of a field inside a CRDT map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MapFieldType {
    /// Embedded counter.
    Counter = 1,
    /// Embedded set.
    Set = 2,
    /// Last-write-wins register.
    Register = 3,
    /// Enable/disable flag.
    Flag = 4,
    /// Nested map.
    Map = 5,
}

/// A `(name, kind)` pair identifying an entry inside a CRDT map.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MapField {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub name: Bytes,
    #[prost(enumeration = "MapFieldType", required, tag = "2")]
    pub field_type: i32,
}

/// A single entry of a fetched CRDT map; exactly one of the `*_value`
/// fields is meaningful, selected by `field.field_type`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MapEntry {
    #[prost(message, optional, tag = "1")]
    pub field: Option<MapField>,
    #[prost(sint64, optional, tag = "2")]
    pub counter_value: Option<i64>,
    #[prost(bytes = "bytes", repeated, tag = "3")]
    pub set_value: Vec<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "4")]
    pub register_value: Option<Bytes>,
    #[prost(bool, optional, tag = "5")]
    pub flag_value: Option<bool>,
    #[prost(message, repeated, tag = "6")]
    pub map_value: Vec<MapEntry>,
}

/// CRDT fetch request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DtFetchReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub bucket: Bytes,
    #[prost(bytes = "bytes", required, tag = "2")]
    pub key: Bytes,
    #[prost(bytes = "bytes", required, tag = "3")]
    pub bucket_type: Bytes,
    #[prost(uint32, optional, tag = "4")]
    pub r: Option<u32>,
    #[prost(uint32, optional, tag = "5")]
    pub pr: Option<u32>,
    #[prost(bool, optional, tag = "6")]
    pub basic_quorum: Option<bool>,
    #[prost(bool, optional, tag = "7")]
    pub notfound_ok: Option<bool>,
    #[prost(uint32, optional, tag = "8")]
    pub timeout: Option<u32>,
    #[prost(bool, optional, tag = "9")]
    pub sloppy_quorum: Option<bool>,
    #[prost(uint32, optional, tag = "10")]
    pub n_val: Option<u32>,
    #[prost(bool, optional, tag = "11", default = "true")]
    pub include_context: Option<bool>,
}

/// The kind of a top-level CRDT.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DataType {
    /// PN-counter.
    Counter = 1,
    /// Observed-remove set.
    Set = 2,
    /// Composable map.
    Map = 3,
}

/// A fetched CRDT value; the field matching the response's `data_type`
/// is meaningful.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DtValue {
    #[prost(sint64, optional, tag = "1")]
    pub counter_value: Option<i64>,
    #[prost(bytes = "bytes", repeated, tag = "2")]
    pub set_value: Vec<Bytes>,
    #[prost(message, repeated, tag = "3")]
    pub map_value: Vec<MapEntry>,
}

/// CRDT fetch response. An absent `value` means the object does not
/// exist.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DtFetchResp {
    #[prost(bytes = "bytes", optional, tag = "1")]
    pub context: Option<Bytes>,
    #[prost(enumeration = "DataType", required, tag = "2")]
    pub data_type: i32,
    #[prost(message, optional, tag = "3")]
    pub value: Option<DtValue>,
}

/// An operation on a CRDT counter.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CounterOp {
    #[prost(sint64, optional, tag = "1")]
    pub increment: Option<i64>,
}

/// An operation on a CRDT set.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetOp {
    #[prost(bytes = "bytes", repeated, tag = "1")]
    pub adds: Vec<Bytes>,
    #[prost(bytes = "bytes", repeated, tag = "2")]
    pub removes: Vec<Bytes>,
}

/// Flag assignment inside a CRDT map update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum FlagOp {
    /// Set the flag to true.
    Enable = 1,
    /// Set the flag to false.
    Disable = 2,
}

/// An update to a single field of a CRDT map.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MapUpdate {
    #[prost(message, optional, tag = "1")]
    pub field: Option<MapField>,
    #[prost(message, optional, tag = "2")]
    pub counter_op: Option<CounterOp>,
    #[prost(message, optional, tag = "3")]
    pub set_op: Option<SetOp>,
    #[prost(bytes = "bytes", optional, tag = "4")]
    pub register_op: Option<Bytes>,
    #[prost(enumeration = "FlagOp", optional, tag = "5")]
    pub flag_op: Option<i32>,
    #[prost(message, optional, boxed, tag = "6")]
    pub map_op: Option<Box<MapOp>>,
}

/// An operation on a CRDT map.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MapOp {
    #[prost(message, repeated, tag = "1")]
    pub removes: Vec<MapField>,
    #[prost(message, repeated, tag = "2")]
    pub updates: Vec<MapUpdate>,
}

/// The operation payload of a CRDT update; exactly one field is set.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DtOp {
    #[prost(message, optional, tag = "1")]
    pub counter_op: Option<CounterOp>,
    #[prost(message, optional, tag = "2")]
    pub set_op: Option<SetOp>,
    #[prost(message, optional, tag = "3")]
    pub map_op: Option<MapOp>,
}

/// CRDT update request. `context` MUST echo the most recent fetched
/// context when the operation removes elements.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DtUpdateReq {
    #[prost(bytes = "bytes", required, tag = "1")]
    pub bucket: Bytes,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub key: Option<Bytes>,
    #[prost(bytes = "bytes", required, tag = "3")]
    pub bucket_type: Bytes,
    #[prost(bytes = "bytes", optional, tag = "4")]
    pub context: Option<Bytes>,
    #[prost(message, optional, tag = "5")]
    pub op: Option<DtOp>,
    #[prost(uint32, optional, tag = "6")]
    pub w: Option<u32>,
    #[prost(uint32, optional, tag = "7")]
    pub dw: Option<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub pw: Option<u32>,
    #[prost(bool, optional, tag = "9")]
    pub return_body: Option<bool>,
    #[prost(uint32, optional, tag = "10")]
    pub timeout: Option<u32>,
    #[prost(bool, optional, tag = "11")]
    pub sloppy_quorum: Option<bool>,
    #[prost(uint32, optional, tag = "12")]
    pub n_val: Option<u32>,
    #[prost(bool, optional, tag = "13")]
    pub include_context: Option<bool>,
}

/// CRDT update response; value fields are present only with
/// `return_body`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DtUpdateResp {
    #[prost(bytes = "bytes", optional, tag = "1")]
    pub key: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub context: Option<Bytes>,
    #[prost(sint64, optional, tag = "3")]
    pub counter_value: Option<i64>,
    #[prost(bytes = "bytes", repeated, tag = "4")]
    pub set_value: Vec<Bytes>,
    #[prost(message, repeated, tag = "5")]
    pub map_value: Vec<MapEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_error_resp_roundtrip() {
        let resp = RpbErrorResp {
            errmsg: Bytes::from_static(b"all nodes down"),
            errcode: 0,
        };
        let bytes = resp.encode_to_vec();
        let decoded = RpbErrorResp::decode(&bytes[..]).unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn test_get_req_skips_unset_fields() {
        let req = RpbGetReq {
            bucket: Bytes::from_static(b"b"),
            key: Bytes::from_static(b"k"),
            ..Default::default()
        };
        let minimal = req.encoded_len();

        let with_quorum = RpbGetReq {
            r: Some(2),
            ..req.clone()
        };
        assert!(with_quorum.encoded_len() > minimal);
    }

    #[test]
    fn test_get_resp_empty_decodes() {
        // A not-found get response is an empty body.
        let decoded = RpbGetResp::decode(&[][..]).unwrap();
        assert!(decoded.content.is_empty());
        assert!(decoded.vclock.is_none());
    }

    #[test]
    fn test_put_req_roundtrip_with_content() {
        let req = RpbPutReq {
            bucket: Bytes::from_static(b"bucket"),
            key: Some(Bytes::from_static(b"key")),
            content: Some(RpbContent {
                value: Bytes::from_static(b"hello"),
                content_type: Some(Bytes::from_static(b"text/plain")),
                ..Default::default()
            }),
            return_body: Some(true),
            ..Default::default()
        };

        let bytes = req.encode_to_vec();
        let decoded = RpbPutReq::decode(&bytes[..]).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn test_list_keys_resp_done_flag() {
        let resp = RpbListKeysResp {
            keys: vec![Bytes::from_static(b"a"), Bytes::from_static(b"b")],
            done: Some(true),
        };
        let bytes = resp.encode_to_vec();
        let decoded = RpbListKeysResp::decode(&bytes[..]).unwrap();
        assert_eq!(decoded.keys.len(), 2);
        assert_eq!(decoded.done, Some(true));
    }

    #[test]
    fn test_index_req_enum_roundtrip() {
        let req = RpbIndexReq {
            bucket: Bytes::from_static(b"b"),
            index: Bytes::from_static(b"age_int"),
            qtype: IndexQueryType::Range as i32,
            range_min: Some(Bytes::from_static(b"18")),
            range_max: Some(Bytes::from_static(b"65")),
            ..Default::default()
        };
        let bytes = req.encode_to_vec();
        let decoded = RpbIndexReq::decode(&bytes[..]).unwrap();
        assert_eq!(decoded.qtype, IndexQueryType::Range as i32);
        assert_eq!(decoded.range_min, Some(Bytes::from_static(b"18")));
    }

    #[test]
    fn test_counter_update_negative_amount() {
        let req = RpbCounterUpdateReq {
            bucket: Bytes::from_static(b"b"),
            key: Bytes::from_static(b"k"),
            amount: -42,
            ..Default::default()
        };
        let bytes = req.encode_to_vec();
        let decoded = RpbCounterUpdateReq::decode(&bytes[..]).unwrap();
        assert_eq!(decoded.amount, -42);
    }

    #[test]
    fn test_dt_update_nested_map_op() {
        let req = DtUpdateReq {
            bucket: Bytes::from_static(b"b"),
            key: Some(Bytes::from_static(b"k")),
            bucket_type: Bytes::from_static(b"maps"),
            op: Some(DtOp {
                map_op: Some(MapOp {
                    removes: vec![],
                    updates: vec![MapUpdate {
                        field: Some(MapField {
                            name: Bytes::from_static(b"visits"),
                            field_type: MapFieldType::Counter as i32,
                        }),
                        counter_op: Some(CounterOp { increment: Some(1) }),
                        ..Default::default()
                    }],
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let bytes = req.encode_to_vec();
        let decoded = DtUpdateReq::decode(&bytes[..]).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn test_dt_fetch_resp_counter() {
        let resp = DtFetchResp {
            context: Some(Bytes::from_static(b"\x01\x02")),
            data_type: DataType::Counter as i32,
            value: Some(DtValue {
                counter_value: Some(7),
                ..Default::default()
            }),
        };
        let bytes = resp.encode_to_vec();
        let decoded = DtFetchResp::decode(&bytes[..]).unwrap();
        assert_eq!(decoded.value.unwrap().counter_value, Some(7));
    }

    #[test]
    fn test_bucket_props_partial_roundtrip() {
        let props = RpbBucketProps {
            n_val: Some(3),
            allow_mult: Some(true),
            ..Default::default()
        };
        let bytes = props.encode_to_vec();
        let decoded = RpbBucketProps::decode(&bytes[..]).unwrap();
        assert_eq!(decoded.n_val, Some(3));
        assert_eq!(decoded.allow_mult, Some(true));
        assert!(decoded.last_write_wins.is_none());
    }
}
