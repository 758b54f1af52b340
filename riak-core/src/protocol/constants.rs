//! Message codes for the Riak binary protocol.
//!
//! Every frame on the wire carries a one-byte code identifying the
//! request or response type. An [`ERROR_RESP`] frame may arrive in place
//! of any expected response code.

/// Server error response. May substitute for any expected response.
pub const ERROR_RESP: u8 = 0;
/// Ping request.
pub const PING_REQ: u8 = 1;
/// Ping response.
pub const PING_RESP: u8 = 2;
/// Get client id request (deprecated upstream; code reserved).
pub const GET_CLIENT_ID_REQ: u8 = 3;
/// Get client id response (deprecated upstream; code reserved).
pub const GET_CLIENT_ID_RESP: u8 = 4;
/// Set client id request (deprecated upstream; code reserved).
pub const SET_CLIENT_ID_REQ: u8 = 5;
/// Set client id response (deprecated upstream; code reserved).
pub const SET_CLIENT_ID_RESP: u8 = 6;
/// Server info request.
pub const GET_SERVER_INFO_REQ: u8 = 7;
/// Server info response.
pub const GET_SERVER_INFO_RESP: u8 = 8;
/// Fetch object request.
pub const GET_REQ: u8 = 9;
/// Fetch object response.
pub const GET_RESP: u8 = 10;
/// Store object request.
pub const PUT_REQ: u8 = 11;
/// Store object response.
pub const PUT_RESP: u8 = 12;
/// Delete object request.
pub const DEL_REQ: u8 = 13;
/// Delete object response.
pub const DEL_RESP: u8 = 14;
/// List buckets request.
pub const LIST_BUCKETS_REQ: u8 = 15;
/// List buckets response (streamed, terminated by `done`).
pub const LIST_BUCKETS_RESP: u8 = 16;
/// List keys request.
pub const LIST_KEYS_REQ: u8 = 17;
/// List keys response (streamed, terminated by `done`).
pub const LIST_KEYS_RESP: u8 = 18;
/// Get bucket properties request.
pub const GET_BUCKET_REQ: u8 = 19;
/// Get bucket properties response.
pub const GET_BUCKET_RESP: u8 = 20;
/// Set bucket properties request.
pub const SET_BUCKET_REQ: u8 = 21;
/// Set bucket properties response.
pub const SET_BUCKET_RESP: u8 = 22;
/// Map-reduce request.
pub const MAP_RED_REQ: u8 = 23;
/// Map-reduce response (streamed, terminated by `done`).
pub const MAP_RED_RESP: u8 = 24;
/// Secondary index query request.
pub const INDEX_REQ: u8 = 25;
/// Secondary index query response.
pub const INDEX_RESP: u8 = 26;
/// Search query request.
pub const SEARCH_QUERY_REQ: u8 = 27;
/// Search query response.
pub const SEARCH_QUERY_RESP: u8 = 28;
/// Reset bucket properties request.
pub const RESET_BUCKET_REQ: u8 = 29;
/// Reset bucket properties response.
pub const RESET_BUCKET_RESP: u8 = 30;
/// Legacy counter update request.
pub const COUNTER_UPDATE_REQ: u8 = 50;
/// Legacy counter update response.
pub const COUNTER_UPDATE_RESP: u8 = 51;
/// Legacy counter get request.
pub const COUNTER_GET_REQ: u8 = 52;
/// Legacy counter get response.
pub const COUNTER_GET_RESP: u8 = 53;
/// CRDT fetch request.
pub const DT_FETCH_REQ: u8 = 80;
/// CRDT fetch response.
pub const DT_FETCH_RESP: u8 = 81;
/// CRDT update request.
pub const DT_UPDATE_REQ: u8 = 82;
/// CRDT update response.
pub const DT_UPDATE_RESP: u8 = 83;

/// Size of the frame length prefix on the wire.
pub const SIZE_OF_LENGTH_FIELD: usize = 4;
/// Size of the message code field on the wire.
pub const SIZE_OF_CODE_FIELD: usize = 1;
