//! The Riak binary protocol: frame codec, message codes, and typed
//! message bodies.

pub mod codec;
pub mod constants;
pub mod messages;

pub use codec::{decode_body, encode_body, MsgCodec};
