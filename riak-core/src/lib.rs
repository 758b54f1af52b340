//! Core protocol support for the Riak Rust client.
//!
//! This crate holds everything the client shares with the wire: the
//! length-prefixed frame codec, the message-code table, the typed
//! Protocol Buffers request/response messages, and the error envelope
//! every operation returns through.
//!
//! Applications depend on the `riak-client` crate; this crate is its
//! protocol substrate and is only useful on its own for tooling that
//! speaks the protocol directly (mock servers, proxies, fuzzers).

#![warn(missing_docs)]

pub mod error;
pub mod protocol;

pub use error::{ErrorKind, Result, RiakError};
