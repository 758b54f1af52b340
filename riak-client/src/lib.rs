//! Async Rust client for [Riak](https://riak.com/) — the distributed
//! key-value store.
//!
//! The client speaks Riak's length-prefixed binary protocol over TCP,
//! with a small legacy HTTP path for bucket-properties maintenance. It
//! is built on [Tokio](https://tokio.rs/): every operation is an
//! `async fn` that borrows one pooled connection from a configured node,
//! retries transient failures on other nodes, and returns a structured
//! result.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use riak_client::{ClusterConfig, NodeConfig, RiakClient, RiakObject, RiakObjectId};
//! use riak_client::options::{GetOptions, PutOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClusterConfig::builder()
//!         .add_node(NodeConfig::builder("127.0.0.1").build()?)
//!         .retries(2)
//!         .build()?;
//!     let client = RiakClient::new(config)?;
//!
//!     let id = RiakObjectId::new("animals", "rufus");
//!     let object = RiakObject::new(id.clone(), "Rufus the dog")
//!         .with_content_type("text/plain");
//!
//!     client.put(&object, &PutOptions::default()).await?;
//!     let fetched = client.get(&id, &GetOptions::default()).await?;
//!     println!("{:?}", fetched.value);
//!
//!     client.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! # Operations
//!
//! | Area | Methods |
//! |------|---------|
//! | Liveness | [`ping`](RiakClient::ping), [`server_info`](RiakClient::server_info) |
//! | Objects | [`get`](RiakClient::get), [`put`](RiakClient::put), [`delete`](RiakClient::delete), [`multi_get`](RiakClient::multi_get), [`multi_put`](RiakClient::multi_put), [`delete_bucket`](RiakClient::delete_bucket) |
//! | Listing | [`list_buckets`](RiakClient::list_buckets), [`list_keys`](RiakClient::list_keys), and lazy `stream_*` variants |
//! | Queries | [`map_reduce`](RiakClient::map_reduce), [`search`](RiakClient::search), [`index_query`](RiakClient::index_query), streaming variants |
//! | Counters | legacy [`increment_counter`](RiakClient::increment_counter) / [`get_counter`](RiakClient::get_counter) |
//! | CRDTs | [`fetch_counter`](RiakClient::fetch_counter), [`update_counter`](RiakClient::update_counter), set and map equivalents |
//! | Buckets | [`get_bucket_properties`](RiakClient::get_bucket_properties), [`set_bucket_properties`](RiakClient::set_bucket_properties), HTTP legacy set/reset |
//! | Sessions | [`batch`](RiakClient::batch) — pin a sequence of operations to one connection |
//!
//! # Siblings and causal vectors
//!
//! Riak tracks object versions through opaque causal vectors. A fetched
//! [`RiakObject`] carries the vector the server attached; echo it on the
//! next put or delete of that key. When concurrent writers collide on a
//! bucket with `allow_mult`, a fetch returns every concurrent value as
//! the object's `siblings`, all sharing one vector; store a resolved
//! value with that vector to settle the conflict.
//!
//! CRDT operations carry the same idea as an opaque `context`: fetch it,
//! and echo it on any update that removes elements.
//!
//! # Streaming
//!
//! List, map-reduce, and index operations exist in eager and lazy forms.
//! The lazy forms keep their connection borrowed until the stream is
//! drained or dropped; dropping a stream early is safe and releases the
//! connection immediately.

#![warn(missing_docs)]

mod batch;
mod client;
mod cluster;
pub mod config;
mod connection;
pub mod crdt;
pub mod object;
mod ops;
pub mod options;
pub mod streaming;

pub use batch::BatchClient;
pub use client::{
    IndexQuery, IndexResults, IndexSpec, MapReduceQuery, RiakClient, SearchResults, ServerInfo,
};
pub use config::{ClusterConfig, ClusterConfigBuilder, ConfigError, NodeConfig, NodeConfigBuilder};
pub use crdt::{CounterResult, MapResult, SetResult, SetUpdate};
pub use object::{RiakObject, RiakObjectId};
pub use options::{
    CounterGetOptions, CounterUpdateOptions, DeleteOptions, DtFetchOptions, DtUpdateOptions,
    GetOptions, IndexOptions, PutOptions, Quorum, SearchOptions,
};
pub use riak_core as core;
pub use riak_core::{ErrorKind, Result, RiakError};
pub use streaming::{
    BucketStream, IndexEntry, IndexStream, KeyStream, MapRedPhase, MapRedStream,
};
