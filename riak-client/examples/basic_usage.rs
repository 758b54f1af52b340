//! Basic usage example demonstrating object storage and retrieval.
//!
//! Run with: `cargo run --example basic_usage`
//!
//! Requires a Riak node listening on localhost:8087.

use std::time::Duration;

use bytes::Bytes;
use riak_client::options::{DeleteOptions, GetOptions, PutOptions};
use riak_client::{ClusterConfig, NodeConfig, RiakClient, RiakObject, RiakObjectId};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Riak Client Basic Usage Example ===\n");

    let config = ClusterConfig::builder()
        .add_node(
            NodeConfig::builder("127.0.0.1")
                .connect_timeout(Duration::from_secs(5))
                .build()?,
        )
        .retries(1)
        .build()?;
    let client = RiakClient::new(config)?;

    println!("Pinging the cluster...");
    client.ping().await?;
    let info = client.server_info().await?;
    println!(
        "Connected to {} ({})\n",
        info.node.as_deref().unwrap_or("unknown"),
        info.server_version.as_deref().unwrap_or("unknown version"),
    );

    // ========== Object Operations ==========
    println!("--- Object Operations ---\n");

    let id = RiakObjectId::new("animals", "rufus");
    let object = RiakObject::new(id.clone(), Bytes::from_static(b"Rufus the dog"))
        .with_content_type("text/plain");

    println!("Storing {}...", id);
    let stored = client
        .put(&object, &PutOptions::default().return_body(true))
        .await?;
    println!("  Stored with vclock: {:?}", stored.vclock);

    println!("Fetching {}...", id);
    let fetched = client.get(&id, &GetOptions::default()).await?;
    println!("  Value: {:?}", fetched.value);
    if fetched.has_siblings() {
        println!("  Concurrent values: {}", fetched.siblings.len());
    }

    println!("Deleting {}...", id);
    client
        .delete(
            &id,
            &DeleteOptions::default().vclock(fetched.vclock.clone().unwrap()),
        )
        .await?;

    match client.get(&id, &GetOptions::default()).await {
        Err(e) => println!("  After delete: {}", e),
        Ok(_) => println!("  Object still visible (eventual consistency)"),
    }

    // ========== Batch Session ==========
    println!("\n--- Batch Session ---\n");

    let results = client
        .batch(|mut batch| async move {
            let mut stored = Vec::new();
            for i in 0..3 {
                let id = RiakObjectId::new("animals", format!("cat-{}", i));
                let object = RiakObject::new(id, format!("cat number {}", i));
                stored.push(batch.put(&object, &PutOptions::default()).await?);
            }
            Ok(stored)
        })
        .await?;
    println!("Stored {} objects over one connection", results.len());

    client.shutdown();
    Ok(())
}
