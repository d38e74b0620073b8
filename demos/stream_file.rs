//! Stream a file through the method channel in chunks
//!
//! Run with: cargo run --example stream_file <PATH> [CHUNK_SIZE]
//!
//! Examples:
//!   cargo run --example stream_file /etc/hosts
//!   cargo run --example stream_file file:///var/log/syslog 4096

use std::time::{Duration, Instant};

use chunk_bridge::{ChannelConfig, ChannelServer, Chunk, FsResolver};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let Some(uri) = args.get(1).cloned() else {
        eprintln!("Usage: {} <PATH> [CHUNK_SIZE]", args[0]);
        std::process::exit(2);
    };
    let chunk_size: Option<usize> = args.get(2).map(|s| s.parse()).transpose()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chunk_bridge=info".parse()?)
                .add_directive("stream_file=info".parse()?),
        )
        .init();

    let config = ChannelConfig::default().call_timeout(Duration::from_secs(10));
    let (server, client) = ChannelServer::new(config, FsResolver::new());
    let server = tokio::spawn(server.run_until(async {
        let _ = tokio::signal::ctrl_c().await;
    }));

    let started = Instant::now();
    let size = client.get_size(&uri).await?;
    client.open_stream(&uri).await?;

    let mut received = 0u64;
    let mut chunks = 0u64;
    while let Chunk::Data(data) = client.read_chunk(&uri, chunk_size).await? {
        received += data.len() as u64;
        chunks += 1;
        tracing::debug!(bytes = data.len(), received, size, "Chunk received");
    }
    client.close_stream(&uri).await?;

    println!(
        "{}: {} of {} bytes in {} chunks ({:?})",
        uri,
        received,
        size,
        chunks,
        started.elapsed()
    );

    drop(client);
    server.await?;
    Ok(())
}
