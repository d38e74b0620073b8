//! chunk-bridge: chunked read access to picked files
//!
//! A host application hands over an opaque resource identifier (typically a
//! content URI from a file picker) and pulls the file through four calls:
//! open a stream, query its length, read sequential chunks, close it.
//!
//! - [`registry`]: the [`StreamRegistry`] owning every open handle
//! - [`resource`]: the [`ContentResolver`] seam plus filesystem and in-memory resolvers
//! - [`bridge`]: named-method dispatch (`openReadStream`, `getFileSize`, `readChunk`, `closeStream`)
//! - [`channel`]: a same-process request channel serving the bridge
//!
//! # Example
//!
//! ```no_run
//! use chunk_bridge::{ChannelConfig, ChannelServer, Chunk, FsResolver};
//!
//! # async fn demo() -> chunk_bridge::Result<()> {
//! let (server, client) = ChannelServer::new(ChannelConfig::default(), FsResolver::new());
//! tokio::spawn(server.run());
//!
//! let uri = "file:///tmp/picked.bin";
//! client.open_stream(uri).await?;
//! let size = client.get_size(uri).await?;
//! let mut received = 0u64;
//! while let Chunk::Data(data) = client.read_chunk(uri, None).await? {
//!     received += data.len() as u64;
//! }
//! client.close_stream(uri).await?;
//! assert_eq!(received, size);
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod channel;
pub mod error;
pub mod registry;
pub mod resource;
pub mod stats;

pub use bridge::{Bridge, Method, MethodCall, Value};
pub use channel::{ChannelClient, ChannelConfig, ChannelServer};
pub use error::{ErrorKind, Result, StreamError};
pub use registry::{Chunk, DuplicateOpen, RegistryConfig, StreamRegistry};
pub use resource::{ContentResolver, FsResolver, MemoryResolver, ResourceId};
pub use stats::RegistryStats;
