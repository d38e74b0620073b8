//! Stream registry
//!
//! The registry owns every open read handle, keyed by resource identifier,
//! and serves size queries, sequential chunk reads and closes against them.
//!
//! # Architecture
//!
//! ```text
//!                       Arc<StreamRegistry<R>>
//!                  ┌────────────────────────────┐
//!                  │ handles: RwLock<HashMap<   │
//!                  │   ResourceId,              │
//!                  │   Arc<Mutex<OpenHandle>>   │
//!                  │ >>                         │
//!                  │ resolver: R                │
//!                  └─────────────┬──────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        │                       │                       │
//!        ▼                       ▼                       ▼
//!   open_stream()          read_chunk()             close_stream()
//!   resolver.open()        lock handle, read        remove, lock handle,
//!   insert (write lock)    (read lock on map)       resolver.close()
//! ```
//!
//! # Locking
//!
//! Opens and closes mutate the map under its write lock. Reads hold the map
//! lock only long enough to clone the handle's `Arc`, then serialize on the
//! handle's own `Mutex`, so reads on different resources run in parallel
//! while a read and a close on the same resource never interleave.

pub mod chunk;
pub mod config;
pub mod entry;
pub mod store;

pub use chunk::Chunk;
pub use config::{DuplicateOpen, RegistryConfig, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use entry::HandleStats;
pub use store::StreamRegistry;
