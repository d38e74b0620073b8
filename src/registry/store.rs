//! Stream registry implementation
//!
//! The central registry that owns every open read handle and serves size
//! queries, sequential chunk reads and closes against them.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bytes::{Bytes, BytesMut};
use tokio::io::AsyncReadExt;
use tokio::sync::{Mutex, RwLock};

use crate::error::{ErrorKind, Result, StreamError};
use crate::resource::{ContentResolver, ResourceId};
use crate::stats::{Counters, RegistryStats};

use super::chunk::Chunk;
use super::config::{DuplicateOpen, RegistryConfig, MIN_CLEANUP_INTERVAL};
use super::entry::{HandleStats, OpenHandle};

type HandleRef<S> = Arc<Mutex<OpenHandle<S>>>;

/// Central registry for all open read handles
///
/// The map is guarded by an `RwLock`; each handle sits behind its own
/// `Mutex`. Opens and closes take the map's write lock, reads only clone
/// the handle's `Arc` under the read lock and then serialize on the handle.
/// Operations on different resources never wait on each other's I/O.
pub struct StreamRegistry<R: ContentResolver> {
    /// Resolves identifiers into streams
    resolver: R,

    /// Map of resource identifier to open handle
    handles: RwLock<HashMap<ResourceId, HandleRef<R::Stream>>>,

    /// Activity counters
    counters: Counters,

    /// Set by `shutdown`; no handle may be installed afterwards
    closed: AtomicBool,

    /// Configuration
    config: RegistryConfig,
}

impl<R: ContentResolver> StreamRegistry<R> {
    /// Create a new stream registry with default configuration
    pub fn new(resolver: R) -> Self {
        Self::with_config(resolver, RegistryConfig::default())
    }

    /// Create a new stream registry with custom configuration
    pub fn with_config(resolver: R, config: RegistryConfig) -> Self {
        Self {
            resolver,
            handles: RwLock::new(HashMap::new()),
            counters: Counters::new(),
            closed: AtomicBool::new(false),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Get the content resolver
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Open a read stream for a resource
    ///
    /// With [`DuplicateOpen::Replace`] an existing handle for `id` is closed
    /// and superseded; with [`DuplicateOpen::Reject`] the call fails with
    /// `already-open` and the existing handle is left untouched.
    pub async fn open_stream(&self, id: &ResourceId) -> Result<()> {
        if self.is_shut_down() {
            self.counters.record_open_failure();
            return Err(shut_down(id));
        }

        let reject_duplicates = self.config.duplicate_open == DuplicateOpen::Reject;
        if reject_duplicates && self.is_open(id).await {
            self.counters.record_open_failure();
            return Err(already_open(id));
        }

        let stream = match self.resolver.open(id).await {
            Ok(Some(stream)) => stream,
            Ok(None) => {
                self.counters.record_open_failure();
                tracing::warn!(resource = %id, "Resource resolved without a stream");
                return Err(StreamError::new(
                    ErrorKind::NoStream,
                    format!("Could not open input stream for {}", id),
                ));
            }
            Err(e) => {
                self.counters.record_open_failure();
                tracing::warn!(resource = %id, error = %e, "Failed to open stream");
                return Err(StreamError::io(ErrorKind::OpenFailed, &e));
            }
        };

        let handle = Arc::new(Mutex::new(OpenHandle::new(stream)));

        let previous = {
            let mut handles = self.handles.write().await;
            if self.is_shut_down() {
                // Shutdown drained the map while the resolver was opening
                drop(handles);
                self.counters.record_open_failure();
                if let Err(e) = self.release(&handle).await {
                    tracing::warn!(resource = %id, error = %e, "Failed to release late stream");
                }
                return Err(shut_down(id));
            }
            if reject_duplicates && handles.contains_key(id) {
                // Lost a race with another open for the same resource
                drop(handles);
                self.counters.record_open_failure();
                if let Err(e) = self.release(&handle).await {
                    tracing::warn!(resource = %id, error = %e, "Failed to release rejected stream");
                }
                return Err(already_open(id));
            }
            handles.insert(id.clone(), handle)
        };

        self.counters.record_open();

        match previous {
            Some(previous) => {
                match self.release(&previous).await {
                    Ok(()) => self.counters.record_close(),
                    Err(e) => {
                        self.counters.record_close_failure();
                        tracing::warn!(
                            resource = %id,
                            error = %e,
                            "Failed to release replaced stream"
                        );
                    }
                }
                tracing::info!(resource = %id, "Stream opened (replaced existing handle)");
            }
            None => {
                tracing::info!(resource = %id, "Stream opened");
            }
        }

        Ok(())
    }

    /// Query the byte length of a resource
    ///
    /// Goes straight to the resolver; whether a handle is open for `id` and
    /// where its cursor sits make no difference.
    pub async fn get_size(&self, id: &ResourceId) -> Result<u64> {
        match self.resolver.size(id).await {
            Ok(Some(len)) => {
                tracing::debug!(resource = %id, size = len, "Size queried");
                Ok(len)
            }
            Ok(None) => Err(StreamError::new(
                ErrorKind::SizeUnavailable,
                format!("Unable to determine size of {}", id),
            )),
            Err(e) => {
                tracing::warn!(resource = %id, error = %e, "Size query failed");
                Err(StreamError::io(ErrorKind::SizeQueryFailed, &e))
            }
        }
    }

    /// Read the next chunk from an open handle
    ///
    /// Issues a single read of up to `size` bytes (the configured default
    /// when `None`, clamped to the configured maximum) and returns exactly
    /// the bytes it produced. An exhausted stream yields
    /// [`Chunk::EndOfStream`]. Never opens a stream implicitly.
    pub async fn read_chunk(&self, id: &ResourceId, size: Option<usize>) -> Result<Chunk> {
        let size = self.chunk_size(size)?;

        let handle = self
            .handles
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StreamError::no_stream(id))?;

        let mut entry = handle.lock().await;
        let stream = entry
            .stream_mut()
            .ok_or_else(|| StreamError::no_stream(id))?;

        let mut buf = BytesMut::zeroed(size);
        let n = match stream.read(&mut buf[..]).await {
            Ok(n) => n,
            Err(e) => {
                self.counters.record_read_failure();
                tracing::warn!(resource = %id, error = %e, "Read failed");
                return Err(StreamError::io(ErrorKind::ReadFailed, &e));
            }
        };

        let chunk = if n == 0 {
            tracing::debug!(resource = %id, "End of stream");
            Chunk::EndOfStream
        } else {
            self.counters.record_chunk(n);
            tracing::trace!(resource = %id, requested = size, bytes = n, "Chunk read");
            // Short reads are copied out so the chunk doesn't pin the whole buffer
            let data = if n == buf.len() {
                buf.freeze()
            } else {
                Bytes::copy_from_slice(&buf[..n])
            };
            Chunk::Data(data)
        };

        entry.record(&chunk);
        Ok(chunk)
    }

    /// Close the handle for a resource
    ///
    /// Closing a resource with no open handle succeeds. The entry is removed
    /// before the stream is released, so it is gone even if the release
    /// faults.
    pub async fn close_stream(&self, id: &ResourceId) -> Result<()> {
        let removed = self.handles.write().await.remove(id);

        let Some(handle) = removed else {
            tracing::debug!(resource = %id, "Close for resource with no open stream");
            return Ok(());
        };

        match self.release(&handle).await {
            Ok(()) => {
                self.counters.record_close();
                tracing::info!(resource = %id, "Stream closed");
                Ok(())
            }
            Err(e) => {
                self.counters.record_close_failure();
                tracing::warn!(resource = %id, error = %e, "Failed to close stream");
                Err(StreamError::io(ErrorKind::CloseFailed, &e))
            }
        }
    }

    /// Check if a handle is open for a resource
    pub async fn is_open(&self, id: &ResourceId) -> bool {
        self.handles.read().await.contains_key(id)
    }

    /// Get total number of open handles
    pub async fn open_count(&self) -> usize {
        self.handles.read().await.len()
    }

    /// Get statistics for one open handle
    pub async fn handle_stats(&self, id: &ResourceId) -> Option<HandleStats> {
        let handle = self.handles.read().await.get(id).cloned()?;
        let entry = handle.lock().await;
        Some(entry.stats())
    }

    /// Get registry-wide statistics
    pub async fn stats(&self) -> RegistryStats {
        self.counters.snapshot(self.open_count().await)
    }

    /// Run idle cleanup once
    ///
    /// Closes handles unused for longer than `idle_timeout`. Handles busy
    /// with a read are skipped. Returns the number of handles removed.
    pub async fn cleanup(&self) -> usize {
        let Some(idle_timeout) = self.config.idle_timeout else {
            return 0;
        };
        let now = Instant::now();

        let expired: Vec<(ResourceId, HandleRef<R::Stream>)> = {
            let mut handles = self.handles.write().await;

            let keys: Vec<ResourceId> = handles
                .iter()
                .filter_map(|(id, handle)| {
                    // Try to lock without blocking
                    let entry = handle.try_lock().ok()?;
                    (entry.idle_for(now) > idle_timeout).then(|| id.clone())
                })
                .collect();

            keys.into_iter()
                .filter_map(|id| handles.remove(&id).map(|handle| (id, handle)))
                .collect()
        };

        let count = expired.len();
        for (id, handle) in expired {
            self.counters.record_expired();
            match self.release(&handle).await {
                Ok(()) => {
                    self.counters.record_close();
                    tracing::info!(resource = %id, "Stream closed by idle cleanup");
                }
                Err(e) => {
                    self.counters.record_close_failure();
                    tracing::warn!(resource = %id, error = %e, "Failed to close idle stream");
                }
            }
        }

        count
    }

    /// Spawn background cleanup task
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        let interval = registry.config.cleanup_interval.max(MIN_CLEANUP_INTERVAL);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                registry.cleanup().await;
            }
        })
    }

    /// Close every open handle and refuse further opens
    ///
    /// Release faults are logged and do not stop the sweep. Returns the
    /// number of handles that were open.
    pub async fn shutdown(&self) -> usize {
        let drained: Vec<(ResourceId, HandleRef<R::Stream>)> = {
            let mut handles = self.handles.write().await;
            self.closed.store(true, Ordering::Release);
            handles.drain().collect()
        };

        let count = drained.len();
        for (id, handle) in drained {
            match self.release(&handle).await {
                Ok(()) => self.counters.record_close(),
                Err(e) => {
                    self.counters.record_close_failure();
                    tracing::warn!(resource = %id, error = %e, "Failed to close stream on shutdown");
                }
            }
        }

        if count > 0 {
            tracing::info!(closed = count, "Registry shut down");
        }
        count
    }

    /// Whether `shutdown` has run
    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn chunk_size(&self, requested: Option<usize>) -> Result<usize> {
        match requested {
            None => Ok(self.config.default_chunk_size),
            Some(0) => Err(StreamError::invalid_argument(
                "Chunk size must be positive",
            )),
            Some(n) => Ok(n.min(self.config.max_chunk_size)),
        }
    }

    /// Take the stream out of a handle and hand it back to the resolver
    ///
    /// Waits for any in-flight read on the handle to finish first.
    async fn release(&self, handle: &HandleRef<R::Stream>) -> io::Result<()> {
        let stream = handle.lock().await.take();
        match stream {
            Some(stream) => self.resolver.close(stream).await,
            None => Ok(()),
        }
    }
}

fn shut_down(id: &ResourceId) -> StreamError {
    StreamError::new(
        ErrorKind::OpenFailed,
        format!("Registry is shut down, cannot open {}", id),
    )
}

fn already_open(id: &ResourceId) -> StreamError {
    StreamError::new(
        ErrorKind::AlreadyOpen,
        format!("Stream already open for {}", id),
    )
}
