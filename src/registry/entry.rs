//! Open handle state
//!
//! This module defines the per-resource state stored in the registry.

use std::time::{Duration, Instant};

use super::chunk::Chunk;

/// A live read handle owned by the registry
///
/// The stream is an `Option` so that a close can take it out while the
/// entry is still reachable by a reader that raced the removal; such a
/// reader finds `None` and reports "no stream".
pub(super) struct OpenHandle<S> {
    stream: Option<S>,

    /// When the handle was opened
    opened_at: Instant,

    /// Last read (or open) time, for idle cleanup
    last_used: Instant,

    bytes_read: u64,
    chunks_read: u64,
    reached_end: bool,
}

impl<S> OpenHandle<S> {
    pub(super) fn new(stream: S) -> Self {
        let now = Instant::now();
        Self {
            stream: Some(stream),
            opened_at: now,
            last_used: now,
            bytes_read: 0,
            chunks_read: 0,
            reached_end: false,
        }
    }

    /// The underlying stream, unless it has been released
    pub(super) fn stream_mut(&mut self) -> Option<&mut S> {
        self.stream.as_mut()
    }

    /// Take the stream out for release
    pub(super) fn take(&mut self) -> Option<S> {
        self.stream.take()
    }

    /// Account for a completed read
    pub(super) fn record(&mut self, chunk: &Chunk) {
        self.last_used = Instant::now();
        match chunk {
            Chunk::Data(data) => {
                self.chunks_read += 1;
                self.bytes_read += data.len() as u64;
            }
            Chunk::EndOfStream => self.reached_end = true,
        }
    }

    pub(super) fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_used)
    }

    pub(super) fn stats(&self) -> HandleStats {
        let now = Instant::now();
        HandleStats {
            bytes_read: self.bytes_read,
            chunks_read: self.chunks_read,
            reached_end: self.reached_end,
            age: now.saturating_duration_since(self.opened_at),
            idle: self.idle_for(now),
        }
    }
}

/// Statistics for a single open handle
#[derive(Debug, Clone)]
pub struct HandleStats {
    /// Bytes served so far (the cursor position)
    pub bytes_read: u64,
    /// Data chunks served so far
    pub chunks_read: u64,
    /// Whether a read has already returned end-of-stream
    pub reached_end: bool,
    /// Time since the handle was opened
    pub age: Duration,
    /// Time since the handle was last used
    pub idle: Duration,
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn test_record_tracks_cursor() {
        let mut handle = OpenHandle::new(());
        handle.record(&Chunk::Data(Bytes::from_static(b"HELL")));
        handle.record(&Chunk::Data(Bytes::from_static(b"LD")));

        let stats = handle.stats();
        assert_eq!(stats.bytes_read, 6);
        assert_eq!(stats.chunks_read, 2);
        assert!(!stats.reached_end);

        handle.record(&Chunk::EndOfStream);
        assert!(handle.stats().reached_end);
        assert_eq!(handle.stats().chunks_read, 2);
    }

    #[test]
    fn test_take_releases_stream_once() {
        let mut handle = OpenHandle::new(7u8);

        assert_eq!(handle.stream_mut().copied(), Some(7));
        assert_eq!(handle.take(), Some(7));
        assert!(handle.take().is_none());
        assert!(handle.stream_mut().is_none());
    }
}
