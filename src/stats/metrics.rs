//! Statistics and metrics for the stream registry

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of registry activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Streams successfully opened
    pub streams_opened: u64,
    /// Open attempts that failed (any kind)
    pub open_failures: u64,
    /// Streams released by close, replacement, cleanup or shutdown
    pub streams_closed: u64,
    /// Releases that faulted
    pub close_failures: u64,
    /// Handles closed because they sat idle too long
    pub streams_expired: u64,
    /// Data chunks served
    pub chunks_read: u64,
    /// Total bytes served
    pub bytes_read: u64,
    /// Reads that faulted
    pub read_failures: u64,
    /// Handles currently open
    pub open_streams: usize,
}

impl RegistryStats {
    /// Average chunk length in bytes
    pub fn average_chunk_size(&self) -> u64 {
        if self.chunks_read > 0 {
            self.bytes_read / self.chunks_read
        } else {
            0
        }
    }
}

/// Live counters updated by the registry
#[derive(Debug, Default)]
pub struct Counters {
    streams_opened: AtomicU64,
    open_failures: AtomicU64,
    streams_closed: AtomicU64,
    close_failures: AtomicU64,
    streams_expired: AtomicU64,
    chunks_read: AtomicU64,
    bytes_read: AtomicU64,
    read_failures: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_open(&self) {
        self.streams_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_open_failure(&self) {
        self.open_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_close(&self) {
        self.streams_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_close_failure(&self) {
        self.close_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expired(&self) {
        self.streams_expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chunk(&self, len: usize) {
        self.chunks_read.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(len as u64, Ordering::Relaxed);
    }

    pub fn record_read_failure(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters, tagging the current number of open handles
    pub fn snapshot(&self, open_streams: usize) -> RegistryStats {
        RegistryStats {
            streams_opened: self.streams_opened.load(Ordering::Relaxed),
            open_failures: self.open_failures.load(Ordering::Relaxed),
            streams_closed: self.streams_closed.load(Ordering::Relaxed),
            close_failures: self.close_failures.load(Ordering::Relaxed),
            streams_expired: self.streams_expired.load(Ordering::Relaxed),
            chunks_read: self.chunks_read.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            open_streams,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_new() {
        let stats = Counters::new().snapshot(0);
        assert_eq!(stats, RegistryStats::default());
    }

    #[test]
    fn test_record_chunks() {
        let counters = Counters::new();
        counters.record_chunk(4);
        counters.record_chunk(4);
        counters.record_chunk(2);

        let stats = counters.snapshot(1);
        assert_eq!(stats.chunks_read, 3);
        assert_eq!(stats.bytes_read, 10);
        assert_eq!(stats.open_streams, 1);
        assert_eq!(stats.average_chunk_size(), 3);
    }

    #[test]
    fn test_average_chunk_size_without_reads() {
        assert_eq!(RegistryStats::default().average_chunk_size(), 0);
    }

    #[test]
    fn test_lifecycle_counters() {
        let counters = Counters::new();
        counters.record_open();
        counters.record_open_failure();
        counters.record_close();
        counters.record_close_failure();
        counters.record_expired();
        counters.record_read_failure();

        let stats = counters.snapshot(0);
        assert_eq!(stats.streams_opened, 1);
        assert_eq!(stats.open_failures, 1);
        assert_eq!(stats.streams_closed, 1);
        assert_eq!(stats.close_failures, 1);
        assert_eq!(stats.streams_expired, 1);
        assert_eq!(stats.read_failures, 1);
    }
}
