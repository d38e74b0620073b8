//! Registry configuration

use std::time::Duration;

/// Chunk size used when a read does not ask for one
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Upper bound on a single read
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Shortest allowed cleanup period
pub const MIN_CLEANUP_INTERVAL: Duration = Duration::from_millis(1);

/// What to do when a resource is opened while a handle for it is still open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateOpen {
    /// Install the new handle and close the previous one
    #[default]
    Replace,
    /// Fail the second open with `already-open`
    Reject,
}

/// Stream registry configuration options
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Chunk size for reads that don't specify one
    pub default_chunk_size: usize,

    /// Requested chunk sizes are clamped to this
    pub max_chunk_size: usize,

    /// Policy for opening an already-open resource
    pub duplicate_open: DuplicateOpen,

    /// Close handles unused for this long (None = never)
    pub idle_timeout: Option<Duration>,

    /// How often the background cleanup task runs
    pub cleanup_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_chunk_size: DEFAULT_CHUNK_SIZE,
            max_chunk_size: MAX_CHUNK_SIZE,
            duplicate_open: DuplicateOpen::Replace,
            idle_timeout: None,
            cleanup_interval: Duration::from_secs(30),
        }
    }
}

impl RegistryConfig {
    /// Set the default chunk size
    pub fn default_chunk_size(mut self, size: usize) -> Self {
        self.default_chunk_size = size.clamp(1, self.max_chunk_size);
        self
    }

    /// Set the maximum chunk size
    ///
    /// Also lowers the default chunk size if it would exceed the new maximum.
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size.max(1);
        self.default_chunk_size = self.default_chunk_size.min(self.max_chunk_size);
        self
    }

    /// Set the duplicate-open policy
    pub fn duplicate_open(mut self, policy: DuplicateOpen) -> Self {
        self.duplicate_open = policy;
        self
    }

    /// Close handles that sit unused for longer than `timeout`
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Set the cleanup interval (at least 1ms)
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval.max(MIN_CLEANUP_INTERVAL);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();

        assert_eq!(config.default_chunk_size, 65536);
        assert_eq!(config.max_chunk_size, MAX_CHUNK_SIZE);
        assert_eq!(config.duplicate_open, DuplicateOpen::Replace);
        assert!(config.idle_timeout.is_none());
    }

    #[test]
    fn test_builder_default_chunk_size() {
        let config = RegistryConfig::default().default_chunk_size(4096);

        assert_eq!(config.default_chunk_size, 4096);
    }

    #[test]
    fn test_builder_default_chunk_size_clamped() {
        let config = RegistryConfig::default().default_chunk_size(usize::MAX);
        assert_eq!(config.default_chunk_size, MAX_CHUNK_SIZE);

        let config = RegistryConfig::default().default_chunk_size(0);
        assert_eq!(config.default_chunk_size, 1);
    }

    #[test]
    fn test_builder_max_chunk_size_lowers_default() {
        let config = RegistryConfig::default().max_chunk_size(1024);

        assert_eq!(config.max_chunk_size, 1024);
        assert_eq!(config.default_chunk_size, 1024);
    }

    #[test]
    fn test_builder_cleanup_interval_never_zero() {
        let config = RegistryConfig::default().cleanup_interval(Duration::ZERO);

        assert_eq!(config.cleanup_interval, MIN_CLEANUP_INTERVAL);
    }

    #[test]
    fn test_builder_chaining() {
        let config = RegistryConfig::default()
            .duplicate_open(DuplicateOpen::Reject)
            .idle_timeout(Duration::from_secs(120))
            .cleanup_interval(Duration::from_secs(5));

        assert_eq!(config.duplicate_open, DuplicateOpen::Reject);
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.cleanup_interval, Duration::from_secs(5));
    }
}
