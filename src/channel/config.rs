//! Channel configuration

use std::time::Duration;

/// Channel server options
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Requests that may wait in the queue before callers block
    pub queue_capacity: usize,

    /// Maximum calls executing at once (0 = unlimited)
    pub max_in_flight: usize,

    /// Deadline applied by clients to each call (None = wait forever)
    pub call_timeout: Option<Duration>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            max_in_flight: 0, // Unlimited
            call_timeout: None,
        }
    }
}

impl ChannelConfig {
    /// Set the request queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the maximum number of concurrently executing calls
    pub fn max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max;
        self
    }

    /// Set the per-call deadline
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChannelConfig::default();

        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.max_in_flight, 0);
        assert!(config.call_timeout.is_none());
    }

    #[test]
    fn test_builder_queue_capacity_minimum() {
        let config = ChannelConfig::default().queue_capacity(0);

        assert_eq!(config.queue_capacity, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let config = ChannelConfig::default()
            .queue_capacity(8)
            .max_in_flight(4)
            .call_timeout(Duration::from_secs(2));

        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.max_in_flight, 4);
        assert_eq!(config.call_timeout, Some(Duration::from_secs(2)));
    }
}
