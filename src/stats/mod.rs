//! Registry statistics

pub mod metrics;

pub use metrics::{Counters, RegistryStats};
