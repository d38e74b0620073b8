//! Same-process method channel
//!
//! A bounded request queue between any number of [`ChannelClient`]s and one
//! [`ChannelServer`]. Calls are served concurrently; the registry keeps
//! calls on the same resource exclusive.

pub mod client;
pub mod config;
pub mod server;

pub use client::ChannelClient;
pub use config::ChannelConfig;
pub use server::ChannelServer;
