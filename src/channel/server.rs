//! Channel server
//!
//! Receives method calls from the request queue and runs each one on its
//! own task against the shared registry.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinSet;

use crate::bridge::{Bridge, MethodCall, Value};
use crate::error::Result;
use crate::registry::StreamRegistry;
use crate::resource::ContentResolver;

use super::client::ChannelClient;
use super::config::ChannelConfig;

/// A queued call and where to send its outcome
pub(crate) struct Request {
    pub(crate) call: MethodCall,
    pub(crate) reply: oneshot::Sender<Result<Value>>,
}

/// Same-process method channel server
pub struct ChannelServer<R: ContentResolver> {
    bridge: Bridge<R>,
    requests: mpsc::Receiver<Request>,
    in_flight: Option<Arc<Semaphore>>,

    /// Calls currently executing
    calls: JoinSet<()>,
}

impl<R: ContentResolver> ChannelServer<R> {
    /// Create a server with its own registry, plus a client connected to it
    pub fn new(config: ChannelConfig, resolver: R) -> (Self, ChannelClient) {
        Self::with_registry(config, Arc::new(StreamRegistry::new(resolver)))
    }

    /// Create a server over an existing registry
    pub fn with_registry(
        config: ChannelConfig,
        registry: Arc<StreamRegistry<R>>,
    ) -> (Self, ChannelClient) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));

        let in_flight = if config.max_in_flight > 0 {
            Some(Arc::new(Semaphore::new(config.max_in_flight)))
        } else {
            None
        };

        let server = Self {
            bridge: Bridge::new(registry),
            requests: rx,
            in_flight,
            calls: JoinSet::new(),
        };
        let client = ChannelClient::new(tx, config.call_timeout);

        (server, client)
    }

    /// Get a reference to the stream registry
    pub fn registry(&self) -> &Arc<StreamRegistry<R>> {
        self.bridge.registry()
    }

    /// Serve until every client has been dropped
    pub async fn run(self) {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves or every client has been dropped
    ///
    /// On exit, queued calls are refused, calls already executing run to
    /// completion, and then the registry is shut down, closing every open
    /// handle.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tracing::info!("Channel server started");

        // Idle cleanup only matters when a timeout is configured
        let cleanup_handle = self
            .registry()
            .config()
            .idle_timeout
            .map(|_| self.registry().spawn_cleanup_task());

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
            }
            _ = self.serve() => {
                tracing::info!("All clients disconnected");
            }
        }

        if let Some(handle) = cleanup_handle {
            handle.abort();
        }

        self.requests.close();
        while let Ok(request) = self.requests.try_recv() {
            // Dropping the reply sender reports channel-closed to the caller
            tracing::debug!(method = %request.call.method, "Call refused during shutdown");
        }

        if !self.calls.is_empty() {
            tracing::debug!(calls = self.calls.len(), "Waiting for in-flight calls");
        }
        while self.calls.join_next().await.is_some() {}

        let closed = self.registry().shutdown().await;
        tracing::info!(closed_streams = closed, "Channel server stopped");
    }

    async fn serve(&mut self) {
        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(request) => self.dispatch(request).await,
                    None => break,
                },
                // Reap finished calls
                Some(_) = self.calls.join_next(), if !self.calls.is_empty() => {}
            }
        }
    }

    async fn dispatch(&mut self, request: Request) {
        // Wait for a slot when the in-flight limit is reached
        let permit = match self.in_flight {
            Some(ref sem) => match Arc::clone(sem).acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(_) => return,
            },
            None => None,
        };

        let bridge = self.bridge.clone();

        self.calls.spawn(async move {
            let _permit = permit;
            let Request { call, reply } = request;

            let result = bridge.handle(&call).await;
            if let Err(ref e) = result {
                tracing::debug!(method = %call.method, error = %e, "Call failed");
            }

            if reply.send(result).is_err() {
                tracing::debug!(method = %call.method, "Caller went away before reply");
            }
        });
    }
}
