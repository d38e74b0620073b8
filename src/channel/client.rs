//! Channel client

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::bridge::{Method, MethodCall, Value};
use crate::error::{ErrorKind, Result, StreamError};
use crate::registry::Chunk;

use super::server::Request;

/// Handle for sending method calls to a [`ChannelServer`](super::ChannelServer)
///
/// Cheap to clone; the server keeps running until every clone is dropped
/// or its shutdown signal fires.
#[derive(Clone)]
pub struct ChannelClient {
    tx: mpsc::Sender<Request>,
    call_timeout: Option<Duration>,
}

impl ChannelClient {
    pub(super) fn new(tx: mpsc::Sender<Request>, call_timeout: Option<Duration>) -> Self {
        Self { tx, call_timeout }
    }

    /// Send a raw method call and wait for its result
    ///
    /// A configured deadline bounds the caller's wait only; the operation
    /// itself still runs to completion on the server.
    pub async fn invoke(&self, call: MethodCall) -> Result<Value> {
        let method = call.method.clone();
        let exchange = async {
            let (reply, response) = oneshot::channel();
            self.tx
                .send(Request { call, reply })
                .await
                .map_err(|_| channel_closed())?;
            response.await.map_err(|_| channel_closed())?
        };

        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange).await.map_err(|_| {
                tracing::debug!(method = %method, timeout_ms = limit.as_millis() as u64, "Call timed out");
                StreamError::new(
                    ErrorKind::Timeout,
                    format!("{} timed out after {:?}", method, limit),
                )
            })?,
            None => exchange.await,
        }
    }

    /// Open a read stream for `uri`
    pub async fn open_stream(&self, uri: &str) -> Result<()> {
        self.invoke(MethodCall::with_uri(Method::OpenStream, uri))
            .await
            .map(|_| ())
    }

    /// Byte length of `uri`
    pub async fn get_size(&self, uri: &str) -> Result<u64> {
        match self
            .invoke(MethodCall::with_uri(Method::GetSize, uri))
            .await?
        {
            Value::Int(n) => u64::try_from(n).map_err(|_| unexpected(Method::GetSize, &Value::Int(n))),
            other => Err(unexpected(Method::GetSize, &other)),
        }
    }

    /// Read the next chunk of `uri`
    pub async fn read_chunk(&self, uri: &str, size: Option<usize>) -> Result<Chunk> {
        match self.invoke(MethodCall::read_chunk(uri, size)).await? {
            Value::Bytes(data) => Ok(Chunk::Data(data)),
            Value::Null => Ok(Chunk::EndOfStream),
            other => Err(unexpected(Method::ReadChunk, &other)),
        }
    }

    /// Close the stream for `uri`
    pub async fn close_stream(&self, uri: &str) -> Result<()> {
        self.invoke(MethodCall::with_uri(Method::CloseStream, uri))
            .await
            .map(|_| ())
    }

    /// Whether the server has stopped accepting calls
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

fn channel_closed() -> StreamError {
    StreamError::new(ErrorKind::ChannelClosed, "Channel server is not running")
}

fn unexpected(method: Method, value: &Value) -> StreamError {
    StreamError::invalid_argument(format!("Unexpected {} response: {:?}", method, value))
}
