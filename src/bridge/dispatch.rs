//! Method dispatch onto the stream registry

use std::sync::Arc;

use crate::error::{ErrorKind, Result, StreamError};
use crate::registry::StreamRegistry;
use crate::resource::ContentResolver;

use super::method::{Method, MethodCall};
use super::value::Value;

/// Dispatches named method calls to a shared [`StreamRegistry`]
pub struct Bridge<R: ContentResolver> {
    registry: Arc<StreamRegistry<R>>,
}

impl<R: ContentResolver> Bridge<R> {
    pub fn new(registry: Arc<StreamRegistry<R>>) -> Self {
        Self { registry }
    }

    /// Get a reference to the stream registry
    pub fn registry(&self) -> &Arc<StreamRegistry<R>> {
        &self.registry
    }

    /// Handle one method call
    ///
    /// Results: `Bool(true)` for open and close, `Int` for size, `Bytes` or
    /// `Null` (end of stream) for reads. Unknown methods fail with
    /// `not-implemented` before any argument is looked at.
    pub async fn handle(&self, call: &MethodCall) -> Result<Value> {
        let Some(method) = Method::parse(&call.method) else {
            tracing::debug!(method = %call.method, "Unknown method");
            return Err(StreamError::new(
                ErrorKind::NotImplemented,
                format!("Method not implemented: {}", call.method),
            ));
        };

        let id = call.uri()?;
        tracing::trace!(method = %method, resource = %id, "Dispatching call");

        match method {
            Method::OpenStream => {
                self.registry.open_stream(&id).await?;
                Ok(Value::Bool(true))
            }
            Method::GetSize => {
                let len = self.registry.get_size(&id).await?;
                i64::try_from(len).map(Value::Int).map_err(|_| {
                    StreamError::new(
                        ErrorKind::SizeUnavailable,
                        format!("Size of {} exceeds the 64-bit integer range", id),
                    )
                })
            }
            Method::ReadChunk => {
                let size = call.size()?;
                let chunk = self.registry.read_chunk(&id, size).await?;
                Ok(chunk.into())
            }
            Method::CloseStream => {
                self.registry.close_stream(&id).await?;
                Ok(Value::Bool(true))
            }
        }
    }
}

impl<R: ContentResolver> Clone for Bridge<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::resource::MemoryResolver;

    fn bridge() -> Bridge<MemoryResolver> {
        let resolver = MemoryResolver::new().with_resource("doc-1", "HELLOWORLD");
        Bridge::new(Arc::new(StreamRegistry::new(resolver)))
    }

    #[tokio::test]
    async fn test_doc_scenario_over_methods() {
        let bridge = bridge();

        let open = MethodCall::with_uri(Method::OpenStream, "doc-1");
        assert_eq!(bridge.handle(&open).await.unwrap(), Value::Bool(true));

        let size = MethodCall::with_uri(Method::GetSize, "doc-1");
        assert_eq!(bridge.handle(&size).await.unwrap(), Value::Int(10));

        let read = MethodCall::read_chunk("doc-1", Some(4));
        let expected: [&[u8]; 3] = [b"HELL", b"OWOR", b"LD"];
        for expected in expected {
            let value = bridge.handle(&read).await.unwrap();
            assert_eq!(value, Value::Bytes(Bytes::copy_from_slice(expected)));
        }
        assert_eq!(bridge.handle(&read).await.unwrap(), Value::Null);

        let close = MethodCall::with_uri(Method::CloseStream, "doc-1");
        assert_eq!(bridge.handle(&close).await.unwrap(), Value::Bool(true));

        let err = bridge.handle(&read).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoStream);
    }

    #[tokio::test]
    async fn test_aliases_dispatch() {
        let bridge = bridge();

        let open = MethodCall::new("openStream", Value::map([("uri", "doc-1")]));
        assert_eq!(bridge.handle(&open).await.unwrap(), Value::Bool(true));

        let size = MethodCall::new("getSize", Value::map([("uri", "doc-1")]));
        assert_eq!(bridge.handle(&size).await.unwrap(), Value::Int(10));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let bridge = bridge();
        let call = MethodCall::new("deleteFile", Value::Null);

        let err = bridge.handle(&call).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }

    #[tokio::test]
    async fn test_missing_uri() {
        let bridge = bridge();
        let call = MethodCall::new("readChunk", Value::map([("size", 4)]));

        let err = bridge.handle(&call).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_default_read_size() {
        let bridge = bridge();
        bridge
            .handle(&MethodCall::with_uri(Method::OpenStream, "doc-1"))
            .await
            .unwrap();

        let value = bridge
            .handle(&MethodCall::read_chunk("doc-1", None))
            .await
            .unwrap();
        assert_eq!(value, Value::Bytes(Bytes::from_static(b"HELLOWORLD")));
    }

    #[tokio::test]
    async fn test_size_errors_surface() {
        let bridge = bridge();
        let err = bridge
            .handle(&MethodCall::with_uri(Method::GetSize, "missing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SizeUnavailable);
    }
}
