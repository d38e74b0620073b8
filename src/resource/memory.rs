//! In-memory content resolver

use std::collections::HashMap;
use std::io::{self, Cursor};

use bytes::Bytes;

use super::{ContentResolver, ResourceId};

/// Resolver backed by a fixed set of in-memory resources
///
/// Unknown identifiers resolve to "no stream" and "size unknown" rather
/// than an error. Contents are shared, so every open gets an independent
/// cursor over the same `Bytes`.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    resources: HashMap<ResourceId, Bytes>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource, replacing any previous content for `id`
    pub fn with_resource(mut self, id: impl Into<ResourceId>, content: impl Into<Bytes>) -> Self {
        self.insert(id, content);
        self
    }

    pub fn insert(&mut self, id: impl Into<ResourceId>, content: impl Into<Bytes>) {
        self.resources.insert(id.into(), content.into());
    }

    pub fn remove(&mut self, id: &ResourceId) -> Option<Bytes> {
        self.resources.remove(id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ContentResolver for MemoryResolver {
    type Stream = Cursor<Bytes>;

    async fn open(&self, id: &ResourceId) -> io::Result<Option<Self::Stream>> {
        Ok(self.resources.get(id).cloned().map(Cursor::new))
    }

    async fn size(&self, id: &ResourceId) -> io::Result<Option<u64>> {
        Ok(self.resources.get(id).map(|b| b.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn test_open_known_resource() {
        let resolver = MemoryResolver::new().with_resource("doc-1", "HELLOWORLD");

        let mut stream = resolver.open(&"doc-1".into()).await.unwrap().unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();

        assert_eq!(out, b"HELLOWORLD");
    }

    #[tokio::test]
    async fn test_unknown_resource() {
        let resolver = MemoryResolver::new();
        let id = ResourceId::new("missing");

        assert!(resolver.open(&id).await.unwrap().is_none());
        assert!(resolver.size(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_streams_have_independent_cursors() {
        let resolver = MemoryResolver::new().with_resource("doc-1", "ABCD");
        let id = ResourceId::new("doc-1");

        let mut first = resolver.open(&id).await.unwrap().unwrap();
        let mut buf = [0u8; 2];
        first.read_exact(&mut buf).await.unwrap();

        let mut second = resolver.open(&id).await.unwrap().unwrap();
        let mut out = Vec::new();
        second.read_to_end(&mut out).await.unwrap();

        assert_eq!(&buf, b"AB");
        assert_eq!(out, b"ABCD");
    }

    #[tokio::test]
    async fn test_size_of_empty_resource() {
        let resolver = MemoryResolver::new().with_resource("empty", Bytes::new());
        assert_eq!(resolver.size(&"empty".into()).await.unwrap(), Some(0));
    }
}
