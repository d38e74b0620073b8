//! Resource identifiers and content resolution
//!
//! A [`ContentResolver`] turns an opaque [`ResourceId`] into a readable byte
//! stream and answers length queries. The registry never touches the
//! filesystem directly; everything goes through this seam.
//!
//! Two resolvers ship with the crate:
//! - [`FsResolver`]: `file://` URIs and plain paths, optionally jailed to a root
//! - [`MemoryResolver`]: fixed in-memory contents, handy for embedding and tests

pub mod fs;
pub mod memory;

use std::fmt;
use std::future::Future;
use std::io;

use tokio::io::AsyncRead;

pub use fs::FsResolver;
pub use memory::MemoryResolver;

/// Opaque caller-supplied token naming a readable resource
///
/// Typically a content URI handed out by a file picker. Uniqueness is the
/// caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    /// Create a new resource identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(v: &str) -> Self {
        Self::new(v)
    }
}

impl From<String> for ResourceId {
    fn from(v: String) -> Self {
        Self(v)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolves resource identifiers into readable streams
///
/// Implementations stand in for the platform's content-access layer,
/// including whatever permission model it applies.
pub trait ContentResolver: Send + Sync + 'static {
    /// Stream type produced by [`open`](Self::open)
    type Stream: AsyncRead + Send + Unpin + 'static;

    /// Open a fresh stream positioned at the start of the resource
    ///
    /// `Ok(None)` means the identifier resolved but produced no stream.
    fn open(
        &self,
        id: &ResourceId,
    ) -> impl Future<Output = io::Result<Option<Self::Stream>>> + Send;

    /// Byte length of the resource, independent of any open stream
    ///
    /// `Ok(None)` means the length cannot be determined.
    fn size(&self, id: &ResourceId) -> impl Future<Output = io::Result<Option<u64>>> + Send;

    /// Release a stream previously returned by [`open`](Self::open)
    fn close(&self, stream: Self::Stream) -> impl Future<Output = io::Result<()>> + Send {
        async move {
            drop(stream);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_display() {
        let id = ResourceId::new("content://media/external/file/42");
        assert_eq!(id.to_string(), "content://media/external/file/42");
        assert_eq!(id.as_str(), "content://media/external/file/42");
    }

    #[test]
    fn test_resource_id_conversions() {
        let a: ResourceId = "doc-1".into();
        let b: ResourceId = String::from("doc-1").into();
        assert_eq!(a, b);
    }
}
