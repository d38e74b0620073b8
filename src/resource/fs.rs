//! Filesystem content resolver

use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs::{self, File};

use super::{ContentResolver, ResourceId};

const FILE_SCHEME: &str = "file://";

/// Resolver mapping identifiers onto filesystem paths
///
/// Accepts `file://` URIs and plain paths. With a root configured, relative
/// identifiers are joined onto it and anything that would escape it, by
/// `..`, by absolute path or through a symlink, is refused as permission
/// denied. Missing files and directories resolve to "no stream".
#[derive(Debug, Clone, Default)]
pub struct FsResolver {
    root: Option<PathBuf>,
}

impl FsResolver {
    /// Resolver with no root: identifiers are used as paths verbatim
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver confined to `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Map an identifier to the path it names
    pub fn resolve(&self, id: &ResourceId) -> io::Result<PathBuf> {
        let raw = id.as_str();
        let raw = raw.strip_prefix(FILE_SCHEME).unwrap_or(raw);
        if raw.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("empty path in resource identifier {}", id),
            ));
        }

        let path = Path::new(raw);
        let Some(root) = &self.root else {
            return Ok(path.to_path_buf());
        };

        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} escapes the resolver root", id),
            ));
        }

        if path.is_absolute() {
            if path.starts_with(root) {
                Ok(path.to_path_buf())
            } else {
                Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("{} is outside the resolver root", id),
                ))
            }
        } else {
            Ok(root.join(path))
        }
    }
}

impl FsResolver {
    /// Resolve and, under a root, follow symlinks to check the real target
    ///
    /// Returns the canonical path when a root is configured.
    async fn locate(&self, id: &ResourceId) -> io::Result<PathBuf> {
        let path = self.resolve(id)?;
        let Some(root) = &self.root else {
            return Ok(path);
        };

        let real = fs::canonicalize(&path).await?;
        let real_root = fs::canonicalize(root).await?;
        if !real.starts_with(&real_root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} links outside the resolver root", id),
            ));
        }
        Ok(real)
    }
}

impl ContentResolver for FsResolver {
    type Stream = File;

    async fn open(&self, id: &ResourceId) -> io::Result<Option<Self::Stream>> {
        let path = match self.locate(id).await {
            Ok(path) => path,
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => return Ok(None),
            Ok(_) => {}
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        }

        tracing::trace!(resource = %id, path = %path.display(), "Opening file");
        File::open(&path).await.map(Some)
    }

    async fn size(&self, id: &ResourceId) -> io::Result<Option<u64>> {
        let path = match self.locate(id).await {
            Ok(path) => path,
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
            Ok(_) => Ok(None),
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
