//! Method names and calls

use std::fmt;

use crate::error::{Result, StreamError};
use crate::resource::ResourceId;

use super::value::Value;

/// Argument carrying the resource identifier
pub const ARG_URI: &str = "uri";

/// Argument carrying the requested chunk size
pub const ARG_SIZE: &str = "size";

/// Methods understood by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    OpenStream,
    GetSize,
    ReadChunk,
    CloseStream,
}

impl Method {
    /// Parse a method name, accepting the channel names and their short aliases
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "openReadStream" | "openStream" => Some(Method::OpenStream),
            "getFileSize" | "getSize" => Some(Method::GetSize),
            "readChunk" => Some(Method::ReadChunk),
            "closeStream" => Some(Method::CloseStream),
            _ => None,
        }
    }

    /// Canonical channel name
    pub fn name(&self) -> &'static str {
        match self {
            Method::OpenStream => "openReadStream",
            Method::GetSize => "getFileSize",
            Method::ReadChunk => "readChunk",
            Method::CloseStream => "closeStream",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named request with its arguments
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    /// Method name as sent by the caller
    pub method: String,
    /// Arguments, normally a [`Value::Map`]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Call carrying only a resource identifier
    pub fn with_uri(method: Method, uri: impl Into<String>) -> Self {
        Self::new(method.name(), Value::map([(ARG_URI, Value::String(uri.into()))]))
    }

    /// `readChunk` call, optionally with an explicit size
    pub fn read_chunk(uri: impl Into<String>, size: Option<usize>) -> Self {
        let mut args = vec![(ARG_URI, Value::String(uri.into()))];
        if let Some(size) = size {
            // The registry clamps oversized requests anyway
            args.push((ARG_SIZE, Value::Int(i64::try_from(size).unwrap_or(i64::MAX))));
        }
        Self::new(Method::ReadChunk.name(), Value::map(args))
    }

    /// The required `uri` argument
    pub fn uri(&self) -> Result<ResourceId> {
        match self.arguments.get(ARG_URI) {
            Some(Value::String(uri)) => Ok(ResourceId::new(uri.as_str())),
            Some(other) => Err(StreamError::invalid_argument(format!(
                "'{}' must be a string, got {:?}",
                ARG_URI, other
            ))),
            None => Err(StreamError::invalid_argument(format!(
                "missing '{}' argument",
                ARG_URI
            ))),
        }
    }

    /// The optional `size` argument; `None` when absent or null
    pub fn size(&self) -> Result<Option<usize>> {
        match self.arguments.get(ARG_SIZE) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Int(n)) if *n > 0 => usize::try_from(*n)
                .map(Some)
                .map_err(|_| StreamError::invalid_argument(format!("size {} out of range", n))),
            Some(Value::Int(n)) => Err(StreamError::invalid_argument(format!(
                "size must be positive, got {}",
                n
            ))),
            Some(other) => Err(StreamError::invalid_argument(format!(
                "'{}' must be an integer, got {:?}",
                ARG_SIZE, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!(Method::parse("openReadStream"), Some(Method::OpenStream));
        assert_eq!(Method::parse("openStream"), Some(Method::OpenStream));
        assert_eq!(Method::parse("getFileSize"), Some(Method::GetSize));
        assert_eq!(Method::parse("getSize"), Some(Method::GetSize));
        assert_eq!(Method::parse("readChunk"), Some(Method::ReadChunk));
        assert_eq!(Method::parse("closeStream"), Some(Method::CloseStream));
        assert_eq!(Method::parse("deleteFile"), None);
    }

    #[test]
    fn test_uri_argument() {
        let call = MethodCall::with_uri(Method::GetSize, "doc-1");
        assert_eq!(call.method, "getFileSize");
        assert_eq!(call.uri().unwrap(), ResourceId::new("doc-1"));

        let call = MethodCall::new("getFileSize", Value::map([("uri", 5)]));
        assert_eq!(call.uri().unwrap_err().kind(), ErrorKind::InvalidArgument);

        let call = MethodCall::new("getFileSize", Value::Null);
        assert_eq!(call.uri().unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_read_chunk_huge_size_saturates() {
        let call = MethodCall::read_chunk("doc-1", Some(usize::MAX));

        assert_eq!(call.arguments.get_int(ARG_SIZE), Some(i64::MAX));
        assert!(call.size().unwrap().is_some());
    }

    #[test]
    fn test_size_argument() {
        assert_eq!(MethodCall::read_chunk("doc-1", None).size().unwrap(), None);
        assert_eq!(
            MethodCall::read_chunk("doc-1", Some(4)).size().unwrap(),
            Some(4)
        );

        let call = MethodCall::new(
            "readChunk",
            Value::map([("uri", Value::from("doc-1")), ("size", Value::Null)]),
        );
        assert_eq!(call.size().unwrap(), None);

        for bad in [Value::Int(0), Value::Int(-1), Value::from("4")] {
            let call = MethodCall::new(
                "readChunk",
                Value::map([("uri", Value::from("doc-1")), ("size", bad)]),
            );
            assert_eq!(call.size().unwrap_err().kind(), ErrorKind::InvalidArgument);
        }
    }
}
