//! Chunk results returned by reads

use bytes::Bytes;

/// Result of a single sequential read
///
/// `Data` always holds at least one byte; an exhausted stream is reported
/// as `EndOfStream`, never as an empty `Data`. Cloning is cheap since
/// `Bytes` is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Bytes read from the handle's cursor (possibly fewer than requested)
    Data(Bytes),
    /// No further bytes exist
    EndOfStream,
}

impl Chunk {
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Chunk::EndOfStream)
    }

    /// Payload, if any
    pub fn data(&self) -> Option<&Bytes> {
        match self {
            Chunk::Data(data) => Some(data),
            Chunk::EndOfStream => None,
        }
    }

    pub fn into_data(self) -> Option<Bytes> {
        match self {
            Chunk::Data(data) => Some(data),
            Chunk::EndOfStream => None,
        }
    }

    /// Payload length (0 at end of stream)
    pub fn byte_len(&self) -> usize {
        self.data().map_or(0, Bytes::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_chunk() {
        let chunk = Chunk::Data(Bytes::from_static(b"HELL"));

        assert!(!chunk.is_end_of_stream());
        assert_eq!(chunk.byte_len(), 4);
        assert_eq!(chunk.into_data(), Some(Bytes::from_static(b"HELL")));
    }

    #[test]
    fn test_end_of_stream() {
        let chunk = Chunk::EndOfStream;

        assert!(chunk.is_end_of_stream());
        assert_eq!(chunk.byte_len(), 0);
        assert!(chunk.data().is_none());
    }
}
