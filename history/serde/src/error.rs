use thiserror::Error;

/// Errors raised while decoding a byte stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The stream ended before a value could be fully read
    #[error("Unexpected end of stream: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A change kind tag outside of the known range was read
    #[error("Invalid change kind tag {tag}")]
    InvalidChangeKind { tag: u8 },

    /// A value was read successfully but is not valid for its type
    #[error("Invalid value while reading {context}")]
    InvalidValue { context: &'static str },

    /// Bytes were left over after a complete message was read
    #[error("{remaining} trailing bytes after end of message")]
    TrailingBytes { remaining: usize },
}
