//! Chat error types

use thiserror::Error;

/// Chat error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Unauthenticated, message)
    }

    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::RequestFailed, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::TransportFailure, message)
    }

    pub fn decoding(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::DecodingFailure, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Timeout, message)
    }
}

/// Error classification surfaced on a failed turn session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// No credential available, request never sent
    Unauthenticated,
    /// Service answered with a non-success status
    RequestFailed,
    /// Connection-level failure before or during streaming
    TransportFailure,
    /// Byte sequence that cannot be decoded even with carry-over
    DecodingFailure,
    /// Request or stream read exceeded the configured deadline
    Timeout,
}
