//! Transport abstraction
//!
//! One request per turn: the outbound message plus the prior history, with
//! the response body exposed as an incremental byte stream. The service is
//! stateless per the client's model, so the supplied history is the whole
//! context it sees.

mod decode;
mod http;

pub use decode::Utf8Decoder;
pub use http::HttpTransport;

use crate::auth::Credential;
use crate::conversation::Turn;
use crate::error::ChatError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::sync::Arc;

/// Incremental response body. Each item is one raw chunk as it arrived off
/// the wire; chunk boundaries carry no meaning.
pub type ByteStream = BoxStream<'static, Result<Bytes, ChatError>>;

/// Common interface for issuing one chat request
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the new message and prior history, returning the streamed reply.
    ///
    /// Requests are independent of each other; nothing is guaranteed about
    /// ordering across separate calls.
    async fn request(
        &self,
        prompt: &str,
        history: &[Turn],
        credential: &Credential,
    ) -> Result<ByteStream, ChatError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn request(
        &self,
        prompt: &str,
        history: &[Turn],
        credential: &Credential,
    ) -> Result<ByteStream, ChatError> {
        (**self).request(prompt, history, credential).await
    }
}

/// Logging wrapper for transports
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T: Transport> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: Transport> Transport for LoggingTransport<T> {
    async fn request(
        &self,
        prompt: &str,
        history: &[Turn],
        credential: &Credential,
    ) -> Result<ByteStream, ChatError> {
        let start = std::time::Instant::now();
        let result = self.inner.request(prompt, history, credential).await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    history_turns = history.len(),
                    "Chat request accepted, streaming reply"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Chat request failed"
                );
            }
        }

        result
    }
}
