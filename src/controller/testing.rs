//! Mock implementations for testing
//!
//! These doubles enable exercising the controller without real I/O.

use crate::auth::{Credential, CredentialProvider};
use crate::conversation::Turn;
use crate::error::ChatError;
use crate::transport::{ByteStream, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One request as the mock transport saw it
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub prompt: String,
    pub history: Vec<Turn>,
    pub token: String,
}

enum Script {
    Stream(Vec<Result<Bytes, ChatError>>),
    RequestError(ChatError),
    /// A stream that never yields, for overlap and cancellation tests
    Hanging,
}

/// Mock transport that replays queued scripts and records every request
pub(crate) struct MockTransport {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<RecordedRequest>>,
    /// Notified when a request starts, for test synchronization
    pub request_started: Arc<Notify>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            request_started: Arc::new(Notify::new()),
        }
    }

    /// Queue a successful stream delivering each fragment as one chunk.
    pub fn queue_fragments(&self, fragments: &[&str]) {
        let chunks = fragments
            .iter()
            .map(|f| Ok(Bytes::copy_from_slice(f.as_bytes())))
            .collect();
        self.scripts.lock().unwrap().push_back(Script::Stream(chunks));
    }

    /// Queue a stream with explicit chunk results, for byte-level scripts.
    pub fn queue_chunks(&self, chunks: Vec<Result<Bytes, ChatError>>) {
        self.scripts.lock().unwrap().push_back(Script::Stream(chunks));
    }

    /// Queue a request that is rejected before any body is streamed.
    pub fn queue_request_error(&self, error: ChatError) {
        self.scripts
            .lock()
            .unwrap()
            .push_back(Script::RequestError(error));
    }

    /// Queue a stream that never yields a chunk.
    pub fn queue_hanging_stream(&self) {
        self.scripts.lock().unwrap().push_back(Script::Hanging);
    }

    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        prompt: &str,
        history: &[Turn],
        credential: &Credential,
    ) -> Result<ByteStream, ChatError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            prompt: prompt.to_string(),
            history: history.to_vec(),
            token: credential.token().to_string(),
        });
        self.request_started.notify_one();

        match self.scripts.lock().unwrap().pop_front() {
            None => Err(ChatError::transport("No mock response queued")),
            Some(Script::RequestError(error)) => Err(error),
            Some(Script::Stream(chunks)) => Ok(futures::stream::iter(chunks).boxed()),
            Some(Script::Hanging) => {
                Ok(futures::stream::pending::<Result<Bytes, ChatError>>().boxed())
            }
        }
    }
}

/// Mock credential provider pinned to signed-in or signed-out
pub(crate) struct MockCredentialProvider {
    credential: Option<Credential>,
}

impl MockCredentialProvider {
    pub fn signed_in(token: &str) -> Self {
        Self {
            credential: Some(Credential::new(token)),
        }
    }

    pub fn signed_out() -> Self {
        Self { credential: None }
    }
}

#[async_trait]
impl CredentialProvider for MockCredentialProvider {
    async fn acquire(&self) -> Option<Credential> {
        self.credential.clone()
    }
}
