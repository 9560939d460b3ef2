//! Turn controller
//!
//! Owns one turn end-to-end: snapshot the history, append the user turn and
//! its placeholder, acquire a credential, issue the request, fold decoded
//! fragments into the conversation, and finalize or fail the session. Every
//! failure kind is caught here and converted into the session's terminal
//! state; nothing is re-thrown past this boundary in a form that crashes the
//! caller.

#[cfg(test)]
pub(crate) mod testing;

use crate::auth::CredentialProvider;
use crate::conversation::Conversation;
use crate::error::ChatError;
use crate::transport::{ByteStream, Transport, Utf8Decoder};
use crate::turn::{Effect, StreamEvent, SubmitError, TurnSession, TurnStatus, FALLBACK_REPLY};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

const NOT_SIGNED_IN: &str = "Authentication failed: User is not signed in.";

/// Drives turns against a caller-owned [`Conversation`].
///
/// At most one session is in flight per controller: an overlapping
/// [`submit`] is rejected with [`SubmitError::Busy`] before anything is
/// mutated. Observers subscribe to the broadcast stream of [`StreamEvent`]s;
/// a dropped or lagging receiver never affects the turn.
///
/// [`submit`]: TurnController::submit
pub struct TurnController<P, T>
where
    P: CredentialProvider,
    T: Transport,
{
    credentials: P,
    transport: T,
    events_tx: broadcast::Sender<StreamEvent>,
    busy: AtomicBool,
}

impl<P, T> TurnController<P, T>
where
    P: CredentialProvider,
    T: Transport,
{
    pub fn new(credentials: P, transport: T) -> Self {
        let (events_tx, _) = broadcast::channel(128);
        Self {
            credentials,
            transport,
            events_tx,
            busy: AtomicBool::new(false),
        }
    }

    /// Subscribe to the fragment events of subsequent sessions.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.events_tx.subscribe()
    }

    /// Run one turn to its terminal state.
    ///
    /// Appends the user turn and an empty model placeholder, then streams
    /// the reply into the placeholder. The returned session carries the
    /// terminal status and, on failure, the recorded error; failures attach
    /// to the session, never to the call. Only empty input and an
    /// overlapping submission are rejected up front, before any
    /// conversation mutation.
    pub async fn submit(
        &self,
        text: &str,
        conversation: &mut Conversation,
    ) -> Result<TurnSession, SubmitError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitError::EmptyMessage);
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitError::Busy);
        }
        let _busy = BusyGuard(&self.busy);

        let mut session = TurnSession::new(text, conversation.snapshot());
        tracing::info!(
            session_id = %session.id(),
            history_turns = session.history_snapshot().len(),
            "Submitting turn"
        );
        conversation.begin_exchange(text);

        let Some(credential) = self.credentials.acquire().await else {
            let error = ChatError::unauthenticated(NOT_SIGNED_IN);
            self.apply(&mut session, StreamEvent::Error(error), conversation);
            self.log_outcome(&session);
            return Ok(session);
        };

        let request = self
            .transport
            .request(session.request_text(), session.history_snapshot(), &credential)
            .await;
        match request {
            Ok(stream) => self.drain(&mut session, stream, conversation).await,
            Err(error) => self.apply(&mut session, StreamEvent::Error(error), conversation),
        }

        self.log_outcome(&session);
        Ok(session)
    }

    /// Consume the byte stream, folding decoded fragments into the session
    /// until a terminal event.
    async fn drain(
        &self,
        session: &mut TurnSession,
        mut stream: ByteStream,
        conversation: &mut Conversation,
    ) {
        let mut decoder = Utf8Decoder::new();

        while let Some(chunk) = stream.next().await {
            let event = match chunk.and_then(|bytes| decoder.decode(&bytes)) {
                // A chunk may end mid-character and decode to nothing yet.
                Ok(fragment) if fragment.is_empty() => continue,
                Ok(fragment) => StreamEvent::Fragment { text: fragment },
                Err(error) => StreamEvent::Error(error),
            };
            let terminal = event.is_terminal();
            self.apply(session, event, conversation);
            if terminal {
                return;
            }
        }

        // Clean end of stream; a cut-off character still fails the turn.
        let event = match decoder.finish() {
            Ok(()) => StreamEvent::End,
            Err(error) => StreamEvent::Error(error),
        };
        self.apply(session, event, conversation);
    }

    /// Fold one event into the session, execute the resulting effects on the
    /// conversation, and broadcast the event to observers.
    fn apply(&self, session: &mut TurnSession, event: StreamEvent, conversation: &mut Conversation) {
        match session.apply(event.clone()) {
            Ok(effects) => {
                for effect in effects {
                    let updated = match effect {
                        Effect::UpdateReply { text } => conversation.update_reply(&text),
                        Effect::ReplaceWithFallback => conversation.update_reply(FALLBACK_REPLY),
                    };
                    if !updated {
                        tracing::warn!(
                            session_id = %session.id(),
                            "No model placeholder to update"
                        );
                    }
                }
            }
            Err(error) => {
                tracing::error!(
                    session_id = %session.id(),
                    error = %error,
                    "Rejected turn transition"
                );
            }
        }
        let _ = self.events_tx.send(event);
    }

    fn log_outcome(&self, session: &TurnSession) {
        match session.status() {
            TurnStatus::Completed => {
                tracing::info!(
                    session_id = %session.id(),
                    reply_chars = session.accumulated_text().chars().count(),
                    "Turn completed"
                );
            }
            TurnStatus::Failed => {
                if let Some(error) = session.error() {
                    tracing::error!(
                        session_id = %session.id(),
                        error = %error.message,
                        kind = ?error.kind,
                        "Turn failed"
                    );
                }
            }
            TurnStatus::Pending | TurnStatus::Streaming => {}
        }
    }
}

/// Clears the in-flight flag on every exit path, including when the submit
/// future is dropped mid-await.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
