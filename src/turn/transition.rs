//! Pure turn transition function
//!
//! Given the current status, the accumulation so far, and one stream event,
//! produce the next status, the new accumulation, and the effects to apply
//! to the conversation. No I/O happens here; given the same inputs this
//! always produces the same outputs.

use super::event::StreamEvent;
use super::state::TurnStatus;
use crate::error::{ChatError, ChatErrorKind};
use thiserror::Error;

/// Fixed reply shown in place of a failed turn. Partial output is replaced
/// wholesale rather than left truncated.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Result of folding one stream event into a turn
#[derive(Debug)]
pub struct TransitionResult {
    pub status: TurnStatus,
    pub accumulated: String,
    pub effects: Vec<Effect>,
    /// Failure to record on the session, when the event was an error
    pub error: Option<ChatError>,
}

/// Conversation mutations requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace the placeholder's text with the full accumulation so far
    UpdateReply { text: String },
    /// Replace the placeholder's text with [`FALLBACK_REPLY`]
    ReplaceWithFallback,
}

/// Errors from misusing the state machine
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("turn already reached terminal status {0:?}")]
    AlreadyTerminal(TurnStatus),
}

/// Synchronous submission rejections. Raised before any conversation
/// mutation, so a rejected call leaves no placeholder behind.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a turn is already in flight; wait for it to reach a terminal state")]
    Busy,
    #[error("message is empty after trimming")]
    EmptyMessage,
}

/// Fold one stream event into the turn lifecycle.
///
/// Fragments accumulate in arrival order and re-emit the whole accumulation,
/// so the conversation only ever observes a growing sequence of prefixes of
/// the final text. The single sanctioned exception is the overwrite on
/// failure: the accumulated partial text is discarded and the fallback shown
/// instead. A credential failure is the one error that leaves the placeholder
/// untouched, since nothing was ever requested.
pub fn transition(
    status: TurnStatus,
    accumulated: &str,
    event: StreamEvent,
) -> Result<TransitionResult, TransitionError> {
    if status.is_terminal() {
        return Err(TransitionError::AlreadyTerminal(status));
    }

    match event {
        StreamEvent::Fragment { text } => {
            let mut accumulated = accumulated.to_string();
            accumulated.push_str(&text);
            Ok(TransitionResult {
                status: TurnStatus::Streaming,
                effects: vec![Effect::UpdateReply {
                    text: accumulated.clone(),
                }],
                accumulated,
                error: None,
            })
        }

        StreamEvent::End => Ok(TransitionResult {
            status: TurnStatus::Completed,
            accumulated: accumulated.to_string(),
            effects: vec![],
            error: None,
        }),

        StreamEvent::Error(error) => {
            let unauthenticated = status == TurnStatus::Pending
                && error.kind == ChatErrorKind::Unauthenticated;
            let effects = if unauthenticated {
                // No request was sent; the placeholder stays empty.
                vec![]
            } else {
                vec![Effect::ReplaceWithFallback]
            };
            Ok(TransitionResult {
                status: TurnStatus::Failed,
                accumulated: accumulated.to_string(),
                effects,
                error: Some(error),
            })
        }
    }
}
