//! Turn session state

use super::event::StreamEvent;
use super::transition::{transition, Effect, TransitionError};
use crate::conversation::Turn;
use crate::error::ChatError;
use serde::Serialize;
use uuid::Uuid;

/// Lifecycle of one in-flight turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// Request submitted, no fragment received yet
    #[default]
    Pending,
    /// At least one fragment received
    Streaming,
    /// Stream ended cleanly; the reply is final
    Completed,
    /// Transport, decoding, or credential failure; the reply is the fallback
    Failed,
}

impl TurnStatus {
    /// Terminal statuses accept no further events.
    pub fn is_terminal(self) -> bool {
        matches!(self, TurnStatus::Completed | TurnStatus::Failed)
    }
}

/// Working state for one in-flight request.
///
/// Created per submission, driven to a terminal status, then discarded; only
/// its effect (the finalized model turn) persists in the conversation. The
/// loading/error condition a UI needs is derived from `status` and `error`
/// here rather than held anywhere else.
#[derive(Debug, Clone)]
pub struct TurnSession {
    id: Uuid,
    request_text: String,
    history_snapshot: Vec<Turn>,
    accumulated_text: String,
    status: TurnStatus,
    error: Option<ChatError>,
}

impl TurnSession {
    pub(crate) fn new(request_text: &str, history_snapshot: Vec<Turn>) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_text: request_text.to_string(),
            history_snapshot,
            accumulated_text: String::new(),
            status: TurnStatus::Pending,
            error: None,
        }
    }

    /// Identifier used for log correlation only.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request_text(&self) -> &str {
        &self.request_text
    }

    /// The conversation contents captured at submission time. Never contains
    /// this session's own placeholder or anything appended later.
    pub fn history_snapshot(&self) -> &[Turn] {
        &self.history_snapshot
    }

    /// The running fold of received fragments, in arrival order.
    pub fn accumulated_text(&self) -> &str {
        &self.accumulated_text
    }

    pub fn status(&self) -> TurnStatus {
        self.status
    }

    /// The failure recorded at `Failed`, with its human-readable message.
    pub fn error(&self) -> Option<&ChatError> {
        self.error.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Fold one stream event into the session, returning the effects the
    /// caller must apply to the conversation.
    pub(crate) fn apply(&mut self, event: StreamEvent) -> Result<Vec<Effect>, TransitionError> {
        let result = transition(self.status, &self.accumulated_text, event)?;
        self.status = result.status;
        self.accumulated_text = result.accumulated;
        if let Some(error) = result.error {
            self.error = Some(error);
        }
        Ok(result.effects)
    }
}
