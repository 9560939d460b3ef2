//! Conversational client core for a streaming completion service
//!
//! One logical turn couples a user message with its streamed model reply.
//! The [`TurnController`] drives a turn end-to-end: it snapshots the prior
//! history, appends the user turn and an empty model placeholder to the
//! caller-owned [`Conversation`], acquires a bearer credential, issues one
//! request, and folds decoded fragments into the placeholder until the
//! stream ends or fails. A failed turn always shows the fixed
//! [`FALLBACK_REPLY`], never a truncated fragment concatenation.
//!
//! Presentation, markdown rendering, and credential issuance live in the
//! embedding application; this crate exposes the seams they plug into
//! ([`CredentialProvider`], [`Transport`], the broadcast [`StreamEvent`]s).

pub mod auth;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod transport;
pub mod turn;

pub use auth::{Credential, CredentialProvider, EnvCredentialProvider, StaticCredentialProvider};
pub use config::ChatConfig;
pub use controller::TurnController;
pub use conversation::{Conversation, Role, Turn};
pub use error::{ChatError, ChatErrorKind};
pub use transport::{ByteStream, HttpTransport, LoggingTransport, Transport, Utf8Decoder};
pub use turn::{StreamEvent, SubmitError, TurnSession, TurnStatus, FALLBACK_REPLY};
