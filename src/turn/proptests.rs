//! Property-based tests for the turn state machine
//!
//! These verify the streaming invariants hold across all fragment sequences.

use super::state::{TurnSession, TurnStatus};
use super::transition::{transition, Effect, TransitionError, FALLBACK_REPLY};
use super::StreamEvent;
use crate::error::{ChatError, ChatErrorKind};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

fn arb_fragments() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(any::<String>(), 0..8)
}

fn arb_error_kind() -> impl Strategy<Value = ChatErrorKind> {
    prop_oneof![
        Just(ChatErrorKind::Unauthenticated),
        Just(ChatErrorKind::RequestFailed),
        Just(ChatErrorKind::TransportFailure),
        Just(ChatErrorKind::DecodingFailure),
        Just(ChatErrorKind::Timeout),
    ]
}

fn fragment(text: &str) -> StreamEvent {
    StreamEvent::Fragment {
        text: text.to_string(),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// The final text equals the concatenation of all fragments, and every
    /// intermediate reply update is a prefix of the final text.
    #[test]
    fn fold_is_concatenation_and_growth_is_monotonic(fragments in arb_fragments()) {
        let mut session = TurnSession::new("prompt", vec![]);
        let expected: String = fragments.concat();
        let mut updates = Vec::new();

        for text in &fragments {
            let effects = session.apply(fragment(text)).unwrap();
            for effect in effects {
                match effect {
                    Effect::UpdateReply { text } => updates.push(text),
                    Effect::ReplaceWithFallback => panic!("fallback during clean stream"),
                }
            }
        }

        let effects = session.apply(StreamEvent::End).unwrap();
        prop_assert!(effects.is_empty());
        prop_assert_eq!(session.status(), TurnStatus::Completed);
        prop_assert_eq!(session.accumulated_text(), expected.as_str());

        let mut last_len = 0;
        for update in &updates {
            prop_assert!(expected.starts_with(update.as_str()));
            prop_assert!(update.len() >= last_len);
            last_len = update.len();
        }
    }

    /// A failure at any point lands in Failed and overwrites the reply with
    /// the fallback, except the credential failure that precedes any request.
    #[test]
    fn any_failure_is_terminal_with_fallback_policy(
        fragments in arb_fragments(),
        kind in arb_error_kind(),
    ) {
        let mut session = TurnSession::new("prompt", vec![]);
        for text in &fragments {
            session.apply(fragment(text)).unwrap();
        }

        let before_error = session.status();
        let effects = session
            .apply(StreamEvent::Error(ChatError::new(kind, "boom")))
            .unwrap();

        prop_assert_eq!(session.status(), TurnStatus::Failed);
        prop_assert_eq!(session.error().unwrap().kind, kind);

        let placeholder_untouched =
            before_error == TurnStatus::Pending && kind == ChatErrorKind::Unauthenticated;
        if placeholder_untouched {
            prop_assert!(effects.is_empty());
        } else {
            prop_assert_eq!(effects, vec![Effect::ReplaceWithFallback]);
        }
    }

    /// Terminal sessions accept no further events, so a turn can never be
    /// mutated after it completes or fails.
    #[test]
    fn terminal_sessions_absorb_nothing(
        fragments in arb_fragments(),
        fail in any::<bool>(),
        late_text in any::<String>(),
    ) {
        let mut session = TurnSession::new("prompt", vec![]);
        for text in &fragments {
            session.apply(fragment(text)).unwrap();
        }
        if fail {
            session
                .apply(StreamEvent::Error(ChatError::transport("boom")))
                .unwrap();
        } else {
            session.apply(StreamEvent::End).unwrap();
        }

        let accumulated = session.accumulated_text().to_string();
        let status = session.status();

        let err = session.apply(fragment(&late_text)).unwrap_err();
        prop_assert_eq!(err, TransitionError::AlreadyTerminal(status));
        prop_assert_eq!(session.accumulated_text(), accumulated.as_str());
        prop_assert_eq!(session.status(), status);
    }

    /// The pure transition never produces text inconsistent with its inputs:
    /// a fragment step always extends the accumulation by exactly that
    /// fragment.
    #[test]
    fn fragment_step_extends_accumulation_exactly(
        accumulated in any::<String>(),
        text in any::<String>(),
    ) {
        let result = transition(TurnStatus::Streaming, &accumulated, fragment(&text)).unwrap();
        let mut expected = accumulated;
        expected.push_str(&text);
        prop_assert_eq!(result.accumulated, expected);
    }
}

#[test]
fn fallback_reply_is_the_fixed_user_facing_string() {
    assert_eq!(FALLBACK_REPLY, "Sorry, I encountered an error. Please try again.");
}
