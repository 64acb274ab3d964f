//! Property-based tests for the exchange controller
//!
//! These tests drive the controller with arbitrary action sequences and check
//! the ordering, single-flight and late-arrival invariants after every step.

use std::collections::HashSet;

use parley_ai::{GeneratedArtifact, RefinementTag, Tone};
use proptest::prelude::*;

use crate::controller::{ExchangeController, Resolution};
use crate::error::Rejection;
use crate::refine::refine;
use crate::state::{ExchangeState, RequestId};

// ============================================================================
// Arbitrary Generators
// ============================================================================

#[derive(Debug, Clone)]
enum Action {
    Submit(String),
    /// Resolve the pending request (or the latest one if none is pending)
    ResolvePending { ok: bool },
    /// Resolve some earlier request by index into the issued list
    ResolveEarlier { index: usize, ok: bool },
    Cancel,
    Pause,
    Stop,
    Reset,
    Clear,
    Refine(RefinementTag),
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z]{1,8}( [a-z]{1,8}){0,8}",
        1 => Just(String::new()),
        1 => Just("   ".to_string()),
    ]
}

fn arb_tag() -> impl Strategy<Value = RefinementTag> {
    prop_oneof![
        Just(RefinementTag::Shorten),
        proptest::sample::select(Tone::ALL.to_vec()).prop_map(RefinementTag::ChangeTone),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => arb_text().prop_map(Action::Submit),
        3 => any::<bool>().prop_map(|ok| Action::ResolvePending { ok }),
        2 => (0usize..16, any::<bool>()).prop_map(|(index, ok)| Action::ResolveEarlier { index, ok }),
        1 => Just(Action::Cancel),
        1 => Just(Action::Pause),
        1 => Just(Action::Stop),
        1 => Just(Action::Reset),
        1 => Just(Action::Clear),
        2 => arb_tag().prop_map(Action::Refine),
    ]
}

fn outcome(ok: bool, request: RequestId) -> parley_ai::Result<GeneratedArtifact> {
    if ok {
        Ok(GeneratedArtifact::text(format!(
            "reply to {} with some extra words to exceed the shorten bound",
            request
        )))
    } else {
        Err(parley_ai::Error::Backend(format!("failure for {}", request)))
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_exchange_invariants(actions in proptest::collection::vec(arb_action(), 1..60)) {
        let mut c = ExchangeController::new();
        let mut issued: Vec<RequestId> = vec![];
        let mut suppressed: HashSet<RequestId> = HashSet::new();
        let mut last_sequence: Option<u64> = None;

        for action in actions {
            let turns_before = c.turns().to_vec();
            let state_before = c.state().clone();

            match action {
                Action::Submit(text) => match c.submit(&text) {
                    Ok(sub) => {
                        prop_assert!(!text.trim().is_empty());
                        prop_assert!(!state_before.is_awaiting());
                        if let Some(prev) = issued.last() {
                            prop_assert!(sub.request > *prev);
                        }
                        issued.push(sub.request);
                    }
                    Err(Rejection::EmptyInput) => prop_assert!(text.trim().is_empty()),
                    Err(Rejection::Busy) => {
                        // Never a second outstanding request
                        prop_assert_eq!(c.state(), &state_before);
                        prop_assert_eq!(c.turns(), &turns_before[..]);
                    }
                    Err(Rejection::Interrupted) => {
                        prop_assert_eq!(&state_before, &ExchangeState::Interrupted);
                    }
                    Err(other) => prop_assert!(false, "unexpected rejection {:?}", other),
                },

                Action::ResolvePending { ok } => {
                    let target = c.state().pending_request().or_else(|| issued.last().copied());
                    if let Some(request) = target {
                        let res = c.on_generation_result(request, outcome(ok, request));
                        if suppressed.contains(&request) || state_before.pending_request() != Some(request) {
                            prop_assert_eq!(res, Resolution::Discarded);
                            prop_assert_eq!(c.turns(), &turns_before[..]);
                            prop_assert_eq!(c.state(), &state_before);
                        } else {
                            prop_assert_eq!(c.turns().len(), turns_before.len() + 1);
                            prop_assert!(!c.state().is_awaiting());
                        }
                    }
                }

                Action::ResolveEarlier { index, ok } => {
                    if !issued.is_empty() {
                        let request = issued[index % issued.len()];
                        let res = c.on_generation_result(request, outcome(ok, request));
                        if state_before.pending_request() != Some(request) {
                            prop_assert_eq!(res, Resolution::Discarded);
                            prop_assert_eq!(c.turns(), &turns_before[..]);
                        }
                    }
                }

                Action::Cancel | Action::Pause | Action::Stop => {
                    let result = match action {
                        Action::Cancel => c.cancel(),
                        Action::Pause => c.pause(),
                        _ => c.stop(),
                    };
                    match result {
                        Ok(request) => {
                            prop_assert_eq!(state_before.pending_request(), Some(request));
                            prop_assert!(!c.state().is_awaiting());
                            prop_assert_eq!(c.turns(), &turns_before[..]);
                            suppressed.insert(request);
                        }
                        Err(rejection) => {
                            prop_assert_eq!(rejection, Rejection::NotAwaiting);
                            prop_assert_eq!(c.state(), &state_before);
                        }
                    }
                }

                Action::Reset => {
                    if c.reset().is_ok() {
                        prop_assert!(c.turns().is_empty());
                        prop_assert!(c.current_artifact().is_none());
                        prop_assert_eq!(c.state(), &ExchangeState::Idle);
                    } else {
                        prop_assert!(state_before.is_awaiting());
                    }
                }

                Action::Clear => {
                    if c.clear().is_ok() {
                        prop_assert!(c.turns().is_empty());
                    }
                }

                Action::Refine(tag) => {
                    let previous = c.current_artifact().cloned();
                    let lineage_before = c.artifacts().len();
                    let refined = c.refine(tag).cloned();
                    match (refined, previous) {
                        (Ok(refined), Some(previous)) => {
                            // Always derived from the immediately preceding artifact
                            prop_assert_eq!(&refined, &refine(&previous, tag));
                            prop_assert_eq!(c.artifacts().len(), lineage_before + 1);
                            prop_assert_eq!(&c.artifacts()[lineage_before - 1], &previous);
                        }
                        (Err(Rejection::NoArtifact), None) => {}
                        (other, prev) => prop_assert!(false, "refine {:?} with previous {:?}", other, prev),
                    }
                    prop_assert_eq!(c.turns(), &turns_before[..]);
                }
            }

            // Sequence numbers strictly increase and are never reused
            for turn in c.turns() {
                if turns_before.iter().any(|t| t.sequence == turn.sequence) {
                    continue;
                }
                if let Some(last) = last_sequence {
                    prop_assert!(turn.sequence > last, "sequence {} reused after {}", turn.sequence, last);
                }
                last_sequence = Some(turn.sequence);
            }
            for pair in c.turns().windows(2) {
                prop_assert!(pair[0].sequence < pair[1].sequence);
            }

            // At most one outstanding request, and it is the newest one
            if let Some(pending) = c.state().pending_request() {
                prop_assert_eq!(issued.last().copied(), Some(pending));
                prop_assert!(!suppressed.contains(&pending));
            }
        }
    }

    #[test]
    fn prop_late_results_never_reach_history(
        prompt in "[a-z]{1,10}",
        reply in "[a-z]{12,20}",
        cancel in any::<bool>(),
    ) {
        let mut c = ExchangeController::new();
        let sub = c.submit(&prompt).unwrap();
        if cancel {
            c.cancel().unwrap();
        } else {
            c.pause().unwrap();
        }
        let before = c.turns().to_vec();

        let res = c.on_generation_result(sub.request, Ok(GeneratedArtifact::text(reply.clone())));
        prop_assert_eq!(res, Resolution::Discarded);
        prop_assert_eq!(c.turns(), &before[..]);
        prop_assert!(c.turns().iter().all(|t| t.content != reply));
        prop_assert!(c.current_artifact().is_none());
    }

    #[test]
    fn prop_refine_preserves_kind(
        text in proptest::option::of(".{0,80}"),
        tags in proptest::collection::vec(arb_tag(), 0..6),
    ) {
        let mut artifact = match text {
            Some(text) => GeneratedArtifact::text(text),
            None => GeneratedArtifact::new(parley_ai::Payload::Video { url: "https://cdn/v.mp4".into() }),
        };
        let original = artifact.clone();

        for (i, tag) in tags.iter().enumerate() {
            let next = refine(&artifact, *tag);
            prop_assert_eq!(next.revision as usize, i + 1);
            prop_assert_eq!(next.kind(), original.kind());
            artifact = next;
        }
    }
}
