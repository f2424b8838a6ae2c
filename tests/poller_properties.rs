//! Property-based tests for status classification and the task poller.
//!
//! Each poll runs on its own current-thread runtime with a zero interval, so
//! cases stay fast without a paused clock.

mod common;

use std::time::Duration;

use common::ScriptedSource;
use proptest::prelude::*;
use profiler_tester::status::{FAILURE_LABELS, PENDING_LABELS, SUCCESS_LABELS};
use profiler_tester::{ApiError, PollOutcome, PollPolicy, TaskPoller, TaskState, TaskStatusSnapshot};

// ─── Arbitrary Strategies ───────────────────────────────────────────────────

fn arb_success() -> impl Strategy<Value = &'static str> {
    prop::sample::select(SUCCESS_LABELS.to_vec())
}

fn arb_failure() -> impl Strategy<Value = &'static str> {
    prop::sample::select(FAILURE_LABELS.to_vec())
}

/// Labels that keep the poller waiting: known pending labels plus
/// unrecognised ones.
fn arb_non_terminal() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(PENDING_LABELS.to_vec()).prop_map(str::to_string),
        "[A-Z_]{3,12}".prop_filter("must not be a terminal label", |label| {
            !TaskState::classify(label).is_terminal()
        }),
    ]
}

/// Random ASCII casing of a label.
fn arb_casing(label: &'static str) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), label.len()).prop_map(move |upper| {
        label
            .chars()
            .zip(upper)
            .map(|(c, up)| {
                if up {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect::<String>()
    })
}

fn poll(source: &ScriptedSource, max_attempts: u32) -> PollOutcome {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let policy = PollPolicy::new(max_attempts, Duration::ZERO);
    runtime.block_on(TaskPoller::new(source, policy).poll("task-1"))
}

// ─── Classification ─────────────────────────────────────────────────────────

proptest! {
    /// Classification ignores ASCII case and surrounding whitespace.
    #[test]
    fn classification_is_case_insensitive(
        label in prop::sample::select(
            [SUCCESS_LABELS, FAILURE_LABELS, PENDING_LABELS].concat()
        ).prop_flat_map(arb_casing),
        pad in " {0,2}",
    ) {
        let padded = format!("{pad}{label}{pad}");
        prop_assert_eq!(
            TaskState::classify(&padded),
            TaskState::classify(&label.to_ascii_uppercase())
        );
    }

    /// Classifying the same label twice yields the same state.
    #[test]
    fn classification_is_idempotent(label in "\\PC{0,16}") {
        prop_assert_eq!(TaskState::classify(&label), TaskState::classify(&label));
    }

    /// Any status payload, including missing fields, classifies without panicking.
    #[test]
    fn arbitrary_status_payload_never_panics(raw in "\\PC{0,64}") {
        let body = serde_json::json!({ "status": raw, "taskId": "t" });
        let snapshot: TaskStatusSnapshot = serde_json::from_value(body).unwrap();
        let _ = snapshot.state();
    }
}

// ─── Poller Invariants ──────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A success label at position k within budget completes after k calls.
    #[test]
    fn success_at_k_completes_after_k_calls(
        pending in prop::collection::vec(arb_non_terminal(), 0..20),
        success in arb_success(),
        slack in 0u32..5,
    ) {
        let k = pending.len() as u32 + 1;
        let mut labels = pending;
        labels.push(success.to_string());
        let source = ScriptedSource::labels(&labels);

        let outcome = poll(&source, k + slack);

        prop_assert!(outcome.is_completed());
        prop_assert_eq!(outcome.attempts(), k);
        prop_assert_eq!(source.calls(), k as usize);
    }

    /// A failure label at position k within budget fails after exactly k calls.
    #[test]
    fn failure_at_k_fails_after_k_calls(
        pending in prop::collection::vec(arb_non_terminal(), 0..20),
        failure in arb_failure(),
        slack in 0u32..5,
    ) {
        let k = pending.len() as u32 + 1;
        let mut labels = pending;
        labels.push(failure.to_string());
        let source = ScriptedSource::labels(&labels);

        let outcome = poll(&source, k + slack);

        let is_failed = matches!(outcome, PollOutcome::Failed { .. });
        prop_assert!(is_failed);
        prop_assert_eq!(source.calls(), k as usize);
        prop_assert!(outcome.failure_reason().unwrap().contains(failure));
    }

    /// Without a terminal label in budget the poll times out after exactly
    /// `max_attempts` calls, even if a terminal label would follow.
    #[test]
    fn no_terminal_within_budget_times_out(
        max_attempts in 1u32..25,
        late in prop_oneof![arb_success(), arb_failure()],
        filler in arb_non_terminal(),
    ) {
        let mut labels = vec![filler.clone(); max_attempts as usize];
        labels.push(late.to_string());
        let source = ScriptedSource::labels(&labels);

        let outcome = poll(&source, max_attempts);

        prop_assert_eq!(
            outcome,
            PollOutcome::TimedOut {
                attempts: max_attempts,
                last_status: Some(filler),
            }
        );
        prop_assert_eq!(source.calls(), max_attempts as usize);
    }

    /// A transport error on attempt k stops the poll with no further calls.
    #[test]
    fn transport_error_at_k_stops_immediately(
        pending in prop::collection::vec(arb_non_terminal(), 0..10),
        slack in 0u32..5,
    ) {
        let k = pending.len() as u32 + 1;
        let mut replies: Vec<Result<TaskStatusSnapshot, ApiError>> = pending
            .into_iter()
            .map(|label| Ok(TaskStatusSnapshot::with_status(label)))
            .collect();
        replies.push(Err(ApiError::Timeout));
        replies.push(Ok(TaskStatusSnapshot::with_status("SUCCESS")));
        let source = ScriptedSource::new(replies);

        let outcome = poll(&source, k + slack);

        prop_assert!(!outcome.is_completed());
        prop_assert_eq!(outcome.attempts(), k);
        prop_assert_eq!(source.calls(), k as usize);
    }
}
