//! Capture session integration tests
//!
//! End-to-end scenarios across the state machine, acceptance checker,
//! digest engine and bundle assembler.

mod helpers;

use std::sync::Mutex;

use async_trait::async_trait;

use avs_capture::bundle::SubmissionBundle;
use avs_capture::category::CategoryCatalog;
use avs_capture::checker::{AcceptanceLimits, RejectReason};
use avs_capture::frame::RawFrame;
use avs_capture::sink::SubmissionSink;
use avs_capture::token::StaticTokenValidator;
use avs_capture::{CaptureSession, Error, SessionState};
use helpers::{frame, noise_png};

/// Sink that records bundles and fails the first `fail_count` submissions
struct MockSink {
    fail_remaining: Mutex<u32>,
    submitted: Mutex<Vec<SubmissionBundle>>,
}

impl MockSink {
    fn new(fail_count: u32) -> Self {
        Self {
            fail_remaining: Mutex::new(fail_count),
            submitted: Mutex::new(Vec::new()),
        }
    }

    fn submitted(&self) -> Vec<SubmissionBundle> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionSink for MockSink {
    async fn submit(&self, bundle: &SubmissionBundle) -> avs_capture::Result<()> {
        let mut remaining = self.fail_remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(Error::Sink("upstream unavailable".to_string()));
        }
        self.submitted.lock().unwrap().push(bundle.clone());
        Ok(())
    }
}

async fn shoes_session() -> CaptureSession {
    CaptureSession::start(
        "shoes",
        &CategoryCatalog::default(),
        AcceptanceLimits::default(),
        "token-1",
        &StaticTokenValidator::always_valid(),
    )
    .await
    .unwrap()
}

/// Capture and confirm one step
async fn accept(session: &mut CaptureSession, seed: u64) {
    session.capture(frame(seed)).await.unwrap();
    session.advance().unwrap();
}

#[tokio::test]
async fn scenario_a_full_run_reaches_submitted() {
    let mut session = shoes_session().await;

    for seed in 1..=6 {
        // Invariant: accepted count tracks the current step exactly
        assert_eq!(session.accepted().len() as u32, session.current_step() - 1);
        accept(&mut session, seed).await;
    }

    assert_eq!(session.state(), SessionState::ReadyForSubmission);
    assert!(session.is_complete());
    assert_eq!(session.current_step(), 7);

    let sink = MockSink::new(0);
    let bundle = session.submit(&sink).await.unwrap();
    assert_eq!(session.state(), SessionState::Submitted);

    let received = sink.submitted();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].bundle_id, bundle.bundle_id);
    assert_eq!(received[0].category, "shoes");

    // Bundle step labels and order match the category definition
    let labels: Vec<&str> = received[0]
        .images
        .iter()
        .map(|i| i.label.as_str())
        .collect();
    assert_eq!(
        labels,
        vec!["Outer side", "Inner side", "Sole", "Insole", "Size tag", "Box label"]
    );
    let steps: Vec<u32> = received[0].images.iter().map(|i| i.step).collect();
    assert_eq!(steps, vec![1, 2, 3, 4, 5, 6]);

    // Fingerprints pairwise distinct
    for i in 0..received[0].images.len() {
        for j in 0..i {
            assert_ne!(
                received[0].images[i].fingerprint,
                received[0].images[j].fingerprint
            );
        }
    }
}

#[tokio::test]
async fn scenario_b_duplicate_rejected_at_step_two() {
    let mut session = shoes_session().await;
    accept(&mut session, 1).await;
    assert_eq!(session.state(), SessionState::AwaitingCapture(2));

    // Identical bytes at step 2
    let err = session.capture(frame(1)).await.unwrap_err();
    assert!(matches!(err, Error::Duplicate { step: 1, .. }));

    // Session unchanged
    assert_eq!(session.state(), SessionState::AwaitingCapture(2));
    assert_eq!(session.accepted().len(), 1);
}

#[tokio::test]
async fn scenario_c_retake_discards_pending() {
    let mut session = shoes_session().await;

    session.capture(frame(1)).await.unwrap();
    assert_eq!(session.state(), SessionState::Previewing(1));
    assert!(session.pending().is_some());

    session.retake().unwrap();
    assert_eq!(session.state(), SessionState::AwaitingCapture(1));
    assert!(session.accepted().is_empty());
    assert!(session.pending().is_none());
}

#[tokio::test]
async fn scenario_d_bogus_category_fails_before_session() {
    let result = CaptureSession::start(
        "bogus",
        &CategoryCatalog::default(),
        AcceptanceLimits::default(),
        "token-1",
        &StaticTokenValidator::always_valid(),
    )
    .await;
    assert!(matches!(result, Err(Error::Category(name)) if name == "bogus"));
}

#[tokio::test]
async fn scenario_e_sink_failure_keeps_session_ready() {
    let mut session = shoes_session().await;
    for seed in 1..=6 {
        accept(&mut session, seed).await;
    }

    let sink = MockSink::new(1);

    // First attempt fails; session state and images preserved
    let err = session.submit(&sink).await.unwrap_err();
    assert!(matches!(err, Error::Sink(_)));
    assert_eq!(session.state(), SessionState::ReadyForSubmission);
    assert_eq!(session.accepted().len(), 6);

    // Explicit retry succeeds
    session.submit(&sink).await.unwrap();
    assert_eq!(session.state(), SessionState::Submitted);
    assert_eq!(sink.submitted().len(), 1);

    // The bundle is handed off exactly once
    let err = session.submit(&sink).await.unwrap_err();
    assert!(matches!(err, Error::Session(_)));
    assert_eq!(sink.submitted().len(), 1);
}

#[tokio::test]
async fn category_reselection_is_idempotent() {
    let first = shoes_session().await;
    let second = shoes_session().await;

    assert_eq!(first.state(), second.state());
    assert_eq!(first.steps(), second.steps());
    assert!(second.accepted().is_empty());
    assert!(second.pending().is_none());
}

#[tokio::test]
async fn retake_steps_back_from_ready() {
    let mut session = shoes_session().await;
    for seed in 1..=6 {
        accept(&mut session, seed).await;
    }
    assert_eq!(session.state(), SessionState::ReadyForSubmission);

    session.retake().unwrap();
    assert_eq!(session.state(), SessionState::AwaitingCapture(6));
    assert_eq!(session.accepted().len(), 5);

    // Re-shoot the last step with a fresh image
    accept(&mut session, 99).await;
    assert_eq!(session.state(), SessionState::ReadyForSubmission);
    assert_eq!(session.accepted().len(), 6);
}

#[tokio::test]
async fn retake_steps_back_mid_sequence() {
    let mut session = shoes_session().await;
    accept(&mut session, 1).await;
    accept(&mut session, 2).await;
    assert_eq!(session.state(), SessionState::AwaitingCapture(3));

    session.retake().unwrap();
    assert_eq!(session.state(), SessionState::AwaitingCapture(2));
    assert_eq!(session.accepted().len(), 1);
    assert_eq!(session.accepted().len() as u32, session.current_step() - 1);
}

#[tokio::test]
async fn duplicate_check_ignores_pending_image() {
    let mut session = shoes_session().await;

    // A discarded preview must not count as an accepted fingerprint
    session.capture(frame(5)).await.unwrap();
    session.retake().unwrap();

    session.capture(frame(5)).await.unwrap();
    assert_eq!(session.state(), SessionState::Previewing(1));
}

#[tokio::test]
async fn low_resolution_frame_rejected() {
    let mut session = shoes_session().await;

    // 640x480 noise is well over the size floor but under both dimension
    // minimums
    let frame = RawFrame {
        bytes: noise_png(7, 640, 480),
        source: "small.png".to_string(),
    };
    let err = session.capture(frame).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(RejectReason::LowResolution)
    ));
    assert_eq!(session.state(), SessionState::AwaitingCapture(1));
}

#[tokio::test]
async fn undersized_frame_rejected_as_too_small() {
    let mut session = shoes_session().await;

    let frame = RawFrame {
        bytes: noise_png(7, 50, 50),
        source: "tiny.png".to_string(),
    };
    let err = session.capture(frame).await.unwrap_err();
    assert!(matches!(err, Error::Validation(RejectReason::TooSmall)));
    assert_eq!(session.state(), SessionState::AwaitingCapture(1));
}

#[tokio::test]
async fn garbage_frame_rejected_as_bad_format() {
    let mut session = shoes_session().await;

    // Large enough to pass the size rule, but not an image at all
    let frame = RawFrame {
        bytes: vec![0u8; 600 * 1024],
        source: "garbage.bin".to_string(),
    };
    let err = session.capture(frame).await.unwrap_err();
    assert!(matches!(err, Error::Validation(RejectReason::BadFormat)));
    assert_eq!(session.state(), SessionState::AwaitingCapture(1));
}
