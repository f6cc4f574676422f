//! Capture session state machine
//!
//! One session owns one operator's capture run: the ordered steps of the
//! selected category, the images accepted so far, and the current position.
//! Each step cycles AwaitingCapture → Previewing → (advance), the last
//! advance reaches ReadyForSubmission, and a successful submit terminates in
//! Submitted.
//!
//! Invariants held at every observable state:
//! - `accepted.len() == current_step - 1` (no gaps, no step skipped)
//! - accepted fingerprints are pairwise distinct
//! - the step position moves by exactly ±1 per accepted image / retake

use serde::{Deserialize, Serialize};

use crate::bundle::{assemble, SubmissionBundle};
use crate::category::{CategoryCatalog, StepDefinition};
use crate::checker::{probe, AcceptanceLimits, ImageKind, RejectReason};
use crate::digest::{fingerprint, Fingerprint};
use crate::error::{Error, Result};
use crate::frame::RawFrame;
use crate::sink::SubmissionSink;
use crate::token::TokenValidator;

/// Session state. Step indices are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for the operator to capture the given step
    AwaitingCapture(u32),
    /// A candidate for the given step passed all checks and awaits
    /// operator confirmation or retake
    Previewing(u32),
    /// All steps captured; submission permitted
    ReadyForSubmission,
    /// Bundle handed to the sink (terminal)
    Submitted,
}

/// A validated, fingerprinted image owned exclusively by the session until
/// it is bundled
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub step_index: u32,
    pub label: String,
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
    pub format: ImageKind,
    pub fingerprint: Fingerprint,
    pub bytes: Vec<u8>,
}

/// Step-sequencing state machine for one capture run.
///
/// Single-threaded cooperative: every transition takes `&mut self` and runs
/// to completion, so no two transitions can interleave on the same session.
pub struct CaptureSession {
    category: String,
    steps: Vec<StepDefinition>,
    limits: AcceptanceLimits,
    accepted: Vec<CapturedImage>,
    /// `Some` iff `state` is `Previewing`
    pending: Option<CapturedImage>,
    state: SessionState,
}

impl CaptureSession {
    /// Start a session for a category.
    ///
    /// The token gate runs first: a session is created only after a positive
    /// validation result. Category resolution follows; an unknown category
    /// fails before any session state exists.
    pub async fn start(
        category: &str,
        catalog: &CategoryCatalog,
        limits: AcceptanceLimits,
        token: &str,
        validator: &dyn TokenValidator,
    ) -> Result<Self> {
        if !validator.validate(token).await? {
            return Err(Error::Token("token rejected by validator".to_string()));
        }

        let steps = catalog.steps(category)?.to_vec();
        tracing::info!(category, steps = steps.len(), "Capture session started");

        Ok(Self {
            category: category.to_string(),
            steps,
            limits,
            accepted: Vec::new(),
            pending: None,
            state: SessionState::AwaitingCapture(1),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    /// Images committed so far, in capture order
    pub fn accepted(&self) -> &[CapturedImage] {
        &self.accepted
    }

    /// The uncommitted preview image, present only while `Previewing`
    pub fn pending(&self) -> Option<&CapturedImage> {
        self.pending.as_ref()
    }

    /// 1-based index of the step being worked on; `N + 1` once complete
    pub fn current_step(&self) -> u32 {
        self.accepted.len() as u32 + 1
    }

    /// Label of the step awaiting capture or preview, `None` once complete
    pub fn current_label(&self) -> Option<&str> {
        self.steps
            .get(self.accepted.len())
            .map(|step| step.label.as_str())
    }

    pub fn is_complete(&self) -> bool {
        self.accepted.len() == self.steps.len()
    }

    /// Run a raw frame through the acceptance pipeline for the current step.
    ///
    /// Probe → acceptance check → fingerprint → duplicate check (against
    /// committed images only). Any rejection leaves the session state
    /// unchanged and surfaces the reason; success enters `Previewing`.
    ///
    /// Probing and hashing run on a blocking worker. The session is mutated
    /// only after the result arrives, so cancelling (dropping) a pending
    /// capture leaves the session in its prior state.
    pub async fn capture(&mut self, frame: RawFrame) -> Result<()> {
        let step = match self.state {
            SessionState::AwaitingCapture(i) => i,
            other => {
                return Err(Error::Session(format!(
                    "capture not permitted in state {:?}",
                    other
                )))
            }
        };

        let limits = self.limits;
        let RawFrame { bytes, source } = frame;

        let (candidate, fp, bytes) = tokio::task::spawn_blocking(move || {
            let candidate = probe(&bytes)?;
            limits.check(&candidate).map_err(Error::Validation)?;
            let fp = fingerprint(&bytes)?;
            Ok::<_, Error>((candidate, fp, bytes))
        })
        .await
        .map_err(|e| Error::Session(format!("capture task failed: {}", e)))?
        .map_err(|e| {
            tracing::warn!(step, source = %source, error = %e, "Capture rejected");
            e
        })?;

        if let Some(existing) = self.accepted.iter().find(|img| img.fingerprint == fp) {
            tracing::warn!(
                step,
                source = %source,
                duplicate_of = existing.step_index,
                "Duplicate image rejected"
            );
            return Err(Error::Duplicate {
                fingerprint: fp,
                step: existing.step_index,
            });
        }

        let format = match candidate.format {
            Some(kind) => kind,
            None => return Err(Error::Validation(RejectReason::BadFormat)),
        };
        let label = self.steps[(step - 1) as usize].label.clone();

        tracing::debug!(
            step,
            label = %label,
            source = %source,
            size = candidate.byte_size,
            width = candidate.width,
            height = candidate.height,
            fingerprint = %fp,
            "Image passed acceptance checks"
        );

        self.pending = Some(CapturedImage {
            step_index: step,
            label,
            byte_size: candidate.byte_size,
            width: candidate.width,
            height: candidate.height,
            format,
            fingerprint: fp,
            bytes,
        });
        self.state = SessionState::Previewing(step);

        Ok(())
    }

    /// Discard the pending preview, or step back to re-shoot the most
    /// recently accepted step.
    ///
    /// Retake at step 1 with nothing accepted is a no-op.
    pub fn retake(&mut self) -> Result<()> {
        match self.state {
            SessionState::Previewing(step) => {
                self.pending = None;
                self.state = SessionState::AwaitingCapture(step);
                tracing::debug!(step, "Pending image discarded");
                Ok(())
            }
            SessionState::AwaitingCapture(1) => Ok(()),
            SessionState::AwaitingCapture(step) => {
                self.accepted.pop();
                self.state = SessionState::AwaitingCapture(step - 1);
                tracing::debug!(step = step - 1, "Stepped back for retake");
                Ok(())
            }
            SessionState::ReadyForSubmission => {
                self.accepted.pop();
                let step = self.steps.len() as u32;
                self.state = SessionState::AwaitingCapture(step);
                tracing::debug!(step, "Stepped back from ready for retake");
                Ok(())
            }
            SessionState::Submitted => {
                Err(Error::Session("session already submitted".to_string()))
            }
        }
    }

    /// Commit the pending image and advance. The final step's commit
    /// reaches `ReadyForSubmission`.
    pub fn advance(&mut self) -> Result<()> {
        let step = match self.state {
            SessionState::Previewing(i) => i,
            other => {
                return Err(Error::Session(format!(
                    "advance not permitted in state {:?}",
                    other
                )))
            }
        };
        let image = self
            .pending
            .take()
            .ok_or_else(|| Error::Session("no pending image to commit".to_string()))?;

        self.accepted.push(image);

        if step as usize == self.steps.len() {
            self.state = SessionState::ReadyForSubmission;
            tracing::info!(category = %self.category, "All steps captured; ready for submission");
        } else {
            self.state = SessionState::AwaitingCapture(step + 1);
        }

        Ok(())
    }

    /// Assemble the bundle and hand it to the sink.
    ///
    /// Sink failure leaves the session in `ReadyForSubmission` with its
    /// images intact so the operator can retry explicitly; success reaches
    /// the terminal `Submitted` state and the bundle is never handed off
    /// again.
    pub async fn submit(&mut self, sink: &dyn SubmissionSink) -> Result<SubmissionBundle> {
        match self.state {
            SessionState::ReadyForSubmission => {}
            SessionState::Submitted => {
                return Err(Error::Session("session already submitted".to_string()))
            }
            other => {
                return Err(Error::Session(format!(
                    "submit not permitted in state {:?}",
                    other
                )))
            }
        }

        let bundle = assemble(&self.category, &self.steps, &self.accepted)?;

        match sink.submit(&bundle).await {
            Ok(()) => {
                self.state = SessionState::Submitted;
                tracing::info!(
                    bundle_id = %bundle.bundle_id,
                    category = %self.category,
                    images = bundle.images.len(),
                    "Submission accepted"
                );
                Ok(bundle)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Submission failed; session remains ready");
                Err(e)
            }
        }
    }
}
