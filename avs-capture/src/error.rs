//! Error types for avs-capture
//!
//! Every rejection path returns control to the same pre-transition session
//! state with a reason attached; no error advances the state machine.

use thiserror::Error;

use crate::checker::RejectReason;
use crate::digest::Fingerprint;

/// Result type for capture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Capture pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Acceptance check failed; recovered locally, operator retakes
    #[error("image rejected: {0}")]
    Validation(RejectReason),

    /// Fingerprint matches an already-accepted image; operator retakes
    #[error("duplicate image: fingerprint {fingerprint} already accepted at step {step}")]
    Duplicate { fingerprint: Fingerprint, step: u32 },

    /// Camera/device failure; terminal for the attempt, not the session
    #[error("device error: {0}")]
    Device(String),

    /// Unknown category; fatal before any session exists
    #[error("unknown category: {0}")]
    Category(String),

    /// Submission hand-off failed; retryable from ReadyForSubmission
    #[error("submission failed: {0}")]
    Sink(String),

    /// Input could not be recognized as image content
    #[error("digest error: {0}")]
    Digest(String),

    /// Token validation failed or returned a negative result
    #[error("token validation failed: {0}")]
    Token(String),

    /// Operation not valid in the current session state (programming error
    /// in the caller, never an operator error)
    #[error("invalid session operation: {0}")]
    Session(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// avs-common error
    #[error("Common error: {0}")]
    Common(#[from] avs_common::Error),
}
