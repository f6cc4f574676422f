//! avs-capture — verification photo capture core
//!
//! Implements the capture-and-validation pipeline for authenticating
//! physical goods: a category selects a fixed ordered photo sequence, every
//! captured image must pass acceptance checks (size, resolution, format)
//! and exact-duplicate detection, and a completed session is assembled into
//! a submission bundle handed to a pluggable sink.
//!
//! External collaborators (token validation, submission persistence, the
//! capture device) are narrow traits in [`token`], [`sink`] and [`frame`];
//! the state machine itself has no dependency on any of their concrete
//! implementations.

pub mod bundle;
pub mod category;
pub mod checker;
pub mod config;
pub mod digest;
pub mod error;
pub mod frame;
pub mod session;
pub mod sink;
pub mod token;

pub use crate::error::{Error, Result};
pub use crate::session::{CaptureSession, CapturedImage, SessionState};
