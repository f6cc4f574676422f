//! Submission bundle assembly
//!
//! Packages the accepted images of a completed session, preserving capture
//! order. Images were already validated at capture time and are not
//! re-validated here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::StepDefinition;
use crate::checker::ImageKind;
use crate::digest::Fingerprint;
use crate::error::{Error, Result};
use crate::session::CapturedImage;

/// One accepted image in the bundle.
///
/// Raw bytes ride along for the sink but are excluded from the serialized
/// manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleImage {
    pub step: u32,
    pub label: String,
    pub fingerprint: Fingerprint,
    pub byte_size: u64,
    pub format: ImageKind,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// The finished, ordered set of accepted images plus metadata, handed to
/// the submission sink exactly once per completed session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionBundle {
    pub bundle_id: Uuid,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub images: Vec<BundleImage>,
}

/// Package accepted images into a submission bundle.
///
/// Requires exactly one accepted image per step. The session state machine
/// makes a violation unreachable, so it surfaces as a session-usage error
/// rather than an operator error.
pub fn assemble(
    category: &str,
    steps: &[StepDefinition],
    accepted: &[CapturedImage],
) -> Result<SubmissionBundle> {
    if accepted.len() != steps.len() {
        return Err(Error::Session(format!(
            "bundle requires {} images, session holds {}",
            steps.len(),
            accepted.len()
        )));
    }

    let images = accepted
        .iter()
        .map(|img| BundleImage {
            step: img.step_index,
            label: img.label.clone(),
            fingerprint: img.fingerprint.clone(),
            byte_size: img.byte_size,
            format: img.format,
            bytes: img.bytes.clone(),
        })
        .collect();

    Ok(SubmissionBundle {
        bundle_id: Uuid::new_v4(),
        category: category.to_string(),
        created_at: Utc::now(),
        images,
    })
}
