//! Device capture source abstraction
//!
//! A frame source stands in for the camera/media device. Acquisition errors
//! are terminal for the current capture attempt, never for the session.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{Error, Result};

/// A raw frame delivered by a capture device
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub bytes: Vec<u8>,
    /// Origin of the frame (file name, device id) for log messages
    pub source: String,
}

/// Abstracts the camera/media device
#[async_trait]
pub trait FrameSource: Send {
    /// Acquire the next raw frame, or a device error when none is available
    async fn acquire_frame(&mut self) -> Result<RawFrame>;
}

const FRAME_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Frame source backed by a directory of image files, ordered by file name
#[derive(Debug)]
pub struct DirectoryFrameSource {
    files: VecDeque<PathBuf>,
}

impl DirectoryFrameSource {
    pub fn new(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::Device(format!("not a directory: {}", dir.display())));
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| Error::Device(format!("cannot read {}: {}", dir.display(), e)))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                        .unwrap_or(false)
            })
            .collect();
        files.sort();

        tracing::debug!(dir = %dir.display(), frames = files.len(), "Frame directory scanned");
        Ok(Self {
            files: files.into(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

#[async_trait]
impl FrameSource for DirectoryFrameSource {
    async fn acquire_frame(&mut self) -> Result<RawFrame> {
        let path = self
            .files
            .pop_front()
            .ok_or_else(|| Error::Device("no frames remaining".to_string()))?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| Error::Device(format!("failed to read {}: {}", path.display(), e)))?;

        let source = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("frame")
            .to_string();

        tracing::debug!(source = %source, size = bytes.len(), "Acquired frame");
        Ok(RawFrame { bytes, source })
    }
}
