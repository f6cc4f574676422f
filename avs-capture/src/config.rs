//! Capture configuration
//!
//! TOML-backed with compiled defaults for every field; a missing config file
//! is not an error.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::category::{default_categories, CategoryCatalog, CategoryConfig};
use crate::checker::AcceptanceLimits;
use crate::error::Result;

/// Capture core configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Acceptance limits applied to every captured image
    pub limits: AcceptanceLimits,
    /// Category catalog; step order is capture order
    pub categories: Vec<CategoryConfig>,
    /// Base URL of the remote verification API (`None` ⇒ offline mode)
    pub api_base_url: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            limits: AcceptanceLimits::default(),
            categories: default_categories(),
            api_base_url: None,
        }
    }
}

impl CaptureConfig {
    /// Load configuration from the resolved path (CLI arg → `AVS_CONFIG`
    /// env var → platform config dir), falling back to defaults when no
    /// config file exists.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        match avs_common::config::resolve_config_path(cli_path) {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration");
                Ok(avs_common::config::read_toml(&path)?)
            }
            None => {
                debug!("No configuration file found; using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Build the validated category catalog from the configured entries
    pub fn catalog(&self) -> Result<CategoryCatalog> {
        CategoryCatalog::new(&self.categories)
    }
}
