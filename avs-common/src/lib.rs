//! # AVS Common Library
//!
//! Shared code for AVS (authenticity verification scanner) components:
//! - Common error type
//! - Configuration file resolution and TOML loading

pub mod config;
pub mod error;

pub use error::{Error, Result};
