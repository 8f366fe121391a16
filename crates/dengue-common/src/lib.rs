//! Dengue Pipeline Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the dengue pipeline workspace members.
//!
//! # Overview
//!
//! This crate provides common functionality used by the pipeline crates:
//!
//! - **Error Handling**: The pipeline error taxonomy and result alias
//! - **Logging**: Structured logging configuration and initialization
//! - **Checksums**: Payload digest utilities for download provenance
//!
//! # Example
//!
//! ```no_run
//! use dengue_common::{EtlError, Result};
//! use dengue_common::checksum::sha256_hex;
//!
//! fn describe_payload(data: &[u8]) -> Result<String> {
//!     if data.is_empty() {
//!         return Err(EtlError::Parse("empty payload".to_string()));
//!     }
//!     Ok(sha256_hex(data))
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{EtlError, Result};
