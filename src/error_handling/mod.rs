//! Error handling.
//!
//! This module provides:
//! - Check failures reported for misconfigured domains
//! - DNS and HTTP probe errors
//! - Initialization and configuration errors
//!
//! Check failures are categorized by [`FailureKind`], which gives every failure
//! a stable machine-readable name.

mod types;

// Re-export public API
pub use types::{
    CdnRangeError, CheckFailure, ConfigValidationError, DnsError, FailureKind,
    InitializationError, ProbeError,
};
