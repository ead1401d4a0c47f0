//! Logging utilities.
//!
//! The crate logs through the `log` facade only (rate-limited capacity
//! warnings, one-time diagnostics). This module provides an optional
//! `env_logger` initializer for binaries that do not bring their own backend.

mod init;

pub use init::{LoggingConfig, init_logging};
