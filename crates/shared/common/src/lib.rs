//! Common utilities shared across service crates.
//!
//! This crate provides:
//! - Unified error handling for the HTTP surface
//! - Configuration structures
//! - Request/response and value-formatting helpers

pub mod config;
pub mod error;
pub mod util;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
