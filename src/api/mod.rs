//! Backend API client and effect interpreter.
//!
//! This module provides the implementation for executing API effects over HTTP with
//! reqwest. It implements the `ApiInterpreter` trait defined in the effects module.
//!
//! Key features:
//! - Errors classified into the five user-facing kinds
//! - Bearer-token short-circuit before any authenticated request
//! - No automatic retries

mod client;
mod error;
mod interpreter;

pub use client::ApiClient;
pub use error::{ApiError, ApiErrorKind, classify_status};
pub use interpreter::interpret_api_effect;
