//! Effect interpreter trait.
//!
//! The trait-based design lets the workflow run against the real backend or a
//! recording mock in tests.

use std::future::Future;

use crate::api::ApiError;
use crate::types::AccessToken;

use super::api::{ApiEffect, ApiResponse};

/// Executes API effects against the backend.
///
/// Implementations are constructed with a base URL, so every effect executed through a
/// single interpreter instance targets the same backend. The bearer token is supplied
/// per call because it belongs to the current session, not to the interpreter.
///
/// Implementations must refuse an effect that [requires auth](ApiEffect::requires_auth)
/// when `token` is `None`, with an [`ApiErrorKind::Auth`](crate::api::ApiErrorKind::Auth)
/// error and without sending anything.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct CannedApi {
///     candidates: Vec<Identity>,
/// }
///
/// impl ApiInterpreter for CannedApi {
///     async fn interpret(
///         &self,
///         effect: ApiEffect,
///         _token: Option<AccessToken>,
///     ) -> Result<ApiResponse, ApiError> {
///         match effect {
///             ApiEffect::SearchMembers { .. } => Ok(ApiResponse::Candidates(self.candidates.clone())),
///             other => Err(ApiError::network(format!("unexpected effect: {:?}", other))),
///         }
///     }
/// }
/// ```
pub trait ApiInterpreter: Send + Sync {
    /// Execute an API effect and return its response.
    fn interpret(
        &self,
        effect: ApiEffect,
        token: Option<AccessToken>,
    ) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send;
}
