//! Effects-as-data for backend calls and application-root signals.
//!
//! Pure logic (session transitions, workflow steps) returns effects instead of
//! performing I/O. This keeps the state machines testable without a backend and makes
//! every intended operation visible in logs.

use serde::{Deserialize, Serialize};

pub mod api;
pub mod interpreter;

pub use api::{ApiEffect, ApiResponse};
pub use interpreter::ApiInterpreter;

/// A view the application root should navigate to. Navigation itself is external.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    /// The landing view, shown after sign-out.
    Root,
    /// A tournament's public page, shown after registration completes.
    Tournament { slug: String },
}

impl Route {
    /// Path of the route in the web client.
    pub fn path(&self) -> String {
        match self {
            Route::Root => "/".to_string(),
            Route::Tournament { slug } => format!("/tournaments/{}", slug),
        }
    }
}

/// A unified effect type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect_type", rename_all = "snake_case")]
pub enum Effect {
    /// A backend call, authenticated with the current session's token.
    Api(ApiEffect),
    /// Ask the application root to navigate.
    Navigate(Route),
    /// The signed-in user has no profile yet and should be asked to complete one.
    PromptProfileSetup,
}
