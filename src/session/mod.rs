//! Session bootstrap: who is signed in, and whether they have a profile.
//!
//! The functional core lives in [`transitions`]; [`bootstrap`] is the imperative shell
//! that feeds it events and performs its effects.

pub mod bootstrap;
pub mod provider;
pub mod state;
pub mod store;
pub mod transitions;

pub use bootstrap::{BootstrapHandle, SessionBootstrap};
pub use provider::{IdentityProvider, StaticIdentityProvider};
pub use state::{NoProfileReason, ProfileState, SessionState, SessionStatus};
pub use store::SessionStore;
pub use transitions::{AuthChange, BootstrapEvent, BootstrapState, ProfileOutcome, apply};
