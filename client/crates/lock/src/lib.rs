//! Lock (App Lock & Session Gate) Client Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Device store and managed-backend implementations
//! - `presentation/` - Gate controller, route guards, lifecycle signal
//!
//! ## Features
//! - PIN / biometric / password app lock over the vault's protected routes
//! - Pre-login PIN verification against the device-cached hash
//! - Session-unlocked flag suppressing repeat prompts within a session
//! - Idle auto-lock with live reconfiguration over a settings broadcast
//! - Foreground/background handling that re-arms the gate
//!
//! ## Security Model
//! - PINs hashed with Argon2id; clear text zeroized in memory
//! - Remote profile record is the source of truth once authenticated;
//!   the device cache serves pre-login checks
//! - Consecutive failed attempts trip a temporary lockout
//! - Verification attempts are mutually exclusive (no double-fire)

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::LockConfig;
pub use error::{LockError, LockResult};
pub use infra::local::{DeviceStore, SessionFlags};
pub use presentation::guard::{AppShellGate, GateDecision, RouteGuard};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::lock_preference::*;
    pub use crate::domain::entity::lock_state::*;
    pub use crate::domain::repository::{AuthUser, LockProfile};
    pub use crate::domain::value_object::idle_timeout::*;
    pub use crate::domain::value_object::lock_method::*;
    pub use crate::domain::value_object::pin_code::*;
}

pub mod store {
    pub use crate::infra::local::DeviceStore as LockStore;
    pub use crate::infra::remote::{HttpAuthGateway, HttpProfileRepository};
}

pub mod gate {
    pub use crate::presentation::gate::*;
}
