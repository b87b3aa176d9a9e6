//! Presentation Layer
//!
//! The gate controller, route guards, and lifecycle signal consumed by
//! the UI route tree.

pub mod gate;
pub mod guard;
pub mod lifecycle;

pub use gate::{GateEvent, LockGate};
pub use guard::{AppShellGate, AuthSnapshot, GateDecision, RouteGuard};
pub use lifecycle::{AppLifecycle, LifecycleEvent};
