//! Application Layer
//!
//! Use cases and application services.

pub mod check_gate;
pub mod config;
pub mod disable_lock;
pub mod enable_lock;
pub mod idle;
pub mod session;
pub mod unlock;
pub mod update_auto_lock;

// Re-exports
pub use check_gate::{CheckGateUseCase, RouteCheck};
pub use config::{LockConfig, SettingsBus};
pub use disable_lock::DisableLockUseCase;
pub use enable_lock::{EnableLockInput, EnableLockUseCase};
pub use idle::{IdleCallback, IdleMonitor};
pub use session::{GatePhase, LockSession};
pub use unlock::UnlockUseCase;
pub use update_auto_lock::UpdateAutoLockUseCase;
