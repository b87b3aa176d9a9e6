//! Lock Error Types
//!
//! This module provides lock-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use std::time::Duration;

use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::biometric::BiometricError;
use platform::keyvalue::StoreError;
use thiserror::Error;

/// Lock-specific result type alias
pub type LockResult<T> = Result<T, LockError>;

/// Lock-specific error variants
#[derive(Debug, Error)]
pub enum LockError {
    /// PIN mismatch, wrong password, or biometric rejection
    #[error("Invalid credential")]
    InvalidCredential,

    /// Challenge refused: too many consecutive failures
    #[error("Too many failed attempts; retry in {}s", retry_in.as_secs())]
    LockedOut {
        /// Remaining cooldown
        retry_in: Duration,
    },

    /// Another verification attempt is already in flight
    #[error("A verification attempt is already in progress")]
    AttemptInProgress,

    /// Operation requires an authenticated session
    #[error("No authenticated session")]
    NotAuthenticated,

    /// PIN challenge requested but no PIN record exists
    #[error("No PIN is configured")]
    PinNotConfigured,

    /// Platform lacks biometric capability or permission was denied
    #[error("Biometric authentication is not available")]
    BiometricUnavailable,

    /// Input validation error
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Remote profile/auth service unreachable or failing
    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(String),

    /// Device store unreadable/unwritable
    #[error("Device storage error: {0}")]
    LocalStorage(#[from] StoreError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LockError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LockError::InvalidCredential | LockError::NotAuthenticated => ErrorKind::Unauthorized,
            LockError::LockedOut { .. } => ErrorKind::RateLimited,
            LockError::AttemptInProgress => ErrorKind::Conflict,
            LockError::PinNotConfigured => ErrorKind::NotFound,
            LockError::BiometricUnavailable | LockError::RemoteUnavailable(_) => {
                ErrorKind::Unavailable
            }
            LockError::Validation(_) => ErrorKind::InvalidInput,
            LockError::LocalStorage(_) => ErrorKind::Storage,
            LockError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert to a user-visible notice at the component boundary
    ///
    /// Logs the error, then produces the `AppError` the UI renders. No
    /// lock error propagates past the gate as anything else.
    pub fn into_notice(self) -> AppError {
        self.log();

        match self {
            LockError::InvalidCredential => {
                AppError::unauthorized("Invalid credential").with_action("Please try again")
            }
            LockError::LockedOut { retry_in } => {
                AppError::rate_limited("Too many failed attempts").with_action(format!(
                    "Try again in {} seconds",
                    retry_in.as_secs().max(1)
                ))
            }
            LockError::AttemptInProgress => {
                AppError::conflict("A verification attempt is already in progress")
            }
            LockError::NotAuthenticated => AppError::unauthorized("Sign in required"),
            LockError::PinNotConfigured => AppError::not_found("No PIN is set up")
                .with_action("Set up a PIN from security settings"),
            LockError::BiometricUnavailable => {
                AppError::unavailable("Biometric authentication is not available")
                    .with_action("Choose another unlock method in security settings")
            }
            LockError::Validation(msg) => AppError::invalid_input(msg),
            LockError::RemoteUnavailable(_) => AppError::unavailable("Could not reach the server")
                .with_action("Check your connection and try again"),
            LockError::LocalStorage(e) => {
                AppError::storage("Device storage is unavailable").with_source(e)
            }
            LockError::Internal(msg) => AppError::internal(msg),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            LockError::InvalidCredential => {
                tracing::warn!("Failed unlock attempt");
            }
            LockError::LockedOut { retry_in } => {
                tracing::warn!(retry_in_secs = retry_in.as_secs(), "Unlock challenge throttled");
            }
            LockError::RemoteUnavailable(msg) => {
                tracing::warn!(message = %msg, "Remote service unavailable");
            }
            LockError::LocalStorage(e) => {
                tracing::error!(error = %e, "Device storage error");
            }
            LockError::Internal(msg) => {
                tracing::error!(message = %msg, "Lock internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Lock error");
            }
        }
    }
}

impl From<AppError> for LockError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::InvalidInput => LockError::Validation(err.message().to_string()),
            _ => LockError::Internal(err.to_string()),
        }
    }
}

impl From<BiometricError> for LockError {
    fn from(err: BiometricError) -> Self {
        match err {
            BiometricError::Unavailable => LockError::BiometricUnavailable,
            BiometricError::Rejected => LockError::InvalidCredential,
            BiometricError::Failed(msg) => LockError::Internal(msg),
        }
    }
}

impl From<reqwest::Error> for LockError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LockError::RemoteUnavailable("request timed out".to_string())
        } else {
            LockError::RemoteUnavailable(err.to_string())
        }
    }
}
