//! Lock Gate Controller
//!
//! Backs the full-screen challenge view. Three variants selected by the
//! active lock method:
//! - PIN: collects exactly six digits on a keypad and auto-submits on
//!   the sixth; mismatch clears the entry
//! - Biometric: runs the platform check immediately on mount
//! - Password: submits the field through a full sign-in attempt
//!
//! Every outcome is a [`GateEvent`]; errors arrive as ready-to-render
//! notices, never as panics or raw errors.

use std::sync::{Arc, Mutex};

use kernel::error::app_error::AppError;
use platform::biometric::BiometricGateway;
use platform::pin::PIN_LENGTH;

use crate::application::unlock::UnlockUseCase;
use crate::domain::repository::{
    AuthGateway, LockPreferenceRepository, ProfileRepository, SessionFlagRepository,
};
use crate::domain::value_object::{lock_method::LockMethod, pin_code::RawPin};
use crate::error::{LockError, LockResult};

/// Gate outcome handed to the view layer
#[derive(Debug)]
pub enum GateEvent {
    /// Digits accepted so far (PIN variant)
    Digits(usize),
    /// Verification succeeded; the gate should dismiss
    Unlocked,
    /// Verification failed or was refused; entry is cleared
    Notice(AppError),
    /// Another verification is in flight; ignore this trigger
    Busy,
}

/// Lock gate controller
pub struct LockGate<P, L, F, A, B>
where
    P: ProfileRepository,
    L: LockPreferenceRepository,
    F: SessionFlagRepository,
    A: AuthGateway,
    B: BiometricGateway,
{
    unlock: Arc<UnlockUseCase<P, L, F, A, B>>,
    method: LockMethod,
    pin_buffer: Mutex<String>,
}

impl<P, L, F, A, B> LockGate<P, L, F, A, B>
where
    P: ProfileRepository,
    L: LockPreferenceRepository,
    F: SessionFlagRepository,
    A: AuthGateway,
    B: BiometricGateway,
{
    /// Create the gate for a challenge
    ///
    /// Invariant: the gate never renders with `method = none`.
    pub fn new(method: LockMethod, unlock: Arc<UnlockUseCase<P, L, F, A, B>>) -> LockResult<Self> {
        if !method.is_configured() {
            return Err(LockError::Internal(
                "Gate requested without a lock method".to_string(),
            ));
        }

        Ok(Self {
            unlock,
            method,
            pin_buffer: Mutex::new(String::new()),
        })
    }

    #[inline]
    pub fn method(&self) -> LockMethod {
        self.method
    }

    /// Digits currently entered (PIN variant)
    pub fn digits_entered(&self) -> usize {
        self.pin_buffer.lock().expect("pin buffer poisoned").len()
    }

    /// Called when the view mounts
    ///
    /// The biometric variant triggers the platform check immediately; the
    /// other variants just report an empty entry.
    pub async fn mounted(&self) -> GateEvent {
        match self.method {
            LockMethod::Biometric => self.attempt_biometric().await,
            _ => GateEvent::Digits(0),
        }
    }

    /// Keypad input; auto-submits on the sixth digit
    pub async fn press_digit(&self, digit: char) -> GateEvent {
        if self.method != LockMethod::Pin || !digit.is_ascii_digit() {
            return GateEvent::Digits(self.digits_entered());
        }

        let entry = {
            let mut buffer = self.pin_buffer.lock().expect("pin buffer poisoned");
            if buffer.len() >= PIN_LENGTH {
                return GateEvent::Digits(buffer.len());
            }
            buffer.push(digit);
            if buffer.len() < PIN_LENGTH {
                return GateEvent::Digits(buffer.len());
            }
            // Sixth digit: take the entry, leaving the buffer cleared for
            // the next attempt whatever the outcome
            std::mem::take(&mut *buffer)
        };

        let pin = match RawPin::new(entry) {
            Ok(pin) => pin,
            Err(notice) => return GateEvent::Notice(notice),
        };

        Self::to_event(self.unlock.unlock_with_pin(pin).await)
    }

    /// Remove the last entered digit
    pub fn backspace(&self) -> GateEvent {
        let mut buffer = self.pin_buffer.lock().expect("pin buffer poisoned");
        buffer.pop();
        GateEvent::Digits(buffer.len())
    }

    /// Password field submit
    pub async fn submit_password(&self, password: &str) -> GateEvent {
        if password.is_empty() {
            return GateEvent::Notice(
                AppError::invalid_input("Password is required").with_action("Enter your password"),
            );
        }

        Self::to_event(self.unlock.unlock_with_password(password).await)
    }

    /// Run (or retry) the platform biometric check
    pub async fn attempt_biometric(&self) -> GateEvent {
        Self::to_event(self.unlock.unlock_with_biometric().await)
    }

    fn to_event(result: LockResult<()>) -> GateEvent {
        match result {
            Ok(()) => GateEvent::Unlocked,
            // A concurrent trigger lost the in-flight race; swallow it
            Err(LockError::AttemptInProgress) => GateEvent::Busy,
            Err(e) => GateEvent::Notice(e.into_notice()),
        }
    }
}
