//! Biometric Gateway Abstraction
//!
//! Thin boundary over the platform authenticator (Face ID / fingerprint /
//! WebAuthn platform authenticator). The capability is optional: web and
//! sensorless devices plug in [`UnsupportedBiometrics`].

use thiserror::Error;

/// Biometric verification errors
#[derive(Debug, Clone, Error)]
pub enum BiometricError {
    /// Platform lacks the capability or OS-level permission was denied
    #[error("Biometric authentication is not available on this device")]
    Unavailable,

    /// The platform check ran and rejected the user
    #[error("Biometric authentication was rejected")]
    Rejected,

    /// The platform call itself failed
    #[error("Biometric check failed: {0}")]
    Failed(String),
}

/// Trait for platform biometric backends
#[trait_variant::make(BiometricGateway: Send)]
pub trait LocalBiometricGateway {
    /// Whether the platform can perform a biometric check right now
    async fn is_available(&self) -> bool;

    /// Run the platform check
    ///
    /// `reason` is shown in the OS prompt where the platform supports it.
    async fn verify(&self, reason: &str) -> Result<(), BiometricError>;
}

/// Gateway for platforms without biometric support
///
/// `verify` always fails with [`BiometricError::Unavailable`]; callers
/// are expected to consult `is_available` before offering the method.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedBiometrics;

impl BiometricGateway for UnsupportedBiometrics {
    async fn is_available(&self) -> bool {
        false
    }

    async fn verify(&self, _reason: &str) -> Result<(), BiometricError> {
        Err(BiometricError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::{BiometricError, BiometricGateway, UnsupportedBiometrics};

    #[tokio::test]
    async fn test_unsupported_gateway() {
        let gateway = UnsupportedBiometrics;
        assert!(!gateway.is_available().await);
        assert!(matches!(
            gateway.verify("unlock").await,
            Err(BiometricError::Unavailable)
        ));
    }
}
