//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, random bytes, Base64)
//! - PIN hashing (Argon2id, zeroized clear text)
//! - Device key-value storage (native file store / in-memory session store)
//! - Device identity (install-secret fingerprint)
//! - Biometric gateway abstraction
//! - Failed-attempt throttling

pub mod biometric;
pub mod crypto;
pub mod device;
pub mod keyvalue;
pub mod pin;
pub mod throttle;
