//! Provisioning of the project secret key.
//!
//! The key is looked up in order:
//! 1. `ONILOCK_SECRET_KEY` env var (base64, 32 bytes)
//! 2. OS keyring (if compiled with `keyring-store` feature); a key is
//!    generated and stored there on first use
//!
//! The vault core never generates or persists the key itself.

use crate::crypto::SecretKey;
use crate::errors::Result;

/// Environment variable holding the base64 project secret key.
pub const SECRET_KEY_ENV: &str = "ONILOCK_SECRET_KEY";

/// Resolve the project secret key from the environment or keyring.
pub fn resolve_secret_key() -> Result<SecretKey> {
    if let Ok(encoded) = std::env::var(SECRET_KEY_ENV) {
        if !encoded.trim().is_empty() {
            tracing::debug!("using secret key from {SECRET_KEY_ENV}");
            return SecretKey::from_base64(&encoded);
        }
    }

    #[cfg(feature = "keyring-store")]
    return keyring_key();

    #[cfg(not(feature = "keyring-store"))]
    Err(crate::errors::OniLockError::ConfigError(format!(
        "no secret key available: set {SECRET_KEY_ENV} (generate one with `onilock keygen`)"
    )))
}

/// Read the key from the OS keyring, creating it on first use.
#[cfg(feature = "keyring-store")]
fn keyring_key() -> Result<SecretKey> {
    if let Some(encoded) = crate::keyring::get_key()? {
        tracing::debug!("using secret key from OS keyring");
        return SecretKey::from_base64(&encoded);
    }

    let key = SecretKey::generate();
    crate::keyring::store_key(&key.to_base64())?;
    tracing::info!("generated a new secret key and stored it in the OS keyring");
    Ok(key)
}
