//! OS keyring integration for the project secret key.
//!
//! Stores and retrieves the base64 secret key from the operating
//! system's secure credential store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! All operations fail gracefully: if the keyring is unavailable, the
//! error is returned and the caller decides whether to fall back.

use crate::errors::{OniLockError, Result};

/// Service name used in the OS keyring.
const SERVICE_NAME: &str = "onilock";

/// Account name of the secret key entry.
const KEY_ENTRY: &str = "secret-key";

fn entry() -> Result<keyring::Entry> {
    keyring::Entry::new(SERVICE_NAME, KEY_ENTRY)
        .map_err(|e| OniLockError::KeyringError(format!("failed to create keyring entry: {e}")))
}

/// Store the base64 secret key in the OS keyring.
pub fn store_key(encoded: &str) -> Result<()> {
    entry()?.set_password(encoded).map_err(|e| {
        OniLockError::KeyringError(format!("failed to store key in keyring: {e}"))
    })
}

/// Retrieve the base64 secret key from the OS keyring.
///
/// Returns `None` if no key is stored (rather than an error).
pub fn get_key() -> Result<Option<String>> {
    match entry()?.get_password() {
        Ok(encoded) => Ok(Some(encoded)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(OniLockError::KeyringError(format!(
            "failed to read from keyring: {e}"
        ))),
    }
}
