//! The project secret key.
//!
//! One 32-byte key encrypts every entry secret and every vault locator
//! path. It is supplied from outside the vault core (environment or OS
//! keyring, see `crate::keystore`) and is never derived from a master
//! password.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{OniLockError, Result};

/// Length of the project secret key (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A wrapper around the 32-byte project key that automatically zeroes
/// its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SecretKey {
    bytes: [u8; KEY_LEN],
}

impl SecretKey {
    /// Create a new `SecretKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Generate a fresh random key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        let key = Self::new(bytes);
        bytes.zeroize();
        key
    }

    /// Parse a base64-encoded key (standard alphabet, padded).
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = Zeroizing::new(BASE64.decode(encoded.trim()).map_err(|e| {
            OniLockError::ConfigError(format!("project secret key is not valid base64: {e}"))
        })?);

        let bytes: [u8; KEY_LEN] = decoded.as_slice().try_into().map_err(|_| {
            OniLockError::ConfigError(format!(
                "project secret key must be exactly {KEY_LEN} bytes, got {}",
                decoded.len()
            ))
        })?;

        Ok(Self::new(bytes))
    }

    /// Render the key as base64, e.g. for storing it in a keyring.
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(BASE64.encode(self.bytes))
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_roundtrip() {
        let key = SecretKey::new([7u8; KEY_LEN]);
        let encoded = key.to_base64();
        let parsed = SecretKey::from_base64(&encoded).unwrap();
        assert_eq!(parsed.as_bytes(), key.as_bytes());
    }

    #[test]
    fn rejects_wrong_length() {
        let short = BASE64.encode([1u8; 16]);
        assert!(SecretKey::from_base64(&short).is_err());
    }

    #[test]
    fn generated_keys_differ() {
        let a = SecretKey::generate();
        let b = SecretKey::generate();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(SecretKey::from_base64("***").is_err());
    }

    #[test]
    fn debug_does_not_leak_bytes() {
        let key = SecretKey::new([0xAB; KEY_LEN]);
        let shown = format!("{key:?}");
        assert!(!shown.contains("171"));
        assert!(shown.contains("redacted"));
    }
}
