//! AES-256-GCM authenticated encryption keyed by the project secret key.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext. The whole blob is then base64-encoded
//! so it can live inside a JSON document.
//!
//! Layout of the decoded blob:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::Zeroize;

use super::keys::SecretKey;
use crate::errors::{OniLockError, Result};

/// Size of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
const TAG_LEN: usize = 16;

/// Symmetric cipher shared by entry secrets and vault locator paths.
///
/// The two payload kinds are independent; they only share the key.
pub struct Cipher {
    inner: Aes256Gcm,
}

impl Cipher {
    /// Build a cipher from the project secret key.
    pub fn new(key: &SecretKey) -> Self {
        Self {
            inner: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes())),
        }
    }

    /// Encrypt `plaintext` and return base64(nonce || ciphertext).
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .inner
            .encrypt(&nonce, plaintext)
            .map_err(|e| OniLockError::EncryptionFailed(format!("encryption error: {e}")))?;

        let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(output))
    }

    /// Decrypt a base64 blob produced by `encrypt`.
    ///
    /// Malformed base64, truncated input, a failed tag check and a
    /// mismatched key all surface as `DecryptionFailed`.
    pub fn decrypt(&self, ciphertext_b64: &str) -> Result<Vec<u8>> {
        let data = BASE64
            .decode(ciphertext_b64.trim())
            .map_err(|_| OniLockError::DecryptionFailed)?;

        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(OniLockError::DecryptionFailed);
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.inner
            .decrypt(nonce, ciphertext)
            .map_err(|_| OniLockError::DecryptionFailed)
    }

    /// Encrypt a UTF-8 string.
    pub fn encrypt_str(&self, plaintext: &str) -> Result<String> {
        self.encrypt(plaintext.as_bytes())
    }

    /// Decrypt into a UTF-8 string.
    ///
    /// Invalid UTF-8 is treated as a decryption failure; the bytes are
    /// wiped before the error is returned.
    pub fn decrypt_string(&self, ciphertext_b64: &str) -> Result<String> {
        let bytes = self.decrypt(ciphertext_b64)?;
        String::from_utf8(bytes).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            OniLockError::DecryptionFailed
        })
    }
}
