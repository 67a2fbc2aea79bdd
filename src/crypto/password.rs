//! Master password hashing using Argon2id.
//!
//! Argon2id is a memory-hard function that protects against brute-force
//! and GPU-based attacks. The output is a PHC string
//! (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`) so the salt and
//! the cost parameters travel with the hash and `verify` needs nothing
//! else. Parameters are configurable via `Argon2Params`.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::errors::{OniLockError, Result};

/// Length of the random salt in bytes (128 bits).
const SALT_LEN: usize = 16;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Configurable Argon2id parameters.
///
/// These map 1:1 to the fields in `Settings` so the CLI can pass
/// whatever the user configured in `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// Reject dangerously weak settings before they reach Argon2.
    fn validate(&self) -> Result<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(OniLockError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if self.iterations < 1 {
            return Err(OniLockError::KeyDerivationFailed(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if self.parallelism < 1 {
            return Err(OniLockError::KeyDerivationFailed(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// One-way hasher for the vault master password.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher {
    params: Argon2Params,
}

impl PasswordHasher {
    /// Create a hasher with explicit cost parameters.
    pub fn new(params: Argon2Params) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Hash `password` with a fresh random salt.
    ///
    /// Returns the bytes of the PHC string.
    pub fn hash(&self, password: &str) -> Result<Vec<u8>> {
        let params = Params::new(
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            None,
        )
        .map_err(|e| OniLockError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let salt = SaltString::encode_b64(&generate_salt())
            .map_err(|e| OniLockError::KeyDerivationFailed(format!("salt encoding: {e}")))?;

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                OniLockError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}"))
            })?;

        Ok(hash.to_string().into_bytes())
    }

    /// Check `password` against a hash produced by `hash`.
    ///
    /// Never errors: a mismatch or an unparsable hash both yield `false`.
    /// The salt and cost are read from the hash itself, so hashes made
    /// with other parameters still verify.
    pub fn verify(&self, password: &str, hash: &[u8]) -> bool {
        let Ok(encoded) = std::str::from_utf8(hash) else {
            return false;
        };
        let Ok(parsed) = PasswordHash::new(encoded) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Generate a cryptographically random salt.
fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> PasswordHasher {
        PasswordHasher::new(Argon2Params {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn default_params_are_sensible() {
        let p = Argon2Params::default();
        assert_eq!(p.memory_kib, 65_536);
        assert_eq!(p.iterations, 3);
        assert_eq!(p.parallelism, 4);
    }

    #[test]
    fn hash_is_a_phc_string_without_the_password() {
        let hash = fast().hash("correct horse").unwrap();
        let text = String::from_utf8(hash).unwrap();
        assert!(text.starts_with("$argon2id$"));
        assert!(!text.contains("correct horse"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let h = fast();
        assert_ne!(h.hash("pw").unwrap(), h.hash("pw").unwrap());
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!fast().verify("pw", b"not a hash"));
        assert!(!fast().verify("pw", &[0xff, 0x00]));
    }

    #[test]
    fn rejects_weak_params() {
        let weak = Argon2Params {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        assert!(PasswordHasher::new(weak).is_err());

        let zero_iter = Argon2Params {
            iterations: 0,
            ..Argon2Params::default()
        };
        assert!(PasswordHasher::new(zero_iter).is_err());
    }
}
