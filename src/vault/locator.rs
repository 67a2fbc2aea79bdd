//! Profile name → vault file path, stored encrypted in the setup document.
//!
//! The setup document is shared by every profile and lives at a fixed
//! location:
//!
//! ```text
//! { "<profile>": { "filepath": "<base64(nonce || ciphertext) of the path>" } }
//! ```
//!
//! Paths never appear in plaintext in this document; they are sealed
//! with the project `Cipher`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::storage::{Document, JsonEngine};
use crate::crypto::Cipher;
use crate::errors::{OniLockError, Result};

/// One profile's record in the setup document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocatorRecord {
    /// Encrypted vault file path.
    pub filepath: String,
}

/// Resolves and registers vault locations.
pub struct VaultLocator<'a> {
    setup: &'a JsonEngine,
    cipher: &'a Cipher,
}

impl<'a> VaultLocator<'a> {
    pub fn new(setup: &'a JsonEngine, cipher: &'a Cipher) -> Self {
        Self { setup, cipher }
    }

    /// Decrypt the vault path registered for `profile`.
    pub fn resolve(&self, profile: &str) -> Result<PathBuf> {
        let document = self.setup.read()?;
        let record = record_for(&document, profile)?
            .ok_or_else(|| OniLockError::ProfileNotInitialized(profile.to_string()))?;

        let path = self.cipher.decrypt_string(&record.filepath)?;
        tracing::debug!(profile, "resolved vault location");
        Ok(PathBuf::from(path))
    }

    /// Record `path` as the vault location for `profile`.
    ///
    /// Fails with `ProfileAlreadyInitialized` if the profile already has
    /// a record, unless `overwrite` is set.
    pub fn register(&self, profile: &str, path: &Path, overwrite: bool) -> Result<()> {
        let path_str = path.to_str().ok_or_else(|| {
            OniLockError::InvalidInput("vault path must be valid UTF-8".into())
        })?;

        self.setup.with_lock(|setup| {
            let mut document = setup.read()?;
            if !overwrite && record_for(&document, profile)?.is_some() {
                return Err(OniLockError::ProfileAlreadyInitialized(profile.to_string()));
            }

            let record = LocatorRecord {
                filepath: self.cipher.encrypt_str(path_str)?,
            };
            let value = serde_json::to_value(&record)
                .map_err(|e| OniLockError::SerializationError(format!("locator: {e}")))?;
            document.insert(profile.to_string(), value);
            setup.write(&document)
        })?;

        tracing::info!(profile, "registered vault location");
        Ok(())
    }

    /// Remove the record for `profile`. Returns whether one existed.
    pub fn unregister(&self, profile: &str) -> Result<bool> {
        let removed = self.setup.with_lock(|setup| {
            let mut document = setup.read()?;
            if document.remove(profile).is_none() {
                return Ok(false);
            }
            setup.write(&document)?;
            Ok(true)
        })?;

        if removed {
            tracing::info!(profile, "unregistered vault location");
        }
        Ok(removed)
    }

    /// `true` if `profile` has a record.
    pub fn is_registered(&self, profile: &str) -> Result<bool> {
        Ok(self.setup.read()?.contains_key(profile))
    }

    /// Names of all registered profiles, sorted. Paths stay encrypted.
    pub fn profiles(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.setup.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

fn record_for(document: &Document, profile: &str) -> Result<Option<LocatorRecord>> {
    document
        .get(profile)
        .map(|value| {
            serde_json::from_value(value.clone()).map_err(|e| {
                OniLockError::InvalidDocument(format!("setup record for '{profile}': {e}"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecretKey;
    use tempfile::TempDir;

    fn setup() -> (TempDir, JsonEngine, Cipher) {
        let dir = TempDir::new().unwrap();
        let engine = JsonEngine::new(dir.path().join("setup.oni"));
        let cipher = Cipher::new(&SecretKey::new([9u8; 32]));
        (dir, engine, cipher)
    }

    #[test]
    fn register_then_resolve() {
        let (_dir, engine, cipher) = setup();
        let locator = VaultLocator::new(&engine, &cipher);
        let path = Path::new("/home/alice/.onilock/vault/abc.oni");

        locator.register("alice", path, false).unwrap();
        assert_eq!(locator.resolve("alice").unwrap(), path);
        assert!(locator.is_registered("alice").unwrap());
    }

    #[test]
    fn path_is_not_stored_in_plaintext() {
        let (_dir, engine, cipher) = setup();
        let locator = VaultLocator::new(&engine, &cipher);
        locator
            .register("alice", Path::new("/very/secret/location.oni"), false)
            .unwrap();

        let raw = std::fs::read_to_string(engine.path()).unwrap();
        assert!(raw.contains("alice"));
        assert!(raw.contains("filepath"));
        assert!(!raw.contains("secret/location"));
    }

    #[test]
    fn resolve_unknown_profile_fails() {
        let (_dir, engine, cipher) = setup();
        let locator = VaultLocator::new(&engine, &cipher);
        assert!(matches!(
            locator.resolve("bob"),
            Err(OniLockError::ProfileNotInitialized(p)) if p == "bob"
        ));
    }

    #[test]
    fn register_twice_requires_overwrite() {
        let (_dir, engine, cipher) = setup();
        let locator = VaultLocator::new(&engine, &cipher);
        locator.register("alice", Path::new("/a.oni"), false).unwrap();

        assert!(matches!(
            locator.register("alice", Path::new("/b.oni"), false),
            Err(OniLockError::ProfileAlreadyInitialized(_))
        ));
        assert_eq!(locator.resolve("alice").unwrap(), Path::new("/a.oni"));

        locator.register("alice", Path::new("/b.oni"), true).unwrap();
        assert_eq!(locator.resolve("alice").unwrap(), Path::new("/b.oni"));
    }

    #[test]
    fn wrong_key_is_a_decryption_failure() {
        let (_dir, engine, cipher) = setup();
        VaultLocator::new(&engine, &cipher)
            .register("alice", Path::new("/a.oni"), false)
            .unwrap();

        let other = Cipher::new(&SecretKey::new([1u8; 32]));
        assert!(matches!(
            VaultLocator::new(&engine, &other).resolve("alice"),
            Err(OniLockError::DecryptionFailed)
        ));
    }

    #[test]
    fn unregister_keeps_other_profiles() {
        let (_dir, engine, cipher) = setup();
        let locator = VaultLocator::new(&engine, &cipher);
        locator.register("alice", Path::new("/a.oni"), false).unwrap();
        locator.register("bob", Path::new("/b.oni"), false).unwrap();

        assert!(locator.unregister("alice").unwrap());
        assert!(!locator.unregister("alice").unwrap());
        assert_eq!(locator.profiles().unwrap(), vec!["bob".to_string()]);
        assert_eq!(locator.resolve("bob").unwrap(), Path::new("/b.oni"));
    }

    #[test]
    fn malformed_record_is_rejected() {
        let (_dir, engine, cipher) = setup();
        std::fs::write(engine.path(), r#"{"alice": {"path": "/plain"}}"#).unwrap();
        let locator = VaultLocator::new(&engine, &cipher);
        assert!(matches!(
            locator.resolve("alice"),
            Err(OniLockError::InvalidDocument(_))
        ));
    }
}
