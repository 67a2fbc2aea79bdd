//! High-level vault operations used by CLI commands.
//!
//! `VaultManager` ties the locator, the storage engines, the cipher and
//! the password hasher together so the rest of the application can work
//! with simple method calls like `manager.add_entry(NewEntry::new("github"), false)`.
//!
//! Every mutating operation is a whole-document read-modify-write held
//! under the vault file's advisory lock.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::crypto::generator::{DEFAULT_MASTER_PASSWORD_LEN, DEFAULT_PASSWORD_LEN};
use crate::crypto::{generate_password, Argon2Params, Cipher, PasswordHasher, SecretKey};
use crate::errors::{OniLockError, Result};

use super::locator::VaultLocator;
use super::model::{validate_name, validate_profile_name, Account, Entry, EntrySummary};
use super::storage::{EngineRegistry, JsonEngine};

/// Registry name of the shared setup document engine.
pub const SETUP_ENGINE: &str = "setup";

/// Extension of vault files created at the default location.
const VAULT_EXTENSION: &str = "oni";

/// Where and how a manager operates.
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Profile this manager acts on.
    pub profile: String,
    /// Location of the shared setup document.
    pub setup_path: PathBuf,
    /// Directory for vault files created without an explicit path.
    pub vault_dir: PathBuf,
    /// Cost of new master password hashes.
    pub argon2: Argon2Params,
}

/// Input for `VaultManager::add_entry`.
#[derive(Debug, Default)]
pub struct NewEntry {
    pub id: String,
    /// Plaintext secret; generated when `None`.
    pub secret: Option<Zeroizing<String>>,
    pub username: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

impl NewEntry {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    pub fn secret(mut self, secret: &str) -> Self {
        self.secret = Some(Zeroizing::new(secret.to_string()));
        self
    }

    pub fn username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// The main vault handle for one profile.
pub struct VaultManager {
    profile: String,
    vault_dir: PathBuf,
    cipher: Cipher,
    hasher: PasswordHasher,
    registry: EngineRegistry,
}

impl VaultManager {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Build a manager.
    ///
    /// The setup engine is added to `registry` unless the caller already
    /// registered one under `SETUP_ENGINE`.
    pub fn new(options: ManagerOptions, key: &SecretKey, mut registry: EngineRegistry) -> Result<Self> {
        validate_profile_name(&options.profile)?;

        if registry.get_engine(SETUP_ENGINE).is_none() {
            registry.add_engine(SETUP_ENGINE, options.setup_path);
        }

        Ok(Self {
            profile: options.profile,
            vault_dir: options.vault_dir,
            cipher: Cipher::new(key),
            hasher: PasswordHasher::new(options.argon2)?,
            registry,
        })
    }

    // ------------------------------------------------------------------
    // Profile lifecycle
    // ------------------------------------------------------------------

    /// Create the vault for this profile and register its location.
    ///
    /// With no `master_password`, a strong one is generated and returned.
    /// This is the only time it is ever observable. With no `filepath`,
    /// the vault goes to `default_vault_path()`, or back to the registered
    /// location when a profile whose vault was lost is initialized again.
    pub fn initialize(
        &mut self,
        master_password: Option<&str>,
        filepath: Option<&Path>,
    ) -> Result<Option<Zeroizing<String>>> {
        let profile = self.profile.clone();

        // A record whose vault is missing, empty or unreadable as JSON
        // counts as uninitialized; initializing again repairs it.
        let previous = if self.locator()?.is_registered(&profile)? {
            let existing = self.locator()?.resolve(&profile)?;
            if JsonEngine::new(&existing).has_data()? {
                return Err(OniLockError::AlreadyInitialized(profile));
            }
            tracing::warn!(profile = %profile, "registered vault is missing or empty; re-initializing");
            Some(existing)
        } else {
            None
        };
        let repair = previous.is_some();

        let path = match (filepath, previous) {
            (Some(p), _) if p.is_absolute() => p.to_path_buf(),
            (Some(p), _) => std::env::current_dir()?.join(p),
            (None, Some(existing)) => existing,
            (None, None) => self.default_vault_path(),
        };

        let (password, generated) = match master_password {
            Some("") => {
                return Err(OniLockError::InvalidInput(
                    "master password cannot be empty".into(),
                ))
            }
            Some(pw) => (Zeroizing::new(pw.to_string()), None),
            None => {
                tracing::warn!(profile = %profile, "no master password given; generating one");
                let pw = generate_password(DEFAULT_MASTER_PASSWORD_LEN, true)?;
                (pw.clone(), Some(pw))
            }
        };

        let account = Account::new(&profile, self.hasher.hash(&password)?);
        let document = account.to_document()?;

        let engine = JsonEngine::new(&path);
        engine.with_lock(|e| {
            if e.has_data()? {
                return Err(OniLockError::AlreadyInitialized(profile.clone()));
            }
            e.write(&document)
        })?;

        if let Err(err) = self.locator()?.register(&profile, &path, repair) {
            // Lost a race with another init of the same profile.
            let _ = engine.delete();
            return Err(match err {
                OniLockError::ProfileAlreadyInitialized(p) => OniLockError::AlreadyInitialized(p),
                other => other,
            });
        }

        self.registry.add_engine(&vault_engine_name(&profile), &path);
        tracing::info!(profile = %profile, "vault initialized");
        Ok(generated)
    }

    /// Delete the vault file and its locator record.
    ///
    /// Requires the master password.
    pub fn destroy(&mut self, master_password: &str) -> Result<()> {
        let profile = self.profile.clone();
        let engine = self.vault_engine().map_err(|err| match err {
            OniLockError::ProfileNotInitialized(p) => OniLockError::NotInitialized(p),
            other => other,
        })?;

        engine.with_lock(|e| {
            let account = self.load_account(e)?;
            self.check_master_password(&account, master_password)?;
            e.delete()
        })?;
        engine.remove_lock_file()?;

        self.locator()?.unregister(&profile)?;
        self.registry.remove_engine(&vault_engine_name(&profile));
        tracing::info!(profile = %profile, "vault destroyed");
        Ok(())
    }

    /// `true` if the profile is registered and its vault holds data.
    pub fn is_initialized(&mut self) -> Result<bool> {
        if !self.locator()?.is_registered(&self.profile)? {
            return Ok(false);
        }
        self.vault_engine()?.has_data()
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Encrypt and store a new entry.
    ///
    /// Fails with `DuplicateId` if the id exists, unless `overwrite` is
    /// set, in which case the entry is replaced in place. Returns the
    /// secret only when it was generated here.
    pub fn add_entry(
        &mut self,
        entry: NewEntry,
        overwrite: bool,
    ) -> Result<Option<Zeroizing<String>>> {
        validate_name("entry id", &entry.id)?;
        let engine = self.vault_engine()?;

        let generated = engine.with_lock(|e| {
            let mut account = self.load_account(e)?;
            if !overwrite && account.contains(&entry.id) {
                return Err(OniLockError::DuplicateId(entry.id.clone()));
            }

            let (secret, generated) = match entry.secret {
                Some(s) if !s.is_empty() => (s, None),
                _ => {
                    tracing::warn!(entry = %entry.id, "no secret given; generating one");
                    let pw = generate_password(DEFAULT_PASSWORD_LEN, true)?;
                    (pw.clone(), Some(pw))
                }
            };

            let stored = Entry {
                encrypted_password: self.cipher.encrypt_str(&secret)?,
                id: entry.id,
                username: non_empty(entry.username),
                url: non_empty(entry.url),
                description: non_empty(entry.description),
                created_at: Utc::now().timestamp(),
            };
            let id = stored.id.clone();

            if overwrite {
                account.replace_entry(stored)?;
            } else {
                account.push_entry(stored)?;
            }
            e.write(&account.to_document()?)?;

            tracing::info!(profile = %account.name, entry = %id, "entry saved");
            Ok(generated)
        })?;

        Ok(generated)
    }

    /// Redacted entries in insertion order. Never writes, never decrypts.
    pub fn list_entries(&mut self) -> Result<Vec<EntrySummary>> {
        let engine = self.vault_engine()?;
        let account = self.load_account(&engine)?;
        Ok(account.summaries())
    }

    /// Decrypt the secret of the entry named (or numbered) `id_or_index`.
    ///
    /// The caller is responsible for delivering it somewhere other than
    /// stdout or the logs.
    pub fn copy_entry(&mut self, id_or_index: &str) -> Result<Zeroizing<String>> {
        let engine = self.vault_engine()?;
        let account = self.load_account(&engine)?;

        let entry = account
            .resolve_entry(id_or_index)
            .ok_or_else(|| OniLockError::NotFound(id_or_index.to_string()))?;

        let secret = Zeroizing::new(self.cipher.decrypt_string(&entry.encrypted_password)?);
        tracing::debug!(entry = %entry.id, "entry decrypted");
        Ok(secret)
    }

    /// Remove an entry. Requires the master password.
    pub fn remove_entry(&mut self, id: &str, master_password: &str) -> Result<()> {
        let engine = self.vault_engine()?;

        engine.with_lock(|e| {
            let mut account = self.load_account(e)?;
            self.check_master_password(&account, master_password)?;

            if account.remove_entry(id).is_none() {
                return Err(OniLockError::NotFound(id.to_string()));
            }
            e.write(&account.to_document()?)?;

            tracing::info!(profile = %account.name, entry = %id, "entry removed");
            Ok(())
        })
    }

    /// The vault document as pretty JSON. Secrets stay encrypted.
    ///
    /// Requires the master password.
    pub fn export(&mut self, master_password: &str) -> Result<Vec<u8>> {
        let engine = self.vault_engine()?;
        let account = self.load_account(&engine)?;
        self.check_master_password(&account, master_password)?;

        serde_json::to_vec_pretty(&account.to_document()?)
            .map_err(|e| OniLockError::SerializationError(format!("export: {e}")))
    }

    /// Check `master_password` against the stored hash.
    pub fn verify_master_password(&mut self, master_password: &str) -> Result<bool> {
        let engine = self.vault_engine()?;
        let account = self.load_account(&engine)?;
        Ok(self.hasher.verify(master_password, &account.master_password_hash))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// All registered profile names.
    pub fn profiles(&self) -> Result<Vec<String>> {
        self.locator()?.profiles()
    }

    /// Decrypted vault path of this profile.
    pub fn vault_path(&self) -> Result<PathBuf> {
        self.locator()?.resolve(&self.profile)
    }

    /// Where `initialize` puts the vault when no path is given.
    ///
    /// The file name is derived from a hash of the profile name so the
    /// directory listing does not reveal which profiles exist.
    pub fn default_vault_path(&self) -> PathBuf {
        self.vault_dir
            .join(format!("{}.{VAULT_EXTENSION}", profile_file_stem(&self.profile)))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn setup_engine(&self) -> Result<&JsonEngine> {
        self.registry
            .get_engine(SETUP_ENGINE)
            .ok_or_else(|| OniLockError::ConfigError("setup engine is not registered".into()))
    }

    fn locator(&self) -> Result<VaultLocator<'_>> {
        Ok(VaultLocator::new(self.setup_engine()?, &self.cipher))
    }

    /// Resolve this profile's vault through the locator and cache the
    /// engine in the registry.
    fn vault_engine(&mut self) -> Result<JsonEngine> {
        let path = self.locator()?.resolve(&self.profile)?;
        let name = vault_engine_name(&self.profile);
        Ok(self.registry.add_engine(&name, path).clone())
    }

    fn load_account(&self, engine: &JsonEngine) -> Result<Account> {
        let account = Account::from_document(engine.read()?)?
            .ok_or_else(|| OniLockError::NotInitialized(self.profile.clone()))?;

        if account.name != self.profile {
            return Err(OniLockError::InvalidDocument(format!(
                "vault belongs to profile '{}', expected '{}'",
                account.name, self.profile
            )));
        }
        Ok(account)
    }

    fn check_master_password(&self, account: &Account, master_password: &str) -> Result<()> {
        if self.hasher.verify(master_password, &account.master_password_hash) {
            Ok(())
        } else {
            tracing::warn!(profile = %account.name, "master password verification failed");
            Err(OniLockError::InvalidMasterPassword)
        }
    }
}

/// Registry name of a profile's vault engine.
fn vault_engine_name(profile: &str) -> String {
    format!("vault:{profile}")
}

/// First 16 hex digits of SHA-256 over the profile name.
fn profile_file_stem(profile: &str) -> String {
    let digest = Sha256::digest(format!("onilock-profile:{profile}").as_bytes());
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_is_stable_and_opaque() {
        let a = profile_file_stem("alice");
        assert_eq!(a, profile_file_stem("alice"));
        assert_eq!(a.len(), 16);
        assert!(!a.contains("alice"));
        assert_ne!(a, profile_file_stem("bob"));
    }

    #[test]
    fn engine_names_do_not_collide_with_setup() {
        assert_ne!(vault_engine_name("setup"), SETUP_ENGINE);
    }

    #[test]
    fn blank_optionals_become_none() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some("x".into())), Some("x".into()));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn new_entry_builder() {
        let e = NewEntry::new("email").secret("hunter2").url("mail.example.com");
        assert_eq!(e.id, "email");
        assert_eq!(e.secret.as_deref().map(String::as_str), Some("hunter2"));
        assert_eq!(e.url.as_deref(), Some("mail.example.com"));
        assert!(e.username.is_none());
    }
}
