use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in OniLock.
#[derive(Debug, Error)]
pub enum OniLockError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong project secret key or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Incorrect master password")]
    InvalidMasterPassword,

    // --- Vault errors ---
    #[error("Profile '{0}' is not initialized — run `onilock init` first")]
    NotInitialized(String),

    #[error("Profile '{0}' is already initialized")]
    AlreadyInitialized(String),

    #[error("No vault is registered for profile '{0}'")]
    ProfileNotInitialized(String),

    #[error("A vault is already registered for profile '{0}'")]
    ProfileAlreadyInitialized(String),

    #[error("Entry '{0}' already exists (use --force to overwrite)")]
    DuplicateId(String),

    #[error("Entry '{0}' not found")]
    NotFound(String),

    #[error("Invalid vault document: {0}")]
    InvalidDocument(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timed out waiting for the lock on {0}; another onilock process may be running")]
    LockTimeout(PathBuf),

    // --- Keyring errors ---
    #[error("Keyring error: {0}")]
    KeyringError(String),

    // --- Clipboard errors ---
    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    // --- Config errors ---
    #[error("Config error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Convenience type alias for OniLock results.
pub type Result<T> = std::result::Result<T, OniLockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decryption_and_master_password_errors_are_distinct() {
        let decrypt = OniLockError::DecryptionFailed.to_string();
        let master = OniLockError::InvalidMasterPassword.to_string();
        assert_ne!(decrypt, master);
        assert!(decrypt.contains("secret key"));
        assert!(master.contains("master password"));
    }

    #[test]
    fn messages_name_the_profile_or_entry() {
        let err = OniLockError::DuplicateId("github".into());
        assert!(err.to_string().contains("github"));

        let err = OniLockError::NotInitialized("alice".into());
        assert!(err.to_string().contains("alice"));
    }
}
