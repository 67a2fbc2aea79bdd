//! Account and Entry types stored inside a vault document.
//!
//! An `Account` is one profile's vault: its name, the hashed master
//! password, and an ordered list of encrypted entries. Conversion to
//! and from the storage `Document` is total and lossless; documents of
//! any other shape are rejected rather than silently defaulted.

use serde::{Deserialize, Serialize};

use super::storage::Document;
use crate::errors::{OniLockError, Result};

/// Maximum length of an entry identifier or profile name.
const MAX_NAME_LEN: usize = 64;

/// A single encrypted secret stored in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entry {
    /// Identifier, unique within the account (e.g. "github").
    pub id: String,

    /// base64(nonce || ciphertext) of the secret.
    pub encrypted_password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// URL or service label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation time in epoch seconds.
    pub created_at: i64,
}

/// One profile's vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Account {
    /// Profile name.
    pub name: String,

    /// Bytes of the Argon2id PHC string (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub master_password_hash: Vec<u8>,

    /// Entries in insertion order.
    pub passwords: Vec<Entry>,
}

/// How a caller points at an entry: by identifier or 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryRef {
    Id(String),
    Index(usize),
}

impl EntryRef {
    /// Interpret user input: all digits means a position, anything
    /// else an identifier.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = trimmed.parse::<usize>() {
                return Self::Index(n);
            }
        }
        Self::Id(input.to_string())
    }
}

impl std::fmt::Display for EntryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => f.write_str(id),
            Self::Index(n) => write!(f, "#{n}"),
        }
    }
}

/// Redacted view of an entry for listings. Holds no plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySummary {
    /// 1-based position in the vault.
    pub index: usize,
    pub id: String,
    pub username: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub created_at: i64,
    /// First and last few characters of the ciphertext.
    pub masked_ciphertext: String,
}

impl Account {
    /// Create an empty account.
    pub fn new(name: &str, master_password_hash: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            master_password_hash,
            passwords: Vec::new(),
        }
    }

    /// Parse a stored document.
    ///
    /// An empty document is an uninitialized vault (`None`). Anything
    /// else must match the account shape exactly.
    pub fn from_document(document: Document) -> Result<Option<Self>> {
        if document.is_empty() {
            return Ok(None);
        }
        let account: Self = serde_json::from_value(serde_json::Value::Object(document))
            .map_err(|e| OniLockError::InvalidDocument(format!("vault: {e}")))?;
        account.check_entries()?;
        Ok(Some(account))
    }

    /// Render the account as a storage document.
    pub fn to_document(&self) -> Result<Document> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => Err(OniLockError::SerializationError(
                "account did not serialize to an object".into(),
            )),
            Err(e) => Err(OniLockError::SerializationError(format!("account: {e}"))),
        }
    }

    /// Look up an entry by identifier or 1-based position.
    pub fn find_entry(&self, entry: &EntryRef) -> Option<&Entry> {
        match entry {
            EntryRef::Id(id) => self.passwords.iter().find(|e| &e.id == id),
            EntryRef::Index(n) => n.checked_sub(1).and_then(|i| self.passwords.get(i)),
        }
    }

    /// Resolve raw user input, preferring a literal identifier match.
    ///
    /// An entry literally named "2" wins over the second entry.
    pub fn resolve_entry(&self, input: &str) -> Option<&Entry> {
        self.find_entry(&EntryRef::Id(input.to_string()))
            .or_else(|| self.find_entry(&EntryRef::parse(input)))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.passwords.iter().any(|e| e.id == id)
    }

    /// Remove the entry with `id`. Does nothing if it is absent.
    pub fn remove_entry(&mut self, id: &str) -> Option<Entry> {
        let index = self.passwords.iter().position(|e| e.id == id)?;
        Some(self.passwords.remove(index))
    }

    /// Append a new entry. Fails with `DuplicateId` if the id is taken.
    pub fn push_entry(&mut self, entry: Entry) -> Result<()> {
        validate_name("entry id", &entry.id)?;
        if self.contains(&entry.id) {
            return Err(OniLockError::DuplicateId(entry.id));
        }
        self.passwords.push(entry);
        Ok(())
    }

    /// Replace an entry in place, keeping its position, or append it.
    pub fn replace_entry(&mut self, entry: Entry) -> Result<()> {
        validate_name("entry id", &entry.id)?;
        match self.passwords.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => *slot = entry,
            None => self.passwords.push(entry),
        }
        Ok(())
    }

    /// Redacted listing in insertion order.
    pub fn summaries(&self) -> Vec<EntrySummary> {
        self.passwords
            .iter()
            .enumerate()
            .map(|(i, e)| EntrySummary {
                index: i + 1,
                id: e.id.clone(),
                username: e.username.clone(),
                url: e.url.clone(),
                description: e.description.clone(),
                created_at: e.created_at,
                masked_ciphertext: mask(&e.encrypted_password),
            })
            .collect()
    }

    fn check_entries(&self) -> Result<()> {
        for (i, entry) in self.passwords.iter().enumerate() {
            if entry.id.is_empty() {
                return Err(OniLockError::InvalidDocument(format!(
                    "entry #{} has an empty id",
                    i + 1
                )));
            }
            if entry.encrypted_password.is_empty() {
                return Err(OniLockError::InvalidDocument(format!(
                    "entry '{}' has no encrypted password",
                    entry.id
                )));
            }
            if self.passwords[..i].iter().any(|e| e.id == entry.id) {
                return Err(OniLockError::InvalidDocument(format!(
                    "duplicate entry id '{}'",
                    entry.id
                )));
            }
        }
        Ok(())
    }
}

/// Show only the ends of a ciphertext.
fn mask(ciphertext: &str) -> String {
    const SHOWN: usize = 8;
    let chars: Vec<char> = ciphertext.chars().collect();
    if chars.len() <= SHOWN * 2 {
        return "***".to_string();
    }
    let head: String = chars[..SHOWN].iter().collect();
    let tail: String = chars[chars.len() - SHOWN..].iter().collect();
    format!("{head}***{tail}")
}

/// Validate an entry identifier or profile name.
///
/// Must be non-empty, at most 64 characters, and contain no control
/// characters.
pub fn validate_name(what: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(OniLockError::InvalidInput(format!("{what} cannot be empty")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(OniLockError::InvalidInput(format!(
            "{what} cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(OniLockError::InvalidInput(format!(
            "{what} cannot contain control characters"
        )));
    }
    Ok(())
}

/// Validate a profile name.
///
/// Allowed: ASCII letters, digits, `-`, `_`, `.`. Must not start with
/// `-` or `.`. Max length 64 characters.
pub fn validate_profile_name(name: &str) -> Result<()> {
    validate_name("profile name", name)?;

    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
    {
        return Err(OniLockError::InvalidInput(format!(
            "profile name '{name}' is invalid — only letters, digits, '-', '_' and '.' are allowed"
        )));
    }

    if name.starts_with('-') || name.starts_with('.') {
        return Err(OniLockError::InvalidInput(format!(
            "profile name '{name}' cannot start with '-' or '.'"
        )));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
