//! Cryptographic primitives for OniLock.
//!
//! This module provides:
//! - AES-256-GCM encryption of entry secrets and locator paths (`cipher`)
//! - Argon2id master password hashing (`password`)
//! - The zeroizing project secret key (`keys`)
//! - Random password generation (`generator`)

pub mod cipher;
pub mod generator;
pub mod keys;
pub mod password;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{Cipher, PasswordHasher, ...};
pub use cipher::Cipher;
pub use generator::generate_password;
pub use keys::SecretKey;
pub use password::{Argon2Params, PasswordHasher};
