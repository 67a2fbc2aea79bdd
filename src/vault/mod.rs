//! Vault module: credential storage for one or more profiles.
//!
//! This module provides:
//! - JSON document engines with atomic writes and file locks (`storage`)
//! - Typed `Account` and `Entry` records (`model`)
//! - Encrypted profile → vault path records in the setup file (`locator`)
//! - High-level `VaultManager` for initializing and managing vaults (`manager`)

pub mod locator;
pub mod manager;
pub mod model;
pub mod storage;

// Re-export the most commonly used items.
pub use locator::VaultLocator;
pub use manager::{ManagerOptions, NewEntry, VaultManager};
pub use model::{Account, Entry, EntryRef, EntrySummary};
pub use storage::{Document, EngineRegistry, JsonEngine};
