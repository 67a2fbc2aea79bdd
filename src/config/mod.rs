//! Configuration: TOML settings and the OniLock home directory.

pub mod settings;

pub use settings::{home_dir, Settings};
