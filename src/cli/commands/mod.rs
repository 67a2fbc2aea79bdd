//! One module per subcommand; each exposes an `execute` function.

pub mod clear;
pub mod completions;
pub mod copy;
pub mod export;
pub mod generate;
pub mod init;
pub mod keygen;
pub mod list;
pub mod new;
pub mod profiles;
pub mod remove;
