//! `onilock copy`: decrypt an entry's secret onto the clipboard.

use crate::cli::output;
use crate::cli::{clipboard, open_manager, Cli};
use crate::errors::Result;

/// Execute the `copy` command.
///
/// The secret is never printed; it only reaches the clipboard.
pub fn execute(cli: &Cli, entry: &str) -> Result<()> {
    let mut manager = open_manager(cli)?;
    let secret = manager.copy_entry(entry)?;

    clipboard::copy_secret(&secret)?;
    output::success(&format!("Secret for '{entry}' copied to clipboard"));

    Ok(())
}
