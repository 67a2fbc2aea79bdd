//! `onilock clear`: destroy a profile's vault.

use crate::cli::output;
use crate::cli::{confirm, open_manager, prompt_master_password, Cli};
use crate::errors::Result;

/// Execute the `clear` command.
pub fn execute(cli: &Cli, master_password: Option<&str>, force: bool) -> Result<()> {
    let mut manager = open_manager(cli)?;
    let profile = manager.profile().to_string();

    // Unless --force is set, ask for confirmation before deleting.
    if !force && !confirm(&format!(
        "Delete every entry of profile '{profile}'? This cannot be undone"
    ))? {
        output::info("Cancelled.");
        return Ok(());
    }

    let password = prompt_master_password(master_password)?;
    manager.destroy(&password)?;

    output::success(&format!("Deleted vault of profile '{profile}'"));
    Ok(())
}
