//! `onilock remove`: delete an entry from the vault.

use crate::cli::output;
use crate::cli::{open_manager, prompt_master_password, Cli};
use crate::errors::Result;

/// Execute the `remove` command.
pub fn execute(cli: &Cli, id: &str, master_password: Option<&str>) -> Result<()> {
    let mut manager = open_manager(cli)?;
    let password = prompt_master_password(master_password)?;

    manager.remove_entry(id, &password)?;
    output::success(&format!("Removed entry '{id}'"));

    Ok(())
}
