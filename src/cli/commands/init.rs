//! `onilock init`: create the vault for a profile.

use std::path::Path;

use crate::cli::output;
use crate::cli::{open_manager, prompt_new_master_password, Cli};
use crate::errors::Result;

/// Execute the `init` command.
pub fn execute(cli: &Cli, master_password: Option<&str>, filepath: Option<&Path>) -> Result<()> {
    let mut manager = open_manager(cli)?;

    // 1. Choose a master password (None means generate one).
    let chosen = prompt_new_master_password(master_password)?;

    // 2. Create the vault and register its location.
    let generated = manager.initialize(chosen.as_deref().map(String::as_str), filepath)?;

    output::success(&format!(
        "Vault initialized for profile '{}'",
        manager.profile()
    ));

    // 3. A generated master password is shown exactly once.
    if let Some(pw) = generated {
        output::warning("A master password was generated. Store it safely; it will not be shown again:");
        println!("{}", pw.as_str());
    }

    output::tip("Run `onilock new <ID>` to add an entry.");
    output::tip("Run `onilock list` to see all entries.");

    Ok(())
}
