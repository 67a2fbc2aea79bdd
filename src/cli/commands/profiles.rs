//! `onilock profiles`: list every initialized profile.

use crate::cli::output;
use crate::cli::{open_manager, Cli};
use crate::errors::Result;

/// Execute the `profiles` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let manager = open_manager(cli)?;
    let profiles = manager.profiles()?;

    if profiles.is_empty() {
        output::info("No profiles initialized yet.");
        output::tip("Run `onilock init` to create one.");
        return Ok(());
    }

    for name in profiles {
        let marker = if name == manager.profile() { "*" } else { " " };
        println!("{marker} {name}");
    }

    Ok(())
}
