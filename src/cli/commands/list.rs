//! `onilock list`: display all entries in a table.

use crate::cli::output;
use crate::cli::{open_manager, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut manager = open_manager(cli)?;
    let entries = manager.list_entries()?;

    output::info(&format!(
        "Profile '{}' — {} entr{}",
        manager.profile(),
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" }
    ));

    output::print_entries_table(&entries);

    Ok(())
}
