//! `onilock new`: add an entry to the vault.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_manager, Cli};
use crate::errors::{OniLockError, Result};
use crate::vault::NewEntry;

/// Optional metadata passed on the command line.
pub struct EntryArgs<'a> {
    pub password: Option<&'a str>,
    pub username: Option<&'a str>,
    pub url: Option<&'a str>,
    pub description: Option<&'a str>,
    pub force: bool,
}

/// Execute the `new` command.
pub fn execute(cli: &Cli, id: &str, args: EntryArgs<'_>) -> Result<()> {
    let mut manager = open_manager(cli)?;

    let entry = NewEntry {
        id: id.to_string(),
        secret: read_secret(id, args.password)?,
        username: args.username.map(str::to_string),
        url: args.url.map(str::to_string),
        description: args.description.map(str::to_string),
    };

    let generated = manager.add_entry(entry, args.force)?;

    let verb = if args.force { "saved" } else { "added" };
    output::success(&format!(
        "Entry '{id}' {verb} to profile '{}'",
        manager.profile()
    ));
    if generated.is_some() {
        output::info("A random secret was generated for this entry.");
        output::tip(&format!("Run `onilock copy {id}` to copy it to the clipboard."));
    }

    Ok(())
}

/// Determine the secret value from one of three sources.
///
/// An empty value from any source means "generate one".
fn read_secret(id: &str, flag: Option<&str>) -> Result<Option<Zeroizing<String>>> {
    let value = if let Some(v) = flag {
        // Source 1: Inline value on the command line.
        if !v.is_empty() {
            output::warning("Secret provided on command line — it may appear in shell history.");
        }
        Zeroizing::new(v.to_string())
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        Zeroizing::new(buf.trim_end().to_string())
    } else {
        // Source 3: Interactive secure prompt (default).
        let pw = dialoguer::Password::new()
            .with_prompt(format!("Enter secret for {id} (empty to generate)"))
            .allow_empty_password(true)
            .interact()
            .map_err(|e| OniLockError::CommandFailed(format!("input prompt: {e}")))?;
        Zeroizing::new(pw)
    };

    Ok(if value.is_empty() { None } else { Some(value) })
}
