//! `onilock completions`: print a shell completion script.
//!
//!   onilock completions bash > ~/.local/share/bash-completion/completions/onilock
//!   onilock completions zsh > ~/.zfunc/_onilock

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Commands;
    use clap::Parser;

    fn parsed_shell(arg: &str) -> Option<Shell> {
        match Cli::try_parse_from(["onilock", "completions", arg]).ok()?.command {
            Commands::Completions { shell } => Some(shell),
            _ => None,
        }
    }

    #[test]
    fn known_shells_parse() {
        assert_eq!(parsed_shell("bash"), Some(Shell::Bash));
        assert_eq!(parsed_shell("zsh"), Some(Shell::Zsh));
        assert_eq!(parsed_shell("fish"), Some(Shell::Fish));
        assert_eq!(parsed_shell("powershell"), Some(Shell::PowerShell));
    }

    #[test]
    fn unknown_shell_is_rejected() {
        assert_eq!(parsed_shell("tcsh"), None);
    }
}
