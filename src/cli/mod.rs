//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod clipboard;
pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use zeroize::Zeroizing;

use crate::config::{home_dir, Settings};
use crate::errors::{OniLockError, Result};
use crate::vault::{EngineRegistry, VaultManager};

/// Minimum length for a master password chosen by the user.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable consulted before prompting for a master password.
pub const MASTER_PASSWORD_ENV: &str = "ONILOCK_MASTER_PASSWORD";

/// OniLock CLI: encrypted local credential vault.
#[derive(Parser)]
#[command(
    name = "onilock",
    about = "Encrypted local credential vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Profile to use (default: `default_profile` from config.toml)
    #[arg(short, long, env = "ONILOCK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize a vault for the profile
    Init {
        /// Master password (omit for prompt; leave empty to generate one)
        #[arg(long)]
        master_password: Option<String>,

        /// Where to create the vault file (default: under the OniLock home)
        #[arg(long)]
        filepath: Option<PathBuf>,
    },

    /// Add a new entry
    New {
        /// Entry identifier (e.g. github)
        id: String,

        /// Secret value (omit for prompt or stdin; empty generates one)
        #[arg(long)]
        password: Option<String>,

        /// Account username
        #[arg(short, long)]
        username: Option<String>,

        /// URL or service where the secret is used
        #[arg(long)]
        url: Option<String>,

        /// Free-form description
        #[arg(short, long)]
        description: Option<String>,

        /// Replace an existing entry with the same id
        #[arg(short, long)]
        force: bool,
    },

    /// List all entries (secrets stay encrypted)
    List,

    /// Copy an entry's secret to the clipboard
    Copy {
        /// Entry identifier or 1-based index from `list`
        entry: String,
    },

    /// Remove an entry
    Remove {
        /// Entry identifier
        id: String,

        /// Master password (omit for prompt)
        #[arg(long)]
        master_password: Option<String>,
    },

    /// Delete the profile's vault and its location record
    Clear {
        /// Master password (omit for prompt)
        #[arg(long)]
        master_password: Option<String>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Export the vault document (secrets stay encrypted)
    Export {
        /// Output file path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Master password (omit for prompt)
        #[arg(long)]
        master_password: Option<String>,

        /// Replace the output file if it already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a random password
    Generate {
        /// Password length
        #[arg(short, long, default_value_t = crate::crypto::generator::DEFAULT_PASSWORD_LEN)]
        length: usize,

        /// Letters and digits only
        #[arg(long)]
        no_special: bool,
    },

    /// Print a fresh project secret key (for ONILOCK_SECRET_KEY)
    Keygen,

    /// List initialized profiles
    Profiles,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Hold a secret on the clipboard until it is replaced (used by `copy`)
    #[command(name = "clipboard-serve", hide = true)]
    ClipboardServe,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the profile name: `--profile` / `ONILOCK_PROFILE`, else config.
pub fn profile_name(cli: &Cli, settings: &Settings) -> String {
    cli.profile
        .clone()
        .unwrap_or_else(|| settings.default_profile.clone())
}

/// Build a `VaultManager` for the profile selected on the command line.
pub fn open_manager(cli: &Cli) -> Result<VaultManager> {
    let home = home_dir()?;
    let settings = Settings::load(&home)?;
    let profile = profile_name(cli, &settings);
    let key = crate::keystore::resolve_secret_key()?;

    tracing::debug!(home = %home.display(), profile = %profile, "opening vault manager");
    VaultManager::new(
        settings.manager_options(&home, &profile),
        &key,
        EngineRegistry::new(),
    )
}

/// Get the master password of an existing vault, trying in order:
/// 1. the `--master-password` flag
/// 2. `ONILOCK_MASTER_PASSWORD` env var (CI/scripts)
/// 3. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_master_password(flag: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(pw) = flag.filter(|p| !p.is_empty()) {
        return Ok(Zeroizing::new(pw.to_string()));
    }

    if let Ok(pw) = std::env::var(MASTER_PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| OniLockError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Choose the master password for a new vault (used during `init`).
///
/// Same sources as `prompt_master_password`. An empty answer at the
/// prompt means "generate one for me" and yields `None`. Enforces a
/// minimum password length otherwise.
pub fn prompt_new_master_password(flag: Option<&str>) -> Result<Option<Zeroizing<String>>> {
    let provided = match flag {
        Some(pw) => Some(pw.to_string()),
        None => std::env::var(MASTER_PASSWORD_ENV).ok(),
    };

    if let Some(pw) = provided {
        if pw.is_empty() {
            return Ok(None);
        }
        check_password_len(&pw)?;
        return Ok(Some(Zeroizing::new(pw)));
    }

    output::info("Choose a strong master password and keep it somewhere safe.");
    output::tip("Leave it empty to generate a secure master password.");

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .allow_empty_password(true)
            .interact()
            .map_err(|e| OniLockError::CommandFailed(format!("password prompt: {e}")))?;

        if password.is_empty() {
            return Ok(None);
        }

        if check_password_len(&password).is_err() {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Some(Zeroizing::new(password)));
    }
}

fn check_password_len(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(OniLockError::InvalidInput(format!(
            "master password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Ask a yes/no question, defaulting to "no".
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| OniLockError::CommandFailed(format!("confirm prompt: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_new_with_metadata() {
        let cli = Cli::try_parse_from([
            "onilock", "-p", "alice", "new", "email", "--password", "hunter22", "--url",
            "mail.example.com", "--force",
        ])
        .unwrap();

        assert_eq!(cli.profile.as_deref(), Some("alice"));
        match cli.command {
            Commands::New {
                id,
                password,
                url,
                force,
                username,
                ..
            } => {
                assert_eq!(id, "email");
                assert_eq!(password.as_deref(), Some("hunter22"));
                assert_eq!(url.as_deref(), Some("mail.example.com"));
                assert!(force);
                assert!(username.is_none());
            }
            _ => panic!("expected `new`"),
        }
    }

    #[test]
    fn clipboard_holder_command_is_hidden() {
        let cli = Cli::try_parse_from(["onilock", clipboard::SERVE_COMMAND]).unwrap();
        assert!(matches!(cli.command, Commands::ClipboardServe));

        let help = Cli::command().render_help().to_string();
        assert!(help.contains("copy"));
        assert!(!help.contains(clipboard::SERVE_COMMAND));
    }

    #[test]
    fn export_flags() {
        let cli = Cli::try_parse_from([
            "onilock", "export", "-o", "backup.json", "--master-password", "pw", "--force",
        ])
        .unwrap();
        match cli.command {
            Commands::Export {
                output,
                master_password,
                force,
            } => {
                assert_eq!(output.as_deref(), Some(std::path::Path::new("backup.json")));
                assert_eq!(master_password.as_deref(), Some("pw"));
                assert!(force);
            }
            _ => panic!("expected `export`"),
        }
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["onilock", "-vv", "list"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn generate_defaults_to_entry_length() {
        let cli = Cli::try_parse_from(["onilock", "generate"]).unwrap();
        match cli.command {
            Commands::Generate { length, no_special } => {
                assert_eq!(length, 12);
                assert!(!no_special);
            }
            _ => panic!("expected `generate`"),
        }
    }

    #[test]
    fn profile_falls_back_to_settings() {
        let cli = Cli::try_parse_from(["onilock", "list"]).unwrap();
        let settings = Settings {
            default_profile: "work".into(),
            ..Settings::default()
        };
        // ONILOCK_PROFILE may leak in from the environment running the tests.
        if std::env::var_os("ONILOCK_PROFILE").is_none() {
            assert_eq!(profile_name(&cli, &settings), "work");
        }
    }

    #[test]
    fn short_master_passwords_are_rejected() {
        assert!(check_password_len("short").is_err());
        assert!(check_password_len("long enough").is_ok());
    }
}
