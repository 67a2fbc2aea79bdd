//! `onilock export`: write the vault document to a file or stdout.
//!
//! The export is the vault JSON as stored: entry secrets remain
//! encrypted with the project secret key.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::cli::output;
use crate::cli::{open_manager, prompt_master_password, Cli};
use crate::errors::{OniLockError, Result};

/// Execute the `export` command.
pub fn execute(
    cli: &Cli,
    output_path: Option<&Path>,
    master_password: Option<&str>,
    force: bool,
) -> Result<()> {
    let mut manager = open_manager(cli)?;
    let password = prompt_master_password(master_password)?;
    let bytes = manager.export(&password)?;

    match output_path {
        Some(path) => {
            let mut file = open_export_file(path, force)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            output::success(&format!(
                "Exported profile '{}' to {}",
                manager.profile(),
                path.display()
            ));
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}

/// Open `path` for the export, owner-only from the moment it exists.
///
/// An existing file is only replaced with `force`.
fn open_export_file(path: &Path, force: bool) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let file = options.open(path).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => OniLockError::InvalidInput(format!(
            "{} already exists (use --force to replace it)",
            path.display()
        )),
        _ => e.into(),
    })?;

    // `mode` only applies to newly created files.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn existing_file_needs_force() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("backup.json");
        fs::write(&path, "keep me").unwrap();

        assert!(matches!(
            open_export_file(&path, false),
            Err(OniLockError::InvalidInput(msg)) if msg.contains("--force")
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");

        open_export_file(&path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[cfg(unix)]
    #[test]
    fn export_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let fresh = dir.path().join("fresh.json");
        open_export_file(&fresh, false).unwrap();
        assert_eq!(fs::metadata(&fresh).unwrap().permissions().mode() & 0o777, 0o600);

        let loose = dir.path().join("loose.json");
        fs::write(&loose, "{}").unwrap();
        fs::set_permissions(&loose, fs::Permissions::from_mode(0o644)).unwrap();
        open_export_file(&loose, true).unwrap();
        assert_eq!(fs::metadata(&loose).unwrap().permissions().mode() & 0o777, 0o600);
    }
}
