//! `onilock generate`: print a random password.

use crate::crypto::generate_password;
use crate::errors::Result;

/// Execute the `generate` command.
pub fn execute(length: usize, no_special: bool) -> Result<()> {
    let password = generate_password(length, !no_special)?;
    println!("{}", password.as_str());
    Ok(())
}
