//! `onilock keygen`: print a fresh project secret key.
//!
//! Usage:
//!   export ONILOCK_SECRET_KEY="$(onilock keygen)"

use crate::cli::output;
use crate::crypto::SecretKey;
use crate::errors::Result;
use crate::keystore::SECRET_KEY_ENV;

/// Execute the `keygen` command.
pub fn execute() -> Result<()> {
    let key = SecretKey::generate();
    println!("{}", key.to_base64().as_str());
    output::warning(&format!(
        "Losing this key makes every vault encrypted with it unreadable. Store it in {SECRET_KEY_ENV} or a secret manager."
    ));
    Ok(())
}
