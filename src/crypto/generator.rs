//! Random password generation.
//!
//! Draws from the thread-local CSPRNG. Every generated password holds at
//! least one lowercase letter, one uppercase letter, one digit and, when
//! requested, one punctuation character. The rest is uniform over the
//! full alphabet and the result is shuffled so the guaranteed characters
//! do not sit at the front.

use rand::seq::{IndexedRandom, SliceRandom};
use zeroize::Zeroizing;

use crate::errors::{OniLockError, Result};

/// Default length for generated entry passwords.
pub const DEFAULT_PASSWORD_LEN: usize = 12;

/// Default length for an auto-generated master password.
pub const DEFAULT_MASTER_PASSWORD_LEN: usize = 25;

/// Upper bound on generated password length.
const MAX_PASSWORD_LEN: usize = 1024;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

/// Punctuation characters allowed in generated passwords.
pub const PUNCTUATION: &[u8] = b"@$!%*?&_}{()-=+";

/// Generate a random password of exactly `length` characters.
pub fn generate_password(length: usize, include_special: bool) -> Result<Zeroizing<String>> {
    let mut classes: Vec<&[u8]> = vec![LOWERCASE, UPPERCASE, DIGITS];
    if include_special {
        classes.push(PUNCTUATION);
    }

    if length < classes.len() {
        return Err(OniLockError::InvalidInput(format!(
            "password length must be at least {} (got {length})",
            classes.len()
        )));
    }
    if length > MAX_PASSWORD_LEN {
        return Err(OniLockError::InvalidInput(format!(
            "password length cannot exceed {MAX_PASSWORD_LEN} (got {length})"
        )));
    }

    let alphabet: Vec<u8> = classes.concat();
    let mut rng = rand::rng();
    let mut chars: Zeroizing<Vec<u8>> = Zeroizing::new(Vec::with_capacity(length));

    for class in &classes {
        chars.extend(class.choose(&mut rng));
    }
    while chars.len() < length {
        chars.extend(alphabet.choose(&mut rng));
    }

    chars.shuffle(&mut rng);

    let password: String = chars.iter().map(|&b| char::from(b)).collect();
    Ok(Zeroizing::new(password))
}
