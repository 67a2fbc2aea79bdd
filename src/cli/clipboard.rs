//! Clipboard delivery of decrypted secrets.
//!
//! On X11 and Wayland the clipboard contents belong to the process that
//! set them and vanish when it exits. There the secret is handed over
//! stdin to a detached `onilock clipboard-serve` child, which keeps
//! serving it until something else takes the clipboard. Other platforms
//! copy the text into the system clipboard directly.

use std::io::{self, Read, Write};

use zeroize::Zeroizing;

use crate::errors::{OniLockError, Result};

/// Hidden subcommand run by the clipboard holder process.
pub const SERVE_COMMAND: &str = "clipboard-serve";

/// Written by the holder once it owns a clipboard connection.
const READY: u8 = b'+';

/// Place `secret` on the system clipboard.
pub fn copy_secret(secret: &Zeroizing<String>) -> Result<()> {
    #[cfg(all(
        unix,
        not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
    ))]
    return hand_off(secret);

    #[cfg(not(all(
        unix,
        not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
    )))]
    {
        let mut clipboard = open()?;
        clipboard.set_text(secret.as_str()).map_err(set_failed)?;
        tracing::debug!("secret placed on clipboard");
        Ok(())
    }
}

/// Body of the hidden `clipboard-serve` command.
///
/// Reads the secret from stdin, reports readiness on stdout, then holds
/// the clipboard until another application replaces its contents.
pub fn serve() -> Result<()> {
    let mut secret = Zeroizing::new(String::new());
    io::stdin().read_to_string(&mut secret)?;
    if secret.is_empty() {
        return Err(OniLockError::ClipboardError("nothing to serve".into()));
    }

    let mut clipboard = open()?;
    {
        let mut stdout = io::stdout().lock();
        stdout.write_all(&[READY])?;
        stdout.flush()?;
    }

    #[cfg(all(
        unix,
        not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
    ))]
    {
        use arboard::SetExtLinux;
        clipboard
            .set()
            .wait()
            .text(secret.as_str())
            .map_err(set_failed)?;
    }

    #[cfg(not(all(
        unix,
        not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
    )))]
    clipboard.set_text(secret.as_str()).map_err(set_failed)?;

    Ok(())
}

#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
fn hand_off(secret: &Zeroizing<String>) -> Result<()> {
    use std::process::{Command, Stdio};

    let exe = std::env::current_exe()?;
    let mut child = Command::new(exe)
        .arg(SERVE_COMMAND)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| OniLockError::ClipboardError(format!("failed to start clipboard holder: {e}")))?;

    let (Some(mut stdin), Some(mut ready)) = (child.stdin.take(), child.stdout.take()) else {
        return Err(OniLockError::ClipboardError(
            "clipboard holder has no pipes".into(),
        ));
    };
    stdin.write_all(secret.as_bytes())?;
    drop(stdin);

    let mut status = [0u8; 1];
    if wait_ready(&mut ready, &mut status) {
        tracing::debug!(pid = child.id(), "secret handed to clipboard holder");
        return Ok(());
    }

    // The holder exits on its own when it cannot reach a display.
    let _ = child.wait();
    Err(OniLockError::ClipboardError(
        "clipboard unavailable (no X11 or Wayland display?)".into(),
    ))
}

/// True when the holder wrote its readiness byte before closing stdout.
fn wait_ready(from: &mut impl Read, buf: &mut [u8; 1]) -> bool {
    matches!(from.read(buf), Ok(1)) && buf[0] == READY
}

fn open() -> Result<arboard::Clipboard> {
    arboard::Clipboard::new()
        .map_err(|e| OniLockError::ClipboardError(format!("clipboard unavailable: {e}")))
}

fn set_failed(e: arboard::Error) -> OniLockError {
    OniLockError::ClipboardError(format!("failed to set clipboard: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_byte_is_required() {
        let mut buf = [0u8; 1];
        assert!(wait_ready(&mut &[READY][..], &mut buf));
        assert!(!wait_ready(&mut &b""[..], &mut buf));
        assert!(!wait_ready(&mut &b"x"[..], &mut buf));
    }
}
