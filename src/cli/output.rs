//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use chrono::{Local, TimeZone};

use crate::vault::EntrySummary;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of entries (#, ID, Username, URL, Description, Created, Secret).
///
/// The secret column shows a masked preview of the ciphertext only.
pub fn print_entries_table(entries: &[EntrySummary]) {
    if entries.is_empty() {
        info("No entries in this vault yet.");
        tip("Run `onilock new <ID>` to add your first entry.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "#",
        "ID",
        "Username",
        "URL",
        "Description",
        "Created",
        "Secret",
    ]);

    for e in entries {
        table.add_row(vec![
            e.index.to_string(),
            e.id.clone(),
            e.username.clone().unwrap_or_default(),
            e.url.clone().unwrap_or_default(),
            e.description.clone().unwrap_or_default(),
            format_timestamp(e.created_at),
            e.masked_ciphertext.clone(),
        ]);
    }

    println!("{table}");
}

/// Render epoch seconds as local `YYYY-MM-DD HH:MM:SS`.
fn format_timestamp(secs: i64) -> String {
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
