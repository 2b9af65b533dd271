//! Colored terminal output helpers.
//!
//! All user-facing messages go through these functions so we get
//! consistent styling across every command. Messages go to stderr;
//! stdout is reserved for command results so they can be piped.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::events::RotationEvent;
use crate::service::RotationStatus;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    eprintln!("{} {}", style("\u{2713}").green().bold(), msg);
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
    eprintln!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print the status summary plus one row per encryption key.
pub fn print_status(status: &RotationStatus, fingerprints: &[(usize, String)]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Setting", "Value"]);

    table.add_row(vec![
        "JWT secrets".to_string(),
        status.jwt_secrets_count.to_string(),
    ]);
    table.add_row(vec![
        "Encryption keys".to_string(),
        status.encryption_keys_count.to_string(),
    ]);
    table.add_row(vec![
        "Grace period".to_string(),
        format_millis(status.grace_period_ms),
    ]);
    for (index, fingerprint) in fingerprints {
        let role = if *index == 0 { "current" } else { "previous" };
        table.add_row(vec![format!("Key {index} ({role})"), fingerprint.clone()]);
    }
    table.add_row(vec![
        "Last event".to_string(),
        status
            .last_rotation_event
            .as_ref()
            .map(describe_event)
            .unwrap_or_else(|| "none".to_string()),
    ]);

    println!("{table}");
}

/// Print a table of rotation events, oldest first.
pub fn print_events_table(events: &[RotationEvent]) {
    if events.is_empty() {
        info("No rotation events recorded.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Type", "Result", "Details"]);

    for event in events {
        let details = match (&event.error, &event.metadata) {
            (Some(err), _) => err.clone(),
            (None, Some(meta)) => meta.to_string(),
            (None, None) => String::new(),
        };
        table.add_row(vec![
            event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            event.kind.to_string(),
            outcome(event).to_string(),
            details,
        ]);
    }

    println!("{table}");
}

fn outcome(event: &RotationEvent) -> &'static str {
    if event.success {
        "ok"
    } else {
        "failed"
    }
}

fn describe_event(event: &RotationEvent) -> String {
    format!(
        "{} {} at {}",
        event.kind,
        outcome(event),
        event.timestamp.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Render milliseconds in the largest whole unit (7d, 2h, 90s).
fn format_millis(ms: u64) -> String {
    match ms / 1000 {
        0 => "0s".to_string(),
        s if s % 86_400 == 0 => format!("{}d", s / 86_400),
        s if s % 3_600 == 0 => format!("{}h", s / 3_600),
        s if s % 60 == 0 => format!("{}m", s / 60),
        s => format!("{s}s"),
    }
}
