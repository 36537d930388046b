//! Output formatting for the CLI.

use clap::ValueEnum;
use serde::Serialize;
use toast_queue::{Toast, ToastKind};

/// Output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message.
pub fn print_success(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "status": "success", "message": message }));
        }
    }
}

/// Print an error message.
pub fn print_error(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Error: {}", message),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "status": "error", "message": message }));
        }
    }
}

/// Print toasts raised while the command ran, oldest first, to stderr.
pub fn print_toasts(toasts: &[Toast], format: &OutputFormat) {
    for toast in toasts.iter().rev() {
        match format {
            OutputFormat::Text => {
                let marker = match toast.kind {
                    ToastKind::Success => "ok",
                    ToastKind::Error => "error",
                    ToastKind::Warning => "warning",
                    ToastKind::Info => "info",
                };
                if toast.message.is_empty() {
                    eprintln!("[{}] {}", marker, toast.title);
                } else {
                    eprintln!("[{}] {}: {}", marker, toast.title, toast.message);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(toast) {
                    eprintln!("{}", json);
                }
            }
        }
    }
}

/// Print a table row.
pub fn print_row(label: &str, value: &str) {
    println!("  {:<16} {}", format!("{}:", label), value);
}

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "-".repeat(50));
}

/// Print a heading.
pub fn print_heading(text: &str) {
    println!("\n{}", text);
    print_divider();
}

/// Shorten `text` to `width` characters for table cells.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}
