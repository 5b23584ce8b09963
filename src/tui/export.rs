use crate::export::{export_csv, ExportOutcome};
use crate::model::RunConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

use super::UiState;

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Export the session's result log as CSV, routing every outcome into the
/// status line. The empty-log case is a notice, never a file.
pub(super) fn export_log(state: &mut UiState, cfg: &RunConfig) {
    let path = match cfg.export_csv.clone() {
        Some(p) => p,
        None => match default_csv_path() {
            Ok(p) => p,
            Err(e) => {
                state.info = format!("CSV export failed: {e:#}");
                return;
            }
        },
    };

    match export_csv(&path, state.session.results()) {
        Ok(ExportOutcome::EmptyLog) => {
            state.info = "No results to export yet.".to_string();
        }
        Ok(ExportOutcome::Written(p)) => {
            state.last_exported_path = Some(p.to_string_lossy().to_string());
            state.info = format!("Exported CSV: {} (press 'y' to copy path)", p.display());
        }
        Err(e) => {
            state.info = format!("CSV export failed: {e:#}");
        }
    }
}

/// Generate a timestamped filename in the current directory.
fn default_csv_path() -> Result<PathBuf> {
    let ts = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into());
    let default_name = format!(
        "brand-mentions-{}.csv",
        ts.replace(':', "-").replace('T', "_")
    );
    let current_dir = std::env::current_dir().context("get current directory")?;
    Ok(current_dir.join(default_name))
}

pub(super) fn copy_exported_path(state: &mut UiState) {
    let Some(path) = state.last_exported_path.clone() else {
        state.info = "No exported file path to copy. Export a file first (Ctrl-E)".to_string();
        return;
    };
    match copy_to_clipboard(&path) {
        Ok(()) => {
            let display_path = if path.len() > 60 {
                format!("{}...", &path[..57])
            } else {
                path
            };
            state.info = format!("Copied to clipboard: {display_path}");
        }
        Err(e) => {
            state.info = format!("Clipboard copy failed: {e:#}");
        }
    }
}

/// Initialize the clipboard manager thread if not already initialized.
/// A dedicated thread processes clipboard operations sequentially and keeps
/// each clipboard instance alive long enough for clipboard managers to read it.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                if let Ok(mut clipboard) = Clipboard::new() {
                    if clipboard.set_text(&text).is_ok() {
                        std::thread::sleep(Duration::from_secs(2));
                    }
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue a clipboard write without blocking the UI thread.
fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}
