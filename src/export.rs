//! CSV serialization of the result log.
//!
//! The export mirrors the log exactly: rows in insertion order, `Mentioned`
//! rendered `Yes`/`No`, and non-positive positions kept verbatim. The dash
//! rendering for absent positions belongs to the table view, never the file.

use crate::model::ResultRecord;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ExportOutcome {
    Written(PathBuf),
    /// Nothing to export yet; surfaced as a status notice, not an error.
    EmptyLog,
}

/// Write the log as CSV, or report the empty-log no-op without touching disk.
pub fn export_csv(path: &Path, records: &[ResultRecord]) -> Result<ExportOutcome> {
    if records.is_empty() {
        return Ok(ExportOutcome::EmptyLog);
    }
    std::fs::write(path, csv_document(records))
        .with_context(|| format!("write CSV to {}", path.display()))?;
    Ok(ExportOutcome::Written(path.to_path_buf()))
}

/// Build the CSV document for a non-empty log. Deterministic: the same log
/// always yields byte-identical output.
pub fn csv_document(records: &[ResultRecord]) -> String {
    let mut doc = String::from("Prompt,Brand,Mentioned,Position\n");
    for r in records {
        doc.push_str(&quote(&r.prompt));
        doc.push(',');
        doc.push_str(&quote(&r.brand));
        doc.push(',');
        doc.push_str(if r.mentioned { "Yes" } else { "No" });
        doc.push(',');
        doc.push_str(&r.position.to_string());
        doc.push('\n');
    }
    doc
}

/// Double-quote a text field, doubling interior quotes.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(prompt: &str, brand: &str, mentioned: bool, position: i64) -> ResultRecord {
        ResultRecord {
            prompt: prompt.to_string(),
            brand: brand.to_string(),
            mentioned,
            position,
            raw: None,
            error: None,
        }
    }

    #[test]
    fn test_header_and_row_shape() {
        let doc = csv_document(&[record("Best CRM?", "Acme", true, 3)]);
        assert_eq!(doc, "Prompt,Brand,Mentioned,Position\n\"Best CRM?\",\"Acme\",Yes,3\n");
    }

    #[test]
    fn test_interior_quotes_are_doubled() {
        let doc = csv_document(&[record("say \"hi\"", "Ac\"me", false, -1)]);
        assert!(doc.contains("\"say \"\"hi\"\"\",\"Ac\"\"me\",No,-1"));
    }

    #[test]
    fn test_non_positive_positions_stay_verbatim() {
        let doc = csv_document(&[record("p", "b", false, 0)]);
        assert!(doc.ends_with("\"p\",\"b\",No,0\n"));
    }

    #[test]
    fn test_commas_and_newlines_survive_quoting() {
        let doc = csv_document(&[record("a, b\nc", "Acme", true, 1)]);
        assert!(doc.contains("\"a, b\nc\",\"Acme\",Yes,1"));
    }

    #[test]
    fn test_export_is_idempotent_for_unchanged_log() {
        let log = vec![record("p1", "b", true, 2), record("p2", "b", false, 0)];
        assert_eq!(csv_document(&log), csv_document(&log));
    }

    #[test]
    fn test_rows_follow_log_order() {
        let log = vec![record("first", "b", true, 1), record("second", "b", false, 0)];
        let doc = csv_document(&log);
        let first = doc.find("first").expect("first row present");
        let second = doc.find("second").expect("second row present");
        assert!(first < second);
    }

    #[test]
    fn test_empty_log_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mentions.csv");
        let out = export_csv(&path, &[]).expect("export");
        assert!(matches!(out, ExportOutcome::EmptyLog));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mentions.csv");
        let out = export_csv(&path, &[record("p", "b", true, 1)]).expect("export");
        assert!(matches!(out, ExportOutcome::Written(ref p) if p == &path));
        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, "Prompt,Brand,Mentioned,Position\n\"p\",\"b\",Yes,1\n");
    }
}
