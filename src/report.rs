// Report writers. The JSON and PDF reports are written independently; a
// failure of one never touches the other file.

use crate::error::ScanError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const JSON_REPORT_FILE: &str = "mob_sf_report.json";
pub const PDF_REPORT_FILE: &str = "mob_sf_report.pdf";

/// Write `report` pretty-printed (four-space indent) to
/// `<output_dir>/mob_sf_report.json`, creating the directory if needed.
pub fn save_json_report(report: &Value, output_dir: &Path) -> Result<PathBuf, ScanError> {
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    report.serialize(&mut ser)?;
    write_report(output_dir, JSON_REPORT_FILE, &buf)
}

/// Write the raw PDF bytes to `<output_dir>/mob_sf_report.pdf`.
pub fn save_pdf_report(pdf: &[u8], output_dir: &Path) -> Result<PathBuf, ScanError> {
    write_report(output_dir, PDF_REPORT_FILE, pdf)
}

fn write_report(output_dir: &Path, file_name: &str, contents: &[u8]) -> Result<PathBuf, ScanError> {
    fs::create_dir_all(output_dir).map_err(|e| ScanError::io(output_dir, e))?;
    let path = output_dir.join(file_name);
    fs::write(&path, contents).map_err(|e| ScanError::io(&path, e))?;
    debug!(path = %path.display(), bytes = contents.len(), "report written");
    Ok(path)
}
