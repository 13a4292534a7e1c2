//! Export writers. Each writer renders a [`Report`] into an in-memory
//! document; this module then writes it next to the destination and renames
//! it into place, so a failed export never leaves a partial file behind.

mod pdf;
mod xlsx;

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{Error, Result};
use crate::report::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            other => Err(format!(
                "unsupported export format '{other}' (expected pdf or xlsx)"
            )),
        }
    }
}

/// `<reports_dir>/<name>_<YYYYmmdd_HHMMSS>.<ext>`
pub fn default_destination(
    reports_dir: &Path,
    name: &str,
    format: ExportFormat,
    now: NaiveDateTime,
) -> PathBuf {
    reports_dir.join(format!(
        "{name}_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

/// Which face the PDF writer draws text with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PdfFont {
    /// First Unicode TrueType face found in the usual system font folders,
    /// falling back to [`PdfFont::Standard`] when there is none.
    #[default]
    System,
    /// Embed this TrueType file. It is used for headings too.
    File(PathBuf),
    /// Built-in Helvetica. Only Latin-1 text can be drawn.
    Standard,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub pdf_font: PdfFont,
}

/// Render `report` and write it to `destination` with default options.
pub fn export(report: &Report, format: ExportFormat, destination: &Path) -> Result<()> {
    export_with(report, format, destination, &ExportOptions::default())
}

/// Render `report` and write it to `destination`, creating the parent
/// directory when needed.
pub fn export_with(
    report: &Report,
    format: ExportFormat,
    destination: &Path,
    options: &ExportOptions,
) -> Result<()> {
    let bytes = match format {
        ExportFormat::Pdf => pdf::render(report, destination, &options.pdf_font)?,
        ExportFormat::Xlsx => xlsx::render(report, destination)?,
    };
    write_atomically(destination, &bytes)?;
    info!(
        "exported '{}' ({} tables) as {format} to {}",
        report.title,
        report.tables.len(),
        destination.display()
    );
    Ok(())
}

fn write_atomically(destination: &Path, bytes: &[u8]) -> Result<()> {
    let parent = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|err| Error::export(destination, err))?;

    let mut staged =
        NamedTempFile::new_in(parent).map_err(|err| Error::export(destination, err))?;
    staged
        .write_all(bytes)
        .map_err(|err| Error::export(destination, err))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|err| Error::export(destination, err))?;
    staged
        .persist(destination)
        .map_err(|err| Error::export(destination, err.error))?;
    Ok(())
}
