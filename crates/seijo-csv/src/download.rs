//! Byte-blob download boundary.
//!
//! Hosts hand over a [`Downloader`]; the crate only decides the file name,
//! bytes and MIME type. [`FileDownloader`] saves into a directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use seijo_core::{today_ymd, Question, Result, SeijoError};

use crate::codec::bank_to_csv;

/// Default MIME type for [`download_text`].
pub const TEXT_MIME: &str = "text/plain";

// ---------------------------------------------------------------------------
// Downloader trait
// ---------------------------------------------------------------------------

/// Host capability that delivers a named blob to the user.
pub trait Downloader {
    fn save(&self, name: &str, bytes: &[u8], mime: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileDownloader
// ---------------------------------------------------------------------------

/// Writes each download as a file inside `dir`.
#[derive(Debug, Clone)]
pub struct FileDownloader {
    dir: PathBuf,
}

impl FileDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Downloader for FileDownloader {
    fn save(&self, name: &str, bytes: &[u8], mime: &str) -> Result<()> {
        // Names come from the host UI; refuse anything that would leave `dir`.
        let file_name = Path::new(name)
            .file_name()
            .filter(|f| *f == name)
            .ok_or_else(|| SeijoError::InvalidInput(format!("invalid download name: {name}")))?;

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)?;
        info!(path = %path.display(), mime, size = bytes.len(), "download saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CsvConfig
// ---------------------------------------------------------------------------

/// Naming and typing of CSV exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvConfig {
    /// Default: `"seijo_bank.csv"`.
    pub file_name: String,
    /// Default: `"text/csv"`.
    pub mime: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            file_name: "seijo_bank.csv".to_string(),
            mime: "text/csv".to_string(),
        }
    }
}

impl CsvConfig {
    /// Export named after today's date, e.g. `seijo_bank_20260115.csv`.
    pub fn dated() -> Self {
        Self {
            file_name: format!("seijo_bank_{}.csv", today_ymd()),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Deliver `text` as UTF-8 bytes.
pub fn download_text<D: Downloader + ?Sized>(
    downloader: &D,
    file_name: &str,
    text: &str,
    mime: &str,
) -> Result<()> {
    downloader.save(file_name, text.as_bytes(), mime)
}

/// Normalize and encode `bank`, then deliver it as a CSV file.
pub fn export_bank<D: Downloader + ?Sized>(
    downloader: &D,
    bank: &[Question],
    config: &CsvConfig,
) -> Result<()> {
    let csv = bank_to_csv(bank);
    download_text(downloader, &config.file_name, &csv, &config.mime)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
