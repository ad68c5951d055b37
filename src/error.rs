//! The errors that can occur while ingesting tables, downloading rows and repairing output.

use std::path::PathBuf;
use thiserror::Error;

/// A table could not be split into header and rows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The table holds no non-blank line to read a header from.
    #[error("The table has no header row")]
    MissingHeader,
    /// A quoted field is still open at the end of its line.
    #[error("Unterminated quoted field on line {line}")]
    UnterminatedQuote { line: usize },
    /// A data row has more fields than the header names.
    #[error("Expected {expected} fields on line {line}, saw {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// A parsed table lacks a column the downloader needs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Required column '{0}' is missing")]
    MissingColumn(&'static str),
}

/// Why a whole table was skipped.
#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Failed to read the table: {0}")]
    Io(#[from] std::io::Error),
}

/// Why one row was not downloaded.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Both quality attempts failed.
    #[error("Both attempts failed for {url} (precise: {precise}; best-effort: {best_effort})")]
    EngineFailure {
        url: String,
        precise: sheetdl_engines::error::Error,
        best_effort: sheetdl_engines::error::Error,
    },
    /// The engine reported success but left nothing under the temp name.
    #[error("No downloaded file was found for {filename}")]
    ArtifactMissing { filename: String },
    /// The requested file name cannot be turned into a temp name.
    #[error("Invalid output file name '{0}'")]
    InvalidFilename(String),
    /// Listing the output directory for temp artifacts failed.
    #[error("Failed to scan the output directory: {0}")]
    Scan(sheetdl_engines::error::Error),
    /// Moving the download to its final name failed.
    #[error("Failed to place the download: {0}")]
    Placement(#[from] std::io::Error),
}

/// Why the repair pass could not run.
#[derive(Debug, Error)]
pub enum RepairError {
    #[error("Output directory {0:?} does not exist")]
    DirectoryMissing(PathBuf),
    #[error("Failed to scan the output directory: {0}")]
    Scan(#[from] sheetdl_engines::error::Error),
}
