//! PDF text extraction.
//!
//! Thin adapter over the `pdf_extract` crate. Validation mirrors the CLI
//! contract: the path must carry a `.pdf` extension and exist on disk
//! before extraction is attempted.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("not a PDF file: {0}")]
    NotAPdf(PathBuf),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Extracts the full text of a PDF document.
///
/// The returned text may still be empty (a scanned PDF with no text
/// layer); the chunker reports that case as unusable input downstream.
pub fn extract_pdf_text(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if !is_pdf {
        return Err(ExtractError::NotAPdf(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ExtractError::FileNotFound(path.to_path_buf()));
    }

    pdf_extract::extract_text(path).map_err(|e| ExtractError::Extraction(e.to_string()))
}
