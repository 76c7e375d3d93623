//! Upload sources.
//!
//! An [`Upload`] is the file a user handed in: its name, its declared media
//! type and its bytes. The `spreadsheet` module turns the bytes into rows.

pub mod spreadsheet;

use std::io::Read;
use std::path::Path;

use crate::config::{XLS_MEDIA_TYPE, XLSX_MEDIA_TYPE};
use crate::error::UploadError;

/// Media type used when a file extension is not recognised.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// A file handed in for validation.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read an upload from disk, inferring the media type from the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or exceeds `max_file_size`.
    pub fn from_path(path: &Path, max_file_size: u64) -> Result<Self, UploadError> {
        let bytes = read_file_bounded(path, max_file_size)?;
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, media_type_for(path), bytes))
    }
}

/// Media type for a spreadsheet path, by extension.
#[must_use]
pub fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("xlsx") => XLSX_MEDIA_TYPE,
        Some("xls") => XLS_MEDIA_TYPE,
        _ => UNKNOWN_MEDIA_TYPE,
    }
}

/// Read a file using a bounded read, enforcing `max_file_size`.
///
/// Reads at most `max_file_size + 1` bytes so an oversized file is detected
/// without loading it whole.
///
/// # Errors
///
/// Returns [`UploadError::Io`] on read failure and
/// [`UploadError::FileTooLarge`] when the limit is exceeded.
pub fn read_file_bounded(path: &Path, max_file_size: u64) -> Result<Vec<u8>, UploadError> {
    let file = std::fs::File::open(path)?;

    let mut buffer = Vec::new();
    file.take(max_file_size.saturating_add(1))
        .read_to_end(&mut buffer)?;

    if buffer.len() as u64 > max_file_size {
        return Err(UploadError::FileTooLarge {
            limit: max_file_size,
        });
    }
    Ok(buffer)
}
