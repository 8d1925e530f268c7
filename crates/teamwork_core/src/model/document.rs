//! Shared document model.
//!
//! # Responsibility
//! - Define the persisted document payload (metadata plus encoded data).
//! - Provide display helpers for sizes and file kinds.

use super::record::{Collection, Entity};
use serde::{Deserialize, Serialize};

/// Persisted document payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub title: String,
    pub file_name: String,
    /// MIME type reported for the file; empty when unknown.
    #[serde(default)]
    pub file_type: String,
    /// Raw payload size in bytes.
    pub size: u64,
    pub uploaded_by: String,
    /// Encoded payload (data URL by default).
    pub data: String,
}

impl Entity for Document {
    const COLLECTION: Collection = Collection::Documents;
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_mime(&self.file_type)
    }
}

/// Raw file handed to the upload flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub file_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        file_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_type: file_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Coarse file category used for icons and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
    Other,
}

impl DocumentKind {
    pub fn from_mime(mime: &str) -> Self {
        if mime.contains("pdf") {
            Self::Pdf
        } else if mime.contains("image") {
            Self::Image
        } else {
            Self::Other
        }
    }
}

/// Human-readable size: `N bytes`, `N.N KB` or `N.N MB`.
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    if bytes < KIB {
        format!("{bytes} bytes")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}
