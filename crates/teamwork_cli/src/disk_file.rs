//! Upload sources backed by files on disk.

use std::fs;
use std::path::{Path, PathBuf};
use teamwork_core::{ExternalError, UploadFile, UploadSource};

/// A file path resolved lazily: sized from metadata, read only on `load`.
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    file_name: String,
    file_type: String,
}

impl DiskFile {
    /// `file_type` overrides the MIME type guessed from the extension.
    pub fn new(path: &Path, file_type: Option<&str>) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file_type = file_type.map_or_else(|| guess_mime(path).to_string(), str::to_string);
        Self {
            path: path.to_path_buf(),
            file_name,
            file_type,
        }
    }

    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    fn io_error(&self, err: std::io::Error) -> ExternalError {
        ExternalError::new(format!("cannot read `{}`: {err}", self.path.display()))
    }
}

impl UploadSource for DiskFile {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn size(&self) -> Result<u64, ExternalError> {
        let metadata = fs::metadata(&self.path).map_err(|err| self.io_error(err))?;
        if !metadata.is_file() {
            return Err(ExternalError::new(format!(
                "`{}` is not a regular file",
                self.path.display()
            )));
        }
        Ok(metadata.len())
    }

    fn load(&self) -> Result<UploadFile, ExternalError> {
        let bytes = fs::read(&self.path).map_err(|err| self.io_error(err))?;
        Ok(UploadFile::new(
            self.file_name.clone(),
            self.file_type.clone(),
            bytes,
        ))
    }
}

fn guess_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "txt" | "md" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::{guess_mime, DiskFile};
    use std::path::Path;
    use teamwork_core::UploadSource;

    #[test]
    fn guess_mime_falls_back_to_empty() {
        assert_eq!(guess_mime(Path::new("Report.PDF")), "application/pdf");
        assert_eq!(guess_mime(Path::new("archive.tar.xz")), "");
        assert_eq!(guess_mime(Path::new("README")), "");
    }

    #[test]
    fn explicit_type_wins_over_extension() {
        let file = DiskFile::new(Path::new("/tmp/a.pdf"), Some("text/plain"));
        assert_eq!(file.file_type(), "text/plain");
        assert_eq!(file.file_name(), "a.pdf");
    }

    #[test]
    fn size_comes_from_metadata_and_missing_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        assert_eq!(DiskFile::new(&path, None).size().unwrap(), 5);
        let loaded = DiskFile::new(&path, None).load().unwrap();
        assert_eq!(loaded.file_type, "text/plain");
        assert_eq!(loaded.bytes, b"hello");

        let missing = DiskFile::new(&dir.path().join("gone.txt"), None);
        assert!(missing.size().is_err());
        assert!(DiskFile::new(dir.path(), None).size().is_err());
    }
}
