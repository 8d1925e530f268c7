//! Runtime limits for storage and uploads.
//!
//! Both limits mirror the browser-storage budget the data set was designed
//! around: a few MiB of total state, with small individual attachments.

/// Default total byte budget for all persisted collections.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;
/// Default per-file upload cap.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 300 * 1024;

/// Key-value store limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Sum of key and value bytes the store may hold.
    pub quota_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

/// Upload acceptance rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Files strictly larger than this are rejected.
    pub max_file_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn accepts(&self, size: u64) -> bool {
        size <= self.max_file_bytes
    }
}
