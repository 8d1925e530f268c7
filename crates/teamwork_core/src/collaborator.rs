//! Contracts for the interactive and external collaborators the services
//! depend on.
//!
//! # Responsibility
//! - Describe member selection, confirmation, payload encoding and quote
//!   fetching as blocking calls that either succeed or fail.
//! - Ship the default data-URL payload encoder.
//!
//! # Invariants
//! - A collaborator answering "none"/"cancel" aborts the dependent operation
//!   with no side effect.

use crate::model::document::UploadFile;
use crate::model::member::Member;
use crate::model::record::Record;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Picks one member name from the roster, or `None` when nothing is chosen.
pub trait MemberSelector {
    fn select_member(&self, prompt: &str, roster: &[Record<Member>]) -> Option<String>;
}

/// Yes/no prompt guarding destructive operations.
pub trait Confirmation {
    fn confirm(&self, message: &str) -> bool;
}

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalError {
    pub message: String,
}

impl ExternalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ExternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ExternalError {}

/// Turns a raw file into the text blob persisted in `Document::data`.
pub trait PayloadEncoder {
    fn encode(&self, file: &UploadFile) -> Result<String, ExternalError>;
}

/// Encodes payloads as `data:<mime>;base64,<payload>` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlEncoder;

impl PayloadEncoder for DataUrlEncoder {
    fn encode(&self, file: &UploadFile) -> Result<String, ExternalError> {
        let mime = if file.file_type.trim().is_empty() {
            "application/octet-stream"
        } else {
            file.file_type.trim()
        };
        Ok(format!("data:{mime};base64,{}", STANDARD.encode(&file.bytes)))
    }
}

/// A file waiting to be uploaded whose bytes may not be loaded yet.
pub trait UploadSource {
    fn file_name(&self) -> &str;

    /// Payload size in bytes, known without loading the payload.
    fn size(&self) -> Result<u64, ExternalError>;

    fn load(&self) -> Result<UploadFile, ExternalError>;
}

impl UploadSource for UploadFile {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn size(&self) -> Result<u64, ExternalError> {
        Ok(UploadFile::size(self))
    }

    fn load(&self) -> Result<UploadFile, ExternalError> {
        Ok(self.clone())
    }
}

/// Motivational quote shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub message: String,
    pub author: String,
}

impl Quote {
    pub fn new(message: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            author: author.into(),
        }
    }
}

/// Remote source of quotes; may be unreachable.
pub trait QuoteProvider {
    fn fetch_quote(&self) -> Result<Quote, ExternalError>;
}

/// Always answers with the same value; handy for scripted callers.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirmation for AutoConfirm {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

/// Selects a fixed member name without prompting, if it is on the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSelection(pub Option<String>);

impl FixedSelection {
    pub fn member(name: impl Into<String>) -> Self {
        Self(Some(name.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl MemberSelector for FixedSelection {
    fn select_member(&self, _prompt: &str, roster: &[Record<Member>]) -> Option<String> {
        let name = self.0.as_deref()?;
        roster
            .iter()
            .any(|member| member.name == name)
            .then(|| name.to_string())
    }
}
