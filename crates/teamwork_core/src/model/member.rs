//! Team member model.

use super::record::{Collection, Entity};
use super::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Roster entry. `name` is unique (case-sensitive) within the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub role: String,
}

impl Entity for Member {
    const COLLECTION: Collection = Collection::Members;

    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyMemberName);
        }
        Ok(())
    }
}

impl Member {
    /// Builds a member from raw form input, trimming both fields.
    pub fn from_input(name: &str, role: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyMemberName);
        }
        Ok(Self {
            name: name.to_string(),
            role: role.trim().to_string(),
        })
    }
}
