//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
    /// The name contains the ` [#` marker that introduces an id in labels.
    #[error("name {0:?} contains the label id marker \" [#\"")]
    IdMarkerInName(String),
}

/// Separates the name from the id in a display label.
const ID_MARKER: &str = " [#";

/// Stable identity of a person in an attendance table.
///
/// The name alone identifies a person unless the table carries a secondary id
/// column, in which case `(name, id)` does. Two keys with the same name but
/// different ids are different people. Names never contain ` [#`, so every
/// key has its own label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonKey {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl PersonKey {
    /// Creates a key after validation. Blank ids are treated as absent.
    pub fn new(name: impl Into<String>, id: Option<String>) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        if name.contains(ID_MARKER) {
            return Err(ValidationError::IdMarkerInName(name));
        }
        let id = id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Ok(Self { name, id })
    }

    /// Creates a key with no secondary id.
    pub fn named(name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(name, None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Display label: `Name` or `Name [#id]`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PersonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}{ID_MARKER}{id}]", self.name),
            None => f.write_str(&self.name),
        }
    }
}
