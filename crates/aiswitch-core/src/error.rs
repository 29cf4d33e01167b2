//! Error types for aiswitch Core

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("No data: the log entry could not be retrieved")]
    NoData,

    #[error("Malformed log entry: {0}")]
    MalformedLog(String),

    #[error("Unknown sort column: {0}")]
    UnknownSortColumn(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A single form-level problem that blocks submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Override at `index` has an empty key
    EmptyKey { index: usize },

    /// Override at `index` shares its key with another override
    DuplicateKey { index: usize, key: String },

    /// A required form field is empty
    MissingField(&'static str),

    /// An update tried to change a provider's identity
    IdentityChange { original: String, attempted: String },

    /// A preset id that the provider does not have
    UnknownPreset(String),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::EmptyKey { index } => {
                write!(f, "override #{}: key must not be empty", index + 1)
            }
            FieldError::DuplicateKey { index, key } => {
                write!(f, "override #{}: duplicate key '{}'", index + 1, key)
            }
            FieldError::MissingField(field) => write!(f, "{} is required", field),
            FieldError::IdentityChange {
                original,
                attempted,
            } => write!(
                f,
                "provider id cannot change from '{}' to '{}'",
                original, attempted
            ),
            FieldError::UnknownPreset(id) => write!(f, "unknown preset '{}'", id),
        }
    }
}

/// All field errors collected during one submission attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn contains(&self, error: &FieldError) -> bool {
        self.errors.contains(error)
    }

    /// `Ok(())` when nothing was collected, otherwise `Error::Validation`
    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}
