//! Error types for the Nutanix provider helpers

use thiserror::Error;

/// Result type alias using the provider Error
pub type Result<T> = std::result::Result<T, Error>;

/// Provider helper error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Missing attribute: {block}.{attribute} must be set to a string")]
    MissingAttribute { block: String, attribute: String },
}

impl Error {
    pub fn missing(block: impl Into<String>, attribute: impl Into<String>) -> Self {
        Error::MissingAttribute {
            block: block.into(),
            attribute: attribute.into(),
        }
    }
}
