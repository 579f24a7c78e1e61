//! Nutanix Common Library
//!
//! Shared v3 API types and the error type used by the provider helpers.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;

