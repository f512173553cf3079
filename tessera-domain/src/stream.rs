//! Stream handles

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the global pseudo-stream
pub const GLOBAL_STREAM: &str = "all";

/// Handle identifying a named stream or the global log
///
/// # Invariants
/// - Name is never empty or whitespace-only
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Stream {
    name: String,
}

impl Stream {
    /// Create a stream handle with validation
    ///
    /// # Errors
    /// Returns `DomainError::IncorrectStreamData` if the name is blank
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::IncorrectStreamData(
                "Stream name must not be blank".to_string(),
            ));
        }
        Ok(Self { name })
    }

    /// The global pseudo-stream spanning every appended record
    pub fn global() -> Self {
        Self {
            name: GLOBAL_STREAM.to_string(),
        }
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this handle addresses the global log
    pub fn is_global(&self) -> bool {
        self.name == GLOBAL_STREAM
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
