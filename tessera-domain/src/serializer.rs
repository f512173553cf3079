//! Payload serialization capability
//!
//! The repository never interprets `data` or `metadata`. It only passes them
//! through an injected [`Serializer`] on the way in (`dump`) and out (`load`).

use crate::error::DomainError;
use bytes::Bytes;

/// Converts payloads to and from their stored form
pub trait Serializer: Send + Sync {
    /// Encode a payload for storage
    fn dump(&self, value: &Bytes) -> Result<Bytes, DomainError>;

    /// Decode a stored payload
    fn load(&self, value: &Bytes) -> Result<Bytes, DomainError>;
}

/// Identity serializer; stored payloads are the caller's bytes as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSerializer;

impl Serializer for NullSerializer {
    fn dump(&self, value: &Bytes) -> Result<Bytes, DomainError> {
        Ok(value.clone())
    }

    fn load(&self, value: &Bytes) -> Result<Bytes, DomainError> {
        Ok(value.clone())
    }
}
