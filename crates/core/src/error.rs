//! Tracking error model.

use thiserror::Error;

/// Result type used across the tracking engine.
pub type TrackingResult<T> = Result<T, TrackingError>;

/// Tracking-level error.
///
/// Every variant signals a misconfigured host object. None of these are
/// recoverable at the call site; they indicate a bug in the host's attribute
/// registration, so operations fail fast instead of silently ignoring the key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackingError {
    /// An operation was invoked with an attribute name the host never
    /// registered. Silently accepting it would mask typos that disable
    /// change tracking for that attribute.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// A pre-resolved attribute key was presented to a tracker whose
    /// attribute set does not contain it (handle from a different host type).
    #[error("attribute key belongs to a different attribute set: {0}")]
    ForeignKey(String),
}

impl TrackingError {
    pub fn unknown_attribute(name: impl Into<String>) -> Self {
        Self::UnknownAttribute(name.into())
    }

    pub fn foreign_key(name: impl Into<String>) -> Self {
        Self::ForeignKey(name.into())
    }
}
