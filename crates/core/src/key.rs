//! Interned attribute keys.
//!
//! Attribute names are canonicalized at registration into an
//! [`AttributeKey`]: the table index plus the canonical `&'static str` name.
//! API operations accept either the raw string form or a pre-resolved key;
//! both resolve to the same table entry, so callers never observe different
//! results depending on which form they used.

use serde::{Serialize, Serializer};

/// Interned handle to a tracked attribute.
///
/// Obtained from an attribute set. Pairs the canonical name with the table
/// index so repeated lookups skip the name scan. Prefer passing these around
/// for hot paths; raw strings resolve to the same entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AttributeKey {
    pub(crate) index: usize,
    pub(crate) name: &'static str,
}

impl AttributeKey {
    pub(crate) fn new(index: usize, name: &'static str) -> Self {
        Self { index, name }
    }

    /// Canonical attribute name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl core::fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(self.name, f)
    }
}

impl Serialize for AttributeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// Either form a caller may use to address an attribute.
///
/// Raw strings resolve by canonical name; keys resolve by index (with a
/// consistency check against the set they are presented to). Internal storage
/// only ever carries the interned form.
#[derive(Debug, Copy, Clone)]
pub enum KeyRef<'a> {
    /// Canonical string form.
    Name(&'a str),
    /// Pre-resolved interned form.
    Key(AttributeKey),
}

impl<'a> From<&'a str> for KeyRef<'a> {
    fn from(name: &'a str) -> Self {
        KeyRef::Name(name)
    }
}

impl<'a> From<&'a String> for KeyRef<'a> {
    fn from(name: &'a String) -> Self {
        KeyRef::Name(name.as_str())
    }
}

impl From<AttributeKey> for KeyRef<'static> {
    fn from(key: AttributeKey) -> Self {
        KeyRef::Key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_displays_as_its_canonical_name() {
        let key = AttributeKey::new(0, "name");
        assert_eq!(key.to_string(), "name");
        assert_eq!(key.name(), "name");
    }

    #[test]
    fn key_serializes_as_a_plain_string() {
        let key = AttributeKey::new(2, "email");
        let json = serde_json::to_value(key).unwrap();
        assert_eq!(json, serde_json::json!("email"));
    }
}
