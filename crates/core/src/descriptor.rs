//! Attribute registration: descriptor tables binding keys to accessors.
//!
//! A host type declares its tracked attributes **statically**, as an ordered
//! table of [`AttributeDescriptor`]s. Each descriptor binds a canonical name
//! to the read/write accessor pair the tracker calls into; there is no
//! runtime registration beyond building the table once per host type.

use crate::error::{TrackingError, TrackingResult};
use crate::key::{AttributeKey, KeyRef};

/// One tracked attribute: canonical name plus its accessor pair.
///
/// Accessors are plain fn pointers so tables can live in `static`s. The read
/// accessor returns an owned value; whatever copy depth the host's value type
/// implements for that is the copy depth the tracker records.
pub struct AttributeDescriptor<S, V> {
    name: &'static str,
    read: fn(&S) -> V,
    write: fn(&mut S, V),
}

impl<S, V> AttributeDescriptor<S, V> {
    pub const fn new(name: &'static str, read: fn(&S) -> V, write: fn(&mut S, V)) -> Self {
        Self { name, read, write }
    }

    /// Canonical attribute name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn read(&self, state: &S) -> V {
        (self.read)(state)
    }

    pub(crate) fn write(&self, state: &mut S, value: V) {
        (self.write)(state, value)
    }
}

impl<S, V> core::fmt::Debug for AttributeDescriptor<S, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AttributeDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered table of every tracked attribute of a host state type.
///
/// Built once per host type over a `static` descriptor slice. The table is a
/// cheap `Copy` handle; trackers hold one and resolve every incoming key
/// through it.
pub struct AttributeSet<S: 'static, V: 'static> {
    descriptors: &'static [AttributeDescriptor<S, V>],
}

impl<S, V> AttributeSet<S, V> {
    /// Build the table.
    ///
    /// Panics on duplicate names: two descriptors for one attribute is a
    /// registration bug in the host type, not a runtime condition.
    pub fn new(descriptors: &'static [AttributeDescriptor<S, V>]) -> Self {
        for (i, d) in descriptors.iter().enumerate() {
            if descriptors[..i].iter().any(|prev| prev.name == d.name) {
                panic!("attribute registered twice: {}", d.name);
            }
        }
        Self { descriptors }
    }

    /// Resolve either key form to the interned handle.
    ///
    /// Unknown names and keys minted by a different attribute set both fail;
    /// the latter is checked by comparing the handle's canonical name against
    /// the entry at its index.
    pub fn resolve<'k>(&self, key: impl Into<KeyRef<'k>>) -> TrackingResult<AttributeKey> {
        match key.into() {
            KeyRef::Name(name) => self
                .descriptors
                .iter()
                .position(|d| d.name == name)
                .map(|index| AttributeKey::new(index, self.descriptors[index].name))
                .ok_or_else(|| TrackingError::unknown_attribute(name)),
            KeyRef::Key(key) => match self.descriptors.get(key.index) {
                Some(d) if d.name == key.name => Ok(key),
                _ => Err(TrackingError::foreign_key(key.name)),
            },
        }
    }

    /// Interned handle for a canonical name.
    pub fn key(&self, name: &str) -> TrackingResult<AttributeKey> {
        self.resolve(name)
    }

    pub(crate) fn descriptor(&self, key: AttributeKey) -> &'static AttributeDescriptor<S, V> {
        &self.descriptors[key.index]
    }

    /// Every registered key, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = AttributeKey> + '_ {
        self.descriptors
            .iter()
            .enumerate()
            .map(|(index, d)| AttributeKey::new(index, d.name))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<S, V> Clone for AttributeSet<S, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, V> Copy for AttributeSet<S, V> {}

impl<S, V> core::fmt::Debug for AttributeSet<S, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.descriptors.iter().map(|d| d.name))
            .finish()
    }
}
