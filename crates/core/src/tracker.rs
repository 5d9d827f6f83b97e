//! Per-instance change tracking state.
//!
//! A [`ChangeTracker`] answers "which attributes changed since the last
//! commit, and what were their prior values?" for one host object. It owns
//! two pieces of state: the in-flight dirty set (attribute -> value before
//! the first uncommitted mark) and the snapshot produced by the last commit.
//! The tracker never compares values and never decides *when* an attribute
//! changed; the host's setters call the mark primitives.
//!
//! Single-threaded, synchronous, no IO. Callers serialize access together
//! with the live state the tracker shadows.

use serde::Serialize;
use tracing::{debug, trace};

use crate::descriptor::AttributeSet;
use crate::error::TrackingResult;
use crate::key::{AttributeKey, KeyRef};

/// An in-flight change: the value before the first mark and the live value.
///
/// `current` is read through the live accessor at query time, never cached,
/// so it reflects in-place mutation done after the mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeChange<V> {
    pub original: V,
    pub current: V,
}

/// One entry of the snapshot produced by the last commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommittedChange<V> {
    key: AttributeKey,
    original: V,
    committed: V,
}

impl<V> CommittedChange<V> {
    pub fn key(&self) -> AttributeKey {
        self.key
    }

    /// Value the attribute held when it was first marked in the committed
    /// window.
    pub fn original(&self) -> &V {
        &self.original
    }

    /// Value the attribute held at commit time.
    pub fn committed(&self) -> &V {
        &self.committed
    }
}

/// Change tracking state for one host object instance.
///
/// Created empty alongside its host and destroyed with it. The two-phase
/// cycle is: setters mark attributes dirty, a commit ([`apply_changes`])
/// moves the dirty set into the previous-changes snapshot and clears it.
/// There are no intermediate states.
///
/// `S` is the host's attribute storage, `V` the attribute value
/// representation. `V`'s `Clone` is the host-supplied copy strategy: the
/// original recorded at first mark is an independent copy exactly as deep as
/// that `Clone`.
///
/// [`apply_changes`]: ChangeTracker::apply_changes
pub struct ChangeTracker<S: 'static, V: 'static> {
    attributes: AttributeSet<S, V>,
    /// Dirty set, in first-marked order. The stored value is the original.
    changed: Vec<(AttributeKey, V)>,
    /// Snapshot of the last commit. Replaced wholesale, never merged.
    committed: Vec<CommittedChange<V>>,
}

impl<S: 'static, V: Clone + 'static> ChangeTracker<S, V> {
    pub fn new(attributes: AttributeSet<S, V>) -> Self {
        Self {
            attributes,
            changed: Vec::new(),
            committed: Vec::new(),
        }
    }

    /// The attribute set this tracker resolves keys against.
    pub fn attributes(&self) -> AttributeSet<S, V> {
        self.attributes
    }

    fn original_for(&self, key: AttributeKey) -> Option<&V> {
        self.changed.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Unconditionally mark an attribute dirty.
    ///
    /// The first mark in a window captures the current live value (read via
    /// the registered accessor) as the original. Re-marking an already dirty
    /// attribute is a no-op; the first-seen original stands. No value
    /// comparison happens here -- a caller that wants "same value, no
    /// change" semantics compares before calling, or uses
    /// [`mark_changed_if_different`].
    ///
    /// [`mark_changed_if_different`]: ChangeTracker::mark_changed_if_different
    pub fn mark_changed<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        state: &S,
    ) -> TrackingResult<()> {
        let key = self.attributes.resolve(key)?;
        if self.original_for(key).is_some() {
            return Ok(());
        }
        let original = self.attributes.descriptor(key).read(state);
        trace!(attribute = key.name(), "attribute marked changed");
        self.changed.push((key, original));
        Ok(())
    }

    /// Mark an attribute dirty only when `new_value` differs from the
    /// current live value.
    ///
    /// Caller-side sugar over [`mark_changed`]; the unconditional primitive
    /// remains the contract, and hosts whose value type has no meaningful
    /// equality simply never call this.
    ///
    /// [`mark_changed`]: ChangeTracker::mark_changed
    pub fn mark_changed_if_different<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        state: &S,
        new_value: &V,
    ) -> TrackingResult<()>
    where
        V: PartialEq,
    {
        let key = self.attributes.resolve(key)?;
        if self.attributes.descriptor(key).read(state) != *new_value {
            self.mark_changed(key, state)?;
        }
        Ok(())
    }

    /// Whether the attribute has been marked dirty since the last commit.
    pub fn is_changed<'k>(&self, key: impl Into<KeyRef<'k>>) -> TrackingResult<bool> {
        let key = self.attributes.resolve(key)?;
        Ok(self.original_for(key).is_some())
    }

    /// Whether anything at all is dirty.
    pub fn any_changed(&self) -> bool {
        !self.changed.is_empty()
    }

    /// Dirty attribute keys, in first-marked order.
    pub fn changed_keys(&self) -> impl Iterator<Item = AttributeKey> + '_ {
        self.changed.iter().map(|(key, _)| *key)
    }

    /// `(original, current)` for a dirty attribute, `None` when clean.
    pub fn change_for<'k>(
        &self,
        key: impl Into<KeyRef<'k>>,
        state: &S,
    ) -> TrackingResult<Option<AttributeChange<V>>> {
        let key = self.attributes.resolve(key)?;
        Ok(self.original_for(key).map(|original| AttributeChange {
            original: original.clone(),
            current: self.attributes.descriptor(key).read(state),
        }))
    }

    /// All in-flight changes, in first-marked order, with live currents.
    pub fn changes(&self, state: &S) -> Vec<(AttributeKey, AttributeChange<V>)> {
        self.changed
            .iter()
            .map(|(key, original)| {
                (
                    *key,
                    AttributeChange {
                        original: original.clone(),
                        current: self.attributes.descriptor(*key).read(state),
                    },
                )
            })
            .collect()
    }

    /// What the attribute "was": the recorded original when dirty, the live
    /// value when clean.
    pub fn original_value<'k>(
        &self,
        key: impl Into<KeyRef<'k>>,
        state: &S,
    ) -> TrackingResult<V> {
        let key = self.attributes.resolve(key)?;
        Ok(match self.original_for(key) {
            Some(original) => original.clone(),
            None => self.attributes.descriptor(key).read(state),
        })
    }

    /// Restore a dirty attribute's live value to its recorded original and
    /// clear its dirtiness. No-op when the attribute is clean.
    ///
    /// The write and the dirty-set removal happen together, so the tracker
    /// and the live value cannot end up disagreeing.
    pub fn reset_attribute<'k>(
        &mut self,
        key: impl Into<KeyRef<'k>>,
        state: &mut S,
    ) -> TrackingResult<()> {
        let key = self.attributes.resolve(key)?;
        if let Some(pos) = self.changed.iter().position(|(k, _)| *k == key) {
            let (_, original) = self.changed.remove(pos);
            self.attributes.descriptor(key).write(state, original);
            debug!(attribute = key.name(), "attribute reset to original");
        }
        Ok(())
    }

    /// Restore every dirty attribute to its recorded original and clear the
    /// dirty set.
    pub fn restore_attributes(&mut self, state: &mut S) {
        let attributes = self.attributes;
        let restored = self.changed.len();
        for (key, original) in std::mem::take(&mut self.changed) {
            attributes.descriptor(key).write(state, original);
        }
        if restored > 0 {
            debug!(restored, "dirty attributes restored");
        }
    }

    /// Commit: replace the previous-changes snapshot with
    /// `key -> (original, value at commit time)` for every dirty attribute,
    /// then clear the dirty set.
    ///
    /// Afterwards nothing is dirty and the snapshot exposes exactly the
    /// just-committed diff. The snapshot is replaced even when the dirty set
    /// was empty.
    pub fn apply_changes(&mut self, state: &S) {
        let attributes = self.attributes;
        self.committed = self
            .changed
            .drain(..)
            .map(|(key, original)| CommittedChange {
                key,
                committed: attributes.descriptor(key).read(state),
                original,
            })
            .collect();
        debug!(committed = self.committed.len(), "changes applied");
    }

    /// Forget all in-flight dirtiness without touching live values and
    /// without committing. The previous-changes snapshot is untouched.
    pub fn clear_changes(&mut self) {
        self.changed.clear();
    }

    /// The committed `(original, value at commit time)` entry for an
    /// attribute, `None` when it was not part of the last commit.
    pub fn previous_change_for<'k>(
        &self,
        key: impl Into<KeyRef<'k>>,
    ) -> TrackingResult<Option<&CommittedChange<V>>> {
        let key = self.attributes.resolve(key)?;
        Ok(self.committed.iter().find(|c| c.key == key))
    }

    /// The full snapshot of the last commit, in the first-marked order of
    /// the committed window.
    pub fn previous_changes(&self) -> &[CommittedChange<V>] {
        &self.committed
    }
}

impl<S, V: core::fmt::Debug> core::fmt::Debug for ChangeTracker<S, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChangeTracker")
            .field("changed", &self.changed)
            .field("committed", &self.committed)
            .finish()
    }
}
