//! Change tracking as a reusable record capability.

use crate::error::TrackingResult;
use crate::key::{AttributeKey, KeyRef};
use crate::tracker::{AttributeChange, ChangeTracker, CommittedChange};

/// Capability trait for a record-like host that owns a [`ChangeTracker`].
///
/// Hosts keep their live attribute storage and tracker side by side and
/// implement the two part-accessors; everything else arrives as provided
/// methods. The `_mut` accessor returns both halves from one `&mut self`
/// borrow, which is what lets a provided method read live values while
/// mutating tracker state.
pub trait TrackChanges {
    /// Live attribute storage the registered accessors read and write.
    type State: 'static;
    /// Attribute value representation; its `Clone` is the copy strategy
    /// applied when an original is captured.
    type Value: Clone + 'static;

    fn tracking_parts(&self) -> (&ChangeTracker<Self::State, Self::Value>, &Self::State);

    fn tracking_parts_mut(
        &mut self,
    ) -> (&mut ChangeTracker<Self::State, Self::Value>, &mut Self::State);

    /// Whether the attribute has been marked dirty since the last commit.
    fn is_changed<'k>(&self, key: impl Into<KeyRef<'k>>) -> TrackingResult<bool> {
        let (tracker, _) = self.tracking_parts();
        tracker.is_changed(key)
    }

    /// Whether anything at all is dirty.
    fn any_changed(&self) -> bool {
        let (tracker, _) = self.tracking_parts();
        tracker.any_changed()
    }

    /// Dirty attribute keys, in first-marked order.
    fn changed_keys(&self) -> Vec<AttributeKey> {
        let (tracker, _) = self.tracking_parts();
        tracker.changed_keys().collect()
    }

    /// `(original, current)` for a dirty attribute, `None` when clean.
    fn change_for<'k>(
        &self,
        key: impl Into<KeyRef<'k>>,
    ) -> TrackingResult<Option<AttributeChange<Self::Value>>> {
        let (tracker, state) = self.tracking_parts();
        tracker.change_for(key, state)
    }

    /// All in-flight changes, in first-marked order.
    fn changes(&self) -> Vec<(AttributeKey, AttributeChange<Self::Value>)> {
        let (tracker, state) = self.tracking_parts();
        tracker.changes(state)
    }

    /// The recorded original when dirty, the live value when clean.
    fn original_value<'k>(&self, key: impl Into<KeyRef<'k>>) -> TrackingResult<Self::Value> {
        let (tracker, state) = self.tracking_parts();
        tracker.original_value(key, state)
    }

    /// Unconditionally mark an attribute dirty.
    fn mark_changed<'k>(&mut self, key: impl Into<KeyRef<'k>>) -> TrackingResult<()> {
        let (tracker, state) = self.tracking_parts_mut();
        tracker.mark_changed(key, state)
    }

    /// Restore a dirty attribute to its original and clear its dirtiness.
    fn reset_attribute<'k>(&mut self, key: impl Into<KeyRef<'k>>) -> TrackingResult<()> {
        let (tracker, state) = self.tracking_parts_mut();
        tracker.reset_attribute(key, state)
    }

    /// Restore every dirty attribute to its original.
    fn restore_attributes(&mut self) {
        let (tracker, state) = self.tracking_parts_mut();
        tracker.restore_attributes(state);
    }

    /// Commit the current window into the previous-changes snapshot.
    fn apply_changes(&mut self) {
        let (tracker, state) = self.tracking_parts_mut();
        tracker.apply_changes(state);
    }

    /// Forget in-flight dirtiness without committing or touching values.
    fn clear_changes(&mut self) {
        let (tracker, _) = self.tracking_parts_mut();
        tracker.clear_changes();
    }

    /// The committed entry for an attribute from the last commit.
    fn previous_change_for<'k>(
        &self,
        key: impl Into<KeyRef<'k>>,
    ) -> TrackingResult<Option<CommittedChange<Self::Value>>> {
        let (tracker, _) = self.tracking_parts();
        Ok(tracker.previous_change_for(key)?.cloned())
    }

    /// The full snapshot of the last commit.
    fn previous_changes(&self) -> Vec<CommittedChange<Self::Value>> {
        let (tracker, _) = self.tracking_parts();
        tracker.previous_changes().to_vec()
    }
}
