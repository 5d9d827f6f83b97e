use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use dirtytrack_core::{
    AttributeChange, AttributeDescriptor, AttributeSet, ChangeTracker, TrackChanges,
    TrackingResult,
};

/// Contact identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(Uuid);

impl ContactId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl core::fmt::Display for ContactId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Live attribute storage for a contact.
///
/// Attributes are loosely typed `serde_json::Value`s, the shape a read model
/// or import pipeline hands over before any schema is enforced. Unset
/// attributes are `Null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub name: Value,
    pub email: Value,
    pub visits: Value,
    pub last_seen_at: Value,
}

impl Default for ContactFields {
    fn default() -> Self {
        Self {
            name: Value::Null,
            email: Value::Null,
            visits: Value::Null,
            last_seen_at: Value::Null,
        }
    }
}

static CONTACT_ATTRIBUTES: &[AttributeDescriptor<ContactFields, Value>] = &[
    AttributeDescriptor::new("name", |f| f.name.clone(), |f, v| f.name = v),
    AttributeDescriptor::new("email", |f| f.email.clone(), |f, v| f.email = v),
    AttributeDescriptor::new("visits", |f| f.visits.clone(), |f, v| f.visits = v),
    AttributeDescriptor::new(
        "last_seen_at",
        |f| f.last_seen_at.clone(),
        |f, v| f.last_seen_at = v,
    ),
];

/// A record-like host with tracked attributes.
///
/// The setters show both caller patterns the engine supports: `set_name`
/// marks unconditionally (assigning an equal value still records a change),
/// while `set_email` and `record_visit` compare first, so equal assignments
/// leave the dirty set untouched.
#[derive(Debug)]
pub struct Contact {
    id: ContactId,
    fields: ContactFields,
    tracker: ChangeTracker<ContactFields, Value>,
}

impl Contact {
    pub fn new(id: ContactId) -> Self {
        Self {
            id,
            fields: ContactFields::default(),
            tracker: ChangeTracker::new(AttributeSet::new(CONTACT_ATTRIBUTES)),
        }
    }

    pub fn id(&self) -> ContactId {
        self.id
    }

    pub fn name(&self) -> &Value {
        &self.fields.name
    }

    pub fn email(&self) -> &Value {
        &self.fields.email
    }

    pub fn visits(&self) -> &Value {
        &self.fields.visits
    }

    pub fn last_seen_at(&self) -> &Value {
        &self.fields.last_seen_at
    }

    pub fn fields(&self) -> &ContactFields {
        &self.fields
    }

    /// Assign `name`, always recording a change.
    pub fn set_name(&mut self, name: Value) -> TrackingResult<()> {
        self.tracker.mark_changed("name", &self.fields)?;
        self.fields.name = name;
        Ok(())
    }

    /// Assign `email`; an equal value is not recorded as a change.
    pub fn set_email(&mut self, email: Value) -> TrackingResult<()> {
        self.tracker
            .mark_changed_if_different("email", &self.fields, &email)?;
        self.fields.email = email;
        Ok(())
    }

    /// Bump the visit counter (unset counts as zero).
    pub fn record_visit(&mut self) -> TrackingResult<()> {
        let next = json!(self.fields.visits.as_i64().unwrap_or(0) + 1);
        self.tracker
            .mark_changed_if_different("visits", &self.fields, &next)?;
        self.fields.visits = next;
        Ok(())
    }

    /// Stamp the last-seen time.
    pub fn touch(&mut self, at: DateTime<Utc>) -> TrackingResult<()> {
        let stamp = json!(at.to_rfc3339());
        self.tracker
            .mark_changed_if_different("last_seen_at", &self.fields, &stamp)?;
        self.fields.last_seen_at = stamp;
        Ok(())
    }

    /// Commit hook. A persistence layer would write
    /// [`previous_changes`](TrackChanges::previous_changes) after this.
    pub fn save(&mut self) {
        self.apply_changes();
    }

    // Conventional per-attribute conveniences. These belong to the host, not
    // the engine; `name` gets the full set as the worked example.

    pub fn name_changed(&self) -> TrackingResult<bool> {
        self.is_changed("name")
    }

    pub fn name_change(&self) -> TrackingResult<Option<AttributeChange<Value>>> {
        self.change_for("name")
    }

    pub fn name_was(&self) -> TrackingResult<Value> {
        self.original_value("name")
    }

    pub fn reset_name(&mut self) -> TrackingResult<()> {
        self.reset_attribute("name")
    }
}

impl TrackChanges for Contact {
    type State = ContactFields;
    type Value = Value;

    fn tracking_parts(&self) -> (&ChangeTracker<ContactFields, Value>, &ContactFields) {
        (&self.tracker, &self.fields)
    }

    fn tracking_parts_mut(
        &mut self,
    ) -> (&mut ChangeTracker<ContactFields, Value>, &mut ContactFields) {
        (&mut self.tracker, &mut self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirtytrack_core::TrackingError;

    fn test_contact() -> Contact {
        Contact::new(ContactId::new())
    }

    #[test]
    fn setting_an_attribute_results_in_a_change() {
        let mut contact = test_contact();
        assert!(!contact.any_changed());
        assert!(!contact.name_changed().unwrap());

        contact.set_name(json!("Ringo")).unwrap();
        assert!(contact.any_changed());
        assert!(contact.name_changed().unwrap());
    }

    #[test]
    fn changed_keys_list_dirty_attributes() {
        let mut contact = test_contact();
        assert!(contact.changed_keys().is_empty());

        contact.set_name(json!("Paul")).unwrap();
        let keys: Vec<_> = contact.changed_keys().iter().map(|k| k.name()).collect();
        assert_eq!(keys, vec!["name"]);
    }

    #[test]
    fn change_pairs_run_from_original_to_current() {
        let mut contact = test_contact();
        assert!(contact.name_change().unwrap().is_none());

        contact.set_name(json!("John")).unwrap();
        let change = contact.name_change().unwrap().unwrap();
        assert_eq!(change.original, Value::Null);
        assert_eq!(change.current, json!("John"));
    }

    #[test]
    fn changes_resolve_through_string_and_interned_forms() {
        let mut contact = test_contact();
        contact.set_name(json!("David")).unwrap();

        let key = contact.tracking_parts().0.attributes().key("name").unwrap();
        assert!(contact.change_for("name").unwrap().is_some());
        assert!(contact.change_for(key).unwrap().is_some());
    }

    #[test]
    fn unmarked_mutation_stays_invisible() {
        let mut contact = test_contact();
        contact.fields.name = json!("Yam");
        assert!(!contact.name_changed().unwrap());

        contact.fields.name = json!("Hadad");
        assert!(!contact.name_changed().unwrap());

        contact.mark_changed("name").unwrap();
        contact.fields.name = json!("Baal");
        assert!(contact.name_changed().unwrap());

        let change = contact.name_change().unwrap().unwrap();
        assert_eq!(change.original, json!("Hadad"));
        assert_eq!(change.current, json!("Baal"));
    }

    #[test]
    fn resetting_an_attribute_rolls_it_back() {
        let mut contact = test_contact();
        contact.set_name(json!("Bob")).unwrap();
        contact.reset_name().unwrap();

        assert_eq!(contact.name(), &Value::Null);
        assert!(!contact.name_changed().unwrap());
    }

    #[test]
    fn assigning_an_equal_value_records_no_change() {
        let mut contact = test_contact();
        contact.set_email(json!("red@example.com")).unwrap();
        assert!(contact.is_changed("email").unwrap());

        contact.save();
        assert!(!contact.is_changed("email").unwrap());
        assert!(!contact.any_changed());

        contact.set_email(json!("red@example.com")).unwrap();
        assert!(!contact.is_changed("email").unwrap());
        assert!(!contact.any_changed());
    }

    #[test]
    fn saving_resets_the_changed_status() {
        let mut contact = test_contact();
        contact.set_name(json!("Alf")).unwrap();
        assert!(contact.any_changed());

        contact.save();
        assert!(!contact.any_changed());
        assert!(!contact.name_changed().unwrap());
    }

    #[test]
    fn saving_preserves_previous_changes() {
        let mut contact = test_contact();
        contact.set_name(json!("Jericho Cane")).unwrap();
        contact.save();

        let previous = contact.previous_change_for("name").unwrap().unwrap();
        assert_eq!(previous.original(), &Value::Null);
        assert_eq!(previous.committed(), &json!("Jericho Cane"));
    }

    #[test]
    fn a_new_window_opens_from_the_saved_value() {
        let mut contact = test_contact();
        contact.set_name(json!("Paul")).unwrap();
        let change = contact.name_change().unwrap().unwrap();
        assert_eq!(change.original, Value::Null);

        contact.save();

        contact.set_name(json!("John")).unwrap();
        let change = contact.name_change().unwrap().unwrap();
        assert_eq!(change.original, json!("Paul"));
        assert_eq!(change.current, json!("John"));
    }

    #[test]
    fn repeated_changes_keep_the_first_original_of_the_window() {
        let mut contact = test_contact();
        contact.set_name(json!("Otto")).unwrap();
        contact.save();

        contact.set_name(json!("DudeFella ManGuy")).unwrap();
        contact.set_name(json!("Mr. Manfredgensonton")).unwrap();

        let change = contact.name_change().unwrap().unwrap();
        assert_eq!(change.original, json!("Otto"));
        assert_eq!(change.current, json!("Mr. Manfredgensonton"));
        assert_eq!(contact.name_was().unwrap(), json!("Otto"));
    }

    #[test]
    fn counters_work_through_the_compare_first_path() {
        let mut contact = test_contact();
        assert_eq!(contact.visits(), &Value::Null);

        contact.record_visit().unwrap();
        assert!(contact.is_changed("visits").unwrap());
        let change = contact.change_for("visits").unwrap().unwrap();
        assert_eq!(change.original, Value::Null);
        assert_eq!(change.current, json!(1));

        contact.record_visit().unwrap();
        let change = contact.change_for("visits").unwrap().unwrap();
        assert_eq!(change.original, Value::Null);
        assert_eq!(change.current, json!(2));
    }

    #[test]
    fn touching_twice_with_the_same_stamp_marks_once() {
        let mut contact = test_contact();
        let at = Utc::now();

        contact.touch(at).unwrap();
        contact.save();

        contact.touch(at).unwrap();
        assert!(!contact.is_changed("last_seen_at").unwrap());
    }

    #[test]
    fn unknown_attributes_error_out() {
        let contact = test_contact();
        let err = contact.is_changed("nickname").unwrap_err();
        assert_eq!(err, TrackingError::unknown_attribute("nickname"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The unconditional setter always dirties, and saving always
            /// produces a snapshot pairing the window's original with the
            /// saved value.
            #[test]
            fn save_snapshots_the_window(
                first in "[A-Za-z]{1,12}",
                second in "[A-Za-z]{1,12}",
            ) {
                let mut contact = test_contact();

                contact.set_name(json!(first.clone())).unwrap();
                contact.save();

                contact.set_name(json!(second.clone())).unwrap();
                prop_assert!(contact.name_changed().unwrap());
                contact.save();

                prop_assert!(!contact.any_changed());
                let previous = contact.previous_change_for("name").unwrap().unwrap();
                prop_assert_eq!(previous.original(), &json!(first));
                prop_assert_eq!(previous.committed(), &json!(second));
            }

            /// The compare-first setter never dirties on equal assignment,
            /// no matter the value.
            #[test]
            fn equal_email_assignments_stay_clean(email in "[a-z]{1,10}@[a-z]{1,10}\\.com") {
                let mut contact = test_contact();
                contact.set_email(json!(email.clone())).unwrap();
                contact.save();

                contact.set_email(json!(email)).unwrap();
                prop_assert!(!contact.any_changed());
            }
        }
    }
}
