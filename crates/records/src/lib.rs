//! `dirtytrack-records` — record types built on the tracking engine.
//!
//! Shows the intended host-object shape: live fields plus a tracker, setters
//! calling the mark primitives, and a save path committing the dirty window.

pub mod contact;

pub use contact::{Contact, ContactFields, ContactId};
