//! `dirtytrack-core` — attribute change tracking building blocks.
//!
//! This crate contains the **pure tracking engine** (no persistence concerns):
//! a host object registers its attributes once, its setters call the mark
//! primitives, and its save path commits the dirty window into a
//! previous-changes snapshot.

pub mod descriptor;
pub mod error;
pub mod key;
pub mod record;
pub mod tracker;

pub use descriptor::{AttributeDescriptor, AttributeSet};
pub use error::{TrackingError, TrackingResult};
pub use key::{AttributeKey, KeyRef};
pub use record::TrackChanges;
pub use tracker::{AttributeChange, ChangeTracker, CommittedChange};
