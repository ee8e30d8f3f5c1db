//! Document collections with unique indexes.
//!
//! Failures are reported in the storage driver's own terms
//! ([`natours_core::RawError::Store`] and friends); turning them into
//! client-facing messages is the classifier's job, not the store's.

pub mod collection;

pub use collection::{Collection, InMemoryCollection};
