//! Tours domain module.
//!
//! Schema rules for tour documents, implemented as deterministic domain logic
//! (no IO, no HTTP, no storage). Rule violations surface as
//! [`natours_core::RawError::Validation`].

pub mod tour;

pub use tour::{Difficulty, Tour, TourInput};
