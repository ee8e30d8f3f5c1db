//! `natours-core`: error model and shared domain primitives.
//!
//! This crate is **pure**: it defines the typed failures produced by the
//! storage and validation layers, the normalized [`OperationalError`], and the
//! classifier mapping one onto the other. No HTTP or infrastructure concerns.

pub mod classify;
pub mod entity;
pub mod error;
pub mod id;

pub use classify::{classify, DUPLICATE_KEY_CODE};
pub use entity::Entity;
pub use error::{FieldError, OperationalError, RawError, Status};
pub use id::{TourId, UserId};
