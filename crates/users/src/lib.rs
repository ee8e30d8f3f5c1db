//! Users domain module.
//!
//! Schema rules for user documents (no IO, no HTTP, no storage).

pub mod user;

pub use user::{Role, User, UserInput};
