//! Infrastructure layer: document storage.

pub mod store;

pub use store::{Collection, InMemoryCollection};
