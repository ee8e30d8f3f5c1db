//! Entity trait: identity plus the keys a collection must keep unique.

/// A stored document with a stable identity.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Ord + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// Fields covered by a unique index, as `(field, value)` pairs.
    ///
    /// Values are compared verbatim; normalize (trim, lowercase) before storing.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}
