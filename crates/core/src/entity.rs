//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Categories and locations are entities referenced weakly by items: an item
/// stores the identifier only and resolves the name by lookup.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Human-facing unique name.
    fn name(&self) -> &str;
}
