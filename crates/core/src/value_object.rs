//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. In this
/// workspace SKUs, prices and low-stock thresholds are value objects: each is
/// validated once on construction and can then be passed around freely.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
