//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To
/// "modify" one, build a new one. `Money` and `Discount` are the value objects
/// of the catalog; the `Product` aggregate owns them outright.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
