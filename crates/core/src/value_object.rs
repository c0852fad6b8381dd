//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are compared by their attribute values.
/// In this workspace the captured usage of a consumption line and the kind of a
/// labor entry are value objects: replacing a bill of materials replaces them
/// wholesale, they are never updated in place.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// enum LaborKind {
///     Fixed { fixed_cost: Decimal },
/// }
///
/// impl ValueObject for LaborKind {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
