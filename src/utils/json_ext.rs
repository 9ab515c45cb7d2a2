//! JSON string round-trip helper shared by the persistence shapes.

/// Types that can round-trip through a JSON string with a domain error
/// type. The persistence module provides a blanket implementation for all
/// serde-capable types using its own error.
pub trait JsonSerializable<E>: Sized {
    fn to_json_string(&self) -> Result<String, E>;
    fn from_json_str(s: &str) -> Result<Self, E>;
}
