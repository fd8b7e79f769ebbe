//! The wire encoding of optional contract values.
//!
//! The store cannot hold an empty value, so an absent optional is published
//! as the literal [`ABSENT_SENTINEL`]. This module is the only place that
//! knows about it: bundles and constructs work with `Option<String>`.

/// The literal published for an absent optional value.
pub const ABSENT_SENTINEL: &str = "null";

pub fn encode_optional(value: Option<&str>) -> String {
    value.unwrap_or(ABSENT_SENTINEL).to_string()
}

/// Only the exact literal decodes to `None`.
pub fn decode_optional(raw: &str) -> Option<String> {
    (raw != ABSENT_SENTINEL).then(|| raw.to_string())
}
