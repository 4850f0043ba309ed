//! The unit of data passed between actors.

/// Opaque data token flowing through a chain.
///
/// Actors treat tokens as JSON values; interpretation of the payload is
/// entirely up to the concrete actor.
pub type Token = serde_json::Value;
