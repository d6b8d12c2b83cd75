//! Project-specific utilities live here.

/// Treat an empty query-string value (`?title=`) the same as a missing one.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
