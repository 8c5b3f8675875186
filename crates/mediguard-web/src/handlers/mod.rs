pub mod dashboard;
pub mod patients;
pub mod predict;
pub mod system;

/// Trimmed, non-empty query parameter.
pub(crate) fn param(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
