//! Environment port for reading process environment variables.

/// Read-only view of the process environment.
pub trait Environment: Send + Sync {
    /// Returns the value of `key`, or `None` when unset or empty.
    fn var(&self, key: &str) -> Option<String>;
}
