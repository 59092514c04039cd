//! ID generator port for span identity on persisted task records.

/// Generates trace and span identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a 32-character lowercase hex trace id.
    fn trace_id(&self) -> String;

    /// Returns a 16-character lowercase hex span id.
    fn span_id(&self) -> String;
}
