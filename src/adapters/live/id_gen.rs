//! Live adapter for the `IdGenerator` port.

use uuid::Uuid;

use crate::ports::IdGenerator;

/// Live ID generator that derives trace and span ids from random UUIDs.
pub struct LiveIdGenerator;

impl LiveIdGenerator {
    /// Creates a new live ID generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for LiveIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for LiveIdGenerator {
    fn trace_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    fn span_id(&self) -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(16);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_unique_trace_ids() {
        let gen = LiveIdGenerator::new();
        let id1 = gen.trace_id();
        let id2 = gen.trace_id();

        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 32);
        assert!(id1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn span_ids_are_sixteen_hex_chars() {
        let id = LiveIdGenerator::new().span_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
