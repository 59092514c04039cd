//! Live environment adapter using `std::env`.

use crate::ports::Environment;

/// Reads the real process environment.
pub struct LiveEnvironment;

impl Environment for LiveEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}
