//! Element identifiers
//!
//! Container elements get a fresh random identifier, and notes reuse their
//! `persistent_id`. Both pass through the same [`IdPrefix`] namespacer so
//! that ids in one finding aid never collide with host-generated ids.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Default namespace prefix for element ids
pub const DEFAULT_ID_PREFIX: &str = "aspace_";

/// Namespaces raw identifiers with a fixed prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdPrefix {
    prefix: String,
}

impl Default for IdPrefix {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX)
    }
}

impl IdPrefix {
    /// Create a namespacer with the given prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Get the prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prefix a raw id
    ///
    /// Returns `None` for absent, empty and literal `"null"` ids, which
    /// callers turn into an omitted attribute. Ids already carrying the
    /// prefix are returned unchanged.
    pub fn apply(&self, raw: Option<&str>) -> Option<String> {
        let raw = raw?.trim();
        if raw.is_empty() || raw == "null" {
            return None;
        }
        if raw.starts_with(&self.prefix) {
            Some(raw.to_string())
        } else {
            Some(format!("{}{}", self.prefix, raw))
        }
    }
}

/// Source of raw identifiers for generated elements
pub trait IdGenerator: Send + Sync {
    /// Produce the next raw identifier; must differ from every earlier one
    fn generate(&self) -> String;
}

/// Random 128-bit identifiers rendered as 32 lowercase hex digits
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomHexIds;

impl IdGenerator for RandomHexIds {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Counter-based identifiers for reproducible output
///
/// Values are zero-padded to the width of a random id so output keeps the
/// same shape.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Start counting from zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from `start`
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{:032x}", n)
    }
}
