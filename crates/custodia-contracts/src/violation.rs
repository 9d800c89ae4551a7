//! Violation and structural-complaint types.
//!
//! A `Violation` is what the policy gate emits; a `SchemaComplaint` is what
//! the schema gate emits. Both are recorded verbatim on the rejected entry,
//! so the codes double as the stable wire vocabulary of the ledger.

use serde::{Deserialize, Serialize};

/// Code prefix for red-line violations; the owning rule number is appended.
pub const RED_LINE_CODE_PREFIX: &str = "RED_LINE_VIOLATION_";

/// Code for structural (constitutional schema) violations.
pub const CONSTITUTIONAL_CODE: &str = "CONSTITUTIONAL_VIOLATION";

/// A single policy or constitutional violation attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Stable code, e.g. `RED_LINE_VIOLATION_1` or `CONSTITUTIONAL_VIOLATION`.
    pub code: String,

    /// The owning red-line rule number (1..=7), absent for constitutional
    /// violations.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rule: Option<u8>,

    /// Human-readable detail naming what matched.
    pub detail: String,
}

impl Violation {
    /// A violation of the numbered red-line rule.
    pub fn red_line(rule: u8, detail: impl Into<String>) -> Self {
        Self {
            code: format!("{RED_LINE_CODE_PREFIX}{rule}"),
            rule: Some(rule),
            detail: detail.into(),
        }
    }

    /// A constitutional (schema-shape) violation.
    pub fn constitutional(detail: impl Into<String>) -> Self {
        Self {
            code: CONSTITUTIONAL_CODE.to_string(),
            rule: None,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.detail)
    }
}

/// A field-level complaint from the constitutional schema gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaComplaint {
    /// JSON pointer-style path to the offending location ("" for the root).
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for SchemaComplaint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}
