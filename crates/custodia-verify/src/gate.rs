//! The constitutional schema gate.
//!
//! `ConstitutionalGate` validates serialized entries against a JSON Schema
//! document describing the constitutional entry shape — required fields,
//! enumerated values, and the 64-hex object digest. It is a pure structural
//! check with no opinion on meaning; a structurally valid entry can still
//! be policy-rejected.
//!
//! The gate stores the parsed schema document and compiles a validator per
//! call. A schema document that fails to compile surfaces as a single
//! complaint rather than a crash, so the submission can still be recorded
//! and audited.

use std::path::Path;

use tracing::{debug, warn};

use custodia_contracts::{CustodiaError, CustodiaResult, SchemaComplaint};
use custodia_core::traits::SchemaGate;

/// The constitutional entry schema shipped with the crate.
const BUILTIN_SCHEMA: &str = include_str!("../schemas/audit_entry.schema.json");

/// A `SchemaGate` backed by a JSON Schema document.
#[derive(Debug)]
pub struct ConstitutionalGate {
    schema: serde_json::Value,
}

impl ConstitutionalGate {
    /// The built-in constitutional entry shape.
    pub fn builtin() -> Self {
        // Embedded at compile time; failing to parse it is a build defect.
        Self {
            schema: serde_json::from_str(BUILTIN_SCHEMA)
                .expect("embedded constitutional schema must parse"),
        }
    }

    /// Parse `s` as a JSON Schema document.
    pub fn from_schema_str(s: &str) -> CustodiaResult<Self> {
        let schema = serde_json::from_str(s).map_err(|e| CustodiaError::Config {
            reason: format!("failed to parse schema document: {e}"),
        })?;
        Ok(Self { schema })
    }

    /// Read the file at `path` and parse it as a JSON Schema document.
    pub fn from_file(path: &Path) -> CustodiaResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CustodiaError::Config {
            reason: format!("failed to read schema file '{}': {e}", path.display()),
        })?;
        Self::from_schema_str(&contents)
    }
}

impl SchemaGate for ConstitutionalGate {
    /// Validate `entry` against the constitutional shape.
    ///
    /// All complaints are collected — the caller sees the full failure set
    /// in one pass rather than only the first offending field.
    fn validate_structure(&self, entry: &serde_json::Value) -> Vec<SchemaComplaint> {
        let validator = match jsonschema::validator_for(&self.schema) {
            Ok(v) => v,
            Err(e) => {
                // A malformed schema document is a configuration fault;
                // report it as a complaint so the entry is still recorded.
                let message = format!("invalid constitutional schema document: {e}");
                warn!(%message, "schema compilation failure");
                return vec![SchemaComplaint {
                    path: String::new(),
                    message,
                }];
            }
        };

        let complaints: Vec<SchemaComplaint> = validator
            .iter_errors(entry)
            .map(|error| SchemaComplaint {
                path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect();

        debug!(
            complaint_count = complaints.len(),
            "structural validation complete"
        );

        complaints
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
