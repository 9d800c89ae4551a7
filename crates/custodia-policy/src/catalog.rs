//! The red-line catalogue: the `PolicyGate` implementation.
//!
//! `RedLineCatalog` loads a `RedLineConfig` from TOML (or the built-in
//! reference catalogue) and evaluates candidate entries against it.
//!
//! Evaluation runs every check and collects every violation — no
//! short-circuiting:
//!
//! 1. Forbidden-action match over `action.operation` (case-normalized,
//!    equality or containment), tagged with the owning rule number.
//! 2. Surveillance-pattern scan over the stringified, lower-cased metadata.
//! 3. Centralization-of-role check against `actor.role`.
//! 4. Optional schema compliance, folded in as a constitutional violation
//!    when a schema gate is attached.

use std::path::Path;

use tracing::{debug, warn};

use custodia_contracts::{AuditEntry, CustodiaError, CustodiaResult, Violation};
use custodia_core::traits::{PolicyGate, SchemaGate};

use crate::rule::RedLineConfig;

/// The reference catalogue shipped with the crate.
const BUILTIN_CATALOG: &str = include_str!("../policies/redlines.toml");

/// A `PolicyGate` backed by a TOML rule table.
pub struct RedLineCatalog {
    config: RedLineConfig,
    /// When present, structural complaints surface through this gate's
    /// output as constitutional violations — so chain verification replays
    /// the schema check too.
    schema: Option<Box<dyn SchemaGate>>,
}

impl RedLineCatalog {
    /// The built-in seven-rule reference catalogue.
    pub fn builtin() -> Self {
        // The embedded catalogue is compiled into the crate; failing to
        // parse it is a build defect, not a runtime condition.
        Self::from_toml_str(BUILTIN_CATALOG)
            .expect("embedded red-line catalogue must parse")
    }

    /// Parse `s` as a TOML catalogue.
    pub fn from_toml_str(s: &str) -> CustodiaResult<Self> {
        let config: RedLineConfig = toml::from_str(s).map_err(|e| CustodiaError::Config {
            reason: format!("failed to parse red-line catalogue TOML: {e}"),
        })?;
        Ok(Self {
            config,
            schema: None,
        })
    }

    /// Read the file at `path` and parse it as a TOML catalogue.
    pub fn from_file(path: &Path) -> CustodiaResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CustodiaError::Config {
            reason: format!("failed to read catalogue file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Fold a structural gate into this catalogue's output.
    pub fn with_schema_gate(mut self, schema: Box<dyn SchemaGate>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// The loaded rule table.
    pub fn config(&self) -> &RedLineConfig {
        &self.config
    }
}

impl PolicyGate for RedLineCatalog {
    fn evaluate(&self, entry: &AuditEntry) -> Vec<Violation> {
        let mut violations = Vec::new();

        let operation_lower = entry.action.operation.to_lowercase();
        let metadata_lower = serde_json::to_string(&entry.metadata)
            .unwrap_or_default()
            .to_lowercase();

        for rule in &self.config.rules {
            if let Some(forbidden) = rule.matched_action(&operation_lower) {
                warn!(
                    rule = rule.number,
                    operation = %entry.action.operation,
                    forbidden,
                    "forbidden action matched"
                );
                violations.push(Violation::red_line(
                    rule.number,
                    format!(
                        "operation '{}' matches forbidden action '{}' ({})",
                        entry.action.operation, forbidden, rule.title
                    ),
                ));
            }

            for pattern in rule.matched_patterns(&metadata_lower) {
                warn!(rule = rule.number, pattern, "forbidden pattern found in metadata");
                violations.push(Violation::red_line(
                    rule.number,
                    format!("metadata contains forbidden pattern '{pattern}'"),
                ));
            }

            if rule.forbids_role(&entry.actor.role) {
                warn!(
                    rule = rule.number,
                    role = %entry.actor.role,
                    "over-privileged role"
                );
                violations.push(Violation::red_line(
                    rule.number,
                    format!(
                        "actor role '{}' is forbidden: centralized control attempt",
                        entry.actor.role
                    ),
                ));
            }
        }

        if let Some(schema) = &self.schema {
            let serialized = serde_json::to_value(entry).unwrap_or_default();
            let complaints = schema.validate_structure(&serialized);
            if !complaints.is_empty() {
                violations.push(Violation::constitutional(format!(
                    "entry fails constitutional shape with {} complaint(s)",
                    complaints.len()
                )));
            }
        }

        debug!(
            event_id = %entry.event_id,
            violation_count = violations.len(),
            "red-line evaluation complete"
        );

        violations
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
