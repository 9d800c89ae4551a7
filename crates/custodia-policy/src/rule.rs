//! Red-line rule types and catalogue schema.
//!
//! A `RedLineConfig` is deserialized from TOML and holds the numbered rule
//! table. Unlike a first-match-wins policy, every rule is evaluated against
//! every entry and all violations are collected — the catalogue is tuned to
//! avoid false negatives, and an over-inclusive match is acceptable because
//! the entry is recorded either way.

use serde::{Deserialize, Serialize};

/// A single numbered red line.
///
/// Each rule owns the identifier sets that implicate it, so a match can be
/// tagged with the owning rule number without positional arithmetic. Any of
/// the three sets may be empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedLineRule {
    /// Stable rule number (1..=7 in the reference catalogue). Appears in
    /// violation codes as `RED_LINE_VIOLATION_{number}`.
    pub number: u8,

    /// Human-readable statement of the red line.
    pub title: String,

    /// Operation identifiers this rule forbids. Matched case-normalized,
    /// by equality or substring containment.
    #[serde(default)]
    pub forbidden_actions: Vec<String>,

    /// Substrings scanned for in the entry's stringified metadata.
    #[serde(default)]
    pub forbidden_patterns: Vec<String>,

    /// Over-privileged role names this rule forbids. Exact match.
    #[serde(default)]
    pub forbidden_roles: Vec<String>,
}

impl RedLineRule {
    /// Return the forbidden identifier matched by `operation_lower`
    /// (already lower-cased), if any.
    ///
    /// Containment is intentional: `"bulk_track_users_export"` implicates
    /// `"track_users"`. Coarse and over-inclusive by design.
    pub fn matched_action(&self, operation_lower: &str) -> Option<&str> {
        self.forbidden_actions
            .iter()
            .map(String::as_str)
            .find(|forbidden| operation_lower.contains(&forbidden.to_lowercase()))
    }

    /// Return every forbidden pattern found in `metadata_lower`.
    pub fn matched_patterns(&self, metadata_lower: &str) -> Vec<&str> {
        self.forbidden_patterns
            .iter()
            .map(String::as_str)
            .filter(|pattern| metadata_lower.contains(&pattern.to_lowercase()))
            .collect()
    }

    /// Return true when `role` is one of this rule's forbidden roles.
    pub fn forbids_role(&self, role: &str) -> bool {
        self.forbidden_roles.iter().any(|r| r == role)
    }
}

/// The top-level structure deserialized from a TOML catalogue file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedLineConfig {
    /// The full rule table. Evaluation order does not matter — all rules
    /// are always checked.
    pub rules: Vec<RedLineRule>,
}
