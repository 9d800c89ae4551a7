//! Caller-facing submission and receipt types.
//!
//! A `Submission` is the raw material the ledger turns into an `AuditEntry`;
//! a `SubmitReceipt` tells the caller what happened. Both rejection outcomes
//! still mean the entry was appended — the receipt carries the position it
//! landed at.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::violation::Violation;

/// A candidate governance action submitted for recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub actor: SubmittedActor,
    /// The operation identifier, e.g. `"create_decision"`.
    pub action: String,
    /// The identifier of the object the action targets.
    pub target: String,
    /// Arbitrary payload; scanned by the policy gate.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Submission {
    /// Convenience constructor for the common no-metadata case.
    pub fn new(
        actor_id: impl Into<String>,
        role: impl Into<String>,
        action: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            actor: SubmittedActor {
                id: actor_id.into(),
                role: role.into(),
                organization: None,
            },
            action: action.into(),
            target: target.into(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Attach a metadata key/value pair.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// The actor as supplied by the caller, before classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedActor {
    pub id: String,
    pub role: String,
    /// Falls back to the ledger's configured organization when absent.
    #[serde(default)]
    pub organization: Option<String>,
}

/// How a submission was disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    Accepted,
    RejectedSchema,
    RejectedPolicy,
}

/// The caller's proof of recording.
///
/// Returned for every submission, including rejected ones — `chain_position`
/// and `chain_hash` always refer to the entry that was actually appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub outcome: SubmitOutcome,
    pub entry_id: Uuid,
    /// 1-based position the entry landed at.
    pub chain_position: u64,
    /// The appended entry's own hash — the chain head after this append.
    pub chain_hash: String,
    /// Violations recorded on the entry; empty when accepted.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub violations: Vec<Violation>,
}
