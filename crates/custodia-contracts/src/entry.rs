//! The audit entry: the atomic, immutable record of the ledger.
//!
//! An `AuditEntry` is created once by the ledger, appended exactly once to
//! the chain, and never mutated or removed afterward (write-once-read-many).
//! The single exception is the `signature` block, which late-binds after the
//! entry is durably appended — it is excluded from hash coverage for exactly
//! that reason (see `custodia-core::canonical`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::violation::Violation;

/// The hash algorithm recorded in every integrity block.
pub const HASH_ALGORITHM: &str = "SHA-256";

/// A single entry in the governance audit chain.
///
/// Every candidate entry — accepted, schema-rejected, or policy-rejected —
/// becomes one of these and is appended to the chain. Rejection never means
/// silent drop; it means recorded-with-violation. The evidentiary value of
/// the ledger comes from recording attempted violations, not hiding them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Globally unique identifier, assigned at creation, never reused.
    pub event_id: Uuid,

    /// Creation time (UTC), assigned once.
    pub timestamp: DateTime<Utc>,

    /// Who performed (or attempted) the action.
    pub actor: Actor,

    /// What was done, how it is classified, and its acceptance status.
    pub action: ActionRecord,

    /// The target of the action, referenced by a stable one-way digest.
    pub object: ObjectRef,

    /// Free-form governance linkage.
    pub context: GovernanceContext,

    /// Hash-chain linkage. Filled by the chain store inside its append
    /// critical section; placeholder values before that.
    pub integrity: Integrity,

    /// Informational legal classification. Not enforced by the core.
    pub legal_status: LegalStatus,

    /// Detached signature over `integrity.hash`. `none` until signed.
    pub signature: SignatureRecord,

    /// Arbitrary caller-supplied payload. Scanned by the policy gate.
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Present only when a schema or policy violation occurred.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub compliance_status: Option<ComplianceStatus>,

    /// Ordered list of violations, empty for compliant entries.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub violations: Vec<Violation>,
}

/// The actor block of an audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub actor_id: String,
    pub actor_type: ActorType,
    pub role: String,
    pub organization: String,
}

/// Best-effort actor classification, derived from the shape of the actor id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    Human,
    System,
}

impl ActorType {
    /// Derive the actor type from an actor id.
    ///
    /// An "@" delimiter (an email-shaped id) classifies the actor as human;
    /// anything else is a system identity. Deliberately coarse — the ledger
    /// records the classification, it does not authenticate it.
    pub fn classify(actor_id: &str) -> Self {
        if actor_id.contains('@') {
            Self::Human
        } else {
            Self::System
        }
    }
}

/// The action block of an audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The operation identifier as submitted by the caller.
    pub operation: String,
    pub classification: ActionClass,
    pub status: ActionStatus,
}

/// Best-effort operation classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionClass {
    Create,
    Update,
}

impl ActionClass {
    /// Derive the classification from an operation name: any operation whose
    /// lower-cased name contains "create" is a create, everything else an
    /// update.
    pub fn classify(operation: &str) -> Self {
        if operation.to_lowercase().contains("create") {
            Self::Create
        } else {
            Self::Update
        }
    }
}

/// Acceptance status of the recorded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A stable reference to the action's target.
///
/// `object_hash` is a SHA-256 digest of `object_id`, giving downstream
/// consumers a reference that survives renaming of the mutable target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub object_type: String,
    pub object_id: String,
    pub object_hash: String,
}

/// Governance linkage attached to every entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceContext {
    pub decision_id: String,
    pub lifecycle_stage: String,
    pub jurisdiction: String,
}

/// Hash-chain linkage for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integrity {
    /// Hash of the predecessor entry, or [`Integrity::GENESIS`] for the
    /// first entry in the chain.
    pub previous_hash: String,

    /// SHA-256 (hex) over the entry's canonical bytes plus `previous_hash`.
    /// Computed with this field itself removed from the input.
    pub hash: String,

    /// Always [`HASH_ALGORITHM`].
    pub hash_algorithm: String,

    /// 1-based position within the chain.
    pub chain_position: u64,
}

impl Integrity {
    /// The sentinel `previous_hash` of the first entry in every chain.
    ///
    /// A literal that can never collide with a hex-encoded SHA-256 digest,
    /// making genesis detection unambiguous.
    pub const GENESIS: &'static str = "GENESIS";

    /// Placeholder integrity block for a draft entry. The chain store
    /// overwrites every field inside its append critical section.
    pub fn draft() -> Self {
        Self {
            previous_hash: String::new(),
            hash: String::new(),
            hash_algorithm: HASH_ALGORITHM.to_string(),
            chain_position: 0,
        }
    }
}

/// Informational legal classification of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalStatus {
    pub evidentiary_class: String,
    pub retention_policy: String,
    pub admissibility: String,
}

impl Default for LegalStatus {
    /// The reference defaults: administrative evidence, 30-year retention,
    /// prima facie admissibility.
    fn default() -> Self {
        Self {
            evidentiary_class: "administrative".to_string(),
            retention_policy: "P30Y".to_string(),
            admissibility: "prima_facie".to_string(),
        }
    }
}

/// Detached-signature block.
///
/// Excluded from canonicalization: the signature is computed over
/// `integrity.hash` after append, so it cannot be covered by that hash.
/// Its absence is an observable state, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// `"none"` until signed, then `"detached"`.
    pub signature_type: String,
    pub signed_at: Option<DateTime<Utc>>,
    pub signer_id: Option<String>,
    /// Hex-encoded signature bytes from the signing collaborator.
    pub signature_value: Option<String>,
}

impl SignatureRecord {
    /// The unsigned state every entry starts in.
    pub fn none() -> Self {
        Self {
            signature_type: "none".to_string(),
            signed_at: None,
            signer_id: None,
            signature_value: None,
        }
    }

    /// A detached signature produced by `signer_id` at `signed_at`.
    pub fn detached(signer_id: impl Into<String>, signature_hex: impl Into<String>) -> Self {
        Self {
            signature_type: "detached".to_string(),
            signed_at: Some(Utc::now()),
            signer_id: Some(signer_id.into()),
            signature_value: Some(signature_hex.into()),
        }
    }
}

impl Default for SignatureRecord {
    fn default() -> Self {
        Self::none()
    }
}

/// Marker recorded on entries that failed the schema or policy gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    NonCompliant,
}
