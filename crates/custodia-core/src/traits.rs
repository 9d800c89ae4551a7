//! Core trait definitions for the CUSTODIA ledger.
//!
//! These traits define the trust boundary around the chain:
//!
//! - `SchemaGate`      — structural check against the constitutional shape
//! - `PolicyGate`      — red-line evaluation over a candidate entry
//! - `ChainStore`      — append-only owner of the hash chain
//! - `DurableStore`    — load/save boundary for persistence
//! - `Signer`          — external detached-signature collaborator
//! - `ReportRenderer`  — external presentational collaborator
//!
//! The ledger wires them together in the correct order. Gates are trusted
//! and total; signer and renderer are untrusted-latency collaborators whose
//! failure must never corrupt or block the chain itself.

use custodia_contracts::{
    AuditEntry, CustodiaResult, SchemaComplaint, SignatureRecord, Violation,
};

/// Structural validation against the constitutional entry shape.
///
/// A pure shape check: it has no opinion on meaning, only on fields, types,
/// and enumerated values. A structurally valid entry can still be
/// policy-rejected.
pub trait SchemaGate: Send + Sync {
    /// Validate the serialized entry. Empty on success.
    fn validate_structure(&self, entry: &serde_json::Value) -> Vec<SchemaComplaint>;
}

/// Red-line evaluation over a candidate entry.
///
/// Implementations are trusted, deterministic, and total — evaluation never
/// fails and never short-circuits; all violations are collected so the
/// recorded entry carries the full picture.
pub trait PolicyGate: Send + Sync {
    fn evaluate(&self, entry: &AuditEntry) -> Vec<Violation>;
}

/// What the chain store reports back after a successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    /// 1-based position the entry landed at.
    pub position: u64,
    /// The appended entry's own hash — the new chain head.
    pub hash: String,
    /// The predecessor hash the entry was linked to.
    pub previous_hash: String,
}

/// The append-only owner of the hash chain.
///
/// `append` must execute "read last hash, compute hash, link, push" as one
/// critical section — two concurrent appenders must never observe the same
/// predecessor. No update or delete operation exists; `attach_signature` is
/// the single permitted late-bind and touches only the signature block,
/// which is excluded from hash coverage.
pub trait ChainStore: Send + Sync {
    /// Fill the entry's integrity block and append it. The store owns the
    /// previous-hash pointer and the position counter.
    fn append(&self, entry: AuditEntry) -> CustodiaResult<Appended>;

    /// Hash of the last entry, or `"GENESIS"` when the chain is empty.
    fn last_hash(&self) -> String;

    /// Number of entries in the chain.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time copy of the whole chain. Never a live reference —
    /// verification must not race a concurrent append mid-walk.
    fn snapshot(&self) -> Vec<AuditEntry>;

    /// Point-in-time copy of the 1-based inclusive position range.
    fn snapshot_range(&self, start: u64, end: u64) -> CustodiaResult<Vec<AuditEntry>>;

    /// Late-bind a detached signature onto the entry at `position`.
    fn attach_signature(&self, position: u64, signature: SignatureRecord) -> CustodiaResult<()>;
}

/// The persistence boundary: an atomic, order-preserving load/save pair.
pub trait DurableStore: Send + Sync {
    /// Load the full chain in insertion order. An absent store is an empty
    /// chain, not an error.
    fn load(&self) -> CustodiaResult<Vec<AuditEntry>>;

    /// Save the full chain. Must be atomic per call — no partial write may
    /// ever be observable by a subsequent `load`.
    fn save(&self, entries: &[AuditEntry]) -> CustodiaResult<()>;
}

/// The external detached-signature collaborator.
///
/// Treated as untrusted-latency and potentially unavailable: a failed or
/// slow signature must never prevent an entry from being durably recorded.
/// The core depends on this trait and never implements a real signer.
pub trait Signer: Send + Sync {
    /// Produce a detached signature over `message`.
    fn sign(&self, message: &[u8]) -> CustodiaResult<Vec<u8>>;

    /// Stable identifier recorded in `signature.signer_id`.
    fn signer_id(&self) -> String;

    /// Public key material for downstream verification.
    fn public_key(&self) -> Vec<u8>;
}

/// The external report renderer. Purely presentational, no integrity role.
pub trait ReportRenderer: Send + Sync {
    /// Render an exported range into an opaque document.
    fn render(
        &self,
        bundle: &custodia_contracts::ExportBundle,
        case_id: &str,
    ) -> CustodiaResult<Vec<u8>>;
}
