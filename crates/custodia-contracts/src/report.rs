//! Chain status, verification, and export/report types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entry::{AuditEntry, SignatureRecord};

/// Point-in-time health summary of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStatus {
    pub length: u64,
    /// Hash of the last entry, or `"GENESIS"` for an empty chain.
    pub last_hash: String,
    /// True when verification found at least one hash break.
    pub tamper_detected: bool,
    /// Number of entries the policy gate flags on replay.
    pub red_line_violation_count: u64,
}

/// The result of a full chain verification walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// True when every checked entry's hash linkage is intact.
    pub valid: bool,
    /// Number of entries walked.
    pub checked: u64,
    /// 1-based position of the first broken entry, if any.
    pub first_break: Option<u64>,
    /// Entries whose policy replay produced a non-empty violation set.
    /// Counted independently of `valid` — an entry correctly recorded as
    /// non-compliant still counts here.
    pub violations: u64,
}

/// A read-only slice of the chain handed to the report boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub entries: Vec<AuditEntry>,
    /// Hash of the last entry in the range, or `"GENESIS"` when empty.
    pub chain_hash_at_range_end: String,
}

/// A rendered, hash-committed, best-effort-signed report document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedReport {
    pub report_id: Uuid,
    pub case_id: String,
    pub generated_at: DateTime<Utc>,
    /// Number of entries the report covers.
    pub entry_count: u64,
    /// Chain head hash at the end of the exported range.
    pub chain_hash: String,
    /// Opaque rendered document bytes from the report renderer.
    pub document: Vec<u8>,
    /// SHA-256 (hex) of `document`.
    pub document_hash: String,
    /// Detached signature over `document_hash`; `none` when the signing
    /// collaborator was unavailable — the report stays valid either way.
    pub signature: SignatureRecord,
}
