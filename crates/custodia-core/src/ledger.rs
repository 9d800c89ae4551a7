//! The ledger: entry construction, gating, chaining, and the query surface.
//!
//! `Ledger::submit` drives the entry-builder state machine:
//!
//!   DRAFT → SCHEMA_CHECKED → POLICY_CHECKED → HASHED → (ACCEPTED
//!   | REJECTED_SCHEMA | REJECTED_POLICY)
//!
//! The central design decision: **every** candidate entry is appended to the
//! chain exactly once. A schema or policy rejection is recorded-with-
//! violation, never silently dropped — the caller gets a receipt naming the
//! violations and the position the rejected entry landed at.
//!
//! Signing is out-of-band: the detached signature over the chain hash is
//! requested after the append has succeeded, and a failed or slow signer
//! only logs a warning. The entry stays valid with `signature_type = none`.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use custodia_contracts::{
    ActionClass, ActionRecord, ActionStatus, Actor, ActorType, AuditEntry, ChainStatus,
    ComplianceStatus, CustodiaError, CustodiaResult, ExportBundle, GovernanceContext, Integrity,
    LegalStatus, ObjectRef, SignatureRecord, SubmitOutcome, SubmitReceipt, Submission, Violation,
};

use crate::canonical::digest_hex;
use crate::traits::{ChainStore, PolicyGate, SchemaGate, Signer};
use crate::verifier::{verify_entries, VerifyMode};

/// Operation prefix recorded on entries that failed the schema gate.
pub const SCHEMA_VIOLATION_PREFIX: &str = "SCHEMA_VIOLATION_";

/// Ambient defaults stamped onto every entry.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Fallback organization when the submission carries none.
    pub organization: String,
    /// Recorded in `context.lifecycle_stage`.
    pub lifecycle_stage: String,
    /// Recorded in `context.jurisdiction`.
    pub jurisdiction: String,
    /// Legal classification stamped onto every entry.
    pub legal_status: LegalStatus,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            organization: "governance-core".to_string(),
            lifecycle_stage: "learning".to_string(),
            jurisdiction: "FI".to_string(),
            legal_status: LegalStatus::default(),
        }
    }
}

/// The policy-enforcing, tamper-evident audit ledger.
///
/// Owns the trusted gates and the chain store; depends on the signing
/// collaborator only through the `Signer` trait and never implements one.
/// There is a single logical writer per `Ledger` — the store serializes the
/// append critical section internally, so `submit` may be called from
/// multiple threads.
pub struct Ledger {
    schema: Box<dyn SchemaGate>,
    policy: Box<dyn PolicyGate>,
    chain: Box<dyn ChainStore>,
    signer: Option<Box<dyn Signer>>,
    config: LedgerConfig,
}

impl Ledger {
    /// Create a ledger over the given gates and chain store, without a
    /// signing collaborator.
    pub fn new(
        schema: Box<dyn SchemaGate>,
        policy: Box<dyn PolicyGate>,
        chain: Box<dyn ChainStore>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            schema,
            policy,
            chain,
            signer: None,
            config,
        }
    }

    /// Attach the external signing collaborator.
    pub fn with_signer(mut self, signer: Box<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Record a candidate governance action.
    ///
    /// Returns `Ok` for accepted AND rejected submissions — rejection is a
    /// recorded outcome, not a fault. `Err` is reserved for the chain store
    /// itself failing, in which case nothing was recorded.
    pub fn submit(&self, submission: Submission) -> CustodiaResult<SubmitReceipt> {
        let mut entry = self.build_draft(&submission);

        debug!(
            event_id = %entry.event_id,
            operation = %entry.action.operation,
            actor = %entry.actor.actor_id,
            "draft entry built"
        );

        // ── SCHEMA_CHECKED ────────────────────────────────────────────────────
        let serialized =
            serde_json::to_value(&entry).map_err(|e| CustodiaError::Serialization {
                reason: format!("failed to serialize draft entry: {e}"),
            })?;
        let complaints = self.schema.validate_structure(&serialized);

        if !complaints.is_empty() {
            // The malformed attempt is still evidence. Record it under a
            // marked operation name so the chain shows what was refused.
            entry.action.operation =
                format!("{SCHEMA_VIOLATION_PREFIX}{}", entry.action.operation);
            entry.action.status = ActionStatus::Rejected;
            entry.compliance_status = Some(ComplianceStatus::NonCompliant);
            entry.violations = complaints
                .iter()
                .map(|c| Violation::constitutional(c.to_string()))
                .collect();
            entry.metadata.insert(
                "schema_complaints".to_string(),
                serde_json::to_value(&complaints).unwrap_or_default(),
            );

            let event_id = entry.event_id;
            let violations = entry.violations.clone();
            let appended = self.chain.append(entry)?;
            warn!(
                position = appended.position,
                complaint_count = complaints.len(),
                "structurally invalid submission recorded as rejected entry"
            );

            return Ok(SubmitReceipt {
                outcome: SubmitOutcome::RejectedSchema,
                entry_id: event_id,
                chain_position: appended.position,
                chain_hash: appended.hash,
                violations,
            });
        }

        // ── POLICY_CHECKED ────────────────────────────────────────────────────
        let violations = self.policy.evaluate(&entry);

        if !violations.is_empty() {
            entry.action.status = ActionStatus::Rejected;
            entry.compliance_status = Some(ComplianceStatus::NonCompliant);
            entry.violations = violations.clone();

            let event_id = entry.event_id;
            let appended = self.chain.append(entry)?;
            warn!(
                position = appended.position,
                violation_count = violations.len(),
                "red-line violation recorded as rejected entry"
            );

            return Ok(SubmitReceipt {
                outcome: SubmitOutcome::RejectedPolicy,
                entry_id: event_id,
                chain_position: appended.position,
                chain_hash: appended.hash,
                violations,
            });
        }

        // ── HASHED → ACCEPTED ─────────────────────────────────────────────────
        entry.action.status = ActionStatus::Accepted;
        let event_id = entry.event_id;
        let appended = self.chain.append(entry)?;

        info!(
            position = appended.position,
            chain_hash = %appended.hash,
            "audit entry accepted"
        );

        // Out-of-band signing: best-effort, after the durable append. A
        // failure here must not invalidate the recorded entry.
        if let Some(signer) = &self.signer {
            match signer.sign(appended.hash.as_bytes()) {
                Ok(signature) => {
                    let record =
                        SignatureRecord::detached(signer.signer_id(), hex::encode(signature));
                    if let Err(e) = self.chain.attach_signature(appended.position, record) {
                        warn!(position = appended.position, error = %e, "failed to attach signature");
                    }
                }
                Err(e) => {
                    warn!(position = appended.position, error = %e, "signing deferred: collaborator unavailable");
                }
            }
        }

        Ok(SubmitReceipt {
            outcome: SubmitOutcome::Accepted,
            entry_id: event_id,
            chain_position: appended.position,
            chain_hash: appended.hash,
            violations: Vec::new(),
        })
    }

    /// Point-in-time health summary: length, head hash, tamper flag, and the
    /// replayed red-line violation count.
    pub fn status(&self) -> ChainStatus {
        let snapshot = self.chain.snapshot();
        let report = verify_entries(&snapshot, self.policy.as_ref(), VerifyMode::FullScan);

        ChainStatus {
            length: snapshot.len() as u64,
            last_hash: snapshot
                .last()
                .map(|e| e.integrity.hash.clone())
                .unwrap_or_else(|| Integrity::GENESIS.to_string()),
            tamper_detected: !report.valid,
            red_line_violation_count: report.violations,
        }
    }

    /// Replay the chain from genesis. See `verifier::verify_entries`.
    pub fn verify(&self, mode: VerifyMode) -> custodia_contracts::VerifyReport {
        verify_entries(&self.chain.snapshot(), self.policy.as_ref(), mode)
    }

    /// Snapshot a 1-based inclusive position range for report generation.
    /// `None` exports the whole chain.
    pub fn export(&self, range: Option<(u64, u64)>) -> CustodiaResult<ExportBundle> {
        let entries = match range {
            Some((start, end)) => self.chain.snapshot_range(start, end)?,
            None => self.chain.snapshot(),
        };

        let chain_hash_at_range_end = entries
            .last()
            .map(|e| e.integrity.hash.clone())
            .unwrap_or_else(|| Integrity::GENESIS.to_string());

        Ok(ExportBundle {
            entries,
            chain_hash_at_range_end,
        })
    }

    /// Read access to the underlying chain store.
    pub fn chain(&self) -> &dyn ChainStore {
        self.chain.as_ref()
    }

    /// The red-line gate this ledger enforces.
    pub fn policy(&self) -> &dyn PolicyGate {
        self.policy.as_ref()
    }

    // ── Draft construction ────────────────────────────────────────────────────

    /// Assemble a draft entry from the submission: identifiers assigned,
    /// classifications derived, integrity left as a placeholder for the
    /// chain store to fill.
    fn build_draft(&self, submission: &Submission) -> AuditEntry {
        let organization = submission
            .actor
            .organization
            .clone()
            .unwrap_or_else(|| self.config.organization.clone());

        let decision_id = submission
            .metadata
            .get("decision_id")
            .and_then(|v| v.as_str())
            .unwrap_or("N/A")
            .to_string();

        AuditEntry {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor: Actor {
                actor_type: ActorType::classify(&submission.actor.id),
                actor_id: submission.actor.id.clone(),
                role: submission.actor.role.clone(),
                organization,
            },
            action: ActionRecord {
                classification: ActionClass::classify(&submission.action),
                operation: submission.action.clone(),
                status: ActionStatus::Pending,
            },
            object: ObjectRef {
                object_type: "audit_entry".to_string(),
                object_id: submission.target.clone(),
                object_hash: digest_hex(submission.target.as_bytes()),
            },
            context: GovernanceContext {
                decision_id,
                lifecycle_stage: self.config.lifecycle_stage.clone(),
                jurisdiction: self.config.jurisdiction.clone(),
            },
            integrity: Integrity::draft(),
            legal_status: self.config.legal_status.clone(),
            signature: SignatureRecord::none(),
            metadata: submission.metadata.clone(),
            compliance_status: None,
            violations: Vec::new(),
        }
    }
}
