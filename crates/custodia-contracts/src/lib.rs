//! # custodia-contracts
//!
//! Shared types, violation codes, and error taxonomy for the CUSTODIA
//! audit ledger.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions, small derivation helpers, and error
//! types.

pub mod entry;
pub mod error;
pub mod report;
pub mod submission;
pub mod violation;

pub use entry::{
    ActionClass, ActionRecord, ActionStatus, Actor, ActorType, AuditEntry, ComplianceStatus,
    GovernanceContext, Integrity, LegalStatus, ObjectRef, SignatureRecord, HASH_ALGORITHM,
};
pub use error::{CustodiaError, CustodiaResult};
pub use report::{ChainStatus, ExportBundle, SignedReport, VerifyReport};
pub use submission::{SubmitOutcome, SubmitReceipt, SubmittedActor, Submission};
pub use violation::{SchemaComplaint, Violation, CONSTITUTIONAL_CODE, RED_LINE_CODE_PREFIX};

#[cfg(test)]
mod tests {
    use super::*;

    // ── Derivations ──────────────────────────────────────────────────────────

    #[test]
    fn actor_type_derived_from_at_delimiter() {
        assert_eq!(ActorType::classify("ombud@example.org"), ActorType::Human);
        assert_eq!(ActorType::classify("ingest-daemon-7"), ActorType::System);
        assert_eq!(ActorType::classify(""), ActorType::System);
    }

    #[test]
    fn action_class_derived_from_create_substring() {
        assert_eq!(ActionClass::classify("create_decision"), ActionClass::Create);
        assert_eq!(ActionClass::classify("RECREATE_INDEX"), ActionClass::Create);
        assert_eq!(ActionClass::classify("publish_minutes"), ActionClass::Update);
    }

    // ── Serde names ──────────────────────────────────────────────────────────

    /// The wire vocabulary is load-bearing: the constitutional schema and
    /// downstream consumers match on these exact strings.
    #[test]
    fn enums_serialize_to_wire_names() {
        assert_eq!(
            serde_json::to_value(ActorType::Human).unwrap(),
            serde_json::json!("human")
        );
        assert_eq!(
            serde_json::to_value(ActionStatus::Rejected).unwrap(),
            serde_json::json!("rejected")
        );
        assert_eq!(
            serde_json::to_value(ComplianceStatus::NonCompliant).unwrap(),
            serde_json::json!("non_compliant")
        );
        assert_eq!(
            serde_json::to_value(SubmitOutcome::RejectedPolicy).unwrap(),
            serde_json::json!("rejected_policy")
        );
    }

    #[test]
    fn violation_codes() {
        let v = Violation::red_line(6, "centralized control attempt");
        assert_eq!(v.code, "RED_LINE_VIOLATION_6");
        assert_eq!(v.rule, Some(6));

        let c = Violation::constitutional("schema non-compliance");
        assert_eq!(c.code, CONSTITUTIONAL_CODE);
        assert_eq!(c.rule, None);
    }

    // ── Entry round-trip ─────────────────────────────────────────────────────

    fn make_entry() -> AuditEntry {
        AuditEntry {
            event_id: uuid::Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            actor: Actor {
                actor_id: "clerk@example.org".to_string(),
                actor_type: ActorType::Human,
                role: "clerk".to_string(),
                organization: "governance-core".to_string(),
            },
            action: ActionRecord {
                operation: "create_decision".to_string(),
                classification: ActionClass::Create,
                status: ActionStatus::Pending,
            },
            object: ObjectRef {
                object_type: "audit_entry".to_string(),
                object_id: "decision-77".to_string(),
                object_hash: "a".repeat(64),
            },
            context: GovernanceContext {
                decision_id: "N/A".to_string(),
                lifecycle_stage: "learning".to_string(),
                jurisdiction: "FI".to_string(),
            },
            integrity: Integrity::draft(),
            legal_status: LegalStatus::default(),
            signature: SignatureRecord::none(),
            metadata: serde_json::Map::new(),
            compliance_status: None,
            violations: Vec::new(),
        }
    }

    /// Serialize → deserialize must be lossless, and the optional compliance
    /// fields must be absent from the JSON of a compliant entry.
    #[test]
    fn entry_round_trips_and_omits_compliance_when_clean() {
        let entry = make_entry();
        let json = serde_json::to_value(&entry).unwrap();

        assert!(json.get("compliance_status").is_none());
        assert!(json.get("violations").is_none());

        let back: AuditEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    /// The genesis sentinel can never collide with a 64-char hex digest.
    #[test]
    fn genesis_sentinel_is_not_a_digest() {
        assert_eq!(Integrity::GENESIS, "GENESIS");
        assert_ne!(Integrity::GENESIS.len(), 64);
    }
}
