//! # custodia-audit
//!
//! Chain storage for the CUSTODIA audit ledger: the mutex-guarded in-memory
//! `ChainStore` the ledger appends to, and the JSON-file `DurableStore` it
//! persists through.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custodia_audit::{InMemoryChainStore, JsonChainFile};
//! use custodia_core::traits::{ChainStore, DurableStore};
//!
//! let file = JsonChainFile::new("chain.json");
//! let store = InMemoryChainStore::from_entries(file.load()?);
//! // ... appends via the ledger ...
//! file.save(&store.snapshot())?;
//! ```

pub mod memory;
pub mod storage;

pub use memory::InMemoryChainStore;
pub use storage::JsonChainFile;

// ── Shared test fixtures ──────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests_support {
    use custodia_contracts::{
        ActionClass, ActionRecord, ActionStatus, Actor, ActorType, AuditEntry, GovernanceContext,
        Integrity, LegalStatus, ObjectRef, SignatureRecord, Violation,
    };
    use custodia_core::canonical::digest_hex;
    use custodia_core::traits::PolicyGate;

    /// A gate that never objects; integrity-only verification.
    pub(crate) struct NoPolicy;

    impl PolicyGate for NoPolicy {
        fn evaluate(&self, _entry: &AuditEntry) -> Vec<Violation> {
            Vec::new()
        }
    }

    /// A well-formed draft entry ready for `ChainStore::append`.
    pub(crate) fn make_entry(operation: &str) -> AuditEntry {
        AuditEntry {
            event_id: uuid::Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            actor: Actor {
                actor_id: "registrar@example.org".to_string(),
                actor_type: ActorType::Human,
                role: "registrar".to_string(),
                organization: "governance-core".to_string(),
            },
            action: ActionRecord {
                operation: operation.to_string(),
                classification: ActionClass::classify(operation),
                status: ActionStatus::Accepted,
            },
            object: ObjectRef {
                object_type: "audit_entry".to_string(),
                object_id: "case-1".to_string(),
                object_hash: digest_hex(b"case-1"),
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
}

// ── End-to-end ledger tests ───────────────────────────────────────────────────
//
// The full pipeline — constitutional gate, red-line catalogue, chain store,
// durable store, stub signer — wired the way an operator would wire it.

#[cfg(test)]
mod tests {
    use custodia_contracts::{
        ActionStatus, ComplianceStatus, CustodiaError, CustodiaResult, ExportBundle, Integrity,
        SubmitOutcome, Submission,
    };
    use custodia_core::traits::{ChainStore, DurableStore, ReportRenderer, Signer};
    use custodia_core::{Ledger, LedgerConfig, ReportExporter, VerifyMode, SCHEMA_VIOLATION_PREFIX};
    use custodia_policy::RedLineCatalog;
    use custodia_verify::ConstitutionalGate;

    use super::{InMemoryChainStore, JsonChainFile};

    // ── Fakes ─────────────────────────────────────────────────────────────────

    /// Deterministic fake for the external signing collaborator.
    struct StubSigner;

    impl Signer for StubSigner {
        fn sign(&self, message: &[u8]) -> CustodiaResult<Vec<u8>> {
            let mut bytes = message.to_vec();
            bytes.reverse();
            Ok(bytes)
        }

        fn signer_id(&self) -> String {
            "stub-qes-provider".to_string()
        }

        fn public_key(&self) -> Vec<u8> {
            b"stub-public-key".to_vec()
        }
    }

    /// A signer that is always unavailable.
    struct DownSigner;

    impl Signer for DownSigner {
        fn sign(&self, _message: &[u8]) -> CustodiaResult<Vec<u8>> {
            Err(CustodiaError::SignerUnavailable {
                reason: "connection refused".to_string(),
            })
        }

        fn signer_id(&self) -> String {
            "down-signer".to_string()
        }

        fn public_key(&self) -> Vec<u8> {
            Vec::new()
        }
    }

    struct LineRenderer;

    impl ReportRenderer for LineRenderer {
        fn render(&self, bundle: &ExportBundle, case_id: &str) -> CustodiaResult<Vec<u8>> {
            let mut out = format!("case {case_id}\n");
            for entry in &bundle.entries {
                out.push_str(&format!(
                    "{} {}\n",
                    entry.integrity.chain_position, entry.action.operation
                ));
            }
            Ok(out.into_bytes())
        }
    }

    /// Ledger over fresh in-memory state, plus a shared handle to its store.
    fn make_ledger() -> (Ledger, InMemoryChainStore) {
        let store = InMemoryChainStore::new();
        let handle = store.clone();
        let ledger = Ledger::new(
            Box::new(ConstitutionalGate::builtin()),
            Box::new(RedLineCatalog::builtin()),
            Box::new(store),
            LedgerConfig::default(),
        );
        (ledger, handle)
    }

    // ── Scenarios ─────────────────────────────────────────────────────────────

    /// A red-line action is rejected AND recorded at position 1.
    #[test]
    fn red_line_submission_is_recorded_with_violation() {
        let (ledger, store) = make_ledger();

        let receipt = ledger
            .submit(Submission::new("u1", "admin", "enable_surveillance", "users"))
            .unwrap();

        assert_eq!(receipt.outcome, SubmitOutcome::RejectedPolicy);
        assert_eq!(receipt.chain_position, 1);
        assert!(receipt
            .violations
            .iter()
            .any(|v| v.code == "RED_LINE_VIOLATION_1"));

        // Rejection never means silent drop.
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot[0].compliance_status,
            Some(ComplianceStatus::NonCompliant)
        );
        assert_eq!(snapshot[0].action.status, ActionStatus::Rejected);
        assert_eq!(snapshot[0].violations, receipt.violations);
    }

    /// Two clean submissions land at positions 1 and 2 and verify.
    #[test]
    fn clean_submissions_chain_and_verify() {
        let (ledger, _store) = make_ledger();

        let first = ledger
            .submit(Submission::new(
                "clerk@example.org",
                "clerk",
                "create_decision",
                "decision-1",
            ))
            .unwrap();
        let second = ledger
            .submit(Submission::new(
                "clerk@example.org",
                "clerk",
                "publish_minutes",
                "minutes-1",
            ))
            .unwrap();

        assert_eq!(first.outcome, SubmitOutcome::Accepted);
        assert_eq!(second.outcome, SubmitOutcome::Accepted);
        assert_eq!(first.chain_position, 1);
        assert_eq!(second.chain_position, 2);

        let report = ledger.verify(VerifyMode::FullScan);
        assert!(report.valid);
        assert_eq!(report.checked, 2);
        assert_eq!(report.violations, 0);
    }

    /// A structurally invalid submission (missing action) is recorded as a
    /// marked variant at the next position.
    #[test]
    fn malformed_submission_is_recorded_as_schema_violation() {
        let (ledger, store) = make_ledger();

        ledger
            .submit(Submission::new("clerk@example.org", "clerk", "create_case", "case-1"))
            .unwrap();

        let receipt = ledger
            .submit(Submission::new("clerk@example.org", "clerk", "", "case-1"))
            .unwrap();

        assert_eq!(receipt.outcome, SubmitOutcome::RejectedSchema);
        assert_eq!(receipt.chain_position, 2, "position still increments");
        assert!(!receipt.violations.is_empty());

        let snapshot = store.snapshot();
        assert!(snapshot[1]
            .action
            .operation
            .starts_with(SCHEMA_VIOLATION_PREFIX));
        assert_eq!(
            snapshot[1].compliance_status,
            Some(ComplianceStatus::NonCompliant)
        );

        // The recorded variant is itself chained correctly.
        assert!(ledger.verify(VerifyMode::FullScan).valid);
    }

    /// Empty chain: genesis head, valid verification, clean status.
    #[test]
    fn empty_chain_status_and_verify() {
        let (ledger, _store) = make_ledger();

        let status = ledger.status();
        assert_eq!(status.length, 0);
        assert_eq!(status.last_hash, Integrity::GENESIS);
        assert!(!status.tamper_detected);
        assert_eq!(status.red_line_violation_count, 0);

        let report = ledger.verify(VerifyMode::FullScan);
        assert!(report.valid);
        assert_eq!(report.checked, 0);
    }

    /// Positions count every outcome: accepted and rejected entries share
    /// one monotonically increasing sequence.
    #[test]
    fn positions_number_all_outcomes() {
        let (ledger, store) = make_ledger();

        let outcomes = [
            ledger
                .submit(Submission::new("a@x.org", "clerk", "create_case", "c1"))
                .unwrap(),
            ledger
                .submit(Submission::new("u1", "admin", "enable_surveillance", "users"))
                .unwrap(),
            ledger
                .submit(Submission::new("a@x.org", "clerk", "", "c1"))
                .unwrap(),
            ledger
                .submit(Submission::new("a@x.org", "clerk", "close_case", "c1"))
                .unwrap(),
        ];

        for (i, receipt) in outcomes.iter().enumerate() {
            assert_eq!(receipt.chain_position, i as u64 + 1);
        }
        assert_eq!(store.len(), 4);

        // Receipts' chain hashes trace the prev-hash linkage.
        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].integrity.previous_hash, Integrity::GENESIS);
        for i in 1..snapshot.len() {
            assert_eq!(
                snapshot[i].integrity.previous_hash,
                snapshot[i - 1].integrity.hash
            );
        }
    }

    /// Tampering with a stored entry is reported at exactly that position,
    /// both via `verify` and the status tamper flag.
    #[test]
    fn tampering_is_detected_and_localized() {
        let (ledger, store) = make_ledger();
        for op in ["create_case", "publish_minutes", "close_case"] {
            ledger
                .submit(Submission::new("a@x.org", "clerk", op, "c1"))
                .unwrap();
        }

        {
            let mut state = store.state.lock().unwrap();
            state.entries[1].object.object_id = "swapped-target".to_string();
        }

        let report = ledger.verify(VerifyMode::FullScan);
        assert!(!report.valid);
        assert_eq!(report.first_break, Some(2));

        let status = ledger.status();
        assert!(status.tamper_detected);
    }

    /// Status surfaces the replayed red-line count without calling the
    /// honest chain tampered.
    #[test]
    fn status_counts_recorded_violations() {
        let (ledger, _store) = make_ledger();
        ledger
            .submit(Submission::new("u1", "admin", "enable_surveillance", "users"))
            .unwrap();
        ledger
            .submit(Submission::new("a@x.org", "clerk", "publish_minutes", "m1"))
            .unwrap();

        let status = ledger.status();
        assert_eq!(status.length, 2);
        assert!(!status.tamper_detected);
        assert_eq!(status.red_line_violation_count, 1);
    }

    // ── Signing ───────────────────────────────────────────────────────────────

    /// An accepted entry gets a detached signature over its chain hash, and
    /// the late bind leaves the chain verifiable.
    #[test]
    fn accepted_entry_is_signed_out_of_band() {
        let store = InMemoryChainStore::new();
        let handle = store.clone();
        let ledger = Ledger::new(
            Box::new(ConstitutionalGate::builtin()),
            Box::new(RedLineCatalog::builtin()),
            Box::new(store),
            LedgerConfig::default(),
        )
        .with_signer(Box::new(StubSigner));

        let receipt = ledger
            .submit(Submission::new("a@x.org", "clerk", "create_case", "c1"))
            .unwrap();
        assert_eq!(receipt.outcome, SubmitOutcome::Accepted);

        let entry = &handle.snapshot()[0];
        assert_eq!(entry.signature.signature_type, "detached");
        assert_eq!(entry.signature.signer_id.as_deref(), Some("stub-qes-provider"));
        assert!(entry.signature.signature_value.is_some());

        assert!(ledger.verify(VerifyMode::FullScan).valid);
    }

    /// A dead signer defers the signature without losing the entry.
    #[test]
    fn signer_failure_does_not_invalidate_the_entry() {
        let store = InMemoryChainStore::new();
        let handle = store.clone();
        let ledger = Ledger::new(
            Box::new(ConstitutionalGate::builtin()),
            Box::new(RedLineCatalog::builtin()),
            Box::new(store),
            LedgerConfig::default(),
        )
        .with_signer(Box::new(DownSigner));

        let receipt = ledger
            .submit(Submission::new("a@x.org", "clerk", "create_case", "c1"))
            .unwrap();

        assert_eq!(receipt.outcome, SubmitOutcome::Accepted);
        let entry = &handle.snapshot()[0];
        assert_eq!(entry.signature.signature_type, "none");
        assert!(ledger.verify(VerifyMode::FullScan).valid);
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    /// Save, reload, resume, append — the chain survives the round trip.
    #[test]
    fn chain_survives_durable_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonChainFile::new(dir.path().join("chain.json"));

        let (ledger, store) = make_ledger();
        for op in ["create_case", "publish_minutes"] {
            ledger
                .submit(Submission::new("a@x.org", "clerk", op, "c1"))
                .unwrap();
        }
        file.save(&store.snapshot()).unwrap();

        let resumed_store = InMemoryChainStore::from_entries(file.load().unwrap());
        let handle = resumed_store.clone();
        let resumed = Ledger::new(
            Box::new(ConstitutionalGate::builtin()),
            Box::new(RedLineCatalog::builtin()),
            Box::new(resumed_store),
            LedgerConfig::default(),
        );

        let receipt = resumed
            .submit(Submission::new("a@x.org", "clerk", "close_case", "c1"))
            .unwrap();
        assert_eq!(receipt.chain_position, 3);
        assert!(resumed.verify(VerifyMode::FullScan).valid);
        assert_eq!(handle.len(), 3);
    }

    // ── Export / report boundary ──────────────────────────────────────────────

    #[test]
    fn export_range_is_positional_and_head_hashed() {
        let (ledger, store) = make_ledger();
        for op in ["a_case", "b_case", "c_case"] {
            ledger
                .submit(Submission::new("a@x.org", "clerk", op, "c1"))
                .unwrap();
        }

        let bundle = ledger.export(Some((1, 2))).unwrap();
        assert_eq!(bundle.entries.len(), 2);
        assert_eq!(
            bundle.chain_hash_at_range_end,
            store.snapshot()[1].integrity.hash
        );

        let whole = ledger.export(None).unwrap();
        assert_eq!(whole.entries.len(), 3);
        assert_eq!(whole.chain_hash_at_range_end, store.last_hash());

        assert!(matches!(
            ledger.export(Some((2, 9))),
            Err(CustodiaError::RangeOutOfBounds { .. })
        ));
    }

    /// The exporter renders, hash-commits, signs, and records its own run
    /// on the chain.
    #[test]
    fn signed_report_is_produced_and_self_audited() {
        let (ledger, store) = make_ledger();
        ledger
            .submit(Submission::new("a@x.org", "clerk", "create_case", "c1"))
            .unwrap();

        let exporter =
            ReportExporter::new(Box::new(LineRenderer)).with_signer(Box::new(StubSigner));
        let report = exporter.export_signed(&ledger, "case-77", None).unwrap();

        assert_eq!(report.entry_count, 1);
        assert_eq!(report.case_id, "case-77");
        assert_eq!(
            report.document_hash,
            custodia_core::digest_hex(&report.document)
        );
        assert_eq!(report.signature.signature_type, "detached");

        // The export itself landed on the chain.
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].action.operation, "generate_audit_report");
        assert_eq!(snapshot[1].actor.role, "SystemAuditor");
        assert!(ledger.verify(VerifyMode::FullScan).valid);
    }

    /// An unavailable signer yields an unsigned but otherwise complete
    /// report.
    #[test]
    fn report_survives_signer_outage() {
        let (ledger, _store) = make_ledger();
        ledger
            .submit(Submission::new("a@x.org", "clerk", "create_case", "c1"))
            .unwrap();

        let exporter =
            ReportExporter::new(Box::new(LineRenderer)).with_signer(Box::new(DownSigner));
        let report = exporter.export_signed(&ledger, "case-77", None).unwrap();

        assert_eq!(report.signature.signature_type, "none");
        assert!(!report.document.is_empty());
    }
}
