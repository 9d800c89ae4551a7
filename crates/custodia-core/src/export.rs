//! The report-export boundary.
//!
//! Rendering and signing are external collaborators with no integrity role:
//! the exporter snapshots a chain range, hands it to the renderer, commits
//! to the document with a SHA-256 digest, and requests a best-effort
//! detached signature. A missing signature leaves the report valid — the
//! underlying entries remain replayable regardless of outcome.
//!
//! Report generation is itself a governance action, so the exporter records
//! it on the chain through the same submit path as everything else.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use custodia_contracts::{CustodiaResult, SignatureRecord, SignedReport, Submission};

use crate::canonical::digest_hex;
use crate::ledger::Ledger;
use crate::traits::{ReportRenderer, Signer};

/// Actor id under which report generation is recorded.
const EXPORTER_ACTOR_ID: &str = "custodia-audit-system";

/// Role under which report generation is recorded.
const EXPORTER_ROLE: &str = "SystemAuditor";

/// Snapshots a chain range, renders it, and requests a detached signature.
pub struct ReportExporter {
    renderer: Box<dyn ReportRenderer>,
    signer: Option<Box<dyn Signer>>,
}

impl ReportExporter {
    pub fn new(renderer: Box<dyn ReportRenderer>) -> Self {
        Self {
            renderer,
            signer: None,
        }
    }

    /// Attach the external signing collaborator.
    pub fn with_signer(mut self, signer: Box<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Produce a signed report over the given 1-based inclusive position
    /// range (`None` = whole chain) and record the export on the chain.
    ///
    /// Fails only when the export range is invalid, the renderer fails, or
    /// the recording append fails — signer unavailability is downgraded to
    /// an unsigned report with a warning.
    pub fn export_signed(
        &self,
        ledger: &Ledger,
        case_id: &str,
        range: Option<(u64, u64)>,
    ) -> CustodiaResult<SignedReport> {
        let bundle = ledger.export(range)?;
        let report_id = Uuid::new_v4();

        let document = self.renderer.render(&bundle, case_id)?;
        let document_hash = digest_hex(&document);

        let signature = match &self.signer {
            Some(signer) => match signer.sign(document_hash.as_bytes()) {
                Ok(bytes) => SignatureRecord::detached(signer.signer_id(), hex::encode(bytes)),
                Err(e) => {
                    warn!(%report_id, error = %e, "report left unsigned: collaborator unavailable");
                    SignatureRecord::none()
                }
            },
            None => SignatureRecord::none(),
        };

        // The export is a governance action in its own right.
        let recording = Submission::new(
            EXPORTER_ACTOR_ID,
            EXPORTER_ROLE,
            "generate_audit_report",
            case_id,
        )
        .with_metadata("report_id", serde_json::json!(report_id.to_string()))
        .with_metadata("document_hash", serde_json::json!(document_hash));
        ledger.submit(recording)?;

        info!(
            %report_id,
            case_id,
            entry_count = bundle.entries.len(),
            signed = signature.signature_value.is_some(),
            "audit report exported"
        );

        Ok(SignedReport {
            report_id,
            case_id: case_id.to_string(),
            generated_at: Utc::now(),
            entry_count: bundle.entries.len() as u64,
            chain_hash: bundle.chain_hash_at_range_end,
            document,
            document_hash,
            signature,
        })
    }
}
