//! Chain-wide tamper detection.
//!
//! The verifier replays the chain from genesis and reports the first point
//! of divergence. It runs over a snapshot, never the live store, so it can
//! execute concurrently with appends without observing a torn chain.
//!
//! Localization invariant: after a mismatch, the walk advances using the
//! entry's *stored* hash rather than the recomputed one. A single corrupted
//! entry therefore produces exactly one break instead of cascading false
//! mismatches down the rest of the chain — the report names exactly the
//! first broken position.

use tracing::{debug, warn};

use custodia_contracts::{AuditEntry, Integrity, VerifyReport};

use crate::canonical::hash_entry;
use crate::traits::PolicyGate;

/// What the verifier does after finding the first broken entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMode {
    /// Stop the walk at the first hash break.
    StopAtFirstBreak,
    /// Continue in report-only mode, checking every entry.
    FullScan,
}

/// Replay `entries` from genesis against the hash chain and the policy gate.
///
/// Three integrity checks per entry: the stored `previous_hash` must match
/// the running predecessor, the stored hash must match the recomputed one,
/// and `chain_position` must equal the entry's 1-based index. Independently,
/// the policy gate is re-run over every walked entry; each non-empty result
/// counts toward `violations` even when the entry was already recorded as
/// non-compliant — this catches tampering with the `compliance_status`
/// field itself.
///
/// `valid` reflects hash integrity only; an honest chain full of recorded
/// red-line attempts is still valid.
pub fn verify_entries(
    entries: &[AuditEntry],
    policy: &dyn PolicyGate,
    mode: VerifyMode,
) -> VerifyReport {
    let mut running_previous = Integrity::GENESIS.to_string();
    let mut first_break: Option<u64> = None;
    let mut violations: u64 = 0;
    let mut checked: u64 = 0;

    for (index, entry) in entries.iter().enumerate() {
        let position = index as u64 + 1;
        checked += 1;

        let expected_hash = match hash_entry(entry, &running_previous) {
            Ok(h) => h,
            Err(e) => {
                // An unhashable stored entry is itself a break.
                warn!(position, error = %e, "entry could not be rehashed during verification");
                first_break.get_or_insert(position);
                if mode == VerifyMode::StopAtFirstBreak {
                    break;
                }
                running_previous = entry.integrity.hash.clone();
                continue;
            }
        };

        let linked = entry.integrity.previous_hash == running_previous;
        let intact = entry.integrity.hash == expected_hash;
        let positioned = entry.integrity.chain_position == position;

        if !(linked && intact && positioned) {
            warn!(
                position,
                linked,
                intact,
                positioned,
                "tamper detected during chain verification"
            );
            first_break.get_or_insert(position);
            if mode == VerifyMode::StopAtFirstBreak {
                break;
            }
        }

        if !policy.evaluate(entry).is_empty() {
            violations += 1;
        }

        // Advance on the stored hash, not the recomputed one, so one
        // corrupted entry stays localized.
        running_previous = entry.integrity.hash.clone();
    }

    let report = VerifyReport {
        valid: first_break.is_none(),
        checked,
        first_break,
        violations,
    };

    debug!(
        checked = report.checked,
        valid = report.valid,
        violations = report.violations,
        "chain verification complete"
    );

    report
}

// ── Tests ─────────────────────────────────────────────────────────────────────
