//! Canonical serialization and hashing of audit entries.
//!
//! Two fields are removed before hashing:
//!
//!   1. `integrity.hash` — the value being computed must not participate in
//!      its own input.
//!   2. `signature` — the detached signature is computed over the hash after
//!      append, so covering it would break every signed entry on replay.
//!
//! Everything else is hashed, including `integrity.previous_hash` and
//! `integrity.chain_position`, binding each entry to its predecessor and its
//! slot. The canonical form is compact JSON with sorted object keys —
//! `serde_json`'s default `Map` is a `BTreeMap`, so two semantically
//! identical entries canonicalize identically regardless of field insertion
//! order.
//!
//! Hash formula: `SHA-256(canonicalize(entry) || previous_hash_bytes)`.

use sha2::{Digest, Sha256};

use custodia_contracts::{AuditEntry, CustodiaError, CustodiaResult};

/// Produce the deterministic byte string an entry is hashed over.
pub fn canonicalize(entry: &AuditEntry) -> CustodiaResult<Vec<u8>> {
    let mut value = serde_json::to_value(entry).map_err(|e| CustodiaError::Serialization {
        reason: format!("failed to serialize entry for canonicalization: {e}"),
    })?;

    if let Some(root) = value.as_object_mut() {
        root.remove("signature");
        if let Some(integrity) = root.get_mut("integrity").and_then(|v| v.as_object_mut()) {
            integrity.remove("hash");
        }
    }

    serde_json::to_vec(&value).map_err(|e| CustodiaError::Serialization {
        reason: format!("failed to emit canonical bytes: {e}"),
    })
}

/// Compute the chain hash for `entry` linked to `previous_hash`.
///
/// Returns a lowercase 64-character hex string. Altering any earlier entry
/// changes every subsequent stored hash, making the alteration detectable
/// without re-trusting any single record.
pub fn hash_entry(entry: &AuditEntry, previous_hash: &str) -> CustodiaResult<String> {
    let canonical = canonicalize(entry)?;

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    hasher.update(previous_hash.as_bytes());

    Ok(hex::encode(hasher.finalize()))
}

/// Plain SHA-256 hex digest, used for object references and report
/// documents.
pub fn digest_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use custodia_contracts::{
        ActionClass, ActionRecord, ActionStatus, Actor, ActorType, AuditEntry, GovernanceContext,
        Integrity, LegalStatus, ObjectRef, SignatureRecord,
    };

    use super::{canonicalize, digest_hex, hash_entry};

    fn make_entry() -> AuditEntry {
        AuditEntry {
            event_id: uuid::Uuid::nil(),
            timestamp: chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            actor: Actor {
                actor_id: "auditor@example.org".to_string(),
                actor_type: ActorType::Human,
                role: "auditor".to_string(),
                organization: "governance-core".to_string(),
            },
            action: ActionRecord {
                operation: "publish_minutes".to_string(),
                classification: ActionClass::Update,
                status: ActionStatus::Pending,
            },
            object: ObjectRef {
                object_type: "audit_entry".to_string(),
                object_id: "minutes-2024-11".to_string(),
                object_hash: digest_hex(b"minutes-2024-11"),
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

    /// Canonicalizing the same entry twice yields identical bytes.
    #[test]
    fn canonicalization_is_deterministic() {
        let entry = make_entry();
        assert_eq!(canonicalize(&entry).unwrap(), canonicalize(&entry).unwrap());
    }

    /// Metadata maps built in different insertion orders canonicalize
    /// identically — object keys are sorted on the way out.
    #[test]
    fn canonicalization_is_insertion_order_independent() {
        let mut a = make_entry();
        a.metadata.insert("zeta".to_string(), serde_json::json!(1));
        a.metadata.insert("alpha".to_string(), serde_json::json!(2));

        let mut b = make_entry();
        b.metadata.insert("alpha".to_string(), serde_json::json!(2));
        b.metadata.insert("zeta".to_string(), serde_json::json!(1));

        assert_eq!(canonicalize(&a).unwrap(), canonicalize(&b).unwrap());
    }

    /// The stored hash must not feed its own input.
    #[test]
    fn stored_hash_is_excluded_from_canonical_bytes() {
        let mut entry = make_entry();
        let before = canonicalize(&entry).unwrap();

        entry.integrity.hash = "f".repeat(64);
        assert_eq!(canonicalize(&entry).unwrap(), before);
    }

    /// Attaching a detached signature after the fact must not change the
    /// canonical bytes, otherwise signing would break the chain.
    #[test]
    fn signature_is_excluded_from_canonical_bytes() {
        let mut entry = make_entry();
        let before = hash_entry(&entry, Integrity::GENESIS).unwrap();

        entry.signature = SignatureRecord::detached("qes-stub", "deadbeef");
        assert_eq!(hash_entry(&entry, Integrity::GENESIS).unwrap(), before);
    }

    /// The previous hash participates in the digest — the same entry linked
    /// to a different predecessor hashes differently.
    #[test]
    fn hash_binds_to_predecessor() {
        let entry = make_entry();
        let genesis = hash_entry(&entry, Integrity::GENESIS).unwrap();
        let linked = hash_entry(&entry, &"a".repeat(64)).unwrap();

        assert_ne!(genesis, linked);
        assert_eq!(genesis.len(), 64);
    }
}
