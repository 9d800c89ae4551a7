//! JSON-file implementation of `DurableStore`.
//!
//! The persisted layout is a single document: an ordered entry log plus a
//! small integrity header `{chain_hash, last_position, hash_algorithm}`.
//! The header is a cache — it must always be recomputable purely from the
//! log, so a stale header on load produces a warning, never a failure.
//!
//! Saves are atomic: the document is written to a sibling temp file and
//! renamed over the target, so a reader can never observe a partial write.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use custodia_contracts::{
    AuditEntry, CustodiaError, CustodiaResult, Integrity, HASH_ALGORITHM,
};
use custodia_core::traits::DurableStore;

/// The cached integrity header persisted alongside the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct IntegrityHeader {
    /// Hash of the last entry, or `"GENESIS"` for an empty log.
    chain_hash: String,
    last_position: u64,
    hash_algorithm: String,
}

impl IntegrityHeader {
    /// Recompute the header from the log it describes.
    fn for_entries(entries: &[AuditEntry]) -> Self {
        Self {
            chain_hash: entries
                .last()
                .map(|e| e.integrity.hash.clone())
                .unwrap_or_else(|| Integrity::GENESIS.to_string()),
            last_position: entries.len() as u64,
            hash_algorithm: HASH_ALGORITHM.to_string(),
        }
    }
}

/// The on-disk document.
#[derive(Debug, Serialize, Deserialize)]
struct ChainDocument {
    header: IntegrityHeader,
    entries: Vec<AuditEntry>,
}

/// A `DurableStore` persisting the chain as one JSON file.
#[derive(Debug, Clone)]
pub struct JsonChainFile {
    path: PathBuf,
}

impl JsonChainFile {
    /// Persist at `path`. The file is created on first save; a missing file
    /// loads as an empty chain.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DurableStore for JsonChainFile {
    fn load(&self) -> CustodiaResult<Vec<AuditEntry>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no chain file yet; loading empty chain");
            return Ok(Vec::new());
        }

        let contents =
            fs::read_to_string(&self.path).map_err(|e| CustodiaError::StoreUnavailable {
                reason: format!("failed to read chain file '{}': {e}", self.path.display()),
            })?;

        let document: ChainDocument =
            serde_json::from_str(&contents).map_err(|e| CustodiaError::Serialization {
                reason: format!("failed to parse chain file '{}': {e}", self.path.display()),
            })?;

        // The header is only a cache; the log is the source of truth.
        let recomputed = IntegrityHeader::for_entries(&document.entries);
        if document.header != recomputed {
            warn!(
                path = %self.path.display(),
                stored_position = document.header.last_position,
                actual_position = recomputed.last_position,
                "stale integrity header in chain file; trusting the log"
            );
        }

        debug!(
            path = %self.path.display(),
            entry_count = document.entries.len(),
            "chain loaded"
        );

        Ok(document.entries)
    }

    fn save(&self, entries: &[AuditEntry]) -> CustodiaResult<()> {
        let document = ChainDocument {
            header: IntegrityHeader::for_entries(entries),
            entries: entries.to_vec(),
        };

        let bytes =
            serde_json::to_vec_pretty(&document).map_err(|e| CustodiaError::Serialization {
                reason: format!("failed to serialize chain document: {e}"),
            })?;

        // Write-then-rename so no partial document is ever observable.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &bytes).map_err(|e| CustodiaError::StoreUnavailable {
            reason: format!("failed to write '{}': {e}", tmp_path.display()),
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| CustodiaError::StoreUnavailable {
            reason: format!(
                "failed to move '{}' into place: {e}",
                tmp_path.display()
            ),
        })?;

        debug!(
            path = %self.path.display(),
            entry_count = document.entries.len(),
            chain_hash = %document.header.chain_hash,
            "chain saved"
        );

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
