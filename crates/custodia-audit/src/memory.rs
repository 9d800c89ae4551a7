//! In-memory implementation of `ChainStore`.
//!
//! `InMemoryChainStore` keeps all entries in a `Vec` behind a `Mutex`. The
//! whole "read last hash, compute hash, link, push" sequence runs under one
//! lock acquisition, so concurrent submitters can never observe the same
//! predecessor or collide on a chain position — the compare-and-append
//! critical section is the lock itself. Nothing inside the section blocks
//! on I/O.
//!
//! Reads (`snapshot`, `snapshot_range`, `last_hash`, `len`) clone under the
//! lock and return owned data, so verification walks a consistent
//! point-in-time copy and never races a concurrent append.

use std::sync::{Arc, Mutex};

use tracing::debug;

use custodia_contracts::{
    AuditEntry, CustodiaError, CustodiaResult, Integrity, SignatureRecord,
};
use custodia_core::canonical::hash_entry;
use custodia_core::traits::{Appended, ChainStore};

/// The mutable interior of an `InMemoryChainStore`.
pub(crate) struct ChainState {
    /// All entries in append order. Never reordered, never truncated.
    pub(crate) entries: Vec<AuditEntry>,

    /// Hash of the last entry, or `Integrity::GENESIS` before the first
    /// append. Owned here so append never re-derives it from the tail.
    pub(crate) last_hash: String,
}

/// An append-only, mutex-guarded, in-memory hash chain.
///
/// Cloning the store clones the `Arc` — all clones observe the same chain,
/// which is how tests and background readers get a handle alongside the
/// ledger's owning `Box`.
#[derive(Clone)]
pub struct InMemoryChainStore {
    pub(crate) state: Arc<Mutex<ChainState>>,
}

impl InMemoryChainStore {
    /// An empty chain at genesis.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ChainState {
                entries: Vec::new(),
                last_hash: Integrity::GENESIS.to_string(),
            })),
        }
    }

    /// Resume a chain previously loaded from a durable store.
    ///
    /// The head hash is taken from the last entry as stored; the loaded
    /// chain is trusted as-is here — run the verifier separately to check
    /// it.
    pub fn from_entries(entries: Vec<AuditEntry>) -> Self {
        let last_hash = entries
            .last()
            .map(|e| e.integrity.hash.clone())
            .unwrap_or_else(|| Integrity::GENESIS.to_string());

        Self {
            state: Arc::new(Mutex::new(ChainState { entries, last_hash })),
        }
    }
}

impl Default for InMemoryChainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainStore for InMemoryChainStore {
    /// Link and append one entry under a single lock acquisition.
    ///
    /// Fills `integrity` with the predecessor hash, the 1-based position,
    /// and the freshly computed chain hash, then pushes and advances the
    /// head.
    fn append(&self, mut entry: AuditEntry) -> CustodiaResult<Appended> {
        let mut state = self.state.lock().map_err(|e| CustodiaError::AppendFailed {
            reason: format!("chain state lock poisoned: {e}"),
        })?;

        let previous_hash = state.last_hash.clone();
        let position = state.entries.len() as u64 + 1;

        entry.integrity.previous_hash = previous_hash.clone();
        entry.integrity.chain_position = position;
        entry.integrity.hash = String::new();

        let hash = hash_entry(&entry, &previous_hash)?;
        entry.integrity.hash = hash.clone();

        state.entries.push(entry);
        state.last_hash = hash.clone();

        debug!(position, chain_hash = %hash, "entry appended");

        Ok(Appended {
            position,
            hash,
            previous_hash,
        })
    }

    fn last_hash(&self) -> String {
        self.state
            .lock()
            .expect("chain state lock poisoned")
            .last_hash
            .clone()
    }

    fn len(&self) -> u64 {
        self.state
            .lock()
            .expect("chain state lock poisoned")
            .entries
            .len() as u64
    }

    fn snapshot(&self) -> Vec<AuditEntry> {
        self.state
            .lock()
            .expect("chain state lock poisoned")
            .entries
            .clone()
    }

    fn snapshot_range(&self, start: u64, end: u64) -> CustodiaResult<Vec<AuditEntry>> {
        let state = self.state.lock().map_err(|e| CustodiaError::AppendFailed {
            reason: format!("chain state lock poisoned: {e}"),
        })?;

        let length = state.entries.len() as u64;
        if start < 1 || end < start || end > length {
            return Err(CustodiaError::RangeOutOfBounds { start, end, length });
        }

        Ok(state.entries[(start - 1) as usize..end as usize].to_vec())
    }

    /// The single permitted late-bind: set the signature block of the entry
    /// at `position`. The signature is excluded from hash coverage, so the
    /// chain stays verifiable afterward.
    fn attach_signature(&self, position: u64, signature: SignatureRecord) -> CustodiaResult<()> {
        let mut state = self.state.lock().map_err(|e| CustodiaError::AppendFailed {
            reason: format!("chain state lock poisoned: {e}"),
        })?;

        let length = state.entries.len() as u64;
        let entry = state
            .entries
            .get_mut(position.saturating_sub(1) as usize)
            .filter(|_| position >= 1)
            .ok_or(CustodiaError::RangeOutOfBounds {
                start: position,
                end: position,
                length,
            })?;

        entry.signature = signature;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
