//! Error types for the CUSTODIA ledger.
//!
//! Schema and policy rejections are NOT errors — they are recorded outcomes
//! carried in `SubmitReceipt`. `CustodiaError` covers system faults only:
//! unavailable collaborators, broken storage, integrity faults surfaced by
//! the verifier, and bad configuration.

use thiserror::Error;

/// The unified fault type for the CUSTODIA crates.
#[derive(Debug, Error)]
pub enum CustodiaError {
    /// A required configuration value is missing or malformed.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The chain store could not complete an append.
    ///
    /// Fatal for the submission: an action that cannot be recorded must not
    /// be reported as recorded.
    #[error("chain append failed: {reason}")]
    AppendFailed { reason: String },

    /// The durable store could not load or save the chain.
    #[error("durable store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// The external signing collaborator failed or timed out.
    ///
    /// Never fatal for an appended entry — the signature late-binds and its
    /// absence is an observable state.
    #[error("signing service unavailable: {reason}")]
    SignerUnavailable { reason: String },

    /// The report renderer failed to produce a document.
    #[error("report rendering failed: {reason}")]
    RenderFailed { reason: String },

    /// Verification found a broken hash link. Reported, never healed.
    #[error("integrity fault: chain broken at position {position}")]
    IntegrityFault { position: u64 },

    /// An export range does not fit the chain.
    #[error("export range {start}..={end} out of bounds for chain of length {length}")]
    RangeOutOfBounds { start: u64, end: u64, length: u64 },

    /// An entry could not be serialized for hashing or persistence.
    #[error("entry serialization failed: {reason}")]
    Serialization { reason: String },
}

/// Convenience alias used throughout the CUSTODIA crates.
pub type CustodiaResult<T> = Result<T, CustodiaError>;
