//! # custodia-core
//!
//! The trusted engine of the CUSTODIA audit ledger: canonical hashing, the
//! entry-builder state machine, chain verification, and the trait seams the
//! gates and collaborators plug into.
//!
//! ## Pipeline
//!
//! ```text
//! Submission → schema gate → policy gate → chain append → (detached sign)
//! ```
//!
//! Every candidate entry — accepted or rejected — is appended exactly once.
//! The verifier replays the chain from genesis independently of the write
//! path.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custodia_core::{Ledger, LedgerConfig, VerifyMode};
//!
//! let ledger = Ledger::new(schema_gate, red_lines, chain_store, LedgerConfig::default());
//! let receipt = ledger.submit(submission)?;
//! assert!(ledger.verify(VerifyMode::FullScan).valid);
//! ```

pub mod canonical;
pub mod export;
pub mod ledger;
pub mod traits;
pub mod verifier;

pub use canonical::{canonicalize, digest_hex, hash_entry};
pub use export::ReportExporter;
pub use ledger::{Ledger, LedgerConfig, SCHEMA_VIOLATION_PREFIX};
pub use traits::{Appended, ChainStore, DurableStore, PolicyGate, ReportRenderer, SchemaGate, Signer};
pub use verifier::{verify_entries, VerifyMode};
