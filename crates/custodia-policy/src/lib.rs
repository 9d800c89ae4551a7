//! # custodia-policy
//!
//! The red-line catalogue for the CUSTODIA audit ledger: a TOML-driven,
//! numbered table of non-negotiable forbidden governance actions,
//! implementing the `PolicyGate` seam from custodia-core.
//!
//! Matching is deliberately coarse — substring containment and keyword
//! scans. False positives are acceptable because a flagged entry is still
//! recorded (only its compliance status changes); false negatives are the
//! failure mode the catalogue is tuned against.

pub mod catalog;
pub mod rule;

pub use catalog::RedLineCatalog;
pub use rule::{RedLineConfig, RedLineRule};
