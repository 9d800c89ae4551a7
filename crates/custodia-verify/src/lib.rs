//! # custodia-verify
//!
//! The constitutional schema gate for the CUSTODIA audit ledger: structural
//! validation of serialized entries against an embedded JSON Schema
//! document, implementing the `SchemaGate` seam from custodia-core.

pub mod gate;

pub use gate::ConstitutionalGate;
