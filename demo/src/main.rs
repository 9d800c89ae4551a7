//! CUSTODIA Audit Ledger — Demo CLI
//!
//! Runs one or all of the demo scenarios against a real ledger: the
//! constitutional schema gate, the red-line catalogue, and the mutex-guarded
//! hash chain, with a stub QES signer standing in for the external signing
//! collaborator.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- red-line
//!   cargo run -p demo -- clean-chain
//!   cargo run -p demo -- malformed
//!   cargo run -p demo -- status
//!   cargo run -p demo -- report
//!
//! Pass `--chain-file ledger.json` to persist the chain between runs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use custodia_audit::{InMemoryChainStore, JsonChainFile};
use custodia_contracts::{CustodiaResult, ExportBundle, SubmitReceipt, Submission};
use custodia_core::traits::{ChainStore, DurableStore, ReportRenderer, Signer};
use custodia_core::{digest_hex, Ledger, LedgerConfig, ReportExporter, VerifyMode};
use custodia_policy::RedLineCatalog;
use custodia_verify::ConstitutionalGate;

// ── CLI definition ────────────────────────────────────────────────────────────

/// CUSTODIA — policy-enforcing, tamper-evident audit ledger demo.
///
/// Each subcommand drives the full submit pipeline: structural validation,
/// red-line evaluation, hash-chained append, and out-of-band signing.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "CUSTODIA audit ledger demo",
    long_about = "Runs CUSTODIA demo scenarios showing constitutional schema validation,\n\
                  red-line policy enforcement, record-even-when-rejected chaining,\n\
                  chain verification, and signed report export."
)]
struct Cli {
    /// Persist the chain to this JSON file (loaded on start, saved on exit).
    #[arg(long, global = true)]
    chain_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every scenario in sequence against one shared chain.
    RunAll,
    /// Scenario: a red-line action is rejected AND recorded with violations.
    RedLine,
    /// Scenario: clean submissions chain from genesis and verify.
    CleanChain,
    /// Scenario: a structurally invalid submission lands as SCHEMA_VIOLATION_*.
    Malformed,
    /// Print chain status: length, head hash, tamper flag, violation count.
    Status,
    /// Export the whole chain as a signed report (self-audited).
    Report,
}

// ── Collaborator stubs ────────────────────────────────────────────────────────

/// Deterministic stand-in for the qualified-signature provider.
struct StubQesSigner;

impl Signer for StubQesSigner {
    fn sign(&self, message: &[u8]) -> CustodiaResult<Vec<u8>> {
        // The "signature" is just a digest of the message. Real deployments
        // plug in an actual QES backend behind this trait.
        Ok(digest_hex(message).into_bytes())
    }

    fn signer_id(&self) -> String {
        "demo-qes-stub".to_string()
    }

    fn public_key(&self) -> Vec<u8> {
        b"demo-qes-stub-public-key".to_vec()
    }
}

/// Plain-text report renderer: one line per entry.
struct TextRenderer;

impl ReportRenderer for TextRenderer {
    fn render(&self, bundle: &ExportBundle, case_id: &str) -> CustodiaResult<Vec<u8>> {
        let mut out = String::new();
        out.push_str(&format!("CUSTODIA audit report — case {case_id}\n"));
        out.push_str(&format!("entries: {}\n", bundle.entries.len()));
        out.push_str(&format!("chain hash: {}\n\n", bundle.chain_hash_at_range_end));
        for entry in &bundle.entries {
            out.push_str(&format!(
                "#{:<4} {:<10} {:<40} {:?}\n",
                entry.integrity.chain_position,
                entry.actor.role,
                entry.action.operation,
                entry.action.status,
            ));
        }
        Ok(out.into_bytes())
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Structured logging. Set RUST_LOG=debug to watch the pipeline.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    if let Err(e) = run(cli) {
        eprintln!("Demo error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CustodiaResult<()> {
    let file = cli.chain_file.map(JsonChainFile::new);

    let store = match &file {
        Some(f) => InMemoryChainStore::from_entries(f.load()?),
        None => InMemoryChainStore::new(),
    };
    let handle = store.clone();

    let ledger = Ledger::new(
        Box::new(ConstitutionalGate::builtin()),
        Box::new(RedLineCatalog::builtin()),
        Box::new(store),
        LedgerConfig::default(),
    )
    .with_signer(Box::new(StubQesSigner));

    match cli.command {
        Command::RunAll => {
            run_clean_chain(&ledger)?;
            run_red_line(&ledger)?;
            run_malformed(&ledger)?;
            run_status(&ledger);
            run_report(&ledger)?;
        }
        Command::RedLine => run_red_line(&ledger)?,
        Command::CleanChain => run_clean_chain(&ledger)?,
        Command::Malformed => run_malformed(&ledger)?,
        Command::Status => run_status(&ledger),
        Command::Report => run_report(&ledger)?,
    }

    if let Some(f) = &file {
        f.save(&handle.snapshot())?;
        println!("Chain saved to {}", f.path().display());
    }

    println!();
    println!("Done.");
    Ok(())
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

fn run_red_line(ledger: &Ledger) -> CustodiaResult<()> {
    println!("── Red-line rejection ───────────────────────────────────────");
    let receipt = ledger.submit(Submission::new(
        "u1",
        "admin",
        "enable_surveillance",
        "users",
    ))?;
    print_receipt(&receipt);

    let receipt = ledger.submit(
        Submission::new("registry-bot", "SuperAdmin", "grant_role", "registry")
            .with_metadata("decision_id", serde_json::json!("D-2024-019")),
    )?;
    print_receipt(&receipt);
    println!();
    Ok(())
}

fn run_clean_chain(ledger: &Ledger) -> CustodiaResult<()> {
    println!("── Clean submissions ────────────────────────────────────────");
    for (actor, role, op, target) in [
        ("clerk@example.org", "clerk", "create_decision", "decision-77"),
        ("ombud@example.org", "ombudsman", "publish_minutes", "minutes-12"),
    ] {
        let receipt = ledger.submit(Submission::new(actor, role, op, target))?;
        print_receipt(&receipt);
    }

    let report = ledger.verify(VerifyMode::FullScan);
    println!(
        "verify: valid={} checked={} violations={}",
        report.valid, report.checked, report.violations
    );
    println!();
    Ok(())
}

fn run_malformed(ledger: &Ledger) -> CustodiaResult<()> {
    println!("── Malformed submission ─────────────────────────────────────");
    // Empty operation: the constitutional gate refuses it, and the refusal
    // itself is chained under a SCHEMA_VIOLATION_ operation.
    let receipt = ledger.submit(Submission::new("clerk@example.org", "clerk", "", "case-3"))?;
    print_receipt(&receipt);
    println!();
    Ok(())
}

fn run_status(ledger: &Ledger) {
    println!("── Chain status ─────────────────────────────────────────────");
    let status = ledger.status();
    println!("length:              {}", status.length);
    println!("head hash:           {}", status.last_hash);
    println!("tamper detected:     {}", status.tamper_detected);
    println!("red-line violations: {}", status.red_line_violation_count);
    println!();
}

fn run_report(ledger: &Ledger) -> CustodiaResult<()> {
    println!("── Signed report ────────────────────────────────────────────");
    let exporter =
        ReportExporter::new(Box::new(TextRenderer)).with_signer(Box::new(StubQesSigner));
    let report = exporter.export_signed(ledger, "demo-case", None)?;

    println!("report id:     {}", report.report_id);
    println!("entry count:   {}", report.entry_count);
    println!("chain hash:    {}", report.chain_hash);
    println!("document hash: {}", report.document_hash);
    println!("signed:        {}", report.signature.signature_value.is_some());
    println!();
    println!("{}", String::from_utf8_lossy(&report.document));
    Ok(())
}

fn print_receipt(receipt: &SubmitReceipt) {
    println!(
        "#{:<4} {:?} entry={}",
        receipt.chain_position, receipt.outcome, receipt.entry_id
    );
    for violation in &receipt.violations {
        println!("      {violation}");
    }
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("CUSTODIA — Tamper-Evident Audit Ledger");
    println!("======================================");
    println!();
    println!("Submit pipeline per entry:");
    println!("  [1] Constitutional gate validates structure against the embedded schema");
    println!("  [2] Red-line catalogue evaluates the action, metadata, and role");
    println!("  [3] Entry is hash-chained and appended — accepted OR rejected");
    println!("  [4] Detached signature over the chain hash, best-effort");
    println!();
}
