//! Builds an option chain table from a saved exchange payload.
//!
//! ```text
//! chain_from_file demos/data/sample_chain.json 25030 28-OCT-2025
//! ```
//!
//! Without an expiry label the run is gated on the live trading session and
//! the next weekly expiry. With a label the table is built immediately for
//! that expiry, as of the payload's own timestamp when it carries one, which
//! is handy for replaying captured payloads.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use clap::Parser;
use optionchain_rs::prelude::*;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "chain_from_file", about = "Build an option chain table from a saved payload")]
struct Args {
    /// Exchange option-chain JSON payload.
    path: PathBuf,
    /// Near-month future price used as the reference.
    reference_price: f64,
    /// Expiry label (DD-MON-YYYY); skips the session gate when given.
    expiry: Option<String>,
}

/// Serves a chain read from disk and a fixed reference price.
struct FileSource {
    path: PathBuf,
    reference_price: f64,
}

impl ChainSource for FileSource {
    fn fetch_chain(&self, expiry_label: &str) -> Result<ChainSnapshot, ChainError> {
        info!(path = %self.path.display(), expiry = expiry_label, "reading chain");
        let data = fs::read_to_string(&self.path).map_err(|error| ChainError::DataUnavailable {
            message: format!("cannot read {}: {error}", self.path.display()),
        })?;
        ChainSnapshot::from_json(&data)
    }

    fn fetch_reference_price(&self) -> Result<f64, ChainError> {
        Ok(self.reference_price)
    }
}

/// Exchange timestamp of the payload in local time, if it parses.
fn snapshot_time(
    pipeline: &ChainPipeline,
    snapshot: &ChainSnapshot,
) -> Option<DateTime<FixedOffset>> {
    let stamp = snapshot.timestamp.as_deref()?;
    let naive = NaiveDateTime::parse_from_str(stamp, "%d-%b-%Y %H:%M:%S").ok()?;
    pipeline.calendar().offset().from_local_datetime(&naive).single()
}

fn print_table(package: &ChainTablePackage) {
    println!("{}", package.table.header().join(","));
    for record in package.table.records() {
        println!("{}", record.join(","));
    }

    let summary = package.table.summary();
    info!(
        run_id = %package.run_id,
        expiry = %package.metadata.expiry,
        atm_iv = ?package.metadata.atm_iv,
        strikes = summary.strikes,
        solved = summary.solved,
        put_call_ratio = ?summary.put_call_ratio,
        checksum = %package.checksum,
        "chain ready"
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let source = FileSource {
        path: args.path,
        reference_price: args.reference_price,
    };

    let pipeline = ChainPipeline::nse()?;
    let now = Utc::now();

    match args.expiry {
        Some(label) => {
            let expiry = pipeline.expiry_from_label(&label)?;
            let snapshot = source.fetch_chain(&expiry.label())?;
            let as_of = snapshot_time(&pipeline, &snapshot)
                .unwrap_or_else(|| pipeline.calendar().local(&now));
            let package =
                pipeline.build_table(&snapshot, source.reference_price, &expiry, &as_of)?;
            print_table(&package);
        }
        None => match pipeline.run(&now, &source)? {
            PipelineOutcome::SessionClosed(status) => warn!(%status, "nothing to do"),
            PipelineOutcome::Table(package) => print_table(&package),
        },
    }

    Ok(())
}
