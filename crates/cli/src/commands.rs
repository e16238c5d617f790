use anyhow::Context;
use remesa_core::{MatchResult, Record};
use remesa_import::{import, summarize, CsvImportProfile, ReconcileConfig};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use crate::Args;

pub fn run(args: &Args) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(sep) = args.separator {
        config = config.with_date_separator(sep);
    }

    let deposits = load_records(&args.deposits, &config.deposits)?;
    let payments = load_records(&args.payments, &config.payments)?;

    let results = import::reconcile(&deposits, &payments).context("Reconciliation aborted")?;

    let summary = summarize(&results, deposits.len());
    tracing::info!(
        matched = summary.matched,
        unmatched = summary.unmatched,
        deposits_used = summary.deposits_used,
        deposits_left = summary.deposits_left,
        "summary"
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_results(BufWriter::new(file), &results, &config, args.json)?;
            tracing::info!("Report written to {}", path.display());
        }
        None => write_results(io::stdout().lock(), &results, &config, args.json)?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ReconcileConfig> {
    let Some(path) = path else {
        return Ok(ReconcileConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    ReconcileConfig::from_toml(&content)
        .with_context(|| format!("Invalid config {}", path.display()))
}

fn load_records(path: &Path, profile: &CsvImportProfile) -> anyhow::Result<Vec<Record>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let records = import::import_records(BufReader::new(file), profile)
        .with_context(|| format!("Failed to import {} from {}", profile.name, path.display()))?;
    tracing::info!(count = records.len(), "Loaded {} from {}", profile.name, path.display());
    Ok(records)
}

fn write_results<W: Write>(
    mut out: W,
    results: &[MatchResult],
    config: &ReconcileConfig,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut out, results)?;
        writeln!(out)?;
        out.flush()?;
        return Ok(());
    }
    import::export_report(out, results, &config.report)?;
    Ok(())
}
