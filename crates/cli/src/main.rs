use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Match outgoing payments against incoming deposits.
///
/// Each payment is paired with unused deposits, dated on or after it, whose
/// amounts add up to it exactly.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    /// CSV file with the deposits
    #[arg(long)]
    pub deposits: PathBuf,

    /// CSV file with the payments
    #[arg(long)]
    pub payments: PathBuf,

    /// Where to write the report (stdout when omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// TOML file describing the input and report layouts
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Date separator for both inputs, overriding the config
    #[arg(long)]
    pub separator: Option<char>,

    /// Write the results as JSON instead of the CSV report
    #[arg(long)]
    pub json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    commands::run(&args)
}
