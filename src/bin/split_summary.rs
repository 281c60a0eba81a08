use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "split_summary",
    about = "Per-heliostat train/validation/test counts of a benchmark split file"
)]
struct Args {
    /// Benchmark split CSV produced by `dataset_split`.
    #[arg(long)]
    split_file: PathBuf,

    /// Optional CSV output; the JSON summary is always printed.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let summary = helio_split::split_summary::summarize_file(&args.split_file)
        .with_context(|| format!("summarize {}", args.split_file.display()))?;

    if let Some(out) = &args.out {
        helio_split::split_summary::write_summary_csv(out, &summary)
            .with_context(|| format!("write {}", out.display()))?;
        info!(out = %out.display(), "summary csv written");
    }

    let json = serde_json::to_string_pretty(&summary).context("serialize summary")?;
    println!("{json}");

    info!(
        heliostats = summary.by_heliostat.len(),
        train = summary.totals.train,
        validation = summary.totals.validation,
        test = summary.totals.test,
        "split_summary done"
    );
    Ok(())
}
