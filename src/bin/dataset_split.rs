use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use helio_split::config::Config;
use helio_split::dataset_split::DatasetSplitter;
use helio_split::split_summary;

#[derive(Debug, Parser)]
#[command(
    name = "dataset_split",
    version,
    about = "Generate per-heliostat benchmark splits from calibration metadata"
)]
struct Args {
    /// Optional TOML config; CLI flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Calibration metadata CSV.
    #[arg(long)]
    input_file: Option<PathBuf>,

    /// Directory receiving the benchmark split CSV.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    split_type: Option<SplitTypeArg>,

    #[arg(long, allow_hyphen_values = true)]
    training_size: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    validation_size: Option<i64>,

    /// Keep passthrough metadata columns in the split file.
    #[arg(long)]
    keep_unused_data: bool,

    /// Also write `<split file stem>_summary.csv` with per-heliostat counts.
    #[arg(long)]
    summary: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SplitTypeArg {
    Azimuth,
    Solstice,
    Balanced,
    HighVariance,
}

impl SplitTypeArg {
    fn as_str(self) -> &'static str {
        match self {
            SplitTypeArg::Azimuth => "azimuth",
            SplitTypeArg::Solstice => "solstice",
            SplitTypeArg::Balanced => "balanced",
            SplitTypeArg::HighVariance => "high_variance",
        }
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(p) = args.input_file {
        cfg.run.input_file = p;
    }
    if let Some(p) = args.output_dir {
        cfg.run.output_dir = p;
    }
    if args.keep_unused_data {
        cfg.run.remove_unused_data = false;
    }
    if let Some(t) = args.split_type {
        cfg.split.split_type = t.as_str().to_string();
    }
    if let Some(n) = args.training_size {
        cfg.split.training_size = n;
    }
    if let Some(n) = args.validation_size {
        cfg.split.validation_size = n;
    }
    cfg.validate()?;

    info!(
        input = %cfg.run.input_file.display(),
        output_dir = %cfg.run.output_dir.display(),
        split_type = %cfg.split.split_type,
        training_size = cfg.split.training_size,
        validation_size = cfg.split.validation_size,
        remove_unused_data = cfg.run.remove_unused_data,
        "dataset_split start"
    );

    let splitter = DatasetSplitter::from_config(&cfg)
        .with_context(|| format!("load {}", cfg.run.input_file.display()))?;
    let outcome = splitter
        .get_dataset_splits(
            &cfg.split.split_type,
            cfg.split.training_size,
            cfg.split.validation_size,
        )
        .context("dataset_split")?;

    println!("split_file={}", outcome.output_path.display());
    println!("rows={}", outcome.table.len());
    println!("skipped_heliostats={}", outcome.skipped.len());
    for s in &outcome.skipped {
        println!(
            "skipped heliostat={} available={} required={}",
            s.heliostat_id, s.available, s.required
        );
    }
    println!("excluded_samples={}", outcome.excluded_samples);

    if args.summary {
        let stem = outcome
            .output_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("benchmark_split");
        let path = cfg.run.output_dir.join(format!("{stem}_summary.csv"));
        let summary = split_summary::summarize(&outcome.table);
        split_summary::write_summary_csv(&path, &summary)
            .with_context(|| format!("write {}", path.display()))?;
        println!("summary_csv={}", path.display());
    }

    Ok(())
}
