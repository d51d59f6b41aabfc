use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use vgeeg::{
    group_features,
    io::{expand_patterns, load_recording},
    run_dataset, Dataset, Group, LogisticRegression, Recording, RunConfig,
};

#[derive(Parser)]
#[command(name = "vgeeg", about = "EEG visibility-graph features + cross-validated classification")]
struct Args {
    /// Healthy-group recordings (raw.safetensors; glob patterns allowed)
    #[arg(long, num_args = 1.., required = true)]
    healthy: Vec<String>,

    /// Patient-group recordings (raw.safetensors; glob patterns allowed)
    #[arg(long, num_args = 1.., required = true)]
    patient: Vec<String>,

    /// JSON run configuration; omitted fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of outer repetitions
    #[arg(long)]
    repetitions: Option<usize>,

    /// Process recordings in parallel
    #[arg(long)]
    parallel: bool,

    /// Report output path (JSON). Printed to stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn load_group(patterns: &[String], group: Group) -> Result<Vec<Recording>> {
    let paths = expand_patterns(patterns)?;
    if paths.is_empty() {
        bail!("no {group:?} recordings match {patterns:?}");
    }
    paths
        .iter()
        .map(|p| load_recording(p, group).with_context(|| format!("loading {}", p.display())))
        .collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => RunConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(r) = args.repetitions {
        cfg.experiment.n_repetitions = r;
    }
    cfg.features.parallel |= args.parallel;

    let healthy = load_group(&args.healthy, Group::Healthy)?;
    let patient = load_group(&args.patient, Group::Patient)?;
    info!("Loaded {} healthy and {} patient recordings", healthy.len(), patient.len());

    let healthy_features = group_features(&healthy, &cfg.features)?;
    let patient_features = group_features(&patient, &cfg.features)?;
    let dataset = Dataset::assemble(&patient_features, &healthy_features)?;

    let classifier = LogisticRegression::new(cfg.classifier.clone());
    let report = run_dataset(&dataset, &classifier, &cfg.experiment)?;
    let m = report.grand_mean;
    info!(
        "Grand mean over {} repetitions: acc={:.4} precision={:.4} recall={:.4} f1={:.4} auc={:.4}",
        report.repetitions.len(),
        m.accuracy,
        m.precision,
        m.recall,
        m.f1,
        m.roc_auc
    );

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("Written → {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
