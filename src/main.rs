use anyhow::{Context, Result};
use clap::Parser;
use mfccprep::cli::{Cli, Command};
use mfccprep::config::PipelineConfig;
use mfccprep::pipeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Pad(args) => {
            let report = pipeline::run_pad(&args.to_config())
                .with_context(|| format!("Failed to pad MFCC files in {:?}", args.source_dir))?;
            info!(
                files = report.written.len(),
                width = report.width,
                "pad finished"
            );
        }
        Command::Aggregate(args) => {
            let report = pipeline::run_aggregate(&args.to_config()).with_context(|| {
                format!("Failed to aggregate MFCC files in {:?}", args.source_dir)
            })?;
            info!(
                files = report.written.len(),
                vector_len = report.vector_len,
                "aggregate finished"
            );
        }
        Command::Combine(args) => {
            let config = args.to_config();
            let table = pipeline::run_combine(&config).with_context(|| {
                format!("Failed to combine feature files in {:?}", args.source_dir)
            })?;
            println!(
                "Combined data saved to: {} ({} rows x {} columns)",
                config.output_path().display(),
                table.n_rows(),
                table.n_columns()
            );
        }
        Command::Merge(args) => {
            let merged = pipeline::run_merge(&args.to_config())
                .context("Failed to merge combined tables")?;
            println!(
                "Merged {} tables into {} ({} rows)",
                args.inputs.len(),
                args.output.display(),
                merged.n_rows()
            );
        }
        Command::Prepare(args) => {
            let dataset = pipeline::run_prepare(&args.to_config())
                .with_context(|| format!("Failed to prepare dataset from {:?}", args.input))?;
            println!("Training set size: {} samples", dataset.split.train.len());
            println!("Test set size: {} samples", dataset.split.test.len());
        }
        Command::Run(args) => {
            let config = PipelineConfig::from_file(&args.config)
                .with_context(|| format!("Failed to load pipeline config {:?}", args.config))?;
            pipeline::run_all(&config).context("Pipeline run failed")?;
            info!("pipeline run complete");
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
