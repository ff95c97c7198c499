use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::combine::LabelSource;
use crate::config::{
    default_id_prefixes, AggregateConfig, CombineConfig, MergeConfig, PadConfig, PrepareConfig,
    DEFAULT_AGGREGATE_PREFIX, DEFAULT_EXTENSION, DEFAULT_LABEL_HEADER, DEFAULT_PAD_PREFIX,
};
use crate::prepare::{ImputeStrategy, LabelColumn, PrepareOptions};

/// mfccprep - MFCC feature preparation for audio classification
///
/// Pads MFCC matrices, aggregates them into statistical feature vectors, combines the
/// vectors into a labelled table and prepares an encoded, scaled train/test dataset.
#[derive(Parser, Debug)]
#[command(name = "mfccprep", version, about = "MFCC feature preparation pipeline")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Zero-pad every MFCC matrix in a folder to the widest one.
    Pad(PadArgs),
    /// Reduce each MFCC matrix to an 11-statistic feature vector.
    Aggregate(AggregateArgs),
    /// Stack aggregated vectors into one table, optionally labelled.
    Combine(CombineArgs),
    /// Concatenate combined tables from several label batches.
    Merge(MergeArgs),
    /// Encode labels, impute, standardize and split into train/test sets.
    Prepare(PrepareArgs),
    /// Run every stage configured in a TOML file.
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PadArgs {
    /// Folder of headerless MFCC CSV files.
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: PathBuf,
    /// Folder that receives the padded files.
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,
    /// Prefix prepended to each output file name.
    #[arg(long, default_value = DEFAULT_PAD_PREFIX)]
    pub prefix: String,
}

impl PadArgs {
    pub fn to_config(&self) -> PadConfig {
        PadConfig {
            source_dir: self.source_dir.clone(),
            output_dir: self.output_dir.clone(),
            extension: self.extension.clone(),
            prefix: self.prefix.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AggregateArgs {
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: PathBuf,
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,
    #[arg(long, default_value = DEFAULT_AGGREGATE_PREFIX)]
    pub prefix: String,
    /// Process recordings one at a time instead of on the thread pool.
    #[arg(long)]
    pub sequential: bool,
}

impl AggregateArgs {
    pub fn to_config(&self) -> AggregateConfig {
        AggregateConfig {
            source_dir: self.source_dir.clone(),
            output_dir: self.output_dir.clone(),
            extension: self.extension.clone(),
            prefix: self.prefix.clone(),
            parallel: !self.sequential,
            id_prefixes: default_id_prefixes(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CombineArgs {
    /// Folder of aggregated single-row CSV files.
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: PathBuf,
    /// Output file (defaults to combined_aggregated_features.csv inside SOURCE_DIR).
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,
    /// Label applied to every recording in this batch.
    #[arg(long, value_name = "LABEL", group = "labels")]
    pub label: Option<String>,
    /// Take each label from the recording id, up to this separator.
    #[arg(long, value_name = "SEPARATOR", group = "labels")]
    pub label_from_filename: Option<String>,
    /// Two-column CSV mapping recording id to label.
    #[arg(long, value_name = "PATH", group = "labels")]
    pub label_manifest: Option<PathBuf>,
    /// Write a header row of feature names.
    #[arg(long)]
    pub header: bool,
    /// Header name of the label column.
    #[arg(long, default_value = DEFAULT_LABEL_HEADER)]
    pub label_header: String,
}

impl CombineArgs {
    pub fn label_source(&self) -> LabelSource {
        if let Some(value) = &self.label {
            LabelSource::Uniform {
                value: value.clone(),
            }
        } else if let Some(separator) = &self.label_from_filename {
            LabelSource::Filename {
                separator: separator.clone(),
            }
        } else if let Some(path) = &self.label_manifest {
            LabelSource::Manifest { path: path.clone() }
        } else {
            LabelSource::None
        }
    }

    pub fn to_config(&self) -> CombineConfig {
        CombineConfig {
            source_dir: self.source_dir.clone(),
            output_path: self.output.clone(),
            extension: self.extension.clone(),
            header: self.header,
            label_header: self.label_header.clone(),
            label: self.label_source(),
            id_prefixes: default_id_prefixes(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Combined tables to concatenate, in order.
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,
    #[arg(long, short)]
    pub output: PathBuf,
    /// Inputs start with a header row.
    #[arg(long)]
    pub has_headers: bool,
}

impl MergeArgs {
    pub fn to_config(&self) -> MergeConfig {
        MergeConfig {
            inputs: self.inputs.clone(),
            output_path: self.output.clone(),
            has_headers: self.has_headers,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PrepareArgs {
    /// Combined (or merged) feature table.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
    /// Folder that receives x/y train/test files, classes.csv and dataset.json.
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,
    #[arg(long)]
    pub has_headers: bool,
    /// `last`, a zero-based index, or a header name.
    #[arg(long, default_value = "last")]
    pub label_column: LabelColumn,
    #[arg(long, value_enum, default_value_t = ImputeStrategy::Mean)]
    pub imputation: ImputeStrategy,
    #[arg(long, default_value_t = crate::prepare::DEFAULT_TEST_FRACTION)]
    pub test_fraction: f64,
    #[arg(long, default_value_t = crate::prepare::DEFAULT_SEED)]
    pub seed: u64,
}

impl PrepareArgs {
    pub fn to_config(&self) -> PrepareConfig {
        PrepareConfig {
            input_path: self.input.clone(),
            output_dir: self.output_dir.clone(),
            has_headers: self.has_headers,
            options: PrepareOptions {
                label_column: self.label_column.clone(),
                imputation: self.imputation,
                test_fraction: self.test_fraction,
                seed: self.seed,
            },
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// TOML pipeline configuration.
    #[arg(long, short)]
    pub config: PathBuf,
}
