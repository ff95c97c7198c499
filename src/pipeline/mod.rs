//! Stage runners: load a folder, transform, write results.
//!
//! Every runner validates its whole batch before writing anything, so a shape error never
//! leaves half a corpus behind.

use std::path::{Path, PathBuf};

use ndarray::{Array2, Axis};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::aggregation::{aggregate, feature_names, STATISTIC_COUNT};
use crate::combine::{combine, merge_tables};
use crate::config::{
    AggregateConfig, CombineConfig, MergeConfig, PadConfig, PipelineConfig, PrepareConfig,
};
use crate::error::{PipelineError, Result};
use crate::io::corpus::file_stem;
use crate::io::{
    list_corpus, read_matrix, read_table, recording_id, write_json, write_matrix, write_table,
};
use crate::padding::{check_row_counts, pad_batch};
use crate::prepare::{prepare, PreparedDataset};
use crate::types::{CombinedTable, FeatureRow, RawTable, Recording};

/// Files written by the padding stage.
#[derive(Debug, Clone)]
pub struct PadReport {
    pub width: usize,
    pub written: Vec<PathBuf>,
}

/// Files written by the aggregation stage.
#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub vector_len: usize,
    pub written: Vec<PathBuf>,
}

/// Outputs of a full `run_all`, one entry per configured stage.
#[derive(Debug, Default)]
pub struct RunReport {
    pub pad: Option<PadReport>,
    pub aggregate: Option<AggregateReport>,
    pub combine: Option<CombinedTable>,
    pub merge: Option<RawTable>,
    pub prepare: Option<PreparedDataset>,
}

pub fn run_pad(config: &PadConfig) -> Result<PadReport> {
    config.validate()?;
    let files = corpus(&config.source_dir, &config.extension)?;
    let recordings = files
        .iter()
        .map(|path| load_recording(path, &[config.prefix.as_str()]))
        .collect::<Result<Vec<_>>>()?;

    let matrices: Vec<_> = recordings.iter().map(|r| r.matrix.clone()).collect();
    check_row_counts(&matrices, |idx| recordings[idx].source.display().to_string())?;
    let (width, padded) = pad_batch(&matrices)?;
    info!(recordings = recordings.len(), width, "padding batch validated");

    let mut written = Vec::with_capacity(padded.len());
    for (recording, matrix) in recordings.iter().zip(&padded) {
        let output = output_file(
            &config.output_dir,
            &config.prefix,
            &recording.stem,
            &config.extension,
        );
        write_matrix(&output, matrix)?;
        debug!(
            source = %recording.source.display(),
            output = %output.display(),
            added = width - recording.matrix.ncols(),
            "padded recording"
        );
        written.push(output);
    }
    info!(written = written.len(), dir = %config.output_dir.display(), "padding complete");
    Ok(PadReport { width, written })
}

pub fn run_aggregate(config: &AggregateConfig) -> Result<AggregateReport> {
    config.validate()?;
    let files = corpus(&config.source_dir, &config.extension)?;
    let prefixes: Vec<&str> = config.id_prefixes.iter().map(String::as_str).collect();

    let aggregate_one = |path: &PathBuf| -> Result<FeatureRow> {
        let recording = load_recording(path, &prefixes)?;
        let values = aggregate(&recording.matrix)
            .map_err(|err| PipelineError::recording(&recording.source, err))?;
        debug!(recording = %recording.id, len = values.len(), "aggregated");
        Ok(FeatureRow {
            id: recording.id,
            stem: recording.stem,
            values,
        })
    };
    let rows = if config.parallel {
        files.par_iter().map(aggregate_one).collect::<Result<Vec<_>>>()?
    } else {
        files.iter().map(aggregate_one).collect::<Result<Vec<_>>>()?
    };

    let mut written = Vec::with_capacity(rows.len());
    for row in &rows {
        let output = output_file(&config.output_dir, &config.prefix, &row.stem, &config.extension);
        let single = row.values.clone().insert_axis(Axis(0));
        write_matrix(&output, &single)?;
        written.push(output);
    }
    let vector_len = rows.first().map(|row| row.values.len()).unwrap_or(0);
    info!(
        written = written.len(),
        vector_len,
        dir = %config.output_dir.display(),
        "aggregation complete"
    );
    Ok(AggregateReport {
        vector_len,
        written,
    })
}

pub fn run_combine(config: &CombineConfig) -> Result<CombinedTable> {
    config.validate()?;
    let output = config.output_path();
    let prefixes: Vec<&str> = config.id_prefixes.iter().map(String::as_str).collect();

    let files: Vec<PathBuf> = corpus(&config.source_dir, &config.extension)?
        .into_iter()
        .filter(|path| !same_file(path, &output))
        .collect();
    if files.is_empty() {
        return Err(PipelineError::EmptyCorpus {
            dir: config.source_dir.clone(),
            extension: config.extension.clone(),
        });
    }

    let mut rows = Vec::with_capacity(files.len());
    for path in &files {
        let recording = load_recording(path, &prefixes)?;
        for values in recording.matrix.outer_iter() {
            rows.push(FeatureRow {
                id: recording.id.clone(),
                stem: recording.stem.clone(),
                values: values.to_owned(),
            });
        }
    }

    let table = combine(&rows, &config.label)?;
    let header = config.header.then(|| combined_header(&table, &config.label_header));
    write_table(&output, header.as_deref(), &table.to_records())?;
    info!(
        rows = table.n_rows(),
        columns = table.n_columns(),
        output = %output.display(),
        "combined table written"
    );
    Ok(table)
}

pub fn run_merge(config: &MergeConfig) -> Result<RawTable> {
    config.validate()?;
    let tables = config
        .inputs
        .iter()
        .map(|path| read_table(path, config.has_headers))
        .collect::<Result<Vec<_>>>()?;
    let merged = merge_tables(tables)?;
    write_table(&config.output_path, merged.header.as_deref(), &merged.records)?;
    info!(
        inputs = config.inputs.len(),
        rows = merged.n_rows(),
        output = %config.output_path.display(),
        "tables merged"
    );
    Ok(merged)
}

pub fn run_prepare(config: &PrepareConfig) -> Result<PreparedDataset> {
    config.validate()?;
    let table = read_table(&config.input_path, config.has_headers)?;
    let dataset = prepare(&table, &config.options)?;

    let dir = &config.output_dir;
    write_matrix(&dir.join("x_train.csv"), &dataset.x_train())?;
    write_matrix(&dir.join("x_test.csv"), &dataset.x_test())?;
    write_matrix(&dir.join("y_train.csv"), &as_column(dataset.y_train().to_vec()))?;
    write_matrix(&dir.join("y_test.csv"), &as_column(dataset.y_test().to_vec()))?;
    let classes: Vec<Vec<String>> = dataset
        .encoder
        .classes()
        .iter()
        .enumerate()
        .map(|(idx, label)| vec![idx.to_string(), label.clone()])
        .collect();
    write_table(&dir.join("classes.csv"), None, &classes)?;
    write_json(&dir.join("dataset.json"), &dataset.summary())?;

    info!(
        training = dataset.split.train.len(),
        test = dataset.split.test.len(),
        dir = %dir.display(),
        "prepared dataset written"
    );
    Ok(dataset)
}

/// Runs every configured stage in pipeline order.
pub fn run_all(config: &PipelineConfig) -> Result<RunReport> {
    config.validate()?;
    let mut report = RunReport::default();
    if let Some(pad) = &config.pad {
        report.pad = Some(run_pad(pad)?);
    }
    if let Some(aggregate) = &config.aggregate {
        report.aggregate = Some(run_aggregate(aggregate)?);
    }
    if let Some(combine) = &config.combine {
        report.combine = Some(run_combine(combine)?);
    }
    if let Some(merge) = &config.merge {
        report.merge = Some(run_merge(merge)?);
    }
    if let Some(prepare) = &config.prepare {
        report.prepare = Some(run_prepare(prepare)?);
    }
    Ok(report)
}

fn corpus(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let files = list_corpus(dir, extension)?;
    if files.is_empty() {
        return Err(PipelineError::EmptyCorpus {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        });
    }
    info!(dir = %dir.display(), files = files.len(), "corpus listed");
    Ok(files)
}

fn load_recording(path: &Path, prefixes: &[&str]) -> Result<Recording> {
    let stem = file_stem(path);
    Ok(Recording {
        id: recording_id(&stem, prefixes),
        matrix: read_matrix(path)?,
        source: path.to_path_buf(),
        stem,
    })
}

fn output_file(dir: &Path, prefix: &str, stem: &str, extension: &str) -> PathBuf {
    let extension = extension.trim_start_matches('.');
    dir.join(format!("{prefix}{stem}.{extension}"))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn combined_header(table: &CombinedTable, label_header: &str) -> Vec<String> {
    let width = table.features.ncols();
    let mut header = if width > 0 && width % STATISTIC_COUNT == 0 {
        feature_names(width / STATISTIC_COUNT)
    } else {
        (0..width).map(|idx| format!("f{idx}")).collect()
    };
    if table.labels.is_some() {
        header.push(label_header.to_string());
    }
    header
}

fn as_column(values: Vec<usize>) -> Array2<f64> {
    let rows = values.len();
    Array2::from_shape_fn((rows, 1), |(row, _)| values[row] as f64)
}
