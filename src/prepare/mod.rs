//! Turning a combined feature table into an encoded, imputed, standardized and split dataset.

pub mod encoder;
pub mod imputer;
pub mod scaler;
pub mod split;

use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::info;

pub use encoder::LabelEncoder;
pub use imputer::{ImputeStrategy, Imputer};
pub use scaler::StandardScaler;
pub use split::{train_test_split, SplitIndices};

use crate::aggregation::{feature_names, STATISTIC_COUNT};
use crate::error::{PipelineError, Result};
use crate::types::RawTable;

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;

/// Which column of the combined table carries the class label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LabelColumn {
    #[default]
    Last,
    Index(usize),
    Named(String),
}

impl LabelColumn {
    /// Resolves the column position within a table of `width` columns.
    pub fn locate(&self, header: Option<&[String]>, width: usize) -> Result<usize> {
        let position = match self {
            LabelColumn::Last => width.checked_sub(1),
            LabelColumn::Index(idx) => (*idx < width).then_some(*idx),
            LabelColumn::Named(name) => header.and_then(|h| h.iter().position(|c| c == name)),
        };
        position.ok_or_else(|| {
            PipelineError::Label(format!("label column {self} not found among {width} columns"))
        })
    }
}

impl FromStr for LabelColumn {
    type Err = Infallible;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let raw = raw.trim();
        Ok(if raw.eq_ignore_ascii_case("last") {
            LabelColumn::Last
        } else if let Ok(idx) = raw.parse::<usize>() {
            LabelColumn::Index(idx)
        } else {
            LabelColumn::Named(raw.to_string())
        })
    }
}

impl From<String> for LabelColumn {
    fn from(raw: String) -> Self {
        match raw.parse() {
            Ok(column) => column,
            Err(never) => match never {},
        }
    }
}

impl From<LabelColumn> for String {
    fn from(column: LabelColumn) -> Self {
        column.to_string()
    }
}

impl Display for LabelColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelColumn::Last => write!(f, "last"),
            LabelColumn::Index(idx) => write!(f, "{idx}"),
            LabelColumn::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Knobs for [`prepare`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareOptions {
    pub label_column: LabelColumn,
    pub imputation: ImputeStrategy,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            label_column: LabelColumn::Last,
            imputation: ImputeStrategy::Mean,
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
        }
    }
}

impl PrepareOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(PipelineError::Config(format!(
                "test_fraction must lie strictly between 0 and 1, got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

/// Numeric features, encoded labels and the train/test partition handed to a classifier.
///
/// Imputation and scaling parameters are fitted on every row before the split.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub feature_names: Vec<String>,
    pub encoder: LabelEncoder,
    pub imputer: Imputer,
    pub scaler: StandardScaler,
    /// Imputed and standardized features for every row, in table order.
    pub features: Array2<f64>,
    pub labels: Array1<usize>,
    pub split: SplitIndices,
    pub missing_before: usize,
    pub missing_after: usize,
    pub test_fraction: f64,
    pub seed: u64,
}

impl PreparedDataset {
    pub fn x_train(&self) -> Array2<f64> {
        self.features.select(Axis(0), &self.split.train)
    }

    pub fn x_test(&self) -> Array2<f64> {
        self.features.select(Axis(0), &self.split.test)
    }

    pub fn y_train(&self) -> Array1<usize> {
        self.labels.select(Axis(0), &self.split.train)
    }

    pub fn y_test(&self) -> Array1<usize> {
        self.labels.select(Axis(0), &self.split.test)
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            classes: self.encoder.classes().to_vec(),
            feature_names: self.feature_names.clone(),
            rows: self.features.nrows(),
            train_rows: self.split.train.len(),
            test_rows: self.split.test.len(),
            test_fraction: self.test_fraction,
            seed: self.seed,
            missing_before: self.missing_before,
            missing_after: self.missing_after,
            imputation: self.imputer.strategy(),
            imputation_fill: self.imputer.fill_values().to_vec(),
            scaler_mean: self.scaler.mean().to_vec(),
            scaler_scale: self.scaler.scale().to_vec(),
            split: self.split.clone(),
        }
    }
}

/// Serializable description of a prepared dataset, written alongside the arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub classes: Vec<String>,
    pub feature_names: Vec<String>,
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub test_fraction: f64,
    pub seed: u64,
    pub missing_before: usize,
    pub missing_after: usize,
    pub imputation: ImputeStrategy,
    pub imputation_fill: Vec<f64>,
    pub scaler_mean: Vec<f64>,
    pub scaler_scale: Vec<f64>,
    pub split: SplitIndices,
}

/// Separates labels from features, imputes, encodes, standardizes and splits.
///
/// Feature cells that are empty, unparseable or non-finite count as missing.
pub fn prepare(table: &RawTable, options: &PrepareOptions) -> Result<PreparedDataset> {
    options.validate()?;
    let width = table.n_columns();
    let label_idx = options
        .label_column
        .locate(table.header.as_deref(), width)?;

    let mut labels = Vec::with_capacity(table.n_rows());
    let mut flat = Vec::with_capacity(table.n_rows() * width.saturating_sub(1));
    for (row_idx, record) in table.records.iter().enumerate() {
        if record.len() != width {
            return Err(PipelineError::shape(
                format!("prepare input row {row_idx}"),
                width,
                record.len(),
            ));
        }
        let label = record[label_idx].trim();
        if label.is_empty() {
            return Err(PipelineError::Label(format!("row {row_idx} has an empty label")));
        }
        labels.push(label.to_string());
        flat.extend(
            record
                .iter()
                .enumerate()
                .filter(|(col, _)| *col != label_idx)
                .map(|(_, cell)| coerce_numeric(cell)),
        );
    }

    let feature_count = width - 1;
    let cells = flat.len();
    let raw = Array2::from_shape_vec((labels.len(), feature_count), flat)
        .map_err(|_| PipelineError::shape("prepare features", labels.len() * feature_count, cells))?;

    let missing_before = count_missing(&raw);
    info!(missing = missing_before, "missing values before imputation");
    let imputer = Imputer::fit(&raw, options.imputation);
    let imputed = imputer.transform(&raw)?;
    let missing_after = count_missing(&imputed);
    info!(missing = missing_after, "missing values after imputation");

    let encoder = LabelEncoder::fit(labels.as_slice());
    let encoded = encoder.transform(labels.as_slice())?;

    let scaler = StandardScaler::fit(&imputed);
    let features = scaler.transform(&imputed)?;

    let split = train_test_split(features.nrows(), options.test_fraction, options.seed)?;
    info!(
        train = split.train.len(),
        test = split.test.len(),
        classes = encoder.classes().len(),
        "dataset split"
    );

    Ok(PreparedDataset {
        feature_names: resolve_feature_names(table.header.as_deref(), label_idx, feature_count),
        encoder,
        imputer,
        scaler,
        features,
        labels: encoded,
        split,
        missing_before,
        missing_after,
        test_fraction: options.test_fraction,
        seed: options.seed,
    })
}

fn coerce_numeric(cell: &str) -> f64 {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

fn count_missing(data: &Array2<f64>) -> usize {
    data.iter().filter(|v| v.is_nan()).count()
}

fn resolve_feature_names(
    header: Option<&[String]>,
    label_idx: usize,
    feature_count: usize,
) -> Vec<String> {
    if let Some(header) = header {
        return header
            .iter()
            .enumerate()
            .filter(|(col, _)| *col != label_idx)
            .map(|(_, name)| name.clone())
            .collect();
    }
    if feature_count > 0 && feature_count % STATISTIC_COUNT == 0 {
        feature_names(feature_count / STATISTIC_COUNT)
    } else {
        (0..feature_count).map(|idx| format!("f{idx}")).collect()
    }
}
