use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::combine::LabelSource;
use crate::error::{PipelineError, Result};
use crate::prepare::PrepareOptions;

pub const DEFAULT_EXTENSION: &str = "csv";
pub const DEFAULT_PAD_PREFIX: &str = "padded_";
pub const DEFAULT_AGGREGATE_PREFIX: &str = "aggregated_";
pub const DEFAULT_COMBINED_NAME: &str = "combined_aggregated_features.csv";
pub const DEFAULT_LABEL_HEADER: &str = "artist";

/// Stage prefixes stripped from file stems to recover a recording id.
pub fn default_id_prefixes() -> Vec<String> {
    vec![
        DEFAULT_AGGREGATE_PREFIX.to_string(),
        DEFAULT_PAD_PREFIX.to_string(),
    ]
}

/// Whole-pipeline configuration; each present section enables one stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub pad: Option<PadConfig>,
    pub aggregate: Option<AggregateConfig>,
    pub combine: Option<CombineConfig>,
    pub merge: Option<MergeConfig>,
    pub prepare: Option<PrepareConfig>,
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| PipelineError::io(path, err))?;
        let config = Self::from_toml(&raw)
            .map_err(|err| PipelineError::Config(format!("{}: {err}", path.display())))?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|err| PipelineError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pad.is_none()
            && self.aggregate.is_none()
            && self.combine.is_none()
            && self.merge.is_none()
            && self.prepare.is_none()
        {
            return Err(PipelineError::Config("no stage sections configured".into()));
        }
        if let Some(pad) = &self.pad {
            pad.validate()?;
        }
        if let Some(aggregate) = &self.aggregate {
            aggregate.validate()?;
        }
        if let Some(combine) = &self.combine {
            combine.validate()?;
        }
        if let Some(merge) = &self.merge {
            merge.validate()?;
        }
        if let Some(prepare) = &self.prepare {
            prepare.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PadConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub extension: String,
    pub prefix: String,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            extension: DEFAULT_EXTENSION.to_string(),
            prefix: DEFAULT_PAD_PREFIX.to_string(),
        }
    }
}

impl PadConfig {
    pub fn validate(&self) -> Result<()> {
        require_path("pad.source_dir", &self.source_dir)?;
        require_path("pad.output_dir", &self.output_dir)?;
        require_text("pad.extension", &self.extension)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregateConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub extension: String,
    pub prefix: String,
    /// Aggregate recordings on the rayon pool.
    pub parallel: bool,
    pub id_prefixes: Vec<String>,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            extension: DEFAULT_EXTENSION.to_string(),
            prefix: DEFAULT_AGGREGATE_PREFIX.to_string(),
            parallel: true,
            id_prefixes: default_id_prefixes(),
        }
    }
}

impl AggregateConfig {
    pub fn validate(&self) -> Result<()> {
        require_path("aggregate.source_dir", &self.source_dir)?;
        require_path("aggregate.output_dir", &self.output_dir)?;
        require_text("aggregate.extension", &self.extension)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CombineConfig {
    pub source_dir: PathBuf,
    /// Defaults to `combined_aggregated_features.csv` inside `source_dir`.
    pub output_path: Option<PathBuf>,
    pub extension: String,
    /// Write a header row of feature names.
    pub header: bool,
    pub label_header: String,
    pub label: LabelSource,
    pub id_prefixes: Vec<String>,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            output_path: None,
            extension: DEFAULT_EXTENSION.to_string(),
            header: false,
            label_header: DEFAULT_LABEL_HEADER.to_string(),
            label: LabelSource::None,
            id_prefixes: default_id_prefixes(),
        }
    }
}

impl CombineConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| self.source_dir.join(DEFAULT_COMBINED_NAME))
    }

    pub fn validate(&self) -> Result<()> {
        require_path("combine.source_dir", &self.source_dir)?;
        require_text("combine.extension", &self.extension)?;
        self.label.validate()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    pub inputs: Vec<PathBuf>,
    pub output_path: PathBuf,
    pub has_headers: bool,
}

impl MergeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(PipelineError::Config("merge.inputs must not be empty".into()));
        }
        require_path("merge.output_path", &self.output_path)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub has_headers: bool,
    #[serde(flatten)]
    pub options: PrepareOptions,
}

impl PrepareConfig {
    pub fn validate(&self) -> Result<()> {
        require_path("prepare.input_path", &self.input_path)?;
        require_path("prepare.output_dir", &self.output_dir)?;
        self.options.validate()
    }
}

fn require_path(field: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(PipelineError::Config(format!("{field} is required")));
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PipelineError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}
