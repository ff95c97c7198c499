use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::io::read_table;
use crate::types::FeatureRow;

/// Where the combiner takes each recording's label from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LabelSource {
    /// No label column is appended.
    #[default]
    None,
    /// One value applied to every recording in the batch.
    Uniform { value: String },
    /// Recording id up to the first occurrence of `separator`.
    Filename { separator: String },
    /// Headerless two-column CSV mapping recording id to label.
    Manifest { path: PathBuf },
}

impl LabelSource {
    pub fn validate(&self) -> Result<()> {
        match self {
            LabelSource::Uniform { value } if value.trim().is_empty() => Err(
                PipelineError::Config("uniform label value must not be empty".into()),
            ),
            LabelSource::Filename { separator } if separator.is_empty() => Err(
                PipelineError::Config("filename label separator must not be empty".into()),
            ),
            _ => Ok(()),
        }
    }

    /// Resolves one label per row, or `None` when no label column is wanted.
    pub fn resolve(&self, rows: &[FeatureRow]) -> Result<Option<Vec<String>>> {
        self.validate()?;
        match self {
            LabelSource::None => Ok(None),
            LabelSource::Uniform { value } => Ok(Some(vec![value.trim().to_string(); rows.len()])),
            LabelSource::Filename { separator } => rows
                .iter()
                .map(|row| label_from_id(&row.id, separator))
                .collect::<Result<Vec<_>>>()
                .map(Some),
            LabelSource::Manifest { path } => {
                let manifest = load_manifest(path)?;
                rows.iter()
                    .map(|row| {
                        manifest
                            .get(&row.id)
                            .or_else(|| manifest.get(&row.stem))
                            .cloned()
                            .ok_or_else(|| {
                                PipelineError::Label(format!(
                                    "recording {} has no entry in manifest {}",
                                    row.id,
                                    path.display()
                                ))
                            })
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Some)
            }
        }
    }
}

fn label_from_id(id: &str, separator: &str) -> Result<String> {
    match id.split_once(separator) {
        Some((label, _)) if !label.trim().is_empty() => Ok(label.trim().to_string()),
        _ => Err(PipelineError::Label(format!(
            "recording id {id:?} has no label before separator {separator:?}"
        ))),
    }
}

fn load_manifest(path: &std::path::Path) -> Result<HashMap<String, String>> {
    let table = read_table(path, false)?;
    let mut entries = HashMap::with_capacity(table.n_rows());
    for (idx, record) in table.records.iter().enumerate() {
        let (Some(key), Some(label)) = (record.first(), record.get(1)) else {
            return Err(PipelineError::Label(format!(
                "manifest {} line {} needs recording id and label",
                path.display(),
                idx + 1
            )));
        };
        let label = label.trim();
        if label.is_empty() {
            return Err(PipelineError::Label(format!(
                "manifest {} line {} has an empty label",
                path.display(),
                idx + 1
            )));
        }
        entries.insert(key.trim().to_string(), label.to_string());
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn row(id: &str) -> FeatureRow {
        FeatureRow {
            id: id.to_string(),
            stem: format!("aggregated_{id}"),
            values: Array1::zeros(2),
        }
    }

    #[test]
    fn uniform_label_applies_to_every_row() {
        let source = LabelSource::Uniform {
            value: "artistA".into(),
        };
        let labels = source.resolve(&[row("a"), row("b")]).unwrap().unwrap();
        assert_eq!(labels, vec!["artistA", "artistA"]);
    }

    #[test]
    fn filename_label_takes_leading_segment() {
        let source = LabelSource::Filename {
            separator: "__".into(),
        };
        let labels = source
            .resolve(&[row("bach__prelude"), row("satie__gymnopedie_1")])
            .unwrap()
            .unwrap();
        assert_eq!(labels, vec!["bach", "satie"]);
        assert!(source.resolve(&[row("untagged")]).is_err());
    }

    #[test]
    fn manifest_maps_ids_to_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.csv");
        std::fs::write(&path, "song1,jazz\naggregated_song2, blues\n").unwrap();
        let source = LabelSource::Manifest { path };

        let labels = source
            .resolve(&[row("song1"), row("song2")])
            .unwrap()
            .unwrap();
        assert_eq!(labels, vec!["jazz", "blues"]);
        assert!(matches!(
            source.resolve(&[row("song3")]),
            Err(PipelineError::Label(_))
        ));
    }

    #[test]
    fn deserializes_tagged_modes() {
        let source: LabelSource = toml::from_str("mode = \"uniform\"\nvalue = \"x\"").unwrap();
        assert_eq!(source, LabelSource::Uniform { value: "x".into() });
        assert!(LabelSource::Uniform { value: " ".into() }.validate().is_err());
    }
}
