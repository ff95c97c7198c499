use std::collections::BTreeSet;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Maps distinct label strings onto `0..K`.
///
/// Classes are numbered in sorted (byte-wise) order, so the same set of labels always
/// produces the same mapping regardless of row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Self {
        let classes: BTreeSet<&str> = labels.iter().map(AsRef::as_ref).collect();
        Self {
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Array1<usize>> {
        labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                self.classes
                    .binary_search_by(|class| class.as_str().cmp(label))
                    .map_err(|_| PipelineError::Label(format!("unseen label {label:?}")))
            })
            .collect::<Result<Vec<_>>>()
            .map(Array1::from_vec)
    }

    pub fn inverse_transform(&self, codes: &[usize]) -> Result<Vec<String>> {
        codes
            .iter()
            .map(|&code| {
                self.classes.get(code).cloned().ok_or_else(|| {
                    PipelineError::Label(format!(
                        "code {code} outside 0..{}",
                        self.classes.len()
                    ))
                })
            })
            .collect()
    }
}
