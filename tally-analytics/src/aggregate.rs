//! Case-insensitive mention counting over an annotated batch.
use crate::model::AnnotatedText;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Normalized name → occurrence count, iterated in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    index: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one mention of `name`, lowercased.
    pub fn record(&mut self, name: &str) {
        let key = name.to_lowercase();
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }
}

/// Index-paired labels and counts, as served to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramResult {
    pub labels: Vec<String>,
    #[serde(rename = "response")]
    pub counts: Vec<u64>,
}

impl From<Histogram> for HistogramResult {
    fn from(histogram: Histogram) -> Self {
        let (labels, counts) = histogram.entries.into_iter().unzip();
        Self { labels, counts }
    }
}

/// An annotated text came back without any analysis result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("text #{index} has no analysis results")]
pub struct MalformedAnnotation {
    pub index: usize,
}

/// Count mentions across `annotated`, consulting only each text's first
/// analysis result.
///
/// Fails on the first text that has no analysis result at all.
pub fn count_mentions(annotated: &[AnnotatedText]) -> Result<HistogramResult, MalformedAnnotation> {
    let mut histogram = Histogram::new();

    for (index, text) in annotated.iter().enumerate() {
        let first = text
            .analytics_results
            .first()
            .ok_or(MalformedAnnotation { index })?;

        for annotation in &first.annotations {
            histogram.record(&annotation.covered_text);
        }
    }

    Ok(histogram.into())
}
