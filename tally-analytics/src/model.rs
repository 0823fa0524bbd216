//! Wire types for the text-analytics service.
use serde::{Deserialize, Serialize};

/// Body POSTed to the analytics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionRequest<'a> {
    pub texts: &'a [String],
    pub annotations: Vec<&'a str>,
}

/// One input text as returned by the service, with its analysis results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedText {
    #[serde(rename = "analyticsResults", default)]
    pub analytics_results: Vec<AnalysisResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "covered-text")]
    pub covered_text: String,
}

impl AnnotatedText {
    /// A text with a single analysis result holding the given spans.
    pub fn with_annotations<I, S>(spans: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            analytics_results: vec![AnalysisResult {
                annotations: spans
                    .into_iter()
                    .map(|s| Annotation {
                        covered_text: s.into(),
                    })
                    .collect(),
            }],
        }
    }
}
