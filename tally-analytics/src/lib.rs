//! Entity extraction and mention counting for Tally.
//!
//! [`client::EntityExtractor`] is the interface to the remote text-analytics
//! service, with [`client::TextAnalyticsClient`] as its HTTP implementation.
//! [`aggregate::count_mentions`] turns the annotated batch into a histogram.
//!
//! ```rust
//! use tally_analytics::aggregate::count_mentions;
//! use tally_analytics::model::AnnotatedText;
//!
//! let batch = vec![
//!     AnnotatedText::with_annotations(["Acme", "IBM"]),
//!     AnnotatedText::with_annotations(["ACME"]),
//! ];
//! let result = count_mentions(&batch).unwrap();
//! assert_eq!(result.labels, vec!["acme", "ibm"]);
//! assert_eq!(result.counts, vec![2, 1]);
//! ```
pub mod aggregate;
pub mod category;
pub mod client;
pub mod model;

pub use aggregate::{count_mentions, Histogram, HistogramResult, MalformedAnnotation};
pub use category::{AnnotationTypes, Category};
pub use client::{AnalyticsEndpoints, EntityExtractor, ExtractError, TextAnalyticsClient};
pub use model::{AnalysisResult, AnnotatedText, Annotation, ExtractionRequest};
