//! Client for the remote text-analytics (entity extraction) service.
//!
//! Each category is served by its own endpoint. Endpoints are fixed at
//! construction; a category without one fails before any network traffic.
use crate::category::{AnnotationTypes, Category};
use crate::model::{AnnotatedText, ExtractionRequest};
use async_trait::async_trait;
use std::time::Duration;
use tally_http::{HttpClient, HttpError, RequestOpts};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no service endpoint configured for {0} extraction")]
    MissingEndpoint(Category),

    #[error("invalid service endpoint for {category} extraction: {reason}")]
    InvalidEndpoint { category: Category, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("Status code: {0}")]
    ServiceStatus(u16),

    #[error("malformed analytics response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Annotate each of `texts` with the entities of `category` found in it.
    ///
    /// The returned items line up with `texts` by index.
    async fn extract(
        &self,
        texts: &[String],
        category: Category,
    ) -> Result<Vec<AnnotatedText>, ExtractError>;
}

/// Endpoint URL per category. Blank values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsEndpoints {
    pub company_analytics_url: Option<String>,
    pub name_analytics_url: Option<String>,
}

impl AnalyticsEndpoints {
    pub fn endpoint_for(&self, category: Category) -> Option<&str> {
        let url = match category {
            Category::Company => self.company_analytics_url.as_deref(),
            Category::Person => self.name_analytics_url.as_deref(),
        };
        url.map(str::trim).filter(|u| !u.is_empty())
    }
}

pub struct TextAnalyticsClient {
    http: HttpClient,
    endpoints: AnalyticsEndpoints,
    annotation_types: AnnotationTypes,
}

impl TextAnalyticsClient {
    pub fn new(
        endpoints: AnalyticsEndpoints,
        annotation_types: AnnotationTypes,
        timeout: Duration,
    ) -> Result<Self, HttpError> {
        let http = HttpClient::unanchored()?.with_timeout(timeout);
        Ok(Self {
            http,
            endpoints,
            annotation_types,
        })
    }

    pub fn endpoints(&self) -> &AnalyticsEndpoints {
        &self.endpoints
    }
}

#[async_trait]
impl EntityExtractor for TextAnalyticsClient {
    async fn extract(
        &self,
        texts: &[String],
        category: Category,
    ) -> Result<Vec<AnnotatedText>, ExtractError> {
        let url = self
            .endpoints
            .endpoint_for(category)
            .ok_or(ExtractError::MissingEndpoint(category))?;

        let body = ExtractionRequest {
            texts,
            annotations: vec![self.annotation_types.for_category(category)],
        };

        tracing::debug!(%category, texts = texts.len(), "analytics.extract.start");

        let annotated: Vec<AnnotatedText> = self
            .http
            .post_json(url, &body, RequestOpts::default())
            .await
            .map_err(|e| {
                tracing::warn!(%category, error = %e, "analytics.extract.failed");
                classify(category, e)
            })?;

        tracing::debug!(%category, annotated = annotated.len(), "analytics.extract.done");
        Ok(annotated)
    }
}

fn classify(category: Category, err: HttpError) -> ExtractError {
    match err {
        HttpError::Api { status, .. } => ExtractError::ServiceStatus(status.as_u16()),
        HttpError::Url(reason) => ExtractError::InvalidEndpoint { category, reason },
        HttpError::Decode(reason, _) => ExtractError::Decode(reason),
        HttpError::Network(reason) | HttpError::Build(reason) => ExtractError::Transport(reason),
    }
}
