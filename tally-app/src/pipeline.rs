//! Search → extract → count, for one request.
//!
//! Each stage consumes the previous stage's output, so stages run strictly in
//! order and the first failure ends the request. Nothing is retried and no
//! partial histogram is ever returned.
use std::sync::Arc;
use tally_analytics::{
    count_mentions, Category, EntityExtractor, ExtractError, HistogramResult, MalformedAnnotation,
};
use tally_social::{Recency, SearchClient, SearchError};

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no service endpoint configured for option `{0}` (expected `companies` or `people`)")]
    UnknownOption(String),

    #[error("no service endpoint configured for {0} extraction")]
    MissingEndpoint(Category),

    #[error("invalid service endpoint for {category} extraction: {reason}")]
    InvalidEndpoint { category: Category, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("Status code: {0}")]
    ServiceStatus(u16),

    #[error("malformed analytics response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    MalformedAnnotation(#[from] MalformedAnnotation),
}

impl PipelineError {
    /// Short tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Configuration(_) => "configuration",
            PipelineError::Search(_) => "search",
            PipelineError::Transport(_) => "transport",
            PipelineError::ServiceStatus(_) => "service_status",
            PipelineError::MalformedResponse(_) => "malformed_response",
            PipelineError::MalformedAnnotation(_) => "malformed_annotation",
        }
    }
}

impl From<ExtractError> for PipelineError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::MissingEndpoint(category) => {
                ConfigurationError::MissingEndpoint(category).into()
            }
            ExtractError::InvalidEndpoint { category, reason } => {
                ConfigurationError::InvalidEndpoint { category, reason }.into()
            }
            ExtractError::Transport(cause) => PipelineError::Transport(cause),
            ExtractError::ServiceStatus(code) => PipelineError::ServiceStatus(code),
            ExtractError::Decode(cause) => PipelineError::MalformedResponse(cause),
        }
    }
}

pub struct MentionPipeline {
    search: Arc<dyn SearchClient>,
    extractor: Arc<dyn EntityExtractor>,
    search_limit: u32,
    recency: Recency,
}

impl MentionPipeline {
    /// Posts fetched per request unless configured otherwise.
    pub const DEFAULT_SEARCH_LIMIT: u32 = 100;

    pub fn new(search: Arc<dyn SearchClient>, extractor: Arc<dyn EntityExtractor>) -> Self {
        Self {
            search,
            extractor,
            search_limit: Self::DEFAULT_SEARCH_LIMIT,
            recency: Recency::Recent,
        }
    }

    pub fn with_search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit;
        self
    }

    pub fn with_recency(mut self, recency: Recency) -> Self {
        self.recency = recency;
        self
    }

    /// Histogram of `option` entities mentioned in posts matching `keyword`.
    ///
    /// An unknown `option` is rejected before any collaborator is called.
    pub async fn run(&self, keyword: &str, option: &str) -> Result<HistogramResult, PipelineError> {
        let category = Category::from_option(option)
            .ok_or_else(|| ConfigurationError::UnknownOption(option.to_string()))?;

        let texts = self
            .search
            .search(keyword, self.search_limit, self.recency)
            .await
            .map_err(|e| {
                tracing::warn!(%keyword, error = %e, "pipeline.search.failed");
                PipelineError::Search(e)
            })?;
        tracing::debug!(%keyword, texts = texts.len(), "pipeline.search.done");

        let annotated = self.extractor.extract(&texts, category).await?;

        let result = count_mentions(&annotated)?;
        tracing::info!(
            %keyword,
            %category,
            texts = texts.len(),
            labels = result.labels.len(),
            "pipeline.done"
        );
        Ok(result)
    }
}
