#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tally_analytics::{AnnotatedText, Category, EntityExtractor, ExtractError};
use tally_app::pipeline::MentionPipeline;
use tally_social::{Recency, SearchClient, SearchError};

/// Search fake that records every call.
pub struct FakeSearch {
    texts: Option<Vec<String>>,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<(String, u32, Recency)>>,
}

impl FakeSearch {
    pub fn returning<I, S>(texts: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            texts: Some(texts.into_iter().map(Into::into).collect()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            texts: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchClient for FakeSearch {
    async fn search(
        &self,
        keyword: &str,
        limit: u32,
        recency: Recency,
    ) -> Result<Vec<String>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((keyword.to_string(), limit, recency));
        match &self.texts {
            Some(texts) => Ok(texts.clone()),
            None => Err(SearchError::Http(tally_http_network_error())),
        }
    }
}

fn tally_http_network_error() -> tally_http::HttpError {
    tally_http::HttpError::Network("connection refused".into())
}

pub enum Extraction {
    Annotated(Vec<AnnotatedText>),
    Status(u16),
    MissingEndpoint,
    Transport,
}

/// Extractor fake that records the category and texts it was asked for.
pub struct FakeExtractor {
    behavior: Extraction,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<(Vec<String>, Category)>>,
}

impl FakeExtractor {
    pub fn new(behavior: Extraction) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn annotating<I>(items: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Vec<&'static str>>,
    {
        Self::new(Extraction::Annotated(
            items
                .into_iter()
                .map(AnnotatedText::with_annotations)
                .collect(),
        ))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntityExtractor for FakeExtractor {
    async fn extract(
        &self,
        texts: &[String],
        category: Category,
    ) -> Result<Vec<AnnotatedText>, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((texts.to_vec(), category));
        match &self.behavior {
            Extraction::Annotated(items) => Ok(items.clone()),
            Extraction::Status(code) => Err(ExtractError::ServiceStatus(*code)),
            Extraction::MissingEndpoint => Err(ExtractError::MissingEndpoint(category)),
            Extraction::Transport => Err(ExtractError::Transport("connection reset".into())),
        }
    }
}

pub fn pipeline(search: &Arc<FakeSearch>, extractor: &Arc<FakeExtractor>) -> MentionPipeline {
    MentionPipeline::new(search.clone(), extractor.clone())
}
