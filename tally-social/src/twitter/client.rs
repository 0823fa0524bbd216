//! Thin wrapper around the Twitter/X v2 recent-search endpoint.
//!
//! Handles bearer auth, parameter shaping, and the API's time-window rules
//! before delegating to the shared HTTP client. Only the first page is read.
use crate::search::{Recency, SearchClient, SearchError};
use crate::twitter::types::SearchResponse;
use async_trait::async_trait;
use std::borrow::Cow;
use std::time::Duration as StdDuration;
use tally_http::{Auth, HttpClient, HttpError, RequestOpts};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

pub const TWITTER_API_BASE: &str = "https://api.twitter.com";

const RECENT_SEARCH_PATH: &str = "2/tweets/search/recent";
const MIN_PAGE: u32 = 10;
const MAX_PAGE: u32 = 100;

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    bearer: String,
}

impl TwitterApi {
    pub fn new(bearer_token: String) -> Result<Self, HttpError> {
        Self::with_base_url(TWITTER_API_BASE, bearer_token)
    }

    /// Point the client at another host (API proxies, test servers).
    pub fn with_base_url(base_url: &str, bearer_token: String) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            bearer: bearer_token,
        })
    }

    pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    /// Fetch one page of recent posts matching `query`.
    pub async fn recent_search(
        &self,
        query: &str,
        limit: u32,
        recency: Recency,
    ) -> Result<SearchResponse, SearchError> {
        let params = search_params(query, limit, recency, OffsetDateTime::now_utc())?;

        let resp: SearchResponse = self
            .http
            .get_json(
                RECENT_SEARCH_PATH,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(
            result_count = ?resp.meta.result_count,
            "twitter.search.page"
        );
        Ok(resp)
    }
}

#[async_trait]
impl SearchClient for TwitterApi {
    async fn search(
        &self,
        keyword: &str,
        limit: u32,
        recency: Recency,
    ) -> Result<Vec<String>, SearchError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut texts = self.recent_search(keyword, limit, recency).await?.into_texts();
        texts.truncate(limit as usize);
        Ok(texts)
    }
}

/// Query parameters for one recent-search call.
///
/// The API only accepts windows fully inside the last 7 days that end at
/// least 10s before now, so caller dates are never forwarded.
fn search_params(
    query: &str,
    limit: u32,
    recency: Recency,
    now: OffsetDateTime,
) -> Result<Vec<(&'static str, Cow<'static, str>)>, SearchError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SearchError::InvalidQuery("keyword must not be blank".into()));
    }

    let end = now - Duration::seconds(20);
    let start = now - Duration::days(7);
    let fmt = |t: OffsetDateTime| {
        t.format(&Rfc3339)
            .map_err(|e| SearchError::InvalidQuery(format!("time window: {e}")))
    };

    let mut params: Vec<(&'static str, Cow<'static, str>)> = vec![
        ("query", query.to_string().into()),
        (
            "max_results",
            limit.clamp(MIN_PAGE, MAX_PAGE).to_string().into(),
        ),
        ("start_time", fmt(start)?.into()),
        ("end_time", fmt(end)?.into()),
    ];

    match recency {
        Recency::Recent => params.push(("sort_order", "recency".into())),
        Recency::Popular => params.push(("sort_order", "relevancy".into())),
        Recency::Mixed => {}
    }

    Ok(params)
}
