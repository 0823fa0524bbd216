//! JSON-over-HTTP client shared by the Tally collaborators.
//!
//! One [`HttpClient`] per upstream. It is either anchored to a base URL (the
//! Twitter API) or unanchored, taking absolute URLs per call (the analytics
//! endpoints, which live on unrelated hosts). Every call:
//!
//! - sends `Accept: application/json` and, for POST, a JSON body
//! - runs under a per-call timeout
//! - maps non-2xx answers to [`HttpError::Api`] with the upstream's message
//! - never logs bearer tokens or secret query values
//!
//! Each call is exactly one request; failures go straight back to the caller.
//!
//! Events: `http.request.start`, `http.response.headers`, `http.error`, plus
//! curl-style lines on target `http.raw` when `TALLY_HTTP_RAW=1`.
//!
//! ```no_run
//! # async fn demo() -> Result<(), tally_http::HttpError> {
//! use tally_http::{Auth, HttpClient, RequestOpts};
//!
//! let client = HttpClient::new("https://api.twitter.com")?;
//! let page: serde_json::Value = client
//!     .get_json(
//!         "2/tweets/search/recent",
//!         RequestOpts {
//!             auth: Some(Auth::Bearer("token")),
//!             query: Some(vec![("query", "rust".into())]),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! # Ok(()) }
//! ```

mod redact;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

pub use reqwest::StatusCode;

const JSON: &str = "application/json";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("could not build request: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("could not decode response: {0} (body: {1})")]
    Decode(String, String),
    #[error("upstream answered {status}: {message} (request id {request_id})")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

#[derive(Clone, Debug, Default)]
pub enum Auth<'a> {
    /// `Authorization: Bearer <token>`; surrounding quotes and whitespace are stripped.
    Bearer(&'a str),
    #[default]
    None,
}

/// Per-call overrides of the client defaults.
///
/// ```
/// use tally_http::{Auth, RequestOpts};
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     auth: Some(Auth::Bearer("token")),
///     query: Some(vec![("max_results", "100".into())]),
///     ..Default::default()
/// };
/// assert!(opts.query.is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Option<Url>,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Client whose call paths are joined onto `base`.
    ///
    /// ```
    /// use tally_http::HttpClient;
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.twitter.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), tally_http::HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(format!("{base}: {e}")))?;
        Self::build(Some(base))
    }

    /// Client without a base; every call passes an absolute URL.
    pub fn unanchored() -> Result<Self, HttpError> {
        Self::build(None)
    }

    fn build(base: Option<Url>) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.execute::<(), T>(Method::GET, path, None, opts).await
    }

    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path, Some(body), opts).await
    }

    fn resolve(&self, path: &str) -> Result<Url, HttpError> {
        let joined = match &self.base {
            Some(base) => base.join(path),
            None => Url::parse(path),
        };
        joined.map_err(|e| HttpError::Url(format!("{path}: {e}")))
    }

    async fn execute<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(path)?;
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| HttpError::Build(format!("body serialization failed: {e}")))?;
        let bearer = match &opts.auth {
            Some(Auth::Bearer(raw)) => Some(clean_bearer(raw)?),
            _ => None,
        };

        let req_id = format!("r{:06}", REQUEST_SEQ.fetch_add(1, Ordering::Relaxed));
        let timeout = opts.timeout.unwrap_or(self.default_timeout);

        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(timeout)
            .header(ACCEPT, JSON);
        if let Some(query) = &opts.query {
            rb = rb.query(query);
        }
        if let Some(bytes) = payload {
            rb = rb.header(CONTENT_TYPE, JSON).body(bytes);
        }
        if let Some(token) = &bearer {
            rb = rb.bearer_auth(token);
        }
        let req = rb.build().map_err(|e| HttpError::Build(e.to_string()))?;

        tracing::debug!(
            %req_id,
            %method,
            host_path = %format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            query = ?redact::query_pairs(opts.query.as_deref()),
            timeout_ms = timeout.as_millis() as u64,
            bearer = bearer.is_some(),
            has_body = req.body().is_some(),
            "http.request.start"
        );
        if redact::raw_enabled() {
            tracing::debug!(target: "http.raw", %req_id, curl = %redact::curl(&req), "request");
        }

        let started = Instant::now();
        let exchange = self.send(req).await.map_err(|err| {
            tracing::warn!(
                %req_id,
                timed_out = err.is_timeout(),
                error = %err,
                "http.network_error"
            );
            HttpError::Network(err.to_string())
        })?;
        exchange.trace(&req_id, started.elapsed());

        if exchange.status.is_success() {
            return exchange.decode(&req_id);
        }

        let message = extract_error_message(&exchange.body);
        let request_id = exchange.upstream_id();
        tracing::warn!(
            %req_id,
            status = %exchange.status,
            %message,
            upstream_request_id = %request_id,
            body_snippet = %redact::snippet(&exchange.body),
            "http.error"
        );
        Err(HttpError::Api {
            status: exchange.status,
            message,
            request_id,
        })
    }

    async fn send(&self, req: reqwest::Request) -> Result<Exchange, reqwest::Error> {
        let resp = self.inner.execute(req).await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?.to_vec();
        Ok(Exchange {
            status,
            headers,
            body,
        })
    }
}

/// One answered round trip, body fully read.
struct Exchange {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Exchange {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn upstream_id(&self) -> String {
        self.header("x-request-id")
            .or_else(|| self.header("x-correlation-id"))
            .unwrap_or("-")
            .to_string()
    }

    fn trace(&self, req_id: &str, elapsed: Duration) {
        tracing::debug!(
            %req_id,
            status = %self.status,
            duration_ms = elapsed.as_millis() as u64,
            body_len = self.body.len(),
            rate_limit.remaining = ?self.header("x-rate-limit-remaining"),
            rate_limit.reset = ?self.header("x-rate-limit-reset"),
            "http.response.headers"
        );
        if redact::raw_enabled() {
            let end = self.body.len().min(redact::RAW_MAX_BODY);
            tracing::info!(
                target: "http.raw",
                %req_id,
                status = %self.status,
                headers = ?redact::headers(&self.headers),
                body = %String::from_utf8_lossy(&self.body[..end]),
                truncated = self.body.len() > redact::RAW_MAX_BODY,
                "response"
            );
        }
    }

    fn decode<T: DeserializeOwned>(&self, req_id: &str) -> Result<T, HttpError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            let snippet = redact::snippet(&self.body);
            tracing::warn!(
                %req_id,
                line = e.line(),
                column = e.column(),
                error = %e,
                body_snippet = %snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }
}

/// Best human-readable message from an error body.
///
/// Understands `{"errors":[{...}]}` (Twitter) and flat `{"message"|"detail"|
/// "title"|"error": ...}` objects; anything else falls back to a snippet.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        errors: Vec<Fields>,
    }

    #[derive(Deserialize)]
    struct Fields {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        detail: Option<String>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        error: Option<String>,
    }

    impl Fields {
        fn best(self) -> Option<String> {
            [self.message, self.detail, self.title, self.error]
                .into_iter()
                .flatten()
                .find(|s| !s.trim().is_empty())
        }
    }

    serde_json::from_slice::<Envelope>(body)
        .ok()
        .and_then(|env| env.errors.into_iter().next())
        .and_then(Fields::best)
        .or_else(|| {
            serde_json::from_slice::<Fields>(body)
                .ok()
                .and_then(Fields::best)
        })
        .unwrap_or_else(|| redact::snippet(body))
}

fn clean_bearer(raw: &str) -> Result<String, HttpError> {
    let token: String = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if token.is_empty() {
        return Err(HttpError::Build("bearer token is empty".into()));
    }
    if !token.is_ascii() {
        return Err(HttpError::Build("bearer token contains non-ASCII characters".into()));
    }
    HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(token)
}
