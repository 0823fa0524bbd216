use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tally_http::HttpError;

/// How the backend should rank candidate posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recency {
    /// Newest first.
    #[default]
    Recent,
    /// Most relevant / engaged-with first.
    Popular,
    /// Backend default ordering.
    Mixed,
}

impl FromStr for Recency {
    type Err = SearchError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(Recency::Recent),
            "popular" => Ok(Recency::Popular),
            "mixed" => Ok(Recency::Mixed),
            other => Err(SearchError::InvalidQuery(format!(
                "unknown recency mode `{other}`"
            ))),
        }
    }
}

impl fmt::Display for Recency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Recency::Recent => "recent",
            Recency::Popular => "popular",
            Recency::Mixed => "mixed",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid search query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Http(#[from] HttpError),
}

/// Keyword search over a social network, returning raw post texts.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Return up to `limit` texts matching `keyword`, ranked per `recency`.
    async fn search(
        &self,
        keyword: &str,
        limit: u32,
        recency: Recency,
    ) -> Result<Vec<String>, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recency_parses_known_modes() {
        assert_eq!("recent".parse::<Recency>().unwrap(), Recency::Recent);
        assert_eq!("Popular".parse::<Recency>().unwrap(), Recency::Popular);
        assert_eq!("mixed".parse::<Recency>().unwrap(), Recency::Mixed);
        assert!(matches!(
            "latest".parse::<Recency>(),
            Err(SearchError::InvalidQuery(_))
        ));
    }
}
