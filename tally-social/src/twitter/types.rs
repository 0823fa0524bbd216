use serde::Deserialize;

/// Body of `GET /2/tweets/search/recent`. Only the fields Tally reads.
///
/// The API omits `data` entirely when nothing matched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<Post>,
    #[serde(default)]
    pub meta: SearchMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchMeta {
    pub result_count: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub text: String,
}

impl SearchResponse {
    /// Post texts in the order the API returned them.
    pub fn into_texts(self) -> Vec<String> {
        self.data.into_iter().map(|post| post.text).collect()
    }
}
