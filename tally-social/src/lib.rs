//! Social network search for Tally.
//!
//! [`SearchClient`] is the seam the analysis pipeline depends on; the Twitter/X
//! recent-search API is the one concrete backend.
pub mod search;
pub mod twitter;

pub use search::{Recency, SearchClient, SearchError};
pub use twitter::TwitterApi;
