//! Twitter/X recent-search backend.
//!
//! `client` shapes requests and trims responses down to post texts; `types`
//! holds the subset of the v2 response schema we decode.
pub mod client;
pub mod types;

pub use client::TwitterApi;
