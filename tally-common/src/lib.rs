//! Shared building blocks for the Tally crates.
//!
//! Holds the process-wide logging setup ([`observability`]) and the small
//! value types that more than one crate needs to agree on.
//!
//! ```rust
//! use tally_common::observability::{LogConfig, LogFormat};
//!
//! let format: LogFormat = "json".parse().unwrap();
//! let cfg = LogConfig { format, ..LogConfig::default() };
//! assert_eq!(cfg.app_name, "tally");
//! ```
pub mod observability;

pub use observability::{init_logging, LogConfig, LogFormat};
