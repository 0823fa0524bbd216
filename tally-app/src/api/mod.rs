//! HTTP handlers.

pub mod analyze;
pub mod health;

pub use analyze::{analyze, analyze_routes};
pub use health::{health_check, health_routes};
