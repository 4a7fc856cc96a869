//! Publishes translated articles to a Ghost blog through the Admin API.
//!
//! The pipeline reads `original.md` / `translation.md` from the output directory,
//! archives timestamped copies, optionally renders and uploads a title-card thumbnail,
//! then creates the post. A separate flow swaps the feature image of an existing post
//! using Ghost's `updated_at` optimistic concurrency token.
//!
//! Content extraction and translation are done outside this crate.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{PublishError, Result};
