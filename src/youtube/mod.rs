pub mod api;
pub mod types;

use crate::dataset::Video;
use anyhow::Result;
use async_trait::async_trait;

/// Source of short-video metadata. The production implementation talks to
/// the YouTube Data API; tests substitute a canned source.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn collect(&self, query: &str, max_results: u32) -> Result<Vec<Video>>;
}
