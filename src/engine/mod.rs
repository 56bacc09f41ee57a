pub mod presets;
pub mod ranker;
pub mod scoring;

use crate::dataset::Video;

/// A video with its normalized engagement score attached.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub video: Video,
    pub engagement: f64,
}

/// One slot of a built feed.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub video: Video,
    pub engagement: f64,
    /// Diversity bonus at pick time: 0.0, 0.5, or 1.0. Always 0 for baseline.
    pub diversity: f64,
    pub score: f64,
}

impl FeedEntry {
    pub fn id(&self) -> &str {
        &self.video.video_id
    }
}

/// IDs of a feed, in rank order (for overlap comparisons).
pub fn feed_ids(feed: &[FeedEntry]) -> Vec<String> {
    feed.iter().map(|e| e.video.video_id.clone()).collect()
}
