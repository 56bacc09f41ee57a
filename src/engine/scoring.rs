use super::presets::Weights;
use super::Candidate;
use crate::dataset::Video;

/// Attach normalized engagement (0..=1) based on view counts.
/// Returns the candidates and the max view count used as the divisor.
pub fn add_engagement(videos: Vec<Video>) -> (Vec<Candidate>, u64) {
    let max_views = videos.iter().map(|v| v.view_count).max().unwrap_or(0);
    let divisor = if max_views == 0 { 1 } else { max_views };

    let candidates = videos
        .into_iter()
        .map(|video| {
            let engagement = video.view_count as f64 / divisor as f64;
            Candidate { video, engagement }
        })
        .collect();

    (candidates, max_views)
}

/// Diversity bonus in {0, 0.5, 1}: +0.5 each for a topic and a channel
/// not seen in the recent window.
pub fn diversity_bonus(
    topic: &str,
    channel: &str,
    recent_topics: &[&str],
    recent_channels: &[&str],
) -> f64 {
    let topic_new = !recent_topics.contains(&topic);
    let channel_new = !recent_channels.contains(&channel);
    0.5 * (topic_new as u8 as f64) + 0.5 * (channel_new as u8 as f64)
}

/// Total score: weighted engagement + diversity + prosocial, minus weighted risk.
pub fn score_parts(engagement: f64, diversity: f64, prosocial: f64, risk: f64, w: &Weights) -> f64 {
    engagement * w.engagement + diversity * w.diversity + prosocial * w.prosocial - risk * w.risk
}

/// True if picking `candidate_value` next would extend a run of identical
/// values past `max_streak`.
pub fn would_break_streak(recent: &[&str], candidate_value: &str, max_streak: usize) -> bool {
    if recent.len() < max_streak {
        return false;
    }
    recent[recent.len() - max_streak..]
        .iter()
        .all(|v| *v == candidate_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sample_video;

    #[test]
    fn test_add_engagement_normalizes_to_max() {
        let videos = vec![
            sample_video("a", "c1", "t1", 1000, 0, 0),
            sample_video("b", "c2", "t2", 250, 0, 0),
        ];
        let (candidates, max_views) = add_engagement(videos);
        assert_eq!(max_views, 1000);
        assert!((candidates[0].engagement - 1.0).abs() < 1e-9);
        assert!((candidates[1].engagement - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_add_engagement_all_zero_views() {
        let videos = vec![sample_video("a", "c1", "t1", 0, 0, 0)];
        let (candidates, max_views) = add_engagement(videos);
        assert_eq!(max_views, 0);
        assert!((candidates[0].engagement - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_diversity_bonus_levels() {
        let topics = vec!["comedy", "music"];
        let channels = vec!["ChanA"];
        assert!((diversity_bonus("science", "ChanB", &topics, &channels) - 1.0).abs() < 1e-9);
        assert!((diversity_bonus("comedy", "ChanB", &topics, &channels) - 0.5).abs() < 1e-9);
        assert!((diversity_bonus("science", "ChanA", &topics, &channels) - 0.5).abs() < 1e-9);
        assert!((diversity_bonus("comedy", "ChanA", &topics, &channels) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_parts() {
        let w = Weights { engagement: 0.55, diversity: 0.20, prosocial: 0.15, risk: 0.10 };
        let s = score_parts(1.0, 1.0, 1.0, 0.0, &w);
        assert!((s - 0.90).abs() < 1e-9);
        let s = score_parts(1.0, 0.0, 0.0, 1.0, &w);
        assert!((s - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_would_break_streak() {
        assert!(!would_break_streak(&[], "comedy", 2));
        assert!(!would_break_streak(&["comedy"], "comedy", 2));
        assert!(would_break_streak(&["music", "comedy", "comedy"], "comedy", 2));
        assert!(!would_break_streak(&["comedy", "music"], "comedy", 2));
        assert!(!would_break_streak(&["comedy", "comedy"], "music", 2));
    }
}
