use super::presets::Weights;
use super::scoring::{diversity_bonus, score_parts, would_break_streak};
use super::{Candidate, FeedEntry};
use std::cmp::Ordering;

/// Hard cap on consecutive same-topic / same-channel picks.
pub const MAX_STREAK: usize = 2;

/// Engagement-only ranking: top-k by engagement, descending. The stable sort
/// keeps dataset order for ties.
pub fn rank_baseline(candidates: &[Candidate], k: usize) -> Vec<FeedEntry> {
    let mut sorted: Vec<&Candidate> = candidates.iter().collect();
    sorted.sort_by(|a, b| {
        b.engagement
            .partial_cmp(&a.engagement)
            .unwrap_or(Ordering::Equal)
    });
    sorted
        .into_iter()
        .take(k)
        .map(|c| FeedEntry {
            video: c.video.clone(),
            engagement: c.engagement,
            diversity: 0.0,
            score: c.engagement,
        })
        .collect()
}

/// Score every remaining candidate against the current history window.
/// When `enforce_streak_cap` is set, candidates that would extend a
/// topic/channel run past MAX_STREAK get score -inf.
fn score_remaining(
    remaining: &[Candidate],
    weights: &Weights,
    recent_topics: &[String],
    recent_channels: &[String],
    window_topics: &[&str],
    window_channels: &[&str],
    enforce_streak_cap: bool,
) -> Vec<(f64, f64)> {
    let full_topics: Vec<&str> = recent_topics.iter().map(String::as_str).collect();
    let full_channels: Vec<&str> = recent_channels.iter().map(String::as_str).collect();

    remaining
        .iter()
        .map(|c| {
            let topic = c.video.topic.as_str();
            let channel = c.video.channel.as_str();

            if enforce_streak_cap
                && (would_break_streak(&full_topics, topic, MAX_STREAK)
                    || would_break_streak(&full_channels, channel, MAX_STREAK))
            {
                return (0.0, f64::NEG_INFINITY);
            }

            let diversity = diversity_bonus(topic, channel, window_topics, window_channels);
            let score = score_parts(
                c.engagement,
                diversity,
                c.video.prosocial as f64,
                c.video.risk as f64,
                weights,
            );
            (diversity, score)
        })
        .collect()
}

/// Index of the best score; ties keep the earliest candidate.
fn best_index(scored: &[(f64, f64)]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &(_, score)) in scored.iter().enumerate() {
        match best {
            Some((_, s)) if score <= s => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

/// Build the prototype feed one slot at a time so the diversity bonus can
/// depend on what was just picked.
///
/// Each pick scores all remaining candidates against the recent-history
/// window, excludes any that would create a 3-in-a-row topic or channel
/// streak, and takes the highest score. If the streak cap blocks every
/// remaining candidate, it is relaxed for that single pick.
pub fn build_prototype_feed(
    candidates: &[Candidate],
    weights: &Weights,
    k: usize,
    recent_window: usize,
) -> Vec<FeedEntry> {
    let mut remaining: Vec<Candidate> = candidates.to_vec();
    let mut feed: Vec<FeedEntry> = Vec::with_capacity(k.min(remaining.len()));

    let mut recent_topics: Vec<String> = Vec::new();
    let mut recent_channels: Vec<String> = Vec::new();

    for _ in 0..k {
        if remaining.is_empty() {
            break;
        }

        let window_start_t = recent_topics.len().saturating_sub(recent_window);
        let window_start_c = recent_channels.len().saturating_sub(recent_window);
        let window_topics: Vec<&str> = recent_topics[window_start_t..]
            .iter()
            .map(String::as_str)
            .collect();
        let window_channels: Vec<&str> = recent_channels[window_start_c..]
            .iter()
            .map(String::as_str)
            .collect();

        let mut scored = score_remaining(
            &remaining,
            weights,
            &recent_topics,
            &recent_channels,
            &window_topics,
            &window_channels,
            true,
        );

        // Everything blocked by the streak cap: relax it for this one pick.
        if scored.iter().all(|&(_, s)| s == f64::NEG_INFINITY) {
            scored = score_remaining(
                &remaining,
                weights,
                &recent_topics,
                &recent_channels,
                &window_topics,
                &window_channels,
                false,
            );
        }

        let Some(idx) = best_index(&scored) else { break };
        let (diversity, score) = scored[idx];
        let picked = remaining.remove(idx);

        recent_topics.push(picked.video.topic.clone());
        recent_channels.push(picked.video.channel.clone());

        feed.push(FeedEntry {
            engagement: picked.engagement,
            video: picked.video,
            diversity,
            score,
        });
    }

    feed
}
