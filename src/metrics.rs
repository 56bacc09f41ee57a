//! Feed quality metrics: diversity, repetition caps, prosocial share, and
//! similarity against a baseline feed.

use crate::engine::FeedEntry;
use std::collections::HashSet;

/// Diversity@k: unique topics among the first k entries.
pub fn diversity_at_k(feed: &[FeedEntry], k: usize) -> usize {
    feed.iter()
        .take(k)
        .map(|e| e.video.topic.as_str())
        .filter(|t| !t.trim().is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Longest run of equal consecutive values.
pub fn max_streak<'a, I>(values: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best = 0usize;
    let mut cur = 0usize;
    let mut prev: Option<&str> = None;

    for value in values {
        cur = match prev {
            Some(p) if p == value => cur + 1,
            _ => 1,
        };
        best = best.max(cur);
        prev = Some(value);
    }

    best
}

pub fn max_topic_streak(feed: &[FeedEntry]) -> usize {
    max_streak(feed.iter().map(|e| e.video.topic.as_str()))
}

pub fn max_creator_streak(feed: &[FeedEntry]) -> usize {
    max_streak(feed.iter().map(|e| e.video.channel.as_str()))
}

/// Fraction of entries labeled prosocial. Empty feed -> 0.0.
pub fn prosocial_ratio(feed: &[FeedEntry]) -> f64 {
    if feed.is_empty() {
        return 0.0;
    }
    let sum: u64 = feed.iter().map(|e| e.video.prosocial.min(1) as u64).sum();
    sum as f64 / feed.len() as f64
}

/// Share of the first `top_n` IDs two feeds have in common, over `top_n`.
/// 0.3 means 3 of the top 10 are the same.
pub fn overlap_ratio(ids_a: &[String], ids_b: &[String], top_n: usize) -> f64 {
    if top_n == 0 {
        return 0.0;
    }
    let set_a: HashSet<&str> = ids_a.iter().take(top_n).map(String::as_str).collect();
    let set_b: HashSet<&str> = ids_b.iter().take(top_n).map(String::as_str).collect();
    set_a.intersection(&set_b).count() as f64 / top_n as f64
}

/// Jaccard similarity of the two top-n ID sets: |A ∩ B| / |A ∪ B|.
pub fn jaccard_similarity(ids_a: &[String], ids_b: &[String], top_n: usize) -> f64 {
    let set_a: HashSet<&str> = ids_a.iter().take(top_n).map(String::as_str).collect();
    let set_b: HashSet<&str> = ids_b.iter().take(top_n).map(String::as_str).collect();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    set_a.intersection(&set_b).count() as f64 / union as f64
}
