use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One labeled short-video record (row of the tagged dataset CSV).
#[derive(Debug, Clone, Serialize)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub published_at: String,
    pub view_count: u64,
    pub duration_sec: f64,
    pub topic: String,
    pub prosocial: u8,
    pub risk: u8,
}

/// Raw CSV row. Label and numeric columns come in as strings so that
/// hand-edited datasets (blank cells, "1.0", "yes") still load; they are
/// coerced during validation.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    video_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    view_count: String,
    #[serde(default)]
    duration_sec: String,
    #[serde(default)]
    topic: String,
    #[serde(default)]
    prosocial: String,
    #[serde(default)]
    risk: String,
}

const REQUIRED_COLUMNS: [&str; 5] = ["topic", "channel", "prosocial", "risk", "view_count"];

/// Columns a dataset must have even before hand-tagging.
const BASE_COLUMNS: [&str; 2] = ["channel", "view_count"];

/// Coerce a label cell to a 0/1 flag. Non-numeric -> 0, values clamped.
fn coerce_flag(raw: &str) -> u8 {
    raw.trim()
        .parse::<f64>()
        .map(|v| if v >= 1.0 { 1 } else { 0 })
        .unwrap_or(0)
}

fn coerce_u64(raw: &str) -> u64 {
    raw.trim()
        .parse::<f64>()
        .map(|v| if v.is_finite() && v > 0.0 { v as u64 } else { 0 })
        .unwrap_or(0)
}

fn coerce_f64(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}

/// Load and validate a tagged dataset.
///
/// Preflight checks mirror the evaluation runner's requirements:
/// - required columns must exist in the header
/// - prosocial/risk are coerced to 0/1
/// - blank topic/channel rows are counted and logged
pub fn load_dataset(path: &Path) -> Result<Vec<Video>> {
    load_with_required(path, &REQUIRED_COLUMNS)
}

/// Load a dataset that may not be hand-tagged yet. Missing label columns
/// come through as blanks and coerce to topic="", prosocial=0, risk=0;
/// callers run `ensure_labels` afterwards.
pub fn load_dataset_lenient(path: &Path) -> Result<Vec<Video>> {
    load_with_required(path, &BASE_COLUMNS)
}

fn load_with_required(path: &Path, required: &[&str]) -> Result<Vec<Video>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

    let headers = reader
        .headers()
        .context("Failed to read dataset header")?
        .clone();
    let missing: Vec<&str> = required
        .iter()
        .filter(|c| !headers.iter().any(|h| h == **c))
        .copied()
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("Missing required columns: {:?}", missing);
    }

    let mut videos = Vec::new();
    let mut blank_topics = 0usize;
    let mut blank_channels = 0usize;

    for record in reader.deserialize() {
        let row: RawRow = record.context("Failed to parse dataset row")?;
        if row.topic.trim().is_empty() {
            blank_topics += 1;
        }
        if row.channel.trim().is_empty() {
            blank_channels += 1;
        }
        videos.push(Video {
            video_id: row.video_id,
            title: row.title,
            channel: row.channel,
            published_at: row.published_at,
            view_count: coerce_u64(&row.view_count),
            duration_sec: coerce_f64(&row.duration_sec),
            topic: row.topic,
            prosocial: coerce_flag(&row.prosocial),
            risk: coerce_flag(&row.risk),
        });
    }

    if blank_topics > 0 || blank_channels > 0 {
        tracing::warn!(blank_topics, blank_channels, "dataset has blank label rows");
    }

    Ok(videos)
}

/// Write videos to a CSV dataset (collection output, same schema as input).
pub fn write_dataset(path: &Path, videos: &[Video]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create dataset: {}", path.display()))?;
    for video in videos {
        writer.serialize(video).context("Failed to write dataset row")?;
    }
    writer.flush().context("Failed to flush dataset")?;
    Ok(())
}

/// Deterministic per-seed shuffle (one "simulated session").
pub fn shuffled(videos: &[Video], seed: u64) -> Vec<Video> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = videos.to_vec();
    out.shuffle(&mut rng);
    out
}

/// Fill label columns missing from freshly collected (untagged) data so it
/// can still run through the ranking engine.
pub fn ensure_labels(videos: &mut [Video]) {
    for video in videos.iter_mut() {
        if video.topic.trim().is_empty() {
            video.topic = "unlabeled".to_string();
        }
    }
}

#[cfg(test)]
pub fn sample_video(id: &str, channel: &str, topic: &str, views: u64, prosocial: u8, risk: u8) -> Video {
    Video {
        video_id: id.to_string(),
        title: format!("video {}", id),
        channel: channel.to_string(),
        published_at: "2026-01-01T00:00:00Z".to_string(),
        view_count: views,
        duration_sec: 45.0,
        topic: topic.to_string(),
        prosocial,
        risk,
    }
}
