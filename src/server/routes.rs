use super::state::AppState;
use crate::dataset::{ensure_labels, load_dataset_lenient};
use crate::engine::presets::{mode_settings, Preset, Weights};
use crate::engine::ranker::{build_prototype_feed, rank_baseline};
use crate::engine::scoring::add_engagement;
use crate::engine::FeedEntry;
use crate::metrics::{diversity_at_k, max_creator_streak, max_topic_streak, prosocial_ratio};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

/// Bad request -> 400 with {"error": ...}.
#[derive(Debug)]
pub struct ApiError(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": self.0 }))).into_response()
    }
}

pub async fn get_index() -> Html<&'static str> {
    Html(include_str!("../../web/index.html"))
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

#[derive(Debug, Serialize)]
pub struct PresetsResponse {
    pub presets: Vec<&'static str>,
}

pub async fn get_presets() -> Json<PresetsResponse> {
    Json(PresetsResponse {
        presets: Preset::PROTOTYPES.iter().map(|p| p.as_str()).collect(),
    })
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default)]
    pub night_mode: bool,
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,
    #[serde(default)]
    pub dataset_path: Option<String>,
}

fn default_preset() -> String {
    "entertainment".to_string()
}
fn default_recent_window() -> usize {
    10
}

#[derive(Debug, Serialize)]
pub struct MetricsOut {
    pub diversity_at_10: usize,
    pub max_topic_streak: usize,
    pub max_creator_streak: usize,
    pub prosocial_ratio: f64,
}

fn metrics_for_feed(feed: &[FeedEntry]) -> MetricsOut {
    MetricsOut {
        diversity_at_10: diversity_at_k(feed, 10),
        max_topic_streak: max_topic_streak(feed),
        max_creator_streak: max_creator_streak(feed),
        prosocial_ratio: prosocial_ratio(feed),
    }
}

#[derive(Debug, Serialize)]
pub struct FeedEntryOut {
    pub video_id: String,
    pub title: String,
    pub topic: String,
    pub channel: String,
    pub prosocial: u8,
    pub risk: u8,
    pub engagement: f64,
    pub diversity: f64,
    pub score: f64,
}

fn entries_out(feed: &[FeedEntry], n: usize) -> Vec<FeedEntryOut> {
    feed.iter()
        .take(n)
        .map(|e| FeedEntryOut {
            video_id: e.video.video_id.clone(),
            title: e.video.title.clone(),
            topic: e.video.topic.clone(),
            channel: e.video.channel.clone(),
            prosocial: e.video.prosocial,
            risk: e.video.risk,
            engagement: e.engagement,
            diversity: e.diversity,
            score: e.score,
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub preset: String,
    pub night_mode: bool,
    pub k: usize,
    pub weights: Weights,
    pub improved_metrics: MetricsOut,
    pub baseline_metrics: MetricsOut,
    pub improved_feed: Vec<FeedEntryOut>,
    pub baseline_feed: Vec<FeedEntryOut>,
    pub improved_top10: Vec<FeedEntryOut>,
    pub baseline_top10: Vec<FeedEntryOut>,
    pub source: String,
}

/// Run the prototype and baseline on a local dataset.
pub async fn run_local(
    State(state): State<AppState>,
    body: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError(e.body_text()))?;
    let preset: Preset = req
        .preset
        .parse()
        .map_err(|e: anyhow::Error| ApiError(e.to_string()))?;
    if !preset.is_prototype() {
        return Err(ApiError("preset must be a prototype preset".to_string()));
    }

    let dataset_path = req
        .dataset_path
        .map(PathBuf::from)
        .unwrap_or_else(|| state.dataset_path.clone());
    if !dataset_path.exists() {
        return Err(ApiError(format!("Dataset not found: {}", dataset_path.display())));
    }

    // Lenient load: collected-but-untagged datasets still run, with
    // missing label columns filled with defaults.
    let mut videos =
        load_dataset_lenient(&dataset_path).map_err(|e| ApiError(format!("{:#}", e)))?;
    ensure_labels(&mut videos);

    let (candidates, _) = add_engagement(videos);

    let weights = state
        .config
        .presets
        .weights(preset)
        .unwrap_or(state.config.presets.entertainment);
    let (weights, k) = mode_settings(
        weights,
        req.night_mode,
        state.config.feed.k_default,
        state.config.feed.night_k_cap,
        state.config.feed.night_risk_boost,
    );

    let improved = build_prototype_feed(&candidates, &weights, k, req.recent_window);
    let baseline = rank_baseline(&candidates, k);

    Ok(Json(RunResponse {
        preset: preset.to_string(),
        night_mode: req.night_mode,
        k,
        weights,
        improved_metrics: metrics_for_feed(&improved),
        baseline_metrics: metrics_for_feed(&baseline),
        improved_feed: entries_out(&improved, k.min(50)),
        baseline_feed: entries_out(&baseline, k.min(50)),
        improved_top10: entries_out(&improved, 10),
        baseline_top10: entries_out(&baseline, 10),
        source: dataset_path.display().to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    #[serde(default)]
    pub video_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub status: std::collections::HashMap<String, bool>,
}

/// Check YouTube oEmbed availability for a list of video ids, with an
/// in-process cache so repeat checks do not hit the network.
pub async fn check_embed(
    State(state): State<AppState>,
    body: Result<Json<EmbedRequest>, JsonRejection>,
) -> Result<Json<EmbedResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError(e.body_text()))?;
    let mut status = std::collections::HashMap::new();

    for raw in req.video_ids {
        let id: String = raw.trim().chars().take(32).collect();
        if id.is_empty() {
            continue;
        }

        if let Some(cached) = state.cached_embed(&id) {
            status.insert(id, cached);
            continue;
        }

        let url = format!(
            "https://www.youtube.com/oembed?url=https://www.youtube.com/watch?v={}&format=json",
            id,
        );
        let ok = match state
            .client
            .get(&url)
            .timeout(Duration::from_secs(4))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        };

        state.store_embed(&id, ok);
        status.insert(id, ok);
    }

    Ok(Json(EmbedResponse { status }))
}
