use super::types::{parse_iso8601_duration, SearchResponse, VideosResponse};
use super::VideoSource;
use crate::config::YoutubeConfig;
use crate::dataset::Video;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

/// YouTube Data API v3 client for collecting public short-video metadata.
pub struct YouTubeApi {
    client: Client,
    api_key: String,
    base_url: String,
    region_code: String,
    relevance_language: String,
}

impl YouTubeApi {
    pub fn new(api_key: String, config: &YoutubeConfig) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            region_code: config.region_code.clone(),
            relevance_language: config.relevance_language.clone(),
        }
    }

    /// `search.list` request for short videos matching the query. The query
    /// goes through reqwest's form encoding, not string interpolation, so
    /// `&`/`#` in free text cannot alter the request parameters.
    fn search_request(&self, query: &str, max_results: u32) -> reqwest::RequestBuilder {
        let max_results = max_results.min(50).to_string();
        self.client.get(format!("{}/search", self.base_url)).query(&[
            ("part", "id"),
            ("q", query),
            ("type", "video"),
            ("videoDuration", "short"),
            ("maxResults", max_results.as_str()),
            ("relevanceLanguage", self.relevance_language.as_str()),
            ("regionCode", self.region_code.as_str()),
            ("key", self.api_key.as_str()),
        ])
    }

    /// `search.list` for short videos matching the query. Returns video IDs.
    pub async fn search_video_ids(&self, query: &str, max_results: u32) -> Result<Vec<String>> {
        let resp = self
            .search_request(query, max_results)
            .send()
            .await
            .context("youtube search request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("youtube search.list failed ({}): {}", status, body);
        }

        let search: SearchResponse = resp
            .json()
            .await
            .context("failed to parse youtube search response")?;

        Ok(search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    /// `videos.list` for metadata on up to 50 IDs at a time.
    pub async fn fetch_videos(&self, ids: &[String]) -> Result<Vec<Video>> {
        let mut videos = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(50) {
            let url = format!(
                "{}/videos?part=snippet,statistics,contentDetails&id={}&key={}",
                self.base_url,
                chunk.join(","),
                self.api_key,
            );

            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .context("youtube videos request failed")?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("youtube videos.list failed ({}): {}", status, body);
            }

            let details: VideosResponse = resp
                .json()
                .await
                .context("failed to parse youtube videos response")?;

            for item in details.items {
                let view_count = item
                    .statistics
                    .view_count
                    .as_deref()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(0);

                videos.push(Video {
                    video_id: item.id,
                    title: item.snippet.title,
                    channel: item.snippet.channel_title,
                    published_at: item.snippet.published_at,
                    view_count,
                    duration_sec: parse_iso8601_duration(&item.content_details.duration),
                    // Labels are added by hand after collection.
                    topic: String::new(),
                    prosocial: 0,
                    risk: 0,
                });
            }
        }

        Ok(videos)
    }
}

#[async_trait]
impl VideoSource for YouTubeApi {
    async fn collect(&self, query: &str, max_results: u32) -> Result<Vec<Video>> {
        let ids = self.search_video_ids(query, max_results).await?;
        tracing::info!(count = ids.len(), query, "search returned video ids");
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_videos(&ids).await
    }
}
