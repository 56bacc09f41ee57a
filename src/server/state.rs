use crate::config::Config;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Shared state for the web app.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Default dataset used when a request does not name one.
    pub dataset_path: PathBuf,
    /// oEmbed availability cache: video id -> embeddable.
    pub embed_cache: Arc<Mutex<HashMap<String, bool>>>,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Arc<Config>, dataset_path: PathBuf) -> Self {
        Self {
            config,
            dataset_path,
            embed_cache: Arc::new(Mutex::new(HashMap::new())),
            client: reqwest::Client::new(),
        }
    }

    pub fn cached_embed(&self, video_id: &str) -> Option<bool> {
        self.embed_cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(video_id).copied())
    }

    pub fn store_embed(&self, video_id: &str, ok: bool) {
        if let Ok(mut cache) = self.embed_cache.lock() {
            cache.insert(video_id.to_string(), ok);
        }
    }
}
