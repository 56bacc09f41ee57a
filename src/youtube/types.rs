use serde::Deserialize;

/// YouTube Data API v3 response types (only the fields we read).

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: SearchId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchId {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideosResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub snippet: Snippet,
    #[serde(default)]
    pub statistics: Statistics,
    pub content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub published_at: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// The API serializes counts as strings; absent for some videos.
    #[serde(default)]
    pub view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentDetails {
    #[serde(default)]
    pub duration: String,
}

/// Parse an ISO-8601 duration ("PT1M30S", "PT45S", "P1DT2H") to seconds.
/// Unparseable input yields 0.
pub fn parse_iso8601_duration(raw: &str) -> f64 {
    let raw = raw.trim();
    let Some(rest) = raw.strip_prefix('P') else { return 0.0 };

    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, t),
        None => (rest, ""),
    };

    let mut seconds = 0.0;
    seconds += component_sum(date_part, &[('W', 604_800.0), ('D', 86_400.0)]);
    seconds += component_sum(time_part, &[('H', 3_600.0), ('M', 60.0), ('S', 1.0)]);
    seconds
}

fn component_sum(part: &str, units: &[(char, f64)]) -> f64 {
    let mut total = 0.0;
    let mut number = String::new();
    for ch in part.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            number.push(ch);
            continue;
        }
        if let Some(&(_, factor)) = units.iter().find(|(u, _)| *u == ch) {
            if let Ok(value) = number.parse::<f64>() {
                total += value * factor;
            }
        }
        number.clear();
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_minutes_seconds() {
        assert!((parse_iso8601_duration("PT1M30S") - 90.0).abs() < 1e-9);
        assert!((parse_iso8601_duration("PT45S") - 45.0).abs() < 1e-9);
        assert!((parse_iso8601_duration("PT2H") - 7200.0).abs() < 1e-9);
    }

    #[test]
    fn test_duration_with_date_part() {
        assert!((parse_iso8601_duration("P1DT2H") - 93_600.0).abs() < 1e-9);
        assert!((parse_iso8601_duration("P1W") - 604_800.0).abs() < 1e-9);
    }

    #[test]
    fn test_duration_garbage_is_zero() {
        assert!((parse_iso8601_duration("") - 0.0).abs() < 1e-9);
        assert!((parse_iso8601_duration("not-a-duration") - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_videos_response_parses() {
        let json = r#"{
            "items": [{
                "id": "abc123",
                "snippet": {
                    "title": "A short",
                    "channelTitle": "SomeChannel",
                    "publishedAt": "2026-01-15T10:00:00Z"
                },
                "statistics": {"viewCount": "12345"},
                "contentDetails": {"duration": "PT59S"}
            }]
        }"#;
        let resp: VideosResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.items.len(), 1);
        assert_eq!(resp.items[0].id, "abc123");
        assert_eq!(resp.items[0].snippet.channel_title, "SomeChannel");
        assert_eq!(resp.items[0].statistics.view_count.as_deref(), Some("12345"));
    }

    #[test]
    fn test_missing_view_count() {
        let json = r#"{
            "items": [{
                "id": "abc123",
                "snippet": {"title": "t", "channelTitle": "c", "publishedAt": ""},
                "contentDetails": {"duration": "PT30S"}
            }]
        }"#;
        let resp: VideosResponse = serde_json::from_str(json).unwrap();
        assert!(resp.items[0].statistics.view_count.is_none());
    }
}
