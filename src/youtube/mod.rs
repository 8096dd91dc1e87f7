//! YouTube playlist metadata and transcripts

pub mod client;
pub mod transcript;

pub use client::YouTubeClient;
pub use transcript::{TimedTextTranscriptSource, TranscriptSource};

use crate::error::CourseResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

/// Playlist metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlaylistInfo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub channel_title: String,
    pub channel_id: String,
    pub published_at: String,
    pub video_count: u64,
}

impl PlaylistInfo {
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/playlist?list={}", self.id)
    }
}

/// One playlist entry with its details and optional transcript
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoInfo {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub published_at: String,
    pub position: u32,
    /// ISO 8601 duration as reported by the API, e.g. `PT4M13S`
    pub duration: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub url: String,
    pub transcript: Option<String>,
}

impl VideoInfo {
    pub fn duration_seconds(&self) -> u64 {
        parse_iso8601_duration(&self.duration)
    }

    pub fn has_transcript(&self) -> bool {
        self.transcript.as_deref().map_or(false, |t| !t.is_empty())
    }
}

/// Everything extracted for one playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistData {
    pub playlist_info: PlaylistInfo,
    pub videos: Vec<VideoInfo>,
    pub total_videos: usize,
    pub videos_with_transcripts: usize,
    pub extracted_at: DateTime<Utc>,
}

impl PlaylistData {
    pub fn new(playlist_info: PlaylistInfo, videos: Vec<VideoInfo>) -> Self {
        let videos_with_transcripts = videos.iter().filter(|v| v.has_transcript()).count();
        Self {
            playlist_info,
            total_videos: videos.len(),
            videos_with_transcripts,
            videos,
            extracted_at: Utc::now(),
        }
    }

    /// Sum of all video durations in seconds
    pub fn total_duration_seconds(&self) -> u64 {
        self.videos.iter().map(VideoInfo::duration_seconds).sum()
    }
}

/// Source of playlist data for the pipeline
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    async fn playlist_info(&self, playlist_id: &str) -> CourseResult<PlaylistInfo>;

    async fn extract_playlist_data(&self, playlist_url: &str, max_videos: usize)
        -> CourseResult<PlaylistData>;
}

fn parse_youtube_url(input: &str) -> Option<Url> {
    let trimmed = input.trim();
    let parsed = Url::parse(trimmed)
        .or_else(|_| Url::parse(&format!("https://{}", trimmed)))
        .ok()?;

    let host = parsed.host_str()?.to_ascii_lowercase();
    let is_youtube = host == "youtube.com"
        || host.ends_with(".youtube.com")
        || host == "youtu.be"
        || host == "www.youtu.be";

    is_youtube.then_some(parsed)
}

/// Playlist id from the `list` query parameter of a YouTube URL
pub fn extract_playlist_id(url: &str) -> Option<String> {
    parse_youtube_url(url)?
        .query_pairs()
        .find(|(key, _)| key == "list")
        .map(|(_, value)| value.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Whether `url` is a YouTube URL naming a playlist
pub fn validate_playlist_url(url: &str) -> bool {
    extract_playlist_id(url).is_some()
}

fn video_id_regex() -> &'static Regex {
    static VIDEO_ID: OnceLock<Regex> = OnceLock::new();
    VIDEO_ID.get_or_init(|| Regex::new(r"^[0-9A-Za-z_-]{11}$").expect("video id pattern is valid"))
}

/// Video id from watch, embed, shorts and youtu.be URLs
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = parse_youtube_url(url)?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());

    let candidate = if host.ends_with("youtu.be") {
        segments.next().map(str::to_string)
    } else {
        match segments.next() {
            Some("watch") => parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("embed") | Some("shorts") | Some("v") | Some("live") => {
                segments.next().map(str::to_string)
            }
            _ => None,
        }
    }?;

    video_id_regex().is_match(&candidate).then_some(candidate)
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

fn duration_regex() -> &'static Regex {
    static DURATION: OnceLock<Regex> = OnceLock::new();
    DURATION.get_or_init(|| {
        Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
            .expect("duration pattern is valid")
    })
}

/// Seconds in an ISO 8601 duration such as `PT1H2M3S`; 0 when malformed
pub fn parse_iso8601_duration(duration: &str) -> u64 {
    let Some(caps) = duration_regex().captures(duration.trim()) else {
        return 0;
    };

    let part = |idx: usize| -> u64 {
        caps.get(idx)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    part(1) * 86_400 + part(2) * 3600 + part(3) * 60 + part(4)
}

/// `45s`, `4m 13s` or `1h 2m 3s`
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!(
            "{}h {}m {}s",
            seconds / 3600,
            (seconds % 3600) / 60,
            seconds % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_playlist_id() {
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/playlist?list=PLabc123").as_deref(),
            Some("PLabc123")
        );
        assert_eq!(
            extract_playlist_id("https://youtube.com/watch?v=dQw4w9WgXcQ&list=PLxyz&index=2").as_deref(),
            Some("PLxyz")
        );
        assert_eq!(
            extract_playlist_id("https://youtu.be/dQw4w9WgXcQ?list=PLshort").as_deref(),
            Some("PLshort")
        );
        assert_eq!(
            extract_playlist_id("music.youtube.com/playlist?list=OLAK5uy").as_deref(),
            Some("OLAK5uy")
        );
    }

    #[test]
    fn test_extract_playlist_id_rejects() {
        assert_eq!(extract_playlist_id("https://vimeo.com/playlist?list=PL1"), None);
        assert_eq!(extract_playlist_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(extract_playlist_id("https://notyoutube.com/playlist?list=PL1"), None);
        assert_eq!(extract_playlist_id("https://www.youtube.com/playlist?list="), None);
        assert!(!validate_playlist_url("not a url at all"));
    }

    #[test]
    fn test_extract_video_id() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?list=PL1&v=dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(url).as_deref(), Some("dQw4w9WgXcQ"), "{}", url);
        }
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/playlist?list=PL1"), None);
    }

    #[test]
    fn test_parse_iso8601_duration() {
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), 3723);
        assert_eq!(parse_iso8601_duration("PT4M13S"), 253);
        assert_eq!(parse_iso8601_duration("PT45S"), 45);
        assert_eq!(parse_iso8601_duration("PT2H"), 7200);
        assert_eq!(parse_iso8601_duration("P1DT1S"), 86_401);
        assert_eq!(parse_iso8601_duration(""), 0);
        assert_eq!(parse_iso8601_duration("4 minutes"), 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(253), "4m 13s");
        assert_eq!(format_duration(3723), "1h 2m 3s");
    }

    #[test]
    fn test_playlist_data_counts() {
        let videos = vec![
            VideoInfo {
                video_id: "a".into(),
                transcript: Some("hello".into()),
                duration: "PT1M".into(),
                ..VideoInfo::default()
            },
            VideoInfo {
                video_id: "b".into(),
                transcript: Some(String::new()),
                duration: "PT30S".into(),
                ..VideoInfo::default()
            },
        ];
        let data = PlaylistData::new(PlaylistInfo::default(), videos);
        assert_eq!(data.total_videos, 2);
        assert_eq!(data.videos_with_transcripts, 1);
        assert_eq!(data.total_duration_seconds(), 90);
    }
}
