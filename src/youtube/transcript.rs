/// Best-effort transcripts from YouTube timed-text captions
use crate::config::YouTubeConfig;
use crate::error::CourseResult;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Something that can produce a plain-text transcript for a video
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// `None` when no transcript is available or fetching failed
    async fn fetch_transcript(&self, video_id: &str) -> Option<String>;
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// `asr` for auto-generated tracks
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn matches_language(&self, language: &str) -> bool {
        let code = self.language_code.to_ascii_lowercase();
        let language = language.to_ascii_lowercase();
        code == language || code.starts_with(&format!("{}-", language))
    }
}

/// Reads caption tracks from the watch page and downloads the chosen track
pub struct TimedTextTranscriptSource {
    client: Client,
    watch_base_url: String,
    preferred_languages: Vec<String>,
    max_chars: usize,
}

impl TimedTextTranscriptSource {
    pub fn from_config(config: &YouTubeConfig) -> CourseResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()?;

        Ok(Self {
            client,
            watch_base_url: config.watch_base_url.trim_end_matches('/').to_string(),
            preferred_languages: config.preferred_languages.clone(),
            max_chars: config.max_transcript_chars,
        })
    }

    async fn try_fetch(&self, video_id: &str) -> anyhow::Result<Option<String>> {
        let page = self
            .client
            .get(format!("{}/watch", self.watch_base_url))
            .query(&[("v", video_id)])
            .header("Accept-Language", "en-US,en;q=0.8")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let tracks = parse_caption_tracks(&page);
        let Some(track) = select_track(&tracks, &self.preferred_languages) else {
            debug!("No caption tracks for video {}", video_id);
            return Ok(None);
        };

        let xml = self
            .client
            .get(&track.base_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let text = timed_text_to_plain(&xml);
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(truncate_transcript(&text, self.max_chars)))
    }
}

#[async_trait]
impl TranscriptSource for TimedTextTranscriptSource {
    async fn fetch_transcript(&self, video_id: &str) -> Option<String> {
        match self.try_fetch(video_id).await {
            Ok(transcript) => transcript,
            Err(e) => {
                debug!("Could not get transcript for video {}: {}", video_id, e);
                None
            }
        }
    }
}

/// Caption tracks embedded in a watch page's player response
pub fn parse_caption_tracks(page: &str) -> Vec<CaptionTrack> {
    const MARKER: &str = "\"captionTracks\":";

    let Some(marker) = page.find(MARKER) else {
        return Vec::new();
    };
    let rest = &page[marker + MARKER.len()..];

    serde_json::Deserializer::from_str(rest.trim_start())
        .into_iter::<Vec<CaptionTrack>>()
        .next()
        .and_then(Result::ok)
        .unwrap_or_default()
}

/// Manual track in a preferred language, then generated English, then any
pub fn select_track<'a>(tracks: &'a [CaptionTrack], preferred: &[String]) -> Option<&'a CaptionTrack> {
    preferred
        .iter()
        .find_map(|lang| {
            tracks
                .iter()
                .find(|t| !t.is_generated() && t.matches_language(lang))
        })
        .or_else(|| {
            preferred
                .iter()
                .find_map(|lang| tracks.iter().find(|t| t.matches_language(lang)))
        })
        .or_else(|| tracks.iter().find(|t| t.is_generated() && t.matches_language("en")))
        .or_else(|| tracks.first())
}

/// Joins the `<text>` (or `<p>` in srv3) nodes of a timed-text document
pub fn timed_text_to_plain(xml: &str) -> String {
    let document = Html::parse_fragment(xml);
    let Ok(selector) = Selector::parse("text, p") else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|node| decode_entities(&node.text().collect::<String>()))
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Timed-text bodies are entity-encoded twice; the parser undoes one level
fn decode_entities(text: &str) -> String {
    text.replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// At most `max_chars` characters, with `...` appended when cut
pub fn truncate_transcript(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(lang: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://example.test/{}", lang),
            language_code: lang.to_string(),
            kind: kind.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_caption_tracks_from_page() {
        let page = r#"<script>var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en","languageCode":"en","kind":"asr"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=fr","languageCode":"fr"}],"audioTracks":[]}}};</script>"#;
        let tracks = parse_caption_tracks(page);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].base_url, "https://www.youtube.com/api/timedtext?v=abc&lang=en");
        assert!(tracks[0].is_generated());
        assert_eq!(tracks[1].language_code, "fr");
    }

    #[test]
    fn test_parse_caption_tracks_missing() {
        assert!(parse_caption_tracks("<html>no captions</html>").is_empty());
    }

    #[test]
    fn test_select_track_order() {
        let preferred = vec!["en".to_string()];

        let tracks = vec![track("en", Some("asr")), track("en-GB", None)];
        assert_eq!(select_track(&tracks, &preferred).unwrap().language_code, "en-GB");

        let tracks = vec![track("de", None), track("en", Some("asr"))];
        assert_eq!(select_track(&tracks, &preferred).unwrap().language_code, "en");

        let tracks = vec![track("de", None), track("fr", None)];
        assert_eq!(select_track(&tracks, &preferred).unwrap().language_code, "de");

        assert!(select_track(&[], &preferred).is_none());
    }

    #[test]
    fn test_timed_text_to_plain() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0" dur="1.5">Hello   there</text><text start="1.5" dur="2">it&amp;#39;s a &amp;quot;test&amp;quot;</text><text start="4" dur="1"></text></transcript>"#;
        assert_eq!(timed_text_to_plain(xml), "Hello there it's a \"test\"");
    }

    #[test]
    fn test_truncate_transcript() {
        assert_eq!(truncate_transcript("short", 10), "short");
        assert_eq!(truncate_transcript("abcdefghij", 4), "abcd...");
    }
}
