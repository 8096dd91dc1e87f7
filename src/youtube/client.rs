/// YouTube Data API v3 client
use super::{
    extract_playlist_id, watch_url, PlaylistData, PlaylistInfo, PlaylistSource, TranscriptSource,
    VideoInfo,
};
use crate::config::YouTubeConfig;
use crate::error::{CourseError, CourseResult};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Largest page and id batch the Data API accepts
const API_PAGE_LIMIT: usize = 50;

#[derive(Debug, Default, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

impl Thumbnails {
    fn best_url(&self) -> String {
        [&self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|t| t.url.clone())
            .find(|url| !url.is_empty())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistResource {
    #[serde(default)]
    snippet: PlaylistSnippet,
    #[serde(default)]
    content_details: PlaylistContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PlaylistSnippet {
    title: Option<String>,
    description: String,
    thumbnails: Thumbnails,
    channel_title: String,
    channel_id: String,
    published_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PlaylistContentDetails {
    item_count: u64,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemResource {
    snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnails: Thumbnails,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    position: u32,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    #[serde(default)]
    content_details: VideoContentDetails,
    #[serde(default)]
    statistics: VideoStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VideoContentDetails {
    duration: String,
}

/// The API reports counts as decimal strings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

fn parse_count(value: &Option<String>) -> u64 {
    value.as_deref().and_then(|v| v.parse().ok()).unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Client for playlist metadata, playlist items and video details
#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
    transcripts: Option<Arc<dyn TranscriptSource>>,
    transcript_concurrency: usize,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> CourseResult<Self> {
        Self::from_config(&YouTubeConfig {
            api_key: Some(api_key.into()),
            fetch_transcripts: false,
            ..YouTubeConfig::default()
        })
    }

    /// Client with the configured base URL and, when enabled, the timed-text
    /// transcript source
    pub fn from_config(config: &YouTubeConfig) -> CourseResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(CourseError::MissingCredential("YOUTUBE_API_KEY"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        let transcripts: Option<Arc<dyn TranscriptSource>> = if config.fetch_transcripts {
            Some(Arc::new(super::TimedTextTranscriptSource::from_config(config)?))
        } else {
            None
        };

        Ok(Self {
            client,
            api_key,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            transcripts,
            transcript_concurrency: config.transcript_concurrency.max(1),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_transcript_source(mut self, source: Arc<dyn TranscriptSource>, concurrency: usize) -> Self {
        self.transcripts = Some(source);
        self.transcript_concurrency = concurrency.max(1);
        self
    }

    pub fn without_transcripts(mut self) -> Self {
        self.transcripts = None;
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, String)],
    ) -> CourseResult<T> {
        let url = format!("{}/{}", self.base_url, resource);
        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(CourseError::YouTubeApi {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Playlist metadata; `PlaylistNotFound` when the API returns no item
    pub async fn get_playlist_info(&self, playlist_id: &str) -> CourseResult<PlaylistInfo> {
        let response: ListResponse<PlaylistResource> = self
            .get_json(
                "playlists",
                &[
                    ("part", "snippet,contentDetails".to_string()),
                    ("id", playlist_id.to_string()),
                ],
            )
            .await?;

        let playlist = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| CourseError::PlaylistNotFound(playlist_id.to_string()))?;

        let snippet = playlist.snippet;
        Ok(PlaylistInfo {
            id: playlist_id.to_string(),
            title: snippet.title.unwrap_or_else(|| "Unknown Playlist".to_string()),
            description: snippet.description,
            thumbnail: snippet.thumbnails.best_url(),
            channel_title: snippet.channel_title,
            channel_id: snippet.channel_id,
            published_at: snippet.published_at,
            video_count: playlist.content_details.item_count,
        })
    }

    /// Up to `max_results` playlist entries, enriched with video details
    pub async fn get_playlist_videos(
        &self,
        playlist_id: &str,
        max_results: usize,
    ) -> CourseResult<Vec<VideoInfo>> {
        let mut videos: Vec<VideoInfo> = Vec::new();
        let mut page_token: Option<String> = None;

        while videos.len() < max_results {
            let page_size = API_PAGE_LIMIT.min(max_results - videos.len());
            let mut params = vec![
                ("part", "snippet,contentDetails".to_string()),
                ("playlistId", playlist_id.to_string()),
                ("maxResults", page_size.to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let page: ListResponse<PlaylistItemResource> =
                match self.get_json("playlistItems", &params).await {
                    Err(CourseError::YouTubeApi { status: 404, .. }) => {
                        return Err(CourseError::PlaylistNotFound(playlist_id.to_string()))
                    }
                    other => other?,
                };

            for item in page.items {
                let snippet = item.snippet;
                // deleted and private entries carry no video id
                let Some(video_id) = snippet.resource_id.video_id else {
                    continue;
                };

                videos.push(VideoInfo {
                    url: watch_url(&video_id),
                    video_id,
                    title: snippet.title,
                    description: snippet.description,
                    thumbnail: snippet.thumbnails.best_url(),
                    published_at: snippet.published_at,
                    position: snippet.position,
                    ..VideoInfo::default()
                });
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        videos.truncate(max_results);
        self.attach_video_details(&mut videos).await;

        Ok(videos)
    }

    /// Duration and statistics, fetched in batches; failures keep defaults
    async fn attach_video_details(&self, videos: &mut [VideoInfo]) {
        let ids: Vec<String> = videos.iter().map(|v| v.video_id.clone()).collect();
        let mut details: HashMap<String, VideoResource> = HashMap::new();

        for batch in ids.chunks(API_PAGE_LIMIT) {
            let params = [
                ("part", "contentDetails,statistics".to_string()),
                ("id", batch.join(",")),
            ];
            match self.get_json::<ListResponse<VideoResource>>("videos", &params).await {
                Ok(response) => {
                    details.extend(response.items.into_iter().map(|v| (v.id.clone(), v)));
                }
                Err(e) => warn!("Could not get video details for {} videos: {}", batch.len(), e),
            }
        }

        for video in videos.iter_mut() {
            if let Some(detail) = details.get(&video.video_id) {
                video.duration = detail.content_details.duration.clone();
                video.view_count = parse_count(&detail.statistics.view_count);
                video.like_count = parse_count(&detail.statistics.like_count);
                video.comment_count = parse_count(&detail.statistics.comment_count);
            }
        }
    }

    /// Fetch transcripts with bounded concurrency; missing ones stay `None`
    pub async fn attach_transcripts(&self, videos: &mut [VideoInfo]) {
        let Some(source) = &self.transcripts else {
            return;
        };

        let ids: Vec<(usize, String)> = videos
            .iter()
            .enumerate()
            .map(|(idx, v)| (idx, v.video_id.clone()))
            .collect();

        let results: Vec<(usize, Option<String>)> = stream::iter(ids)
            .map(|(idx, video_id)| {
                let source = Arc::clone(source);
                async move { (idx, source.fetch_transcript(&video_id).await) }
            })
            .buffer_unordered(self.transcript_concurrency)
            .collect()
            .await;

        for (idx, transcript) in results {
            videos[idx].transcript = transcript;
        }
    }
}

#[async_trait]
impl PlaylistSource for YouTubeClient {
    async fn playlist_info(&self, playlist_id: &str) -> CourseResult<PlaylistInfo> {
        self.get_playlist_info(playlist_id).await
    }

    async fn extract_playlist_data(
        &self,
        playlist_url: &str,
        max_videos: usize,
    ) -> CourseResult<PlaylistData> {
        let playlist_id = extract_playlist_id(playlist_url)
            .ok_or_else(|| CourseError::InvalidPlaylistUrl(playlist_url.to_string()))?;

        info!("🎬 Extracting playlist data for: {}", playlist_id);

        let playlist_info = self.get_playlist_info(&playlist_id).await?;
        let mut videos = self.get_playlist_videos(&playlist_id, max_videos).await?;
        self.attach_transcripts(&mut videos).await;

        let data = PlaylistData::new(playlist_info, videos);
        info!(
            "📊 Extracted {} videos, {} with transcripts",
            data.total_videos, data.videos_with_transcripts
        );

        Ok(data)
    }
}
