//! Typed views over stored documents

use super::{Collection, DocumentStore};
use crate::course::{assess_difficulty, content_summary, estimate_complexity_score, ContentAnalysis, CourseDocument};
use crate::error::CourseResult;
use crate::youtube::{PlaylistData, VideoInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub duration: String,
    pub published_at: String,
    pub position: u32,
    pub url: String,
    pub has_transcript: bool,
    pub transcript_length: usize,
}

impl From<&VideoInfo> for VideoRecord {
    fn from(video: &VideoInfo) -> Self {
        Self {
            video_id: video.video_id.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            thumbnail_url: video.thumbnail.clone(),
            duration: video.duration.clone(),
            published_at: video.published_at.clone(),
            position: video.position,
            url: video.url.clone(),
            has_transcript: video.has_transcript(),
            transcript_length: video.transcript.as_deref().map_or(0, |t| t.chars().count()),
        }
    }
}

/// A playlist as kept in the `playlists` collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistRecord {
    pub playlist_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub channel_title: String,
    pub channel_id: String,
    pub video_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
    #[serde(default)]
    pub videos: Vec<VideoRecord>,
}

impl PlaylistRecord {
    pub fn from_playlist_data(data: &PlaylistData) -> Self {
        let info = &data.playlist_info;
        let now = Utc::now();
        Self {
            playlist_id: info.id.clone(),
            title: info.title.clone(),
            description: info.description.clone(),
            thumbnail_url: info.thumbnail.clone(),
            channel_title: info.channel_title.clone(),
            channel_id: info.channel_id.clone(),
            video_count: data.videos.len(),
            created_at: now,
            updated_at: now,
            url: info.url(),
            videos: data.videos.iter().map(VideoRecord::from).collect(),
        }
    }

    pub fn summary(&self) -> PlaylistSummary {
        PlaylistSummary {
            playlist_id: self.playlist_id.clone(),
            title: self.title.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            video_count: self.video_count,
            channel_title: self.channel_title.clone(),
            url: self.url.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// List entry for a stored playlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistSummary {
    pub playlist_id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub video_count: usize,
    pub channel_title: String,
    pub url: String,
    pub updated_at: DateTime<Utc>,
}

/// Advisory statistics kept in the `analyses` collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistAnalysis {
    pub playlist_id: String,
    pub total_videos: usize,
    pub videos_with_transcripts: usize,
    pub total_duration_seconds: u64,
    pub difficulty: String,
    pub complexity_score: f64,
    pub analyzed_at: DateTime<Utc>,
}

impl PlaylistAnalysis {
    pub fn from_playlist_data(data: &PlaylistData) -> Self {
        let summary = content_summary(data);
        Self {
            playlist_id: data.playlist_info.id.clone(),
            total_videos: data.total_videos,
            videos_with_transcripts: data.videos_with_transcripts,
            total_duration_seconds: data.total_duration_seconds(),
            difficulty: assess_difficulty(&summary).to_string(),
            complexity_score: estimate_complexity_score(&summary),
            analyzed_at: Utc::now(),
        }
    }
}

/// Store a playlist and its analysis, keeping the original `created_at`
pub async fn store_playlist(store: &dyn DocumentStore, data: &PlaylistData) -> CourseResult<PlaylistRecord> {
    let id = &data.playlist_info.id;
    let mut record = PlaylistRecord::from_playlist_data(data);
    if let Some(existing) = load_playlist(store, id).await.ok().flatten() {
        record.created_at = existing.created_at;
    }

    store
        .set(Collection::Playlists, id, serde_json::to_value(&record)?)
        .await?;
    let analysis = PlaylistAnalysis::from_playlist_data(data);
    store
        .set(Collection::Analyses, id, serde_json::to_value(&analysis)?)
        .await?;

    Ok(record)
}

pub async fn load_playlist(store: &dyn DocumentStore, playlist_id: &str) -> CourseResult<Option<PlaylistRecord>> {
    match store.get(Collection::Playlists, playlist_id).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc.data)?)),
        None => Ok(None),
    }
}

pub async fn load_analysis(store: &dyn DocumentStore, playlist_id: &str) -> CourseResult<Option<PlaylistAnalysis>> {
    match store.get(Collection::Analyses, playlist_id).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc.data)?)),
        None => Ok(None),
    }
}

pub async fn list_playlists(store: &dyn DocumentStore, limit: usize) -> CourseResult<Vec<PlaylistSummary>> {
    let docs = store.list(Collection::Playlists, limit).await?;
    Ok(docs
        .into_iter()
        .filter_map(|doc| serde_json::from_value::<PlaylistRecord>(doc.data).ok())
        .map(|record| record.summary())
        .collect())
}

pub async fn search_playlists(store: &dyn DocumentStore, query: &str, limit: usize) -> CourseResult<Vec<PlaylistSummary>> {
    let docs = store.search(Collection::Playlists, query, limit).await?;
    Ok(docs
        .into_iter()
        .filter_map(|doc| serde_json::from_value::<PlaylistRecord>(doc.data).ok())
        .map(|record| record.summary())
        .collect())
}

/// Remove a playlist together with its analysis and course
pub async fn delete_playlist(store: &dyn DocumentStore, playlist_id: &str) -> CourseResult<bool> {
    let removed = store.delete(Collection::Playlists, playlist_id).await?;
    store.delete(Collection::Analyses, playlist_id).await?;
    store.delete(Collection::Courses, playlist_id).await?;
    store.delete(Collection::ContentAnalyses, playlist_id).await?;
    Ok(removed)
}

pub async fn store_course(store: &dyn DocumentStore, playlist_id: &str, document: &CourseDocument) -> CourseResult<()> {
    store
        .set(Collection::Courses, playlist_id, serde_json::to_value(document)?)
        .await?;
    Ok(())
}

pub async fn load_course(store: &dyn DocumentStore, playlist_id: &str) -> CourseResult<Option<CourseDocument>> {
    match store.get(Collection::Courses, playlist_id).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc.data)?)),
        None => Ok(None),
    }
}

pub async fn store_content_analysis(
    store: &dyn DocumentStore,
    playlist_id: &str,
    analysis: &ContentAnalysis,
) -> CourseResult<()> {
    store
        .set(Collection::ContentAnalyses, playlist_id, serde_json::to_value(analysis)?)
        .await?;
    Ok(())
}

pub async fn load_content_analysis(
    store: &dyn DocumentStore,
    playlist_id: &str,
) -> CourseResult<Option<ContentAnalysis>> {
    match store.get(Collection::ContentAnalyses, playlist_id).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc.data)?)),
        None => Ok(None),
    }
}
