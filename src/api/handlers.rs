//! API request handlers

use super::models::{ApiError, GenerateCourseRequest, SearchQuery};
use crate::pipeline::CourseAgent;
use crate::store::records::{self, PlaylistRecord};
use crate::store::DocumentStore;
use crate::youtube::validate_playlist_url;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

type ApiResult = Result<Value, ApiError>;

fn require_store(agent: &CourseAgent) -> Result<&Arc<dyn DocumentStore>, ApiError> {
    agent.store().ok_or_else(ApiError::store_unavailable)
}

async fn require_playlist(store: &dyn DocumentStore, playlist_id: &str) -> Result<PlaylistRecord, ApiError> {
    records::load_playlist(store, playlist_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Playlist {} not found", playlist_id)))
}

pub async fn health_check(agent: &CourseAgent) -> ApiResult {
    let store = match agent.store() {
        Some(store) if store.is_connected().await => "connected",
        Some(_) => "disconnected",
        None => "disabled",
    };

    Ok(json!({
        "status": "healthy",
        "service": "course-agent",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "components": {
            "llm_provider": agent.config().llm.provider.to_string(),
            "store": store,
        }
    }))
}

/// Validation outcome; only a missing URL is an error status
pub async fn validate_url(agent: &CourseAgent, url: &str) -> ApiResult {
    let url = url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }
    if !validate_playlist_url(url) {
        return Ok(json!({"valid": false, "error": "Invalid YouTube playlist URL"}));
    }

    match agent.validate_url(url).await {
        Ok(info) => Ok(json!({
            "valid": true,
            "playlist_info": {
                "title": info.title,
                "video_count": info.video_count,
                "channel": info.channel_title,
            }
        })),
        Err(e) => Ok(json!({"valid": false, "error": e.to_string()})),
    }
}

fn checked_url(request: &GenerateCourseRequest) -> Result<&str, ApiError> {
    let url = request.playlist_url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("playlist_url is required"));
    }
    if !validate_playlist_url(url) {
        return Err(ApiError::bad_request("Invalid YouTube playlist URL"));
    }
    if request.max_videos == 0 {
        return Err(ApiError::bad_request("max_videos must be greater than 0"));
    }
    Ok(url)
}

fn file_names(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
        .collect()
}

pub async fn generate_course(agent: &CourseAgent, request: GenerateCourseRequest) -> ApiResult {
    let url = checked_url(&request)?;

    info!("🎓 API course generation for {}", url);
    let run = agent
        .process_playlist(url, Some(request.max_videos), request.force)
        .await?;

    Ok(json!({
        "success": true,
        "playlist_id": run.playlist_id,
        "from_cache": run.from_cache,
        "processing_seconds": run.elapsed.as_secs_f64(),
        "files": file_names(&run.outputs),
        "course": run.document,
    }))
}

/// Content analysis plus learning package for a playlist
pub async fn process_playlist(agent: &CourseAgent, request: GenerateCourseRequest) -> ApiResult {
    let url = checked_url(&request)?;

    info!("📦 API learning package for {}", url);
    let run = agent
        .process_learning_package(url, Some(request.max_videos), request.force)
        .await?;
    let package = run.package;

    Ok(json!({
        "success": true,
        "playlist_id": run.playlist_id,
        "from_cache_analysis": run.from_cache_analysis,
        "processing_seconds": run.elapsed.as_secs_f64(),
        "files": file_names(&run.outputs),
        "total_modules": package.modules.len(),
        "course_info": package.course_info,
        "modules": package.modules,
        "study_guide": package.study_guide,
        "quiz_questions": package.quiz_questions,
        "progress_tracker": package.progress_tracker,
    }))
}

pub async fn list_playlists(agent: &CourseAgent, limit: usize) -> ApiResult {
    let store = require_store(agent)?;
    let playlists = records::list_playlists(store.as_ref(), limit).await?;
    Ok(json!({
        "success": true,
        "count": playlists.len(),
        "playlists": playlists,
    }))
}

pub async fn search_playlists(agent: &CourseAgent, query: SearchQuery) -> ApiResult {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ApiError::bad_request("Query parameter 'q' is required"));
    }
    let store = require_store(agent)?;
    let playlists = records::search_playlists(store.as_ref(), q, query.limit).await?;
    Ok(json!({
        "success": true,
        "query": q,
        "count": playlists.len(),
        "playlists": playlists,
    }))
}

pub async fn playlist_details(agent: &CourseAgent, playlist_id: &str) -> ApiResult {
    let store = require_store(agent)?;
    let playlist = require_playlist(store.as_ref(), playlist_id).await?;
    let analysis = records::load_analysis(store.as_ref(), playlist_id).await?;
    Ok(json!({
        "success": true,
        "playlist": playlist,
        "analysis": analysis,
    }))
}

pub async fn playlist_videos(agent: &CourseAgent, playlist_id: &str) -> ApiResult {
    let store = require_store(agent)?;
    let playlist = require_playlist(store.as_ref(), playlist_id).await?;
    Ok(json!({
        "success": true,
        "playlist_id": playlist.playlist_id,
        "playlist_title": playlist.title,
        "count": playlist.videos.len(),
        "videos": playlist.videos,
    }))
}

pub async fn playlist_links(agent: &CourseAgent, playlist_id: &str) -> ApiResult {
    let store = require_store(agent)?;
    let playlist = require_playlist(store.as_ref(), playlist_id).await?;

    let video_links: Vec<&str> = playlist.videos.iter().map(|v| v.url.as_str()).collect();
    let detailed_links: Vec<Value> = playlist
        .videos
        .iter()
        .map(|v| {
            json!({
                "video_id": v.video_id,
                "title": v.title,
                "url": v.url,
                "position": v.position,
                "duration": v.duration,
            })
        })
        .collect();

    Ok(json!({
        "success": true,
        "playlist_id": playlist.playlist_id,
        "count": video_links.len(),
        "video_links": video_links,
        "detailed_links": detailed_links,
    }))
}

pub async fn delete_playlist(agent: &CourseAgent, playlist_id: &str) -> ApiResult {
    let store = require_store(agent)?;
    if !records::delete_playlist(store.as_ref(), playlist_id).await? {
        return Err(ApiError::not_found(format!("Playlist {} not found", playlist_id)));
    }
    info!("🗑️ Deleted playlist {}", playlist_id);
    Ok(json!({"success": true, "deleted": playlist_id}))
}

pub async fn get_course(agent: &CourseAgent, playlist_id: &str) -> ApiResult {
    let store = require_store(agent)?;
    let course = records::load_course(store.as_ref(), playlist_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No course stored for {}", playlist_id)))?;
    Ok(json!({"success": true, "playlist_id": playlist_id, "course": course}))
}

pub async fn store_status(agent: &CourseAgent) -> ApiResult {
    let (connected, backend) = match agent.store() {
        Some(store) => (store.is_connected().await, Some(store.backend_name())),
        None => (false, None),
    };
    Ok(json!({
        "connected": connected,
        "service_available": agent.store().is_some(),
        "backend": backend,
    }))
}

pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => "application/json",
        Some("html") => "text/html; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Bytes and content type of a written course file
pub async fn download(agent: &CourseAgent, filename: &str) -> Result<(Vec<u8>, &'static str), ApiError> {
    let path = agent
        .writer()
        .resolve_download(filename)
        .ok_or_else(|| ApiError::not_found(format!("File {} not found", filename)))?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok((bytes, content_type_for(&path)))
}
