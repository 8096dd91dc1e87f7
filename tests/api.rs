#![cfg(feature = "api")]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use course_agent::api::router;
use course_agent::config::{ConfigBuilder, ExportFormat};
use course_agent::store::{DocumentStore, MemoryDocumentStore};
use course_agent::youtube::{watch_url, PlaylistData, PlaylistInfo, PlaylistSource, VideoInfo};
use course_agent::{CourseAgent, CourseError, CourseResult, MockLLM};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct OnePlaylist;

#[async_trait]
impl PlaylistSource for OnePlaylist {
    async fn playlist_info(&self, playlist_id: &str) -> CourseResult<PlaylistInfo> {
        if playlist_id != "PLone" {
            return Err(CourseError::PlaylistNotFound(playlist_id.to_string()));
        }
        Ok(PlaylistInfo {
            id: "PLone".into(),
            title: "Cooking with Cast Iron".into(),
            description: "Seasoning, searing and baking".into(),
            channel_title: "Skillet TV".into(),
            video_count: 2,
            ..PlaylistInfo::default()
        })
    }

    async fn extract_playlist_data(&self, url: &str, _max: usize) -> CourseResult<PlaylistData> {
        let id = course_agent::youtube::extract_playlist_id(url).unwrap_or_default();
        let info = self.playlist_info(&id).await?;
        let videos = ["abcdefghijk", "bcdefghijkl"]
            .iter()
            .enumerate()
            .map(|(i, id)| VideoInfo {
                video_id: id.to_string(),
                url: watch_url(id),
                title: format!("Step {}", i + 1),
                position: i as u32,
                ..VideoInfo::default()
            })
            .collect();
        Ok(PlaylistData::new(info, videos))
    }
}

struct TestApp {
    _dir: TempDir,
    app: Router,
}

fn app(with_store: bool) -> TestApp {
    let dir = TempDir::new().unwrap();
    let config = ConfigBuilder::new()
        .with_output_dir(dir.path().to_path_buf())
        .with_formats(vec![ExportFormat::JSON, ExportFormat::Markdown])
        .build();
    let store: Option<Arc<dyn DocumentStore>> = if with_store {
        Some(Arc::new(MemoryDocumentStore::new()))
    } else {
        None
    };
    let agent = CourseAgent::new(config, Arc::new(OnePlaylist), Arc::new(MockLLM::failing()), store);
    TestApp {
        _dir: dir,
        app: router(Arc::new(agent)),
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn generate(app: &Router) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/generate_course",
        Some(json!({"playlist_url": "https://www.youtube.com/playlist?list=PLone"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn test_health() {
    let test = app(true);
    let (status, body) = send(&test.app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["components"]["store"], "connected");
}

#[tokio::test]
async fn test_validate_url() {
    let test = app(true);

    let (status, body) = send(&test.app, Method::POST, "/api/validate_url", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["valid"], false);

    let (status, body) = send(
        &test.app,
        Method::POST,
        "/api/validate_url",
        Some(json!({"url": "https://example.com/x"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);

    let (_, body) = send(
        &test.app,
        Method::POST,
        "/api/validate_url",
        Some(json!({"url": "https://www.youtube.com/playlist?list=PLone"})),
    )
    .await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["playlist_info"]["title"], "Cooking with Cast Iron");
    assert_eq!(body["playlist_info"]["channel"], "Skillet TV");
}

#[tokio::test]
async fn test_generate_course_validation() {
    let test = app(true);

    let (status, body) = send(&test.app, Method::POST, "/api/generate_course", Some(json!({"playlist_url": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &test.app,
        Method::POST,
        "/api/generate_enhanced_course",
        Some(json!({"playlist_url": "https://youtu.be/abcdefghijk"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &test.app,
        Method::POST,
        "/api/generate_course",
        Some(json!({"playlist_url": "https://www.youtube.com/playlist?list=PLother"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_then_browse_store() {
    let test = app(true);
    let generated = generate(&test.app).await;
    assert_eq!(generated["success"], true);
    assert_eq!(generated["from_cache"], false);
    assert_eq!(generated["course"]["course"]["title"], "Cooking with Cast Iron");
    assert_eq!(generated["files"].as_array().map(Vec::len), Some(2));

    let (_, list) = send(&test.app, Method::GET, "/api/playlists", None).await;
    assert_eq!(list["count"], 1);
    assert_eq!(list["playlists"][0]["playlist_id"], "PLone");

    let (status, _) = send(&test.app, Method::GET, "/api/playlists/search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, found) = send(&test.app, Method::GET, "/api/playlists/search?q=SEARING", None).await;
    assert_eq!(found["count"], 1);

    let (_, details) = send(&test.app, Method::GET, "/api/playlists/PLone", None).await;
    assert_eq!(details["playlist"]["title"], "Cooking with Cast Iron");
    assert_eq!(details["analysis"]["total_videos"], 2);

    let (_, videos) = send(&test.app, Method::GET, "/api/playlists/PLone/videos", None).await;
    assert_eq!(videos["count"], 2);
    assert_eq!(videos["playlist_title"], "Cooking with Cast Iron");

    let (_, links) = send(&test.app, Method::GET, "/api/playlists/PLone/links", None).await;
    assert_eq!(links["video_links"][1], "https://www.youtube.com/watch?v=bcdefghijkl");
    assert_eq!(links["detailed_links"][0]["title"], "Step 1");

    let (status, course) = send(&test.app, Method::GET, "/api/courses/PLone", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["course"]["finalExam"]["passingScore"], 75);

    let again = generate(&test.app).await;
    assert_eq!(again["from_cache"], true);

    let (status, _) = send(&test.app, Method::DELETE, "/api/playlists/PLone", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&test.app, Method::GET, "/api/playlists/PLone", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap_or("").contains("PLone"));
    let (status, _) = send(&test.app, Method::GET, "/api/courses/PLone", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_written_files() {
    let test = app(true);
    let generated = generate(&test.app).await;
    let json_file = generated["files"][0].as_str().unwrap().to_string();

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/download/{}", json_file))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let saved: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(saved["metadata"]["source_playlist"]["id"], "PLone");

    let (status, _) = send(&test.app, Method::GET, "/api/download/missing.json", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_endpoints_without_store() {
    let test = app(false);

    let (_, status_body) = send(&test.app, Method::GET, "/api/store/status", None).await;
    assert_eq!(status_body["connected"], false);
    assert_eq!(status_body["service_available"], false);

    let (status, _) = send(&test.app, Method::GET, "/api/playlists", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // generation still works without a store
    let generated = generate(&test.app).await;
    assert_eq!(generated["success"], true);
}

#[tokio::test]
async fn test_view_written_file_inline() {
    let test = app(true);
    let generated = generate(&test.app).await;
    let markdown_file = generated["files"][1].as_str().unwrap().to_string();
    assert!(markdown_file.ends_with(".md"));

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/course/{}", markdown_file))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/markdown; charset=utf-8");
    assert!(response.headers().get("content-disposition").is_none());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("Cooking with Cast Iron"));

    let (status, body) = send(&test.app, Method::GET, "/course/missing.html", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_process_playlist_builds_learning_package() {
    let test = app(true);
    let url = "https://www.youtube.com/playlist?list=PLone";

    let (status, body) = send(
        &test.app,
        Method::POST,
        "/api/process_playlist",
        Some(json!({"playlist_url": url})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["playlist_id"], "PLone");
    assert_eq!(body["from_cache_analysis"], false);
    assert_eq!(body["course_info"]["title"], "Cooking with Cast Iron");
    assert_eq!(body["total_modules"], 0);
    assert_eq!(body["progress_tracker"]["completion_percentage"], 0);
    // fallback objectives still produce multiple-choice questions
    let quiz = body["quiz_questions"].as_array().unwrap();
    assert!(!quiz.is_empty());
    assert!(quiz.iter().all(|q| q["type"] == "multiple_choice"));

    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    let markdown = files[1].as_str().unwrap();
    assert!(markdown.contains("Learning_Package"));
    let (status, _) = send(&test.app, Method::GET, &format!("/course/{markdown}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, again) = send(
        &test.app,
        Method::POST,
        "/api/process_playlist",
        Some(json!({"playlist_url": url})),
    )
    .await;
    assert_eq!(again["from_cache_analysis"], true);

    let (status, body) = send(
        &test.app,
        Method::POST,
        "/api/process_playlist",
        Some(json!({"playlist_url": url, "max_videos": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("max_videos"));
}
