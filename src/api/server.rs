//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, Method},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers;
use super::models::{ApiError, GenerateCourseRequest, ListQuery, SearchQuery, ValidateUrlRequest};
use crate::pipeline::CourseAgent;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<CourseAgent>,
}

type JsonResult = Result<Json<Value>, ApiError>;

/// Build the API router
pub fn router(agent: Arc<CourseAgent>) -> Router {
    let enable_cors = agent.config().server.enable_cors;
    let state = AppState { agent };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        .route("/api/validate_url", post(validate_url_handler))
        .route("/api/generate_course", post(generate_course_handler))
        .route("/api/generate_enhanced_course", post(generate_course_handler))
        .route("/api/process_playlist", post(process_playlist_handler))
        .route("/api/playlists", get(list_playlists_handler))
        .route("/api/playlists/search", get(search_playlists_handler))
        .route(
            "/api/playlists/:id",
            get(playlist_details_handler).delete(delete_playlist_handler),
        )
        .route("/api/playlists/:id/videos", get(playlist_videos_handler))
        .route("/api/playlists/:id/links", get(playlist_links_handler))
        .route("/api/courses/:id", get(course_handler))
        .route("/api/store/status", get(store_status_handler))
        .route("/api/download/:filename", get(download_handler))
        .route("/course/:filename", get(view_course_handler))
        .with_state(state);

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
        app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
    } else {
        app.layer(TraceLayer::new_for_http())
    }
}

/// Bind and serve until the process is stopped
pub async fn start_http_server(agent: Arc<CourseAgent>) -> Result<()> {
    let addr = format!("{}:{}", agent.config().server.host, agent.config().server.port);
    let app = router(agent);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 API server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> JsonResult {
    handlers::health_check(&state.agent).await.map(Json)
}

async fn validate_url_handler(
    State(state): State<AppState>,
    Json(request): Json<ValidateUrlRequest>,
) -> Response {
    match handlers::validate_url(&state.agent, &request.url).await {
        Ok(data) => Json(data).into_response(),
        Err(e) => (
            e.status,
            Json(serde_json::json!({"valid": false, "error": e.message})),
        )
            .into_response(),
    }
}

async fn generate_course_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateCourseRequest>,
) -> JsonResult {
    handlers::generate_course(&state.agent, request).await.map(Json)
}

async fn process_playlist_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateCourseRequest>,
) -> JsonResult {
    handlers::process_playlist(&state.agent, request).await.map(Json)
}

async fn list_playlists_handler(State(state): State<AppState>, Query(query): Query<ListQuery>) -> JsonResult {
    handlers::list_playlists(&state.agent, query.limit).await.map(Json)
}

async fn search_playlists_handler(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> JsonResult {
    handlers::search_playlists(&state.agent, query).await.map(Json)
}

async fn playlist_details_handler(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    handlers::playlist_details(&state.agent, &id).await.map(Json)
}

async fn playlist_videos_handler(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    handlers::playlist_videos(&state.agent, &id).await.map(Json)
}

async fn playlist_links_handler(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    handlers::playlist_links(&state.agent, &id).await.map(Json)
}

async fn delete_playlist_handler(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    handlers::delete_playlist(&state.agent, &id).await.map(Json)
}

async fn course_handler(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    handlers::get_course(&state.agent, &id).await.map(Json)
}

async fn store_status_handler(State(state): State<AppState>) -> JsonResult {
    handlers::store_status(&state.agent).await.map(Json)
}

async fn download_handler(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    match handlers::download(&state.agent, &filename).await {
        Ok((bytes, content_type)) => (
            [
                (header::CONTENT_TYPE, content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Same files as the download route, shown inline by the browser
async fn view_course_handler(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    match handlers::download(&state.agent, &filename).await {
        Ok((bytes, content_type)) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        Err(e) => e.into_response(),
    }
}
