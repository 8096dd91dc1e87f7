//! JSON API over the course agent and its document store

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::pipeline::CourseAgent;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{router, AppState};

/// API server for course generation and stored playlists
pub struct ApiServer {
    agent: Arc<CourseAgent>,
}

impl ApiServer {
    pub fn new(agent: Arc<CourseAgent>) -> Self {
        Self { agent }
    }

    /// Start the API server in the background
    pub fn start_background(self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.start().await })
    }

    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on port {}", self.agent.config().server.port);
        server::start_http_server(self.agent).await
    }
}
