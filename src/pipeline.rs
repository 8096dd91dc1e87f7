//! End-to-end course generation: playlist URL in, stored and written course out

use crate::config::Config;
use crate::course::{build_learning_package, ContentAnalysis, CourseDocument, CourseGenerator, LearningPackage};
use crate::error::{CourseError, CourseResult};
use crate::llm::{create_llm, LLM};
use crate::output::CourseWriter;
use crate::store::{self, records, DocumentStore};
use crate::youtube::{extract_playlist_id, PlaylistInfo, PlaylistSource, YouTubeClient};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Result of one `process_playlist` call
#[derive(Debug, Clone)]
pub struct CourseRun {
    pub playlist_id: String,
    pub document: CourseDocument,
    /// Files written for this run; empty when served from the store
    pub outputs: Vec<PathBuf>,
    pub from_cache: bool,
    pub elapsed: Duration,
}

/// Result of one `process_learning_package` call
#[derive(Debug, Clone)]
pub struct PackageRun {
    pub playlist_id: String,
    pub package: LearningPackage,
    pub outputs: Vec<PathBuf>,
    /// The content analysis came from the store instead of the model
    pub from_cache_analysis: bool,
    pub elapsed: Duration,
}

/// Reachability of the external dependencies
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub llm_provider: String,
    pub llm_available: bool,
    pub store_backend: Option<&'static str>,
    pub store_connected: bool,
}

/// Ties the playlist source, generator, store and writer together
pub struct CourseAgent {
    config: Config,
    source: Arc<dyn PlaylistSource>,
    llm: Arc<dyn LLM>,
    generator: CourseGenerator,
    store: Option<Arc<dyn DocumentStore>>,
    writer: CourseWriter,
}

impl CourseAgent {
    /// Agent backed by the YouTube Data API and the configured model and store
    pub async fn from_config(config: Config) -> Result<Self> {
        info!("🔧 Initializing course agent");

        let source: Arc<dyn PlaylistSource> = Arc::new(YouTubeClient::from_config(&config.youtube)?);
        let llm = create_llm(&config.llm)?;
        let store = store::open_store(&config.store).await?;

        Ok(Self::new(config, source, llm, store))
    }

    pub fn new(
        config: Config,
        source: Arc<dyn PlaylistSource>,
        llm: Arc<dyn LLM>,
        store: Option<Arc<dyn DocumentStore>>,
    ) -> Self {
        let generator = CourseGenerator::new(llm.clone(), config.generation.clone());
        let writer = CourseWriter::from_config(&config.output);
        Self {
            config,
            source,
            llm,
            generator,
            store,
            writer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> Option<&Arc<dyn DocumentStore>> {
        self.store.as_ref()
    }

    pub fn writer(&self) -> &CourseWriter {
        &self.writer
    }

    /// Check the URL and fetch the playlist's metadata
    pub async fn validate_url(&self, url: &str) -> CourseResult<PlaylistInfo> {
        let playlist_id =
            extract_playlist_id(url).ok_or_else(|| CourseError::InvalidPlaylistUrl(url.to_string()))?;
        self.source.playlist_info(&playlist_id).await
    }

    pub async fn test_connections(&self) -> ConnectionReport {
        let llm_available = self.llm.is_available().await;
        let store_connected = match &self.store {
            Some(store) => store.is_connected().await,
            None => false,
        };
        ConnectionReport {
            llm_provider: self.llm.provider_type().to_string(),
            llm_available,
            store_backend: self.store.as_ref().map(|s| s.backend_name()),
            store_connected,
        }
    }

    /// Generate (or reuse) the course for a playlist.
    ///
    /// A stored course is returned unless `force` is set or reuse is
    /// disabled. Store failures are logged and never abort the run.
    pub async fn process_playlist(
        &self,
        url: &str,
        max_videos: Option<usize>,
        force: bool,
    ) -> Result<CourseRun> {
        let started = Instant::now();
        let playlist_id =
            extract_playlist_id(url).ok_or_else(|| CourseError::InvalidPlaylistUrl(url.to_string()))?;
        info!("🚀 Processing playlist {}", playlist_id);

        if !force && self.config.store.reuse_cached_courses {
            if let Some(document) = self.cached_course(&playlist_id).await {
                info!("📚 Using stored course for {}", playlist_id);
                return Ok(CourseRun {
                    playlist_id,
                    document,
                    outputs: Vec::new(),
                    from_cache: true,
                    elapsed: started.elapsed(),
                });
            }
        }

        let max_videos = max_videos.unwrap_or(self.config.generation.default_max_videos);
        let playlist = self.source.extract_playlist_data(url, max_videos).await?;

        if let Some(store) = &self.store {
            if let Err(e) = records::store_playlist(store.as_ref(), &playlist).await {
                warn!("Failed to store playlist {}: {}", playlist_id, e);
            }
        }

        let document = self.generator.generate_course(&playlist).await;

        if let Some(store) = &self.store {
            if let Err(e) = records::store_course(store.as_ref(), &playlist_id, &document).await {
                warn!("Failed to store course {}: {}", playlist_id, e);
            }
        }

        let outputs = self.writer.save(&document, &playlist).await?;

        let elapsed = started.elapsed();
        info!(
            "✅ Course \"{}\" ready in {:.2}s",
            document.course.title,
            elapsed.as_secs_f64()
        );

        Ok(CourseRun {
            playlist_id,
            document,
            outputs,
            from_cache: false,
            elapsed,
        })
    }

    /// Analyze a playlist and build its learning package.
    ///
    /// The playlist is always fetched again; a stored content analysis is
    /// reused unless `force` is set.
    pub async fn process_learning_package(
        &self,
        url: &str,
        max_videos: Option<usize>,
        force: bool,
    ) -> Result<PackageRun> {
        let started = Instant::now();
        let playlist_id =
            extract_playlist_id(url).ok_or_else(|| CourseError::InvalidPlaylistUrl(url.to_string()))?;
        info!("🚀 Building learning package for {}", playlist_id);

        let max_videos = max_videos.unwrap_or(self.config.generation.default_max_videos);
        let playlist = self.source.extract_playlist_data(url, max_videos).await?;

        if let Some(store) = &self.store {
            if let Err(e) = records::store_playlist(store.as_ref(), &playlist).await {
                warn!("Failed to store playlist {}: {}", playlist_id, e);
            }
        }

        let cached = if force { None } else { self.cached_analysis(&playlist_id).await };
        let from_cache_analysis = cached.is_some();
        let analysis = match cached {
            Some(analysis) => {
                info!("📚 Using stored content analysis for {}", playlist_id);
                analysis
            }
            None => {
                let analysis = self.generator.analyze_playlist(&playlist).await;
                if let Some(store) = &self.store {
                    if let Err(e) = records::store_content_analysis(store.as_ref(), &playlist_id, &analysis).await {
                        warn!("Failed to store content analysis {}: {}", playlist_id, e);
                    }
                }
                analysis
            }
        };

        let package = build_learning_package(&analysis);
        let outputs = self.writer.save_package(&package).await?;

        let elapsed = started.elapsed();
        info!(
            "✅ Learning package \"{}\" ready in {:.2}s ({} modules)",
            package.course_info.title,
            elapsed.as_secs_f64(),
            package.modules.len()
        );

        Ok(PackageRun {
            playlist_id,
            package,
            outputs,
            from_cache_analysis,
            elapsed,
        })
    }

    async fn cached_analysis(&self, playlist_id: &str) -> Option<ContentAnalysis> {
        let store = self.store.as_ref()?;
        match records::load_content_analysis(store.as_ref(), playlist_id).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Ignoring stored content analysis for {}: {}", playlist_id, e);
                None
            }
        }
    }

    async fn cached_course(&self, playlist_id: &str) -> Option<CourseDocument> {
        let store = self.store.as_ref()?;
        match records::load_course(store.as_ref(), playlist_id).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Ignoring stored course for {}: {}", playlist_id, e);
                None
            }
        }
    }
}
