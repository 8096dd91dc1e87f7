//! Writing generated courses to disk

use crate::config::{ExportFormat, OutputConfig};
use crate::course::{AgentInfo, CourseDocument, CourseMetadata, LearningPackage};
use crate::render;
use crate::youtube::PlaylistData;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

const MAX_FILENAME_CHARS: usize = 200;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("output pattern is valid"))
}

/// Title reduced to word characters, spaces and dashes, spaces as `_`
pub fn safe_title(title: &str) -> String {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    let cleaned = regex(&NON_WORD, r"[^\w\s-]").replace_all(title, "");
    let safe = cleaned.trim().replace(' ', "_");
    if safe.is_empty() {
        "course".to_string()
    } else {
        safe
    }
}

/// File stem `<safe_title>_<YYYYmmdd_HHMMSS>`
pub fn output_stem(title: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}", safe_title(title), at.format("%Y%m%d_%H%M%S"))
}

/// Replace characters that are invalid in file names and collapse runs of
/// dots and whitespace
pub fn sanitize_filename(name: &str) -> String {
    static DOTS: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();

    let replaced: String = name
        .chars()
        .map(|c| if "<>:\"/\\|?*".contains(c) { '_' } else { c })
        .collect();
    let collapsed = regex(&DOTS, r"\.{2,}").replace_all(&replaced, ".");
    let collapsed = regex(&SPACES, r"\s+").replace_all(&collapsed, " ");
    collapsed
        .chars()
        .take(MAX_FILENAME_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

/// URL slug: lowercase words joined by `-`
pub fn create_slug(text: &str) -> String {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();

    let lower = text.to_lowercase();
    let words = regex(&NON_WORD, r"[^\w\s-]").replace_all(&lower, "");
    regex(&SEPARATORS, r"[-\s]+")
        .replace_all(words.trim(), "-")
        .trim_matches('-')
        .to_string()
}

/// Provenance block for a course generated from `playlist`
pub fn course_metadata(playlist: &PlaylistData) -> CourseMetadata {
    CourseMetadata {
        source_playlist: playlist.playlist_info.clone(),
        total_videos_processed: playlist.videos.len(),
        extraction_timestamp: playlist.extracted_at,
        agent_info: AgentInfo::default(),
    }
}

/// Writes course documents in the configured formats
#[derive(Debug, Clone)]
pub struct CourseWriter {
    base_dir: PathBuf,
    formats: Vec<ExportFormat>,
}

impl CourseWriter {
    pub fn new(base_dir: PathBuf, formats: Vec<ExportFormat>) -> Self {
        Self { base_dir, formats }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.base_dir.clone(), config.formats.clone())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write one file per format; JSON always carries the metadata block.
    /// Returns the written paths.
    pub async fn save(&self, document: &CourseDocument, playlist: &PlaylistData) -> Result<Vec<PathBuf>> {
        let mut with_metadata = document.clone();
        with_metadata.metadata = Some(course_metadata(playlist));

        let stem = output_stem(&document.course.title, Utc::now());
        self.write_formats(&stem, "course", |format| render::render(&with_metadata, format))
            .await
    }

    /// Write a learning package as `<title>_Learning_Package_<timestamp>.*`
    pub async fn save_package(&self, package: &LearningPackage) -> Result<Vec<PathBuf>> {
        let title = format!("{} Learning Package", package.course_info.title);
        let stem = output_stem(&title, Utc::now());
        self.write_formats(&stem, "learning package", |format| render::render_package(package, format))
            .await
    }

    async fn write_formats<F>(&self, stem: &str, kind: &str, render: F) -> Result<Vec<PathBuf>>
    where
        F: Fn(ExportFormat) -> crate::error::CourseResult<String>,
    {
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", self.base_dir.display()))?;

        let mut written = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            let path = self.base_dir.join(format!("{}.{}", stem, format.extension()));
            let content = render(*format)?;
            tokio::fs::write(&path, content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("💾 Saved {:?} {}: {}", format, kind, path.display());
            written.push(path);
        }

        Ok(written)
    }

    /// Path of a previously written file, if `filename` names one directly
    /// inside the output directory
    pub fn resolve_download(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty() || sanitize_filename(filename) != filename || filename.starts_with('.') {
            return None;
        }
        let path = self.base_dir.join(filename);
        path.is_file().then_some(path)
    }
}
