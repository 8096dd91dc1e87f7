/// Course Agent
///
/// Turns a YouTube playlist into a structured course: playlist metadata and
/// transcripts are fetched from YouTube, each part of the course is requested
/// from a language model, and the JSON in each reply is recovered by the
/// structured reply extractor. Courses are stored, rendered and served over
/// a small JSON API.

pub mod config;
pub mod course;
pub mod error;
pub mod extraction;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod store;
pub mod youtube;

#[cfg(feature = "api")]
pub mod api;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::course::{ContentAnalysis, CourseDocument, CourseGenerator, LearningPackage};
pub use crate::error::{CourseError, CourseResult};
pub use crate::extraction::{ExtractionFailure, Shape, StructuredReplyExtractor};
pub use crate::llm::{LLMConfig, LLMProvider, MockLLM, LLM};
pub use crate::output::CourseWriter;
pub use crate::pipeline::{CourseAgent, CourseRun, PackageRun};
pub use crate::store::{DocumentStore, FileDocumentStore, MemoryDocumentStore};
pub use crate::youtube::{PlaylistData, PlaylistSource, YouTubeClient};
