//! Course document model and the model-backed generator

pub mod analysis;
pub mod assignments;
pub mod exam;
pub mod generator;
pub mod heuristics;
pub mod info;
pub mod lenient;
pub mod modules;
pub mod package;
pub mod summary;

pub use analysis::ContentAnalysis;
pub use generator::{CourseGenerator, ReplyError};
pub use heuristics::{assess_difficulty, estimate_complexity_score, Difficulty};
pub use package::{build_learning_package, LearningPackage};
pub use summary::{content_summary, course_summary};

use crate::youtube::PlaylistInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const AGENT_VERSION: &str = "2.0";
pub const DEFAULT_CONFIDENCE: f64 = 0.92;
pub const PLACEHOLDER_THUMBNAIL: &str = "https://via.placeholder.com/640x360?text=Course+Thumbnail";

fn default_published() -> bool {
    true
}

/// Top-level course metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub level: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub instructor: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub thumbnail: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub prerequisites: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub learning_objectives: Vec<String>,
    #[serde(default = "default_published", deserialize_with = "lenient::flag")]
    pub is_published: bool,
    #[serde(default, deserialize_with = "lenient::number")]
    pub estimated_hours: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
    #[default]
    Video,
    Text,
    Quiz,
    Project,
    #[serde(other)]
    Other,
}

/// Lesson body; which fields are set depends on the lesson type
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LessonContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::string_list")]
    pub deliverables: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::string_list")]
    pub resources: Vec<String>,
}

impl LessonContent {
    /// Content pointing at a YouTube video
    pub fn video(url: &str, video_id: &str) -> Self {
        Self {
            video_url: Some(url.to_string()),
            video_id: Some(video_id.to_string()),
            video_source: Some("youtube".to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub question: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub question_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::string_list")]
    pub options: Vec<String>,
    /// Option index or answer text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::optional_integer")]
    pub points: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub resource_type: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(rename = "type", default)]
    pub lesson_type: LessonType,
    #[serde(default, deserialize_with = "lenient::string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub order: u32,
    #[serde(default)]
    pub content: LessonContent,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Module {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub order: u32,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub module_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub due_date: String,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub points: u32,
    #[serde(default, deserialize_with = "lenient::string")]
    pub submission_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinalExam {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    /// Minutes
    #[serde(default, deserialize_with = "lenient::integer")]
    pub time_limit: u32,
    /// Percent
    #[serde(default, deserialize_with = "lenient::integer")]
    pub passing_score: u32,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentInfo {
    pub name: String,
    pub version: String,
    pub created_by: String,
}

impl Default for AgentInfo {
    fn default() -> Self {
        Self {
            name: "YouTube Course Generator Agent".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_by: "course-agent".to_string(),
        }
    }
}

/// Provenance attached when a course is written to disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseMetadata {
    pub source_playlist: PlaylistInfo,
    pub total_videos_processed: usize,
    pub extraction_timestamp: DateTime<Utc>,
    pub agent_info: AgentInfo,
}

/// The generated course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseDocument {
    pub course: CourseInfo,
    pub modules: Vec<Module>,
    pub assignments: Vec<Assignment>,
    pub final_exam: FinalExam,
    pub generated_at: DateTime<Utc>,
    pub agent_version: String,
    pub confidence: f64,
    pub suggested_improvements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CourseMetadata>,
}

impl CourseDocument {
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// Video ids referenced by video lessons, in course order
    pub fn video_ids(&self) -> Vec<&str> {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .filter(|l| l.lesson_type == LessonType::Video)
            .filter_map(|l| l.content.video_id.as_deref())
            .collect()
    }
}

/// Fixed improvement suggestions attached to every course
pub fn suggested_improvements() -> Vec<String> {
    [
        "Consider adding more hands-on exercises and practical projects",
        "Include additional real-world case studies and examples",
        "Add supplementary reading materials and external resources",
        "Consider creating discussion forums for student interaction",
        "Add video transcripts and accessibility features",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
