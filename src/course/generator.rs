use super::summary::content_summary_with_limit;
use super::{suggested_improvements, CourseDocument, AGENT_VERSION, DEFAULT_CONFIDENCE};
use crate::config::GenerationConfig;
use crate::extraction::{ExtractionFailure, Shape, StructuredReplyExtractor};
use crate::llm::LLM;
use crate::youtube::PlaylistData;
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a generation site fell back to its default value
#[derive(thiserror::Error, Debug)]
pub enum ReplyError {
    #[error("model request failed: {0}")]
    Transport(anyhow::Error),

    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),

    #[error("reply does not fit the expected schema: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Builds a course document from playlist data, one model call per site
pub struct CourseGenerator {
    llm: Arc<dyn LLM>,
    extractor: Arc<StructuredReplyExtractor>,
    settings: GenerationConfig,
}

impl CourseGenerator {
    pub fn new(llm: Arc<dyn LLM>, settings: GenerationConfig) -> Self {
        Self {
            llm,
            extractor: Arc::new(StructuredReplyExtractor::new()),
            settings,
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<StructuredReplyExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn settings(&self) -> &GenerationConfig {
        &self.settings
    }

    /// Send `prompt`, extract a value of `shape` and decode it as `T`
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        prompt: &str,
        shape: Shape,
    ) -> Result<T, ReplyError> {
        let reply = self.llm.generate(prompt).await.map_err(ReplyError::Transport)?;
        debug!("Model reply: {} chars", reply.chars().count());

        let value = self.extractor.extract(&reply, shape)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Generate every part of the course; sites that fail use their fallback
    pub async fn generate_course(&self, playlist: &PlaylistData) -> CourseDocument {
        info!("🧠 Generating comprehensive course structure...");

        let summary = content_summary_with_limit(playlist, self.settings.summary_video_limit);

        let course = self.generate_course_info(playlist, &summary).await;
        let modules = self.generate_modules(playlist, &course).await;
        let assignments = self.generate_assignments(&modules, &course).await;
        let final_exam = self.generate_final_exam(&course, &modules).await;

        info!("✅ Generated course with {} modules", modules.len());

        CourseDocument {
            course,
            modules,
            assignments,
            final_exam,
            generated_at: Utc::now(),
            agent_version: AGENT_VERSION.to_string(),
            confidence: DEFAULT_CONFIDENCE,
            suggested_improvements: suggested_improvements(),
            metadata: None,
        }
    }
}

/// Log why a site is using its fallback
pub(crate) fn log_fallback(site: &str, error: &ReplyError) {
    match error {
        ReplyError::Extraction(_) => warn!("⚠️ Using fallback {}: unparsable reply", site),
        other => warn!("⚠️ Using fallback {}: {}", site, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::exam::fallback_final_exam;
    use crate::course::LessonType;
    use crate::extraction::RecordingSink;
    use crate::llm::MockLLM;
    use crate::youtube::{watch_url, PlaylistInfo, VideoInfo};

    fn playlist(videos: usize) -> PlaylistData {
        PlaylistData::new(
            PlaylistInfo {
                id: "PLtest".into(),
                title: "Async Rust".into(),
                ..PlaylistInfo::default()
            },
            (0..videos)
                .map(|i| VideoInfo {
                    video_id: format!("video{:06}", i),
                    url: watch_url(&format!("video{:06}", i)),
                    title: format!("Part {}", i + 1),
                    ..VideoInfo::default()
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_every_site_failing_still_yields_a_course() {
        let sink = Arc::new(RecordingSink::new());
        let generator = CourseGenerator::new(Arc::new(MockLLM::failing()), GenerationConfig::default())
            .with_extractor(Arc::new(StructuredReplyExtractor::with_sink(sink.clone())));

        let doc = generator.generate_course(&playlist(7)).await;

        assert_eq!(doc.course.title, "Async Rust");
        assert_eq!(doc.modules.len(), 3);
        assert_eq!(doc.assignments.len(), 3);
        assert_eq!(doc.final_exam, fallback_final_exam(&doc.course));
        assert_eq!(doc.agent_version, AGENT_VERSION);
        assert_eq!(doc.suggested_improvements.len(), 5);
        assert!(doc.metadata.is_none());
        // transport failures never reach the extractor
        assert!(sink.failures().is_empty());
    }

    #[tokio::test]
    async fn test_course_from_model_replies() {
        let replies = vec![
            Ok(r#"{"title": "Async Rust Mastery", "level": "Advanced", "price": 79}"#.to_string()),
            Ok(r#"{"title": "Futures", "lessons": [{"type": "video"}, {"type": "quiz"}]}"#.to_string()),
            Ok("I could not produce a module.".to_string()),
            Ok(r#"```json
{"title": "Streams", "lessons": [{"type": "video"}]}
```"#
                .to_string()),
            Ok(r#"{"title": "Assignment A"}"#.to_string()),
            Ok(r#"{"title": "Assignment B"}"#.to_string()),
            Ok(r#"{"title": "Assignment C"}"#.to_string()),
            Ok(r#"{"title": "Final", "questions": [{"id": "f1", "question": "Explain Pin", "type": "essay"}]}"#
                .to_string()),
        ];
        let llm = Arc::new(MockLLM::new(replies));
        let generator = CourseGenerator::new(llm.clone(), GenerationConfig::default());

        let doc = generator.generate_course(&playlist(9)).await;

        assert_eq!(llm.remaining(), 0);
        assert_eq!(doc.course.title, "Async Rust Mastery");
        assert_eq!(doc.modules[0].title, "Futures");
        assert_eq!(doc.modules[0].lessons[0].content.video_id.as_deref(), Some("video000000"));
        assert_eq!(doc.modules[1].title, "Module 2");
        assert_eq!(doc.modules[1].lessons.last().map(|l| l.lesson_type), Some(LessonType::Quiz));
        assert_eq!(doc.modules[2].order, 3);
        assert_eq!(doc.modules[2].lessons[0].content.video_id.as_deref(), Some("video000006"));
        assert_eq!(doc.assignments[2].title, "Assignment C");
        assert_eq!(doc.assignments[2].module_id, "module-3");
        assert_eq!(doc.final_exam.title, "Final");
    }
}
