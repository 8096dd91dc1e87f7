//! Model-backed content analysis used to build learning packages.
//!
//! One structure analysis for the playlist, one analysis per transcribed
//! video, then course-wide objectives and prerequisites. Each site falls back
//! to a fixed value when the model reply is unusable.

use super::generator::log_fallback;
use super::lenient;
use super::summary::content_summary_with_limit;
use super::{assess_difficulty, CourseGenerator};
use crate::extraction::Shape;
use crate::youtube::{PlaylistData, VideoInfo};
use serde::{Deserialize, Serialize};
use tracing::info;

const VIDEO_DESCRIPTION_CHARS: usize = 300;
const VIDEO_TRANSCRIPT_CHARS: usize = 2000;
const SUMMARY_PROMPT_CHARS: usize = 1000;

fn head(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Subject, themes and approach of the whole playlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructureAnalysis {
    #[serde(default, deserialize_with = "lenient::string")]
    pub subject: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub themes: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub organization: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub audience_level: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub approach: String,
}

pub fn fallback_structure() -> StructureAnalysis {
    StructureAnalysis {
        subject: "Educational Content".to_string(),
        themes: vec!["Various topics covered".to_string()],
        organization: "sequential".to_string(),
        audience_level: "intermediate".to_string(),
        approach: "mixed".to_string(),
    }
}

/// What one video teaches
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoAnalysis {
    #[serde(default, deserialize_with = "lenient::string")]
    pub video_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub position: u32,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub key_concepts: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub summary: String,
    /// `beginner`, `intermediate`, `advanced` or `unknown`
    #[serde(default, deserialize_with = "lenient::string")]
    pub difficulty: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub learning_outcomes: Vec<String>,
}

impl VideoAnalysis {
    fn bind_to(mut self, video: &VideoInfo) -> Self {
        self.video_id = video.video_id.clone();
        self.title = video.title.clone();
        self.position = video.position;
        self.difficulty = self.difficulty.trim().to_lowercase();
        self
    }
}

pub fn fallback_video_analysis(video: &VideoInfo) -> VideoAnalysis {
    VideoAnalysis {
        video_id: video.video_id.clone(),
        title: video.title.clone(),
        position: video.position,
        key_concepts: Vec::new(),
        summary: "Video content analysis unavailable".to_string(),
        difficulty: "unknown".to_string(),
        learning_outcomes: Vec::new(),
    }
}

/// A group of analysed videos studied together
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathModule {
    pub module_name: String,
    pub description: String,
    pub order: u32,
    pub videos: Vec<VideoAnalysis>,
}

/// Everything the learning package is built from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentAnalysis {
    pub playlist_title: String,
    pub content_summary: String,
    pub structure_analysis: StructureAnalysis,
    pub video_analyses: Vec<VideoAnalysis>,
    pub learning_objectives: Vec<String>,
    pub prerequisites: Vec<String>,
    pub learning_path: Vec<PathModule>,
    pub difficulty_level: String,
    pub estimated_completion_time: String,
}

pub fn fallback_objectives() -> Vec<String> {
    [
        "Understand the main concepts presented in the course",
        "Apply the knowledge gained to practical situations",
        "Analyze the relationships between different topics",
        "Evaluate the effectiveness of different approaches",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn fallback_prerequisites() -> Vec<String> {
    vec!["Basic understanding of the subject area".to_string()]
}

/// Group videos by their assessed difficulty; when none carries a known
/// level, split them by playlist position into chunks of `len / 3`
pub fn suggest_learning_path(videos: &[VideoAnalysis]) -> Vec<PathModule> {
    const LEVELS: [(&str, &str, &str); 3] = [
        ("beginner", "Foundation Concepts", "Start with these fundamental concepts"),
        ("intermediate", "Core Content", "Build on foundation with these key topics"),
        ("advanced", "Advanced Topics", "Master advanced concepts and applications"),
    ];

    let mut path: Vec<PathModule> = LEVELS
        .iter()
        .zip(1u32..)
        .filter_map(|((level, name, description), order)| {
            let grouped: Vec<VideoAnalysis> = videos.iter().filter(|v| v.difficulty == *level).cloned().collect();
            (!grouped.is_empty()).then(|| PathModule {
                module_name: name.to_string(),
                description: description.to_string(),
                order,
                videos: grouped,
            })
        })
        .collect();

    if path.is_empty() && !videos.is_empty() {
        let mut ordered = videos.to_vec();
        ordered.sort_by_key(|v| v.position);
        let chunk_size = (ordered.len() / 3).max(1);

        for (i, chunk) in ordered.chunks(chunk_size).enumerate() {
            let first = i * chunk_size + 1;
            path.push(PathModule {
                module_name: format!("Module {}", i + 1),
                description: format!("Videos {} to {}", first, first + chunk.len() - 1),
                order: i as u32 + 1,
                videos: chunk.to_vec(),
            });
        }
    }

    path
}

/// Video time doubled for notes and practice, e.g. `1 hours 20 minutes`
pub fn estimate_completion_time(videos: &[VideoInfo]) -> String {
    let video_minutes: u64 = videos.iter().map(|v| v.duration_seconds() / 60).sum();
    let study_minutes = video_minutes * 2;
    let (hours, minutes) = (study_minutes / 60, study_minutes % 60);
    if hours > 0 {
        format!("{} hours {} minutes", hours, minutes)
    } else {
        format!("{} minutes", minutes)
    }
}

fn structure_prompt(content_summary: &str) -> String {
    format!(
        r#"Analyze the following educational content and provide a structured analysis:

{content_summary}

Please provide:
1. Main subject/topic
2. Key themes and concepts covered
3. Content organization pattern (sequential, thematic, etc.)
4. Target audience level (beginner, intermediate, advanced)
5. Learning approach (theoretical, practical, mixed)

Respond with ONLY a JSON object with keys: subject, themes, organization, audience_level, approach"#
    )
}

fn video_prompt(video: &VideoInfo, transcript: &str) -> String {
    format!(
        r#"Analyze this educational video content:

Title: {title}
Description: {description}
Transcript: {transcript}...

Please provide:
1. Key concepts covered (list)
2. Brief summary (2-3 sentences)
3. Difficulty level (beginner/intermediate/advanced)
4. Main learning outcomes

Respond with ONLY a JSON object with keys: key_concepts, summary, difficulty, learning_outcomes"#,
        title = video.title,
        description = head(&video.description, VIDEO_DESCRIPTION_CHARS),
        transcript = head(transcript, VIDEO_TRANSCRIPT_CHARS),
    )
}

fn objectives_prompt(content_summary: &str, structure: &StructureAnalysis) -> String {
    format!(
        r#"Based on this educational content analysis, generate 5-8 clear learning objectives:

Subject: {subject}
Key Themes: {themes}
Audience Level: {level}

Content Summary:
{summary}...

Generate learning objectives that are specific and measurable, appropriate for the
audience level, and written with action verbs (understand, apply, analyze).

Return ONLY a JSON array of strings."#,
        subject = structure.subject,
        themes = structure.themes.join(", "),
        level = structure.audience_level,
        summary = head(content_summary, SUMMARY_PROMPT_CHARS),
    )
}

fn prerequisites_prompt(content_summary: &str) -> String {
    format!(
        r#"Based on this educational content, identify the prerequisite knowledge a student should have:

{summary}...

List 3-6 prerequisite topics or skills that would be helpful before starting this course.
Return ONLY a JSON array of strings."#,
        summary = head(content_summary, SUMMARY_PROMPT_CHARS),
    )
}

/// Model lists may hold non-string items; keep the non-empty strings
fn string_items(values: Vec<serde_json::Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .collect()
}

impl CourseGenerator {
    pub async fn analyze_structure(&self, content_summary: &str) -> StructureAnalysis {
        match self
            .request::<StructureAnalysis>(&structure_prompt(content_summary), Shape::Object)
            .await
        {
            Ok(structure) => structure,
            Err(e) => {
                log_fallback("structure analysis", &e);
                fallback_structure()
            }
        }
    }

    pub async fn analyze_video(&self, video: &VideoInfo) -> VideoAnalysis {
        let Some(transcript) = video.transcript.as_deref().filter(|t| !t.is_empty()) else {
            return fallback_video_analysis(video);
        };

        match self
            .request::<VideoAnalysis>(&video_prompt(video, transcript), Shape::Object)
            .await
        {
            Ok(analysis) => analysis.bind_to(video),
            Err(e) => {
                log_fallback(&format!("analysis for video {}", video.video_id), &e);
                fallback_video_analysis(video)
            }
        }
    }

    pub async fn generate_learning_objectives(
        &self,
        content_summary: &str,
        structure: &StructureAnalysis,
    ) -> Vec<String> {
        let prompt = objectives_prompt(content_summary, structure);
        match self.request::<Vec<serde_json::Value>>(&prompt, Shape::Array).await {
            Ok(values) => {
                let objectives = string_items(values);
                if objectives.is_empty() {
                    fallback_objectives()
                } else {
                    objectives
                }
            }
            Err(e) => {
                log_fallback("learning objectives", &e);
                fallback_objectives()
            }
        }
    }

    pub async fn identify_prerequisites(&self, content_summary: &str) -> Vec<String> {
        match self
            .request::<Vec<serde_json::Value>>(&prerequisites_prompt(content_summary), Shape::Array)
            .await
        {
            Ok(values) => {
                let prerequisites = string_items(values);
                if prerequisites.is_empty() {
                    fallback_prerequisites()
                } else {
                    prerequisites
                }
            }
            Err(e) => {
                log_fallback("prerequisites", &e);
                fallback_prerequisites()
            }
        }
    }

    /// Analyse the playlist for a learning package; only videos with a
    /// transcript get a per-video analysis
    pub async fn analyze_playlist(&self, playlist: &PlaylistData) -> ContentAnalysis {
        info!("🔍 Analyzing playlist content...");

        let content_summary = content_summary_with_limit(playlist, self.settings().summary_video_limit);
        let structure_analysis = self.analyze_structure(&content_summary).await;

        let mut video_analyses = Vec::new();
        for video in playlist.videos.iter().filter(|v| v.has_transcript()) {
            video_analyses.push(self.analyze_video(video).await);
        }

        let learning_objectives = self
            .generate_learning_objectives(&content_summary, &structure_analysis)
            .await;
        let prerequisites = self.identify_prerequisites(&content_summary).await;
        let learning_path = suggest_learning_path(&video_analyses);

        info!(
            "✅ Analyzed {} videos into {} learning path modules",
            video_analyses.len(),
            learning_path.len()
        );

        ContentAnalysis {
            playlist_title: playlist.playlist_info.title.clone(),
            difficulty_level: assess_difficulty(&content_summary).to_string().to_lowercase(),
            estimated_completion_time: estimate_completion_time(&playlist.videos),
            content_summary,
            structure_analysis,
            video_analyses,
            learning_objectives,
            prerequisites,
            learning_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::llm::MockLLM;
    use crate::youtube::PlaylistInfo;
    use std::sync::Arc;

    fn analysed(id: &str, position: u32, difficulty: &str) -> VideoAnalysis {
        VideoAnalysis {
            video_id: id.to_string(),
            position,
            difficulty: difficulty.to_string(),
            ..VideoAnalysis::default()
        }
    }

    fn video(id: &str, position: u32, transcript: Option<&str>) -> VideoInfo {
        VideoInfo {
            video_id: id.to_string(),
            title: format!("Video {}", id),
            position,
            duration: "PT25M".to_string(),
            transcript: transcript.map(String::from),
            ..VideoInfo::default()
        }
    }

    #[test]
    fn test_learning_path_by_difficulty() {
        let videos = vec![
            analysed("a", 0, "advanced"),
            analysed("b", 1, "beginner"),
            analysed("c", 2, "beginner"),
            analysed("d", 3, "unknown"),
        ];
        let path = suggest_learning_path(&videos);

        assert_eq!(path.len(), 2);
        assert_eq!(path[0].module_name, "Foundation Concepts");
        assert_eq!(path[0].order, 1);
        assert_eq!(path[0].videos.len(), 2);
        assert_eq!(path[1].module_name, "Advanced Topics");
        assert_eq!(path[1].order, 3);
    }

    #[test]
    fn test_learning_path_by_position_without_levels() {
        let videos: Vec<VideoAnalysis> = (0..7).rev().map(|i| analysed(&i.to_string(), i, "unknown")).collect();
        let path = suggest_learning_path(&videos);

        // chunks of 7 / 3 = 2
        assert_eq!(path.len(), 4);
        assert_eq!(path[0].videos[0].video_id, "0");
        assert_eq!(path[0].description, "Videos 1 to 2");
        assert_eq!(path[3].description, "Videos 7 to 7");
        assert_eq!(path[3].order, 4);
        assert!(suggest_learning_path(&[]).is_empty());
    }

    #[test]
    fn test_completion_time_doubles_video_time() {
        let videos = vec![video("a", 0, None), video("b", 1, None)];
        assert_eq!(estimate_completion_time(&videos), "1 hours 40 minutes");
        assert_eq!(estimate_completion_time(&videos[..0]), "0 minutes");
    }

    #[tokio::test]
    async fn test_analysis_from_model_replies() {
        let playlist = PlaylistData::new(
            PlaylistInfo {
                title: "Sourdough Basics".into(),
                ..PlaylistInfo::default()
            },
            vec![
                video("s1", 0, Some("Feed the starter")),
                video("s2", 1, None),
                video("s3", 2, Some("Shape the loaf")),
            ],
        );
        let llm = Arc::new(MockLLM::new(vec![
            Ok(r#"{"subject": "Baking", "themes": ["starter", "shaping"], "audience_level": "beginner"}"#.into()),
            Ok(r#"```json
{"key_concepts": ["hydration"], "summary": "Starter care", "difficulty": "Beginner", "learning_outcomes": ["Keep a starter"]}
```"#.into()),
            Err("timeout".into()),
            Ok(r#"Here you go: ["Maintain a starter", 3, "Shape a boule"]"#.into()),
            Ok("I cannot list prerequisites.".into()),
        ]));
        let generator = CourseGenerator::new(llm.clone(), GenerationConfig::default());

        let analysis = generator.analyze_playlist(&playlist).await;

        assert_eq!(analysis.playlist_title, "Sourdough Basics");
        assert_eq!(analysis.structure_analysis.subject, "Baking");
        assert_eq!(analysis.structure_analysis.themes, vec!["starter", "shaping"]);
        assert_eq!(analysis.video_analyses.len(), 2);
        assert_eq!(analysis.video_analyses[0].video_id, "s1");
        assert_eq!(analysis.video_analyses[0].difficulty, "beginner");
        assert_eq!(analysis.video_analyses[1], fallback_video_analysis(&playlist.videos[2]));
        assert_eq!(analysis.learning_objectives, vec!["Maintain a starter", "Shape a boule"]);
        assert_eq!(analysis.prerequisites, fallback_prerequisites());
        assert_eq!(analysis.learning_path.len(), 1);
        assert_eq!(analysis.learning_path[0].videos.len(), 1);
        assert_eq!(analysis.estimated_completion_time, "2 hours 30 minutes");
        assert_eq!(llm.prompts().len(), 5);
    }

    #[tokio::test]
    async fn test_failing_model_uses_fallbacks() {
        let playlist = PlaylistData::new(PlaylistInfo::default(), vec![video("x", 0, Some("text"))]);
        let generator = CourseGenerator::new(Arc::new(MockLLM::failing()), GenerationConfig::default());

        let analysis = generator.analyze_playlist(&playlist).await;

        assert_eq!(analysis.structure_analysis, fallback_structure());
        assert_eq!(analysis.learning_objectives, fallback_objectives());
        assert_eq!(analysis.video_analyses[0].difficulty, "unknown");
        assert_eq!(analysis.learning_path[0].module_name, "Module 1");
    }
}
