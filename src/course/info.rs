use super::generator::log_fallback;
use super::{assess_difficulty, CourseGenerator, CourseInfo, PLACEHOLDER_THUMBNAIL};
use crate::extraction::Shape;
use crate::youtube::PlaylistData;

fn course_info_prompt(content_summary: &str) -> String {
    format!(
        r#"Based on this YouTube playlist content, generate comprehensive course information:

{content_summary}

Generate a JSON object with the following structure:
{{
    "title": "Course title (clear and descriptive)",
    "description": "Detailed course description (2-3 sentences)",
    "category": "Course category (Programming, Business, Design, etc.)",
    "level": "Difficulty level (Beginner, Intermediate, Advanced)",
    "price": "Suggested price in USD (numeric value)",
    "duration": "Course duration (e.g., '8 weeks')",
    "instructor": "Course instructor name or 'AI Course Generator'",
    "tags": ["array", "of", "relevant", "tags"],
    "thumbnail": "Playlist thumbnail URL or placeholder",
    "prerequisites": ["List of prerequisites"],
    "learningObjectives": ["List of 4-6 learning objectives"],
    "isPublished": true,
    "estimatedHours": "Total estimated hours (numeric)"
}}

Make it professional and comprehensive. Return ONLY the JSON object."#
    )
}

fn playlist_thumbnail(playlist: &PlaylistData) -> String {
    let thumbnail = playlist.playlist_info.thumbnail.trim();
    if thumbnail.is_empty() {
        PLACEHOLDER_THUMBNAIL.to_string()
    } else {
        thumbnail.to_string()
    }
}

/// Course info used when the model reply is unusable
pub fn fallback_course_info(playlist: &PlaylistData, content_summary: &str) -> CourseInfo {
    let title = playlist.playlist_info.title.trim();

    CourseInfo {
        title: if title.is_empty() {
            "Learning Course".to_string()
        } else {
            title.to_string()
        },
        description: "A comprehensive course based on curated YouTube content".to_string(),
        category: "Education".to_string(),
        level: assess_difficulty(content_summary).to_string(),
        price: 99.99,
        duration: "6 weeks".to_string(),
        instructor: "AI Course Generator".to_string(),
        tags: vec![
            "education".to_string(),
            "online-learning".to_string(),
            "video-course".to_string(),
        ],
        thumbnail: playlist_thumbnail(playlist),
        prerequisites: vec!["Basic understanding of the subject matter".to_string()],
        learning_objectives: vec![
            "Understand the core concepts presented in the course".to_string(),
            "Apply learned knowledge to practical situations".to_string(),
            "Develop skills through hands-on practice".to_string(),
        ],
        is_published: true,
        estimated_hours: playlist.videos.len() as f64 * 0.5,
    }
}

impl CourseGenerator {
    pub async fn generate_course_info(&self, playlist: &PlaylistData, content_summary: &str) -> CourseInfo {
        let prompt = course_info_prompt(content_summary);

        match self.request::<CourseInfo>(&prompt, Shape::Object).await {
            Ok(mut info) => {
                let thumbnail = info.thumbnail.trim();
                if thumbnail.is_empty() || thumbnail.eq_ignore_ascii_case("placeholder") {
                    info.thumbnail = playlist_thumbnail(playlist);
                }
                if info.title.trim().is_empty() {
                    info.title = fallback_course_info(playlist, content_summary).title;
                }
                info
            }
            Err(e) => {
                log_fallback("course info", &e);
                fallback_course_info(playlist, content_summary)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::llm::MockLLM;
    use crate::youtube::{PlaylistInfo, VideoInfo};
    use std::sync::Arc;

    fn playlist() -> PlaylistData {
        PlaylistData::new(
            PlaylistInfo {
                id: "PL1".into(),
                title: "Intro to Rust".into(),
                thumbnail: "https://i.ytimg.com/vi/x/hqdefault.jpg".into(),
                ..PlaylistInfo::default()
            },
            vec![VideoInfo::default(); 4],
        )
    }

    fn generator(replies: Vec<Result<String, String>>) -> CourseGenerator {
        CourseGenerator::new(Arc::new(MockLLM::new(replies)), GenerationConfig::default())
    }

    #[test]
    fn test_fallback_course_info() {
        let info = fallback_course_info(&playlist(), "An introduction to basic Rust");
        assert_eq!(info.title, "Intro to Rust");
        assert_eq!(info.category, "Education");
        assert_eq!(info.level, "Beginner");
        assert_eq!(info.price, 99.99);
        assert_eq!(info.estimated_hours, 2.0);
        assert_eq!(info.thumbnail, "https://i.ytimg.com/vi/x/hqdefault.jpg");
    }

    #[tokio::test]
    async fn test_placeholder_thumbnail_is_replaced() {
        let reply = "```json\n{\"title\": \"Rust Deep Dive\", \"thumbnail\": \"placeholder\", \"price\": \"59\"}\n```";
        let info = generator(vec![Ok(reply.to_string())])
            .generate_course_info(&playlist(), "summary")
            .await;
        assert_eq!(info.title, "Rust Deep Dive");
        assert_eq!(info.price, 59.0);
        assert_eq!(info.thumbnail, "https://i.ytimg.com/vi/x/hqdefault.jpg");
    }

    #[tokio::test]
    async fn test_transport_error_uses_fallback() {
        let info = generator(vec![Err("timeout".to_string())])
            .generate_course_info(&playlist(), "summary")
            .await;
        assert_eq!(info, fallback_course_info(&playlist(), "summary"));
    }

    #[tokio::test]
    async fn test_odd_field_shapes_still_decode() {
        let reply = "{\"title\": \"X\", \"modules\": 3, \"prerequisites\": {\"nested\": true}}";
        let info = generator(vec![Ok(reply.to_string())])
            .generate_course_info(&playlist(), "summary")
            .await;
        assert_eq!(info.title, "X");
        assert_eq!(info.prerequisites.len(), 1);
    }
}
