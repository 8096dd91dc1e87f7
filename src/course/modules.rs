use super::generator::log_fallback;
use super::summary::transcript_preview;
use super::{CourseGenerator, CourseInfo, Lesson, LessonContent, LessonType, Module, Question};
use crate::extraction::Shape;
use crate::youtube::{PlaylistData, VideoInfo};
use serde::Serialize;
use serde_json::json;
use std::ops::Range;
use tracing::info;

const MIN_MODULES: usize = 3;
const MAX_MODULES: usize = 6;
const FALLBACK_VIDEO_LESSONS: usize = 3;

/// Split `total_videos` into contiguous module ranges.
///
/// Three to six modules (about three videos each), never more modules than
/// videos. The last module takes the remainder.
pub fn plan_modules(total_videos: usize) -> Vec<Range<usize>> {
    let mut count = MIN_MODULES.max(MAX_MODULES.min(total_videos / 3));
    if total_videos > 0 {
        count = count.min(total_videos);
    }

    let per_module = total_videos / count;
    (0..count)
        .map(|i| {
            let start = i * per_module;
            let end = if i + 1 == count { total_videos } else { start + per_module };
            start..end
        })
        .collect()
}

#[derive(Serialize)]
struct VideoBrief<'a> {
    title: &'a str,
    description: String,
    url: &'a str,
    video_id: &'a str,
    duration: &'a str,
    transcript_preview: Option<String>,
}

impl<'a> From<&'a VideoInfo> for VideoBrief<'a> {
    fn from(video: &'a VideoInfo) -> Self {
        Self {
            title: &video.title,
            description: video.description.chars().take(200).collect(),
            url: &video.url,
            video_id: &video.video_id,
            duration: &video.duration,
            transcript_preview: video
                .transcript
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(transcript_preview),
        }
    }
}

fn module_prompt(course_title: &str, module_number: usize, videos: &[VideoInfo]) -> String {
    let briefs: Vec<VideoBrief> = videos.iter().map(VideoBrief::from).collect();
    let briefs_json = serde_json::to_string_pretty(&briefs).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Generate a comprehensive learning module for this course:
Course: {course_title}
Module Number: {module_number}

Videos in this module:
{briefs_json}

Create a JSON object with this structure:
{{
    "id": "module-{module_number}",
    "title": "Module title",
    "description": "Module description",
    "duration": "Estimated duration (e.g., '2 weeks')",
    "order": {module_number},
    "lessons": [
        {{
            "id": "lesson-{module_number}-1",
            "title": "Lesson title",
            "description": "Lesson description",
            "type": "video | text | quiz | project",
            "duration": "Duration in minutes",
            "order": 1,
            "content": {{
                "videoUrl": "YouTube URL (video lessons)",
                "videoId": "YouTube video ID (video lessons)",
                "videoSource": "youtube",
                "textContent": "Brief text content (text lessons)",
                "markdownContent": "Detailed markdown content (text lessons)",
                "questions": [],
                "projectDescription": "Project description (project lessons)",
                "deliverables": ["list of deliverables"],
                "resources": ["list of resources"]
            }},
            "resources": [
                {{
                    "title": "Resource title",
                    "type": "pdf | link | code",
                    "url": "Resource URL",
                    "description": "Resource description"
                }}
            ]
        }}
    ]
}}

Make lessons engaging and educational. Include at least one quiz per module.
Return ONLY the JSON object."#
    )
}

/// Point video lessons at the module's real videos, in order
fn bind_videos(module: &mut Module, videos: &[VideoInfo]) {
    let mut remaining = videos.iter();
    for lesson in module
        .lessons
        .iter_mut()
        .filter(|l| l.lesson_type == LessonType::Video)
    {
        match remaining.next() {
            Some(video) => lesson.content = LessonContent::video(&video.url, &video.video_id),
            None => break,
        }
    }
}

/// Module used when the model reply is unusable: up to three video lessons
/// and a knowledge check
pub fn fallback_module(module_number: usize, videos: &[VideoInfo]) -> Module {
    let mut lessons: Vec<Lesson> = videos
        .iter()
        .take(FALLBACK_VIDEO_LESSONS)
        .enumerate()
        .map(|(i, video)| {
            let description: String = video.description.chars().take(100).collect();
            Lesson {
                id: format!("lesson-{}-{}", module_number, i + 1),
                title: if video.title.is_empty() {
                    format!("Lesson {}", i + 1)
                } else {
                    video.title.clone()
                },
                description: if description.trim().is_empty() {
                    "Video lesson".to_string()
                } else {
                    description
                },
                lesson_type: LessonType::Video,
                duration: "20 minutes".to_string(),
                order: (i + 1) as u32,
                content: LessonContent::video(&video.url, &video.video_id),
                resources: Vec::new(),
            }
        })
        .collect();

    lessons.push(Lesson {
        id: format!("lesson-{}-quiz", module_number),
        title: format!("Module {} Knowledge Check", module_number),
        description: "Test your understanding".to_string(),
        lesson_type: LessonType::Quiz,
        duration: "10 minutes".to_string(),
        order: (lessons.len() + 1) as u32,
        content: LessonContent {
            questions: vec![Question {
                id: format!("q{}-1", module_number),
                question: "What is the main topic covered in this module?".to_string(),
                question_type: "multiple-choice".to_string(),
                options: ["Option A", "Option B", "Option C", "Option D"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                correct_answer: Some(json!(0)),
                explanation: Some("Review the module content for the answer.".to_string()),
                points: None,
            }],
            ..LessonContent::default()
        },
        resources: Vec::new(),
    });

    Module {
        id: format!("module-{}", module_number),
        title: format!("Module {}", module_number),
        description: "Learning module based on video content".to_string(),
        duration: "1 week".to_string(),
        order: module_number as u32,
        lessons,
    }
}

impl CourseGenerator {
    /// One module per planned range of the playlist's videos
    pub async fn generate_modules(&self, playlist: &PlaylistData, course: &CourseInfo) -> Vec<Module> {
        let plan = plan_modules(playlist.videos.len());
        info!("📚 Generating {} modules for {} videos", plan.len(), playlist.videos.len());

        let mut modules = Vec::with_capacity(plan.len());
        for (idx, range) in plan.into_iter().enumerate() {
            let videos = &playlist.videos[range];
            modules.push(self.generate_module(idx + 1, videos, course).await);
        }
        modules
    }

    pub async fn generate_module(&self, module_number: usize, videos: &[VideoInfo], course: &CourseInfo) -> Module {
        let prompt = module_prompt(&course.title, module_number, videos);

        match self.request::<Module>(&prompt, Shape::Object).await {
            Ok(mut module) => {
                bind_videos(&mut module, videos);
                if module.id.trim().is_empty() {
                    module.id = format!("module-{}", module_number);
                }
                if module.title.trim().is_empty() {
                    module.title = format!("Module {}", module_number);
                }
                module.order = module_number as u32;
                module
            }
            Err(e) => {
                log_fallback(&format!("module {}", module_number), &e);
                fallback_module(module_number, videos)
            }
        }
    }
}
