//! Learning package: study modules, guide, quiz and progress tracker built
//! from a [`ContentAnalysis`] without further model calls

use super::analysis::{ContentAnalysis, PathModule, VideoAnalysis};
use crate::youtube::watch_url;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAX_MODULE_OBJECTIVES: usize = 5;
const MAX_CONCEPT_QUESTIONS: usize = 10;
const MAX_OBJECTIVE_QUESTIONS: usize = 5;
const OVERVIEW_CHARS: usize = 500;
const MINUTES_PER_VIDEO: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageInfo {
    pub title: String,
    pub description: String,
    pub learning_objectives: Vec<String>,
    pub prerequisites: Vec<String>,
    pub difficulty_level: String,
    pub estimated_time: String,
    pub total_modules: usize,
    pub total_videos: usize,
    pub subject: String,
    pub approach: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotesSection {
    pub name: String,
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotesTemplate {
    pub title: String,
    pub sections: Vec<NotesSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyVideo {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub key_concepts: Vec<String>,
    pub difficulty: String,
    pub url: String,
    pub notes_section: NotesTemplate,
    pub reflection_questions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub title: String,
    pub description: String,
    pub estimated_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub title: String,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyModule {
    pub module_id: String,
    pub title: String,
    pub description: String,
    pub order: u32,
    pub learning_objectives: Vec<String>,
    pub videos: Vec<StudyVideo>,
    pub key_concepts: Vec<String>,
    pub summary: String,
    pub estimated_time: String,
    pub difficulty: String,
    pub activities: Vec<Activity>,
    pub resources: Vec<StudyResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyWeek {
    pub week: usize,
    pub module: String,
    pub activities: Vec<String>,
    pub estimated_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyGuide {
    pub title: String,
    pub overview: String,
    pub learning_objectives: Vec<String>,
    pub key_concepts: Vec<String>,
    pub study_tips: Vec<String>,
    pub study_schedule: Vec<StudyWeek>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizQuestion {
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub topic: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleProgress {
    pub module_id: String,
    pub title: String,
    pub completed: bool,
    pub videos_watched: usize,
    pub total_videos: usize,
    pub notes_taken: bool,
    pub activities_completed: usize,
    pub total_activities: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressTracker {
    pub total_modules: usize,
    pub modules_completed: usize,
    pub completion_percentage: u32,
    pub module_progress: Vec<ModuleProgress>,
    pub study_streak: u32,
    pub last_study_date: Option<String>,
}

/// Self-study material generated from a playlist analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LearningPackage {
    pub course_info: PackageInfo,
    pub modules: Vec<StudyModule>,
    pub study_guide: StudyGuide,
    pub quiz_questions: Vec<QuizQuestion>,
    pub progress_tracker: ProgressTracker,
    pub generated_at: DateTime<Utc>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Items in first-seen order without repeats
fn unique<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        if !seen.contains(item) {
            seen.push(item.clone());
        }
    }
    seen
}

fn package_description(analysis: &ContentAnalysis) -> String {
    let structure = &analysis.structure_analysis;
    let subject = if structure.subject.trim().is_empty() {
        "educational content".to_string()
    } else {
        structure.subject.to_lowercase()
    };
    let mut description = format!("This course covers {}", subject);
    if !structure.themes.is_empty() {
        let themes: Vec<&str> = structure.themes.iter().take(3).map(String::as_str).collect();
        description.push_str(&format!(", focusing on {}", themes.join(", ")));
    }
    description.push_str(&format!(
        ". The course is designed for {} learners and follows a {} approach.",
        or_default(&structure.audience_level, "intermediate"),
        or_default(&structure.approach, "mixed")
    ));
    description
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

fn notes_template(video: &VideoAnalysis) -> NotesTemplate {
    NotesTemplate {
        title: format!("Notes for: {}", or_default(&video.title, "Video")),
        sections: vec![
            NotesSection {
                name: "Key Points".to_string(),
                template: "• Point 1:\n• Point 2:\n• Point 3:".to_string(),
            },
            NotesSection {
                name: "Questions".to_string(),
                template: "• Question 1:\n• Question 2:".to_string(),
            },
            NotesSection {
                name: "Personal Insights".to_string(),
                template: "What did I learn?\n\nHow can I apply this?".to_string(),
            },
        ],
    }
}

/// General reflection prompts plus one per leading key concept (at most two)
pub fn reflection_questions(video: &VideoAnalysis) -> Vec<String> {
    let mut questions = strings(&[
        "What are the main concepts covered in this video?",
        "How do these concepts relate to what I already know?",
        "What questions do I still have about this topic?",
        "How can I apply this knowledge in practice?",
    ]);
    questions.extend(
        video
            .key_concepts
            .iter()
            .take(2)
            .map(|concept| format!("How would you explain {} to someone else?", concept)),
    );
    questions
}

fn study_video(video: &VideoAnalysis) -> StudyVideo {
    StudyVideo {
        id: video.video_id.clone(),
        title: video.title.clone(),
        summary: video.summary.clone(),
        key_concepts: video.key_concepts.clone(),
        difficulty: video.difficulty.clone(),
        url: watch_url(&video.video_id),
        notes_section: notes_template(video),
        reflection_questions: reflection_questions(video),
    }
}

/// Ten minutes per video, e.g. `40 minutes` or `1h 30m`
pub fn module_time(video_count: usize) -> String {
    let minutes = video_count * MINUTES_PER_VIDEO;
    if minutes < 60 {
        format!("{} minutes", minutes)
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// Any advanced video makes the module advanced, then any beginner video
/// makes it beginner
pub fn module_difficulty(videos: &[VideoAnalysis]) -> &'static str {
    if videos.iter().any(|v| v.difficulty == "advanced") {
        "advanced"
    } else if videos.iter().any(|v| v.difficulty == "beginner") {
        "beginner"
    } else {
        "intermediate"
    }
}

fn module_summary(videos: &[VideoAnalysis]) -> String {
    if videos.is_empty() {
        return "This module contains educational content.".to_string();
    }
    let summaries: Vec<&str> = videos
        .iter()
        .map(|v| v.summary.as_str())
        .filter(|s| !s.is_empty())
        .take(2)
        .collect();
    if summaries.is_empty() {
        format!("This module contains {} educational videos.", videos.len())
    } else {
        format!("This module covers: {}", summaries.join(" "))
    }
}

fn module_activities() -> Vec<Activity> {
    [
        ("note_taking", "Take Detailed Notes", "Create comprehensive notes while watching each video", "15 minutes per video"),
        ("concept_mapping", "Create Concept Maps", "Draw connections between key concepts covered", "20 minutes"),
        ("practice", "Apply Concepts", "Practice applying the concepts learned in real scenarios", "30 minutes"),
        ("discussion", "Discuss with Peers", "Discuss key concepts with classmates or study groups", "15 minutes"),
    ]
    .iter()
    .map(|(kind, title, description, time)| Activity {
        activity_type: kind.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        estimated_time: time.to_string(),
    })
    .collect()
}

fn module_resources() -> Vec<StudyResource> {
    [
        ("glossary", "Key Terms Glossary", "Definitions of important terms and concepts", "#glossary"),
        ("references", "Further Reading", "Additional resources for deeper learning", "#references"),
        ("practice", "Practice Exercises", "Hands-on exercises to reinforce learning", "#exercises"),
    ]
    .iter()
    .map(|(kind, title, description, url)| StudyResource {
        resource_type: kind.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        url: url.to_string(),
    })
    .collect()
}

fn study_module(path_module: &PathModule) -> StudyModule {
    let videos = &path_module.videos;
    let mut objectives = unique(videos.iter().flat_map(|v| v.learning_outcomes.iter()));
    objectives.truncate(MAX_MODULE_OBJECTIVES);

    StudyModule {
        module_id: format!("module_{}", path_module.order),
        title: path_module.module_name.clone(),
        description: path_module.description.clone(),
        order: path_module.order,
        learning_objectives: objectives,
        videos: videos.iter().map(study_video).collect(),
        key_concepts: unique(videos.iter().flat_map(|v| v.key_concepts.iter())),
        summary: module_summary(videos),
        estimated_time: module_time(videos.len()),
        difficulty: module_difficulty(videos).to_string(),
        activities: module_activities(),
        resources: module_resources(),
    }
}

fn all_concepts(analysis: &ContentAnalysis) -> Vec<String> {
    unique(analysis.video_analyses.iter().flat_map(|v| v.key_concepts.iter()))
}

fn study_guide(analysis: &ContentAnalysis) -> StudyGuide {
    let overview: String = analysis.content_summary.chars().take(OVERVIEW_CHARS).collect();
    StudyGuide {
        title: format!("Study Guide: {}", or_default(&analysis.playlist_title, "Course")),
        overview: format!("{}...", overview),
        learning_objectives: analysis.learning_objectives.clone(),
        key_concepts: all_concepts(analysis),
        study_tips: strings(&[
            "Watch each video actively, taking notes on key concepts",
            "Pause frequently to reflect on what you've learned",
            "Create your own examples to illustrate concepts",
            "Review notes regularly to reinforce learning",
            "Connect new concepts to previous knowledge",
        ]),
        study_schedule: analysis
            .learning_path
            .iter()
            .enumerate()
            .map(|(i, module)| StudyWeek {
                week: i + 1,
                module: module.module_name.clone(),
                activities: strings(&[
                    "Watch all videos in the module",
                    "Take detailed notes",
                    "Complete reflection questions",
                    "Review and summarize key concepts",
                ]),
                estimated_time: "2-3 hours".to_string(),
            })
            .collect(),
    }
}

/// Short-answer questions from key concepts, then multiple-choice prompts
/// from the course objectives
pub fn quiz_questions(analysis: &ContentAnalysis) -> Vec<QuizQuestion> {
    let concept_questions = all_concepts(analysis)
        .into_iter()
        .take(MAX_CONCEPT_QUESTIONS)
        .map(|concept| QuizQuestion {
            question: format!("Explain the concept of {} and its significance.", concept),
            question_type: "short_answer".to_string(),
            options: Vec::new(),
            topic: concept,
            difficulty: "intermediate".to_string(),
        });
    let objective_questions = analysis
        .learning_objectives
        .iter()
        .take(MAX_OBJECTIVE_QUESTIONS)
        .map(|objective| QuizQuestion {
            question: format!("Which of the following best describes: {}?", objective),
            question_type: "multiple_choice".to_string(),
            options: strings(&["A", "B", "C", "D"]),
            topic: "learning_objectives".to_string(),
            difficulty: "intermediate".to_string(),
        });
    concept_questions.chain(objective_questions).collect()
}

fn progress_tracker(modules: &[StudyModule]) -> ProgressTracker {
    ProgressTracker {
        total_modules: modules.len(),
        modules_completed: 0,
        completion_percentage: 0,
        module_progress: modules
            .iter()
            .map(|module| ModuleProgress {
                module_id: module.module_id.clone(),
                title: module.title.clone(),
                completed: false,
                videos_watched: 0,
                total_videos: module.videos.len(),
                notes_taken: false,
                activities_completed: 0,
                total_activities: module.activities.len(),
            })
            .collect(),
        study_streak: 0,
        last_study_date: None,
    }
}

/// Assemble the package; one study module per learning path entry
pub fn build_learning_package(analysis: &ContentAnalysis) -> LearningPackage {
    let modules: Vec<StudyModule> = analysis.learning_path.iter().map(study_module).collect();
    let structure = &analysis.structure_analysis;

    let course_info = PackageInfo {
        title: or_default(&analysis.playlist_title, "Learning Course").to_string(),
        description: package_description(analysis),
        learning_objectives: analysis.learning_objectives.clone(),
        prerequisites: analysis.prerequisites.clone(),
        difficulty_level: or_default(&analysis.difficulty_level, "intermediate").to_string(),
        estimated_time: or_default(&analysis.estimated_completion_time, "Unknown").to_string(),
        total_modules: analysis.learning_path.len(),
        total_videos: analysis.video_analyses.len(),
        subject: or_default(&structure.subject, "General").to_string(),
        approach: or_default(&structure.approach, "mixed").to_string(),
    };

    LearningPackage {
        course_info,
        study_guide: study_guide(analysis),
        quiz_questions: quiz_questions(analysis),
        progress_tracker: progress_tracker(&modules),
        modules,
        generated_at: Utc::now(),
    }
}
