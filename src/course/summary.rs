use super::CourseDocument;
use crate::youtube::PlaylistData;
use std::fmt::Write;

const DESCRIPTION_CHARS: usize = 500;
const VIDEO_DESCRIPTION_CHARS: usize = 200;
const TRANSCRIPT_PREVIEW_CHARS: usize = 300;

/// Number of videos described by [`content_summary`]
pub const SUMMARY_VIDEO_LIMIT: usize = 10;

fn head(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Transcript head, with `...` when it was cut
pub fn transcript_preview(transcript: &str) -> String {
    if transcript.chars().count() > TRANSCRIPT_PREVIEW_CHARS {
        format!("{}...", head(transcript, TRANSCRIPT_PREVIEW_CHARS))
    } else {
        transcript.to_string()
    }
}

/// Prompt context describing the playlist and its first videos
pub fn content_summary(playlist: &PlaylistData) -> String {
    content_summary_with_limit(playlist, SUMMARY_VIDEO_LIMIT)
}

pub fn content_summary_with_limit(playlist: &PlaylistData, video_limit: usize) -> String {
    let info = &playlist.playlist_info;
    let mut parts = vec![
        format!("Playlist: {}", non_empty(&info.title, "Unknown")),
        format!("Channel: {}", non_empty(&info.channel_title, "Unknown")),
        format!("Description: {}", head(&info.description, DESCRIPTION_CHARS)),
        String::new(),
    ];

    for (i, video) in playlist.videos.iter().take(video_limit).enumerate() {
        parts.push(format!("Video {}: {}", i + 1, non_empty(&video.title, "Unknown")));
        parts.push(format!(
            "Description: {}",
            head(&video.description, VIDEO_DESCRIPTION_CHARS)
        ));
        if let Some(transcript) = video.transcript.as_deref().filter(|t| !t.is_empty()) {
            parts.push(format!("Transcript preview: {}", transcript_preview(transcript)));
        }
        parts.push(String::new());
    }

    parts.join("\n")
}

fn non_empty<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

/// Human-readable overview printed by the CLI
pub fn course_summary(document: &CourseDocument) -> String {
    let course = &document.course;
    let mut out = String::new();

    let _ = writeln!(out, "Course Generation Summary");
    let _ = writeln!(out, "========================");
    let _ = writeln!(out);
    let _ = writeln!(out, "📚 Course: {}", non_empty(&course.title, "N/A"));
    let _ = writeln!(out, "🏷️  Category: {}", non_empty(&course.category, "N/A"));
    let _ = writeln!(out, "📈 Level: {}", non_empty(&course.level, "N/A"));
    let _ = writeln!(out, "💰 Price: ${:.2}", course.price);
    let _ = writeln!(out, "⏱️  Duration: {}", non_empty(&course.duration, "N/A"));
    let _ = writeln!(out, "👨‍🏫 Instructor: {}", non_empty(&course.instructor, "N/A"));
    let _ = writeln!(out, "🕐 Estimated Hours: {}", course.estimated_hours);
    let _ = writeln!(out);
    let _ = writeln!(out, "📖 Structure:");
    let _ = writeln!(out, "- Modules: {}", document.modules.len());
    let _ = writeln!(out, "- Lessons: {}", document.lesson_count());
    let _ = writeln!(out, "- Assignments: {}", document.assignments.len());
    let _ = writeln!(
        out,
        "- Final Exam: {}",
        if document.final_exam.questions.is_empty() { "No" } else { "Yes" }
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "🎯 Learning Objectives:");
    for (i, objective) in course.learning_objectives.iter().enumerate() {
        let _ = writeln!(out, "   {}. {}", i + 1, objective);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "📖 Modules Overview:");
    for (i, module) in document.modules.iter().enumerate() {
        let _ = writeln!(
            out,
            "   Module {}: {} ({} lessons)",
            i + 1,
            non_empty(&module.title, "N/A"),
            module.lessons.len()
        );
    }

    out
}
