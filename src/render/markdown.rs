use crate::course::{CourseDocument, Lesson, LessonType, Module, Question};
use serde_json::Value;
use std::fmt;

/// Markdown view of a course document
pub struct MarkdownCourse<'a>(pub &'a CourseDocument);

pub fn render(document: &CourseDocument) -> String {
    MarkdownCourse(document).to_string()
}

fn answer_text(question: &Question) -> Option<String> {
    match question.correct_answer.as_ref()? {
        Value::Number(n) => {
            let idx = n.as_u64()? as usize;
            question.options.get(idx).cloned().or_else(|| Some(n.to_string()))
        }
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn write_question(f: &mut fmt::Formatter<'_>, number: usize, question: &Question) -> fmt::Result {
    write!(f, "{}. {}", number, question.question)?;
    if let Some(points) = question.points {
        write!(f, " _({} pts)_", points)?;
    }
    writeln!(f)?;
    for option in &question.options {
        writeln!(f, "   - {}", option)?;
    }
    if let Some(answer) = answer_text(question) {
        writeln!(f, "   - **Answer:** {}", answer)?;
    }
    Ok(())
}

fn write_lesson(f: &mut fmt::Formatter<'_>, lesson: &Lesson) -> fmt::Result {
    let kind = match lesson.lesson_type {
        LessonType::Video => "Video",
        LessonType::Text => "Reading",
        LessonType::Quiz => "Quiz",
        LessonType::Project => "Project",
        LessonType::Other => "Lesson",
    };
    write!(f, "#### {}. {} ({}", lesson.order, lesson.title, kind)?;
    if !lesson.duration.is_empty() {
        write!(f, ", {}", lesson.duration)?;
    }
    writeln!(f, ")\n")?;

    if !lesson.description.is_empty() {
        writeln!(f, "{}\n", lesson.description)?;
    }

    let content = &lesson.content;
    if let Some(url) = &content.video_url {
        writeln!(f, "▶️ [Watch on YouTube]({})\n", url)?;
    }
    if let Some(markdown) = content.markdown_content.as_ref().or(content.text_content.as_ref()) {
        writeln!(f, "{}\n", markdown)?;
    }
    if let Some(project) = &content.project_description {
        writeln!(f, "**Project:** {}\n", project)?;
    }
    for deliverable in &content.deliverables {
        writeln!(f, "- [ ] {}", deliverable)?;
    }
    for (i, question) in content.questions.iter().enumerate() {
        write_question(f, i + 1, question)?;
    }
    if !content.questions.is_empty() || !content.deliverables.is_empty() {
        writeln!(f)?;
    }

    for resource in &lesson.resources {
        writeln!(f, "- 📎 [{}]({}) {}", resource.title, resource.url, resource.description)?;
    }
    Ok(())
}

fn write_module(f: &mut fmt::Formatter<'_>, module: &Module) -> fmt::Result {
    writeln!(f, "### Module {}: {}\n", module.order, module.title)?;
    if !module.duration.is_empty() {
        writeln!(f, "_Duration: {}_\n", module.duration)?;
    }
    if !module.description.is_empty() {
        writeln!(f, "{}\n", module.description)?;
    }
    for lesson in &module.lessons {
        write_lesson(f, lesson)?;
    }
    Ok(())
}

impl fmt::Display for MarkdownCourse<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.0;
        let course = &doc.course;

        writeln!(f, "# {}\n", course.title)?;
        writeln!(f, "{}\n", course.description)?;
        writeln!(f, "| | |\n|---|---|")?;
        writeln!(f, "| Category | {} |", course.category)?;
        writeln!(f, "| Level | {} |", course.level)?;
        writeln!(f, "| Duration | {} |", course.duration)?;
        writeln!(f, "| Estimated hours | {} |", course.estimated_hours)?;
        writeln!(f, "| Instructor | {} |", course.instructor)?;
        writeln!(f, "| Price | ${:.2} |\n", course.price)?;

        if !course.tags.is_empty() {
            writeln!(f, "**Tags:** {}\n", course.tags.join(", "))?;
        }
        if !course.prerequisites.is_empty() {
            writeln!(f, "## Prerequisites\n")?;
            for item in &course.prerequisites {
                writeln!(f, "- {}", item)?;
            }
            writeln!(f)?;
        }
        if !course.learning_objectives.is_empty() {
            writeln!(f, "## Learning Objectives\n")?;
            for item in &course.learning_objectives {
                writeln!(f, "- {}", item)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "## Modules\n")?;
        for module in &doc.modules {
            write_module(f, module)?;
        }

        if !doc.assignments.is_empty() {
            writeln!(f, "## Assignments\n")?;
            for assignment in &doc.assignments {
                writeln!(
                    f,
                    "- **{}** ({} pts, {}, due {}): {}",
                    assignment.title,
                    assignment.points,
                    assignment.module_id,
                    assignment.due_date,
                    assignment.description
                )?;
            }
            writeln!(f)?;
        }

        let exam = &doc.final_exam;
        writeln!(f, "## {}\n", exam.title)?;
        writeln!(f, "{}\n", exam.description)?;
        writeln!(
            f,
            "Time limit: {} minutes. Passing score: {}%.\n",
            exam.time_limit, exam.passing_score
        )?;
        for (i, question) in exam.questions.iter().enumerate() {
            write_question(f, i + 1, question)?;
        }
        writeln!(f)?;

        writeln!(f, "---\n")?;
        writeln!(
            f,
            "_Generated {} by agent v{} (confidence {:.0}%)._",
            doc.generated_at.format("%Y-%m-%d %H:%M UTC"),
            doc.agent_version,
            doc.confidence * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::sample_document;

    #[test]
    fn test_markdown_sections() {
        let md = render(&sample_document());
        assert!(md.starts_with("# Rust & Friends\n"));
        assert!(md.contains("### Module 1: Module 1"));
        assert!(md.contains("▶️ [Watch on YouTube](https://www.youtube.com/watch?v=abcdefghijk)"));
        assert!(md.contains("## Assignments"));
        assert!(md.contains("Time limit: 120 minutes. Passing score: 75%."));
        assert!(md.contains("**Answer:** Practical applications"));
    }
}
