use crate::course::{CourseDocument, Lesson, Module, Question};
use std::fmt;

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Only http(s) links are rendered as links
pub(crate) fn safe_href(url: &str) -> Option<String> {
    let lower = url.trim().to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://")).then(|| escape_html(url.trim()))
}

pub(crate) const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:880px;margin:2rem auto;padding:0 1rem;line-height:1.5}\
.meta td{padding:.2rem .8rem}.module{border-top:1px solid #ddd;margin-top:1.5rem}\
.lesson{margin-left:1rem}.tag{background:#eef;border-radius:4px;padding:0 .4rem;margin-right:.3rem}";

/// Standalone HTML page for a course document
pub struct HtmlCourse<'a>(pub &'a CourseDocument);

pub fn render(document: &CourseDocument) -> String {
    HtmlCourse(document).to_string()
}

fn write_list(f: &mut fmt::Formatter<'_>, heading: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f, "<h2>{}</h2>\n<ul>", heading)?;
    for item in items {
        writeln!(f, "<li>{}</li>", escape_html(item))?;
    }
    writeln!(f, "</ul>")
}

fn write_questions(f: &mut fmt::Formatter<'_>, questions: &[Question]) -> fmt::Result {
    if questions.is_empty() {
        return Ok(());
    }
    writeln!(f, "<ol class=\"questions\">")?;
    for question in questions {
        write!(f, "<li>{}", escape_html(&question.question))?;
        if let Some(points) = question.points {
            write!(f, " <small>({} pts)</small>", points)?;
        }
        if !question.options.is_empty() {
            write!(f, "<ul>")?;
            for option in &question.options {
                write!(f, "<li>{}</li>", escape_html(option))?;
            }
            write!(f, "</ul>")?;
        }
        writeln!(f, "</li>")?;
    }
    writeln!(f, "</ol>")
}

fn write_lesson(f: &mut fmt::Formatter<'_>, lesson: &Lesson) -> fmt::Result {
    writeln!(f, "<div class=\"lesson\">")?;
    writeln!(
        f,
        "<h4>{}. {} <small>{:?} · {}</small></h4>",
        lesson.order,
        escape_html(&lesson.title),
        lesson.lesson_type,
        escape_html(&lesson.duration)
    )?;
    if !lesson.description.is_empty() {
        writeln!(f, "<p>{}</p>", escape_html(&lesson.description))?;
    }

    let content = &lesson.content;
    if let Some(href) = content.video_url.as_deref().and_then(safe_href) {
        writeln!(f, "<p><a href=\"{}\">Watch on YouTube</a></p>", href)?;
    }
    if let Some(text) = content.text_content.as_ref().or(content.markdown_content.as_ref()) {
        writeln!(f, "<p>{}</p>", escape_html(text))?;
    }
    if let Some(project) = &content.project_description {
        writeln!(f, "<p><strong>Project:</strong> {}</p>", escape_html(project))?;
    }
    write_questions(f, &content.questions)?;

    for resource in &lesson.resources {
        match safe_href(&resource.url) {
            Some(href) => writeln!(
                f,
                "<p>📎 <a href=\"{}\">{}</a></p>",
                href,
                escape_html(&resource.title)
            )?,
            None => writeln!(f, "<p>📎 {}</p>", escape_html(&resource.title))?,
        }
    }
    writeln!(f, "</div>")
}

fn write_module(f: &mut fmt::Formatter<'_>, module: &Module) -> fmt::Result {
    writeln!(f, "<section class=\"module\" id=\"{}\">", escape_html(&module.id))?;
    writeln!(
        f,
        "<h3>Module {}: {}</h3>",
        module.order,
        escape_html(&module.title)
    )?;
    if !module.description.is_empty() {
        writeln!(f, "<p>{}</p>", escape_html(&module.description))?;
    }
    for lesson in &module.lessons {
        write_lesson(f, lesson)?;
    }
    writeln!(f, "</section>")
}

impl fmt::Display for HtmlCourse<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.0;
        let course = &doc.course;
        let title = escape_html(&course.title);

        writeln!(f, "<!DOCTYPE html>\n<html lang=\"en\">\n<head>")?;
        writeln!(f, "<meta charset=\"utf-8\">\n<title>{}</title>", title)?;
        writeln!(f, "<style>{}</style>\n</head>\n<body>", STYLE)?;

        writeln!(f, "<h1>{}</h1>", title)?;
        if let Some(src) = safe_href(&course.thumbnail) {
            writeln!(f, "<img src=\"{}\" alt=\"{}\" width=\"480\">", src, title)?;
        }
        writeln!(f, "<p>{}</p>", escape_html(&course.description))?;
        writeln!(f, "<table class=\"meta\">")?;
        for (label, value) in [
            ("Category", course.category.clone()),
            ("Level", course.level.clone()),
            ("Duration", course.duration.clone()),
            ("Estimated hours", course.estimated_hours.to_string()),
            ("Instructor", course.instructor.clone()),
            ("Price", format!("${:.2}", course.price)),
        ] {
            writeln!(f, "<tr><td>{}</td><td>{}</td></tr>", label, escape_html(&value))?;
        }
        writeln!(f, "</table>")?;

        if !course.tags.is_empty() {
            write!(f, "<p>")?;
            for tag in &course.tags {
                write!(f, "<span class=\"tag\">{}</span>", escape_html(tag))?;
            }
            writeln!(f, "</p>")?;
        }
        write_list(f, "Prerequisites", &course.prerequisites)?;
        write_list(f, "Learning Objectives", &course.learning_objectives)?;

        writeln!(f, "<h2>Modules</h2>")?;
        for module in &doc.modules {
            write_module(f, module)?;
        }

        if !doc.assignments.is_empty() {
            writeln!(f, "<h2>Assignments</h2>\n<ul>")?;
            for assignment in &doc.assignments {
                writeln!(
                    f,
                    "<li><strong>{}</strong> ({} pts, due {}): {}</li>",
                    escape_html(&assignment.title),
                    assignment.points,
                    escape_html(&assignment.due_date),
                    escape_html(&assignment.description)
                )?;
            }
            writeln!(f, "</ul>")?;
        }

        let exam = &doc.final_exam;
        writeln!(f, "<h2>{}</h2>", escape_html(&exam.title))?;
        writeln!(f, "<p>{}</p>", escape_html(&exam.description))?;
        writeln!(
            f,
            "<p>Time limit: {} minutes. Passing score: {}%.</p>",
            exam.time_limit, exam.passing_score
        )?;
        write_questions(f, &exam.questions)?;

        writeln!(
            f,
            "<footer><small>Generated {} by agent v{}</small></footer>",
            doc.generated_at.format("%Y-%m-%d %H:%M UTC"),
            escape_html(&doc.agent_version)
        )?;
        writeln!(f, "</body>\n</html>")
    }
}
