//! Study guide renderings of a learning package

use super::html::{escape_html, safe_href, STYLE};
use crate::course::package::{LearningPackage, StudyModule};
use std::fmt;

/// Markdown study guide
pub struct MarkdownGuide<'a>(pub &'a LearningPackage);

/// Standalone HTML study guide
pub struct HtmlGuide<'a>(pub &'a LearningPackage);

fn write_markdown_module(f: &mut fmt::Formatter<'_>, module: &StudyModule) -> fmt::Result {
    writeln!(f, "### Module {}: {}\n", module.order, module.title)?;
    writeln!(f, "{}\n", module.description)?;
    writeln!(f, "**Estimated Time:** {}  ", module.estimated_time)?;
    writeln!(f, "**Difficulty:** {}\n", module.difficulty)?;

    writeln!(f, "#### Videos\n")?;
    for video in &module.videos {
        writeln!(f, "##### {}\n", video.title)?;
        if !video.summary.is_empty() {
            writeln!(f, "{}\n", video.summary)?;
        }
        if !video.key_concepts.is_empty() {
            writeln!(f, "**Key Concepts:** {}\n", video.key_concepts.join(", "))?;
        }
        writeln!(f, "[Watch Video]({})\n", video.url)?;
    }

    writeln!(f, "#### Learning Activities\n")?;
    for activity in &module.activities {
        writeln!(
            f,
            "- **{}:** {} ({})",
            activity.title, activity.description, activity.estimated_time
        )?;
    }
    writeln!(f, "\n---\n")
}

impl fmt::Display for MarkdownGuide<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let package = self.0;
        let info = &package.course_info;

        writeln!(f, "# {}\n", info.title)?;
        writeln!(f, "{}\n", info.description)?;
        writeln!(f, "**Difficulty Level:** {}  ", info.difficulty_level)?;
        writeln!(f, "**Estimated Time:** {}  ", info.estimated_time)?;
        writeln!(f, "**Total Modules:** {}\n", info.total_modules)?;

        writeln!(f, "## Learning Objectives\n")?;
        for objective in &info.learning_objectives {
            writeln!(f, "- {}", objective)?;
        }
        writeln!(f, "\n## Prerequisites\n")?;
        for prerequisite in &info.prerequisites {
            writeln!(f, "- {}", prerequisite)?;
        }

        writeln!(f, "\n## Course Modules\n")?;
        for module in &package.modules {
            write_markdown_module(f, module)?;
        }

        let guide = &package.study_guide;
        if !guide.study_schedule.is_empty() {
            writeln!(f, "## Study Schedule\n")?;
            for week in &guide.study_schedule {
                writeln!(f, "- **Week {}:** {} ({})", week.week, week.module, week.estimated_time)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "## Study Tips\n")?;
        for tip in &guide.study_tips {
            writeln!(f, "- {}", tip)?;
        }
        Ok(())
    }
}

impl fmt::Display for HtmlGuide<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let package = self.0;
        let info = &package.course_info;

        writeln!(f, "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">")?;
        writeln!(f, "<title>{}</title>\n<style>{}</style>\n</head>\n<body>", escape_html(&info.title), STYLE)?;
        writeln!(f, "<h1>{}</h1>\n<p>{}</p>", escape_html(&info.title), escape_html(&info.description))?;
        writeln!(
            f,
            "<p><strong>Difficulty:</strong> {} · <strong>Estimated Time:</strong> {}</p>",
            escape_html(&info.difficulty_level),
            escape_html(&info.estimated_time)
        )?;

        if !info.learning_objectives.is_empty() {
            writeln!(f, "<h2>Learning Objectives</h2>\n<ul>")?;
            for objective in &info.learning_objectives {
                writeln!(f, "<li>{}</li>", escape_html(objective))?;
            }
            writeln!(f, "</ul>")?;
        }

        for module in &package.modules {
            writeln!(f, "<div class=\"module\">")?;
            writeln!(f, "<h2>Module {}: {}</h2>", module.order, escape_html(&module.title))?;
            writeln!(f, "<p>{}</p>", escape_html(&module.description))?;
            writeln!(f, "<p><strong>Estimated Time:</strong> {}</p>", escape_html(&module.estimated_time))?;
            for video in &module.videos {
                writeln!(f, "<div class=\"lesson\"><h4>{}</h4>", escape_html(&video.title))?;
                if !video.summary.is_empty() {
                    writeln!(f, "<p>{}</p>", escape_html(&video.summary))?;
                }
                if let Some(href) = safe_href(&video.url) {
                    writeln!(f, "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">Watch Video</a>", href)?;
                }
                writeln!(f, "</div>")?;
            }
            if !module.key_concepts.is_empty() {
                writeln!(f, "<h3>Key Concepts</h3>\n<ul>")?;
                for concept in &module.key_concepts {
                    writeln!(f, "<li>{}</li>", escape_html(concept))?;
                }
                writeln!(f, "</ul>")?;
            }
            writeln!(f, "</div>")?;
        }

        writeln!(f, "</body>\n</html>")
    }
}
