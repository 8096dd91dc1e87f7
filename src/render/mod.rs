//! Human-readable renderings of course documents and learning packages

pub mod guide;
pub mod html;
pub mod markdown;

pub use html::escape_html;

use crate::config::ExportFormat;
use crate::course::{CourseDocument, LearningPackage};
use crate::error::CourseResult;

/// Render `document` in `format`
pub fn render(document: &CourseDocument, format: ExportFormat) -> CourseResult<String> {
    Ok(match format {
        ExportFormat::JSON => serde_json::to_string_pretty(document)?,
        ExportFormat::HTML => html::render(document),
        ExportFormat::Markdown => markdown::render(document),
    })
}

/// Render a learning package in `format`
pub fn render_package(package: &LearningPackage, format: ExportFormat) -> CourseResult<String> {
    Ok(match format {
        ExportFormat::JSON => serde_json::to_string_pretty(package)?,
        ExportFormat::HTML => guide::HtmlGuide(package).to_string(),
        ExportFormat::Markdown => guide::MarkdownGuide(package).to_string(),
    })
}
