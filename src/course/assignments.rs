use super::generator::log_fallback;
use super::{Assignment, CourseGenerator, CourseInfo, Module};
use crate::extraction::Shape;
use chrono::{DateTime, Duration, Utc};

fn assignment_prompt(course: &CourseInfo, module: &Module, assignment_id: &str) -> String {
    format!(
        r#"Generate an assignment for this course module:
Course: {course_title}
Module: {module_title} - {module_description}

Create a JSON object:
{{
    "id": "{assignment_id}",
    "title": "Assignment title",
    "description": "Detailed assignment description (2-3 sentences)",
    "moduleId": "{module_id}",
    "dueDate": "Due date (ISO format, 2 weeks from now)",
    "points": "Point value (50-150)",
    "submissionType": "file"
}}

Make it practical and relevant to the module content.
Return ONLY the JSON object."#,
        course_title = course.title,
        module_title = module.title,
        module_description = module.description,
        module_id = module.id,
    )
}

/// Assignment `index` (zero-based) is due `2 * (index + 1)` weeks after `now`
pub fn due_date(now: DateTime<Utc>, index: usize) -> String {
    (now + Duration::weeks(2 * (index as i64 + 1))).to_rfc3339()
}

/// Assignment used when the model reply is unusable
pub fn fallback_assignment(index: usize, module: &Module, now: DateTime<Utc>) -> Assignment {
    Assignment {
        id: format!("assignment-{}", index + 1),
        title: format!("Module {} Assignment", index + 1),
        description: format!(
            "Complete practical exercises based on {} content.",
            module.title
        ),
        module_id: module.id.clone(),
        due_date: due_date(now, index),
        points: 100,
        submission_type: "file".to_string(),
    }
}

impl CourseGenerator {
    /// Assignments for the leading modules
    pub async fn generate_assignments(&self, modules: &[Module], course: &CourseInfo) -> Vec<Assignment> {
        let now = Utc::now();
        let mut assignments = Vec::new();

        for (index, module) in modules
            .iter()
            .take(self.settings().assignment_modules)
            .enumerate()
        {
            let assignment_id = format!("assignment-{}", index + 1);
            let prompt = assignment_prompt(course, module, &assignment_id);

            let assignment = match self.request::<Assignment>(&prompt, Shape::Object).await {
                Ok(mut assignment) => {
                    assignment.due_date = due_date(now, index);
                    if assignment.id.trim().is_empty() {
                        assignment.id = assignment_id;
                    }
                    if assignment.module_id.trim().is_empty() {
                        assignment.module_id = module.id.clone();
                    }
                    assignment
                }
                Err(e) => {
                    log_fallback(&format!("assignment {}", index + 1), &e);
                    fallback_assignment(index, module, now)
                }
            };
            assignments.push(assignment);
        }

        assignments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::course::modules::fallback_module;
    use crate::llm::MockLLM;
    use std::sync::Arc;

    #[test]
    fn test_due_dates_are_two_weeks_apart() {
        let now = Utc::now();
        let first = DateTime::parse_from_rfc3339(&due_date(now, 0)).unwrap();
        let third = DateTime::parse_from_rfc3339(&due_date(now, 2)).unwrap();
        assert_eq!((first.with_timezone(&Utc) - now).num_days(), 14);
        assert_eq!((third.with_timezone(&Utc) - now).num_days(), 42);
    }

    #[tokio::test]
    async fn test_only_three_modules_get_assignments() {
        let modules: Vec<Module> = (1..=5).map(|n| fallback_module(n, &[])).collect();
        let llm = Arc::new(MockLLM::new(vec![
            Ok(r#"{"title": "Build a CLI", "points": "120", "dueDate": "yesterday"}"#.to_string()),
            Err("503".to_string()),
            Ok("no json".to_string()),
        ]));
        let generator = CourseGenerator::new(llm.clone(), GenerationConfig::default());
        let course = CourseInfo {
            title: "Rust".into(),
            ..crate::course::info::fallback_course_info(
                &crate::youtube::PlaylistData::new(Default::default(), Vec::new()),
                "",
            )
        };

        let assignments = generator.generate_assignments(&modules, &course).await;
        assert_eq!(assignments.len(), 3);
        assert_eq!(llm.prompts().len(), 3);

        assert_eq!(assignments[0].title, "Build a CLI");
        assert_eq!(assignments[0].points, 120);
        assert_eq!(assignments[0].id, "assignment-1");
        assert_eq!(assignments[0].module_id, "module-1");
        assert_ne!(assignments[0].due_date, "yesterday");

        assert_eq!(assignments[1].title, "Module 2 Assignment");
        assert_eq!(assignments[1].points, 100);
        assert_eq!(assignments[2].submission_type, "file");
    }
}
