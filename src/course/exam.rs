use super::generator::log_fallback;
use super::{CourseGenerator, CourseInfo, FinalExam, Module, Question};
use crate::extraction::Shape;
use serde_json::json;

fn final_exam_prompt(course: &CourseInfo, modules: &[Module]) -> String {
    let covered: Vec<_> = modules
        .iter()
        .map(|m| json!({"title": m.title, "description": m.description}))
        .collect();
    let covered_json = serde_json::to_string_pretty(&covered).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Generate a comprehensive final exam for this course:
Course: {title}
Description: {description}

Modules covered:
{covered_json}

Create a JSON object:
{{
    "title": "Final exam title",
    "description": "Exam description",
    "timeLimit": "Time limit in minutes (90-180)",
    "passingScore": "Passing score percentage (70-80)",
    "questions": [
        {{
            "id": "final-q1",
            "question": "Essay question text",
            "type": "essay",
            "points": "Point value (10-20)"
        }},
        {{
            "id": "final-q2",
            "question": "Multiple choice question",
            "type": "multiple-choice",
            "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
            "correctAnswer": 0,
            "points": "Point value (5-10)"
        }}
    ]
}}

Include 3-5 questions mixing essay and multiple choice.
Return ONLY the JSON object."#,
        title = course.title,
        description = course.description,
    )
}

/// Exam used when the model reply is unusable
pub fn fallback_final_exam(course: &CourseInfo) -> FinalExam {
    FinalExam {
        title: format!("{} Final Exam", course.title),
        description: "Comprehensive exam covering all course topics and modules.".to_string(),
        time_limit: 120,
        passing_score: 75,
        questions: vec![
            Question {
                id: "final-q1".to_string(),
                question: format!(
                    "Explain the key concepts covered in {} and how they relate to each other.",
                    course.title
                ),
                question_type: "essay".to_string(),
                points: Some(20),
                ..Question::default()
            },
            Question {
                id: "final-q2".to_string(),
                question: "Which of the following best describes the main focus of this course?"
                    .to_string(),
                question_type: "multiple-choice".to_string(),
                options: vec![
                    "Theoretical foundations".to_string(),
                    "Practical applications".to_string(),
                    "Historical context".to_string(),
                    "Future trends".to_string(),
                ],
                correct_answer: Some(json!(1)),
                points: Some(10),
                ..Question::default()
            },
        ],
    }
}

impl CourseGenerator {
    pub async fn generate_final_exam(&self, course: &CourseInfo, modules: &[Module]) -> FinalExam {
        let prompt = final_exam_prompt(course, modules);

        match self.request::<FinalExam>(&prompt, Shape::Object).await {
            Ok(exam) if !exam.questions.is_empty() => exam,
            Ok(_) => {
                tracing::warn!("⚠️ Using fallback final exam: reply had no questions");
                fallback_final_exam(course)
            }
            Err(e) => {
                log_fallback("final exam", &e);
                fallback_final_exam(course)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::llm::MockLLM;
    use std::sync::Arc;

    fn course() -> CourseInfo {
        CourseInfo {
            title: "Rust".into(),
            ..crate::course::info::fallback_course_info(
                &crate::youtube::PlaylistData::new(Default::default(), Vec::new()),
                "",
            )
        }
    }

    #[test]
    fn test_fallback_exam() {
        let exam = fallback_final_exam(&course());
        assert_eq!(exam.title, "Rust Final Exam");
        assert_eq!(exam.time_limit, 120);
        assert_eq!(exam.passing_score, 75);
        let types: Vec<_> = exam.questions.iter().map(|q| q.question_type.as_str()).collect();
        assert_eq!(types, vec!["essay", "multiple-choice"]);
    }

    #[tokio::test]
    async fn test_exam_from_reply() {
        let reply = r#"{"title": "Rust Final", "timeLimit": "90 minutes", "passingScore": 70,
            "questions": [{"id": "final-q1", "question": "Why ownership?", "type": "essay", "points": "15"}]}"#;
        let generator = CourseGenerator::new(
            Arc::new(MockLLM::new(vec![Ok(reply.to_string())])),
            GenerationConfig::default(),
        );

        let exam = generator.generate_final_exam(&course(), &[]).await;
        assert_eq!(exam.title, "Rust Final");
        assert_eq!(exam.time_limit, 90);
        assert_eq!(exam.questions[0].points, Some(15));
    }

    #[tokio::test]
    async fn test_exam_without_questions_uses_fallback() {
        let generator = CourseGenerator::new(
            Arc::new(MockLLM::new(vec![
                Ok(r#"{"title": "Empty", "questions": []}"#.to_string()),
                Ok(r#"["essay", "multiple-choice"]"#.to_string()),
            ])),
            GenerationConfig::default(),
        );
        let empty = generator.generate_final_exam(&course(), &[]).await;
        assert_eq!(empty, fallback_final_exam(&course()));

        let list = generator.generate_final_exam(&course(), &[]).await;
        assert_eq!(list, fallback_final_exam(&course()));
    }
}
