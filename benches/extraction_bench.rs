use course_agent::extraction::{NullSink, Shape, StructuredReplyExtractor};
use course_agent::render;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::sync::Arc;

fn module_reply(lessons: usize) -> String {
    let lessons: Vec<_> = (1..=lessons)
        .map(|i| {
            json!({
                "id": format!("lesson-1-{}", i),
                "title": format!("Lesson {} with {{braces}} and \"quotes\"", i),
                "type": "video",
                "content": {"videoUrl": "https://www.youtube.com/watch?v=abcdefghijk"}
            })
        })
        .collect();
    serde_json::to_string_pretty(&json!({"id": "module-1", "title": "Basics", "lessons": lessons}))
        .unwrap_or_default()
}

fn bench_extraction(c: &mut Criterion) {
    let extractor = StructuredReplyExtractor::with_sink(Arc::new(NullSink));
    let body = module_reply(12);

    let direct = body.clone();
    c.bench_function("extract_direct", |b| {
        b.iter(|| black_box(extractor.extract(black_box(&direct), Shape::Object)))
    });

    let fenced = format!("Here is the module you asked for:\n```json\n{}\n```\nEnjoy!", body);
    c.bench_function("extract_fenced", |b| {
        b.iter(|| black_box(extractor.extract(black_box(&fenced), Shape::Object)))
    });

    let embedded = format!(
        "Sure! Note the list [1, 2, 3] first. The module: {} and that's it.",
        body
    );
    c.bench_function("extract_embedded_span", |b| {
        b.iter(|| black_box(extractor.extract(black_box(&embedded), Shape::Object)))
    });

    let prose = "I'm sorry, but I can't produce JSON for this request. ".repeat(40);
    c.bench_function("extract_failure", |b| {
        b.iter(|| black_box(extractor.extract(black_box(&prose), Shape::Object)))
    });
}

fn bench_rendering(c: &mut Criterion) {
    let extractor = StructuredReplyExtractor::with_sink(Arc::new(NullSink));
    let Ok(module) = extractor.extract(&module_reply(30), Shape::Object) else {
        return;
    };
    let document = json!({
        "course": {"title": "Bench <Course>", "description": "A & B"},
        "modules": [module.clone(), module.clone(), module],
        "assignments": [],
        "finalExam": {"title": "Final", "questions": []},
        "generatedAt": "2024-01-01T00:00:00Z",
        "agentVersion": "2.0",
        "confidence": 0.92,
        "suggestedImprovements": []
    });
    let Ok(document) = serde_json::from_value::<course_agent::CourseDocument>(document) else {
        return;
    };

    c.bench_function("render_html", |b| b.iter(|| black_box(render::html::render(&document))));
    c.bench_function("render_markdown", |b| {
        b.iter(|| black_box(render::markdown::render(&document)))
    });
}

criterion_group!(benches, bench_extraction, bench_rendering);
criterion_main!(benches);
