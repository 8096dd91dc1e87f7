use async_trait::async_trait;
use course_agent::config::{ConfigBuilder, ExportFormat};
use course_agent::course::LessonType;
use course_agent::store::{records, Collection, DocumentStore, MemoryDocumentStore};
use course_agent::youtube::{watch_url, PlaylistData, PlaylistInfo, PlaylistSource, VideoInfo};
use course_agent::{CourseAgent, CourseError, CourseResult, MockLLM};
use std::sync::Arc;
use tempfile::TempDir;

struct FakePlaylist {
    videos: usize,
}

#[async_trait]
impl PlaylistSource for FakePlaylist {
    async fn playlist_info(&self, playlist_id: &str) -> CourseResult<PlaylistInfo> {
        if playlist_id != "PLfake" {
            return Err(CourseError::PlaylistNotFound(playlist_id.to_string()));
        }
        Ok(PlaylistInfo {
            id: "PLfake".into(),
            title: "Web Development with Rust".into(),
            description: "Build web services step by step".into(),
            channel_title: "Rustacean Station".into(),
            thumbnail: "https://i.ytimg.com/fake.jpg".into(),
            video_count: self.videos as u64,
            ..PlaylistInfo::default()
        })
    }

    async fn extract_playlist_data(&self, _url: &str, max_videos: usize) -> CourseResult<PlaylistData> {
        let info = self.playlist_info("PLfake").await?;
        let videos = (0..self.videos.min(max_videos))
            .map(|i| {
                let id = format!("web{:08}", i);
                VideoInfo {
                    url: watch_url(&id),
                    title: format!("Episode {}", i + 1),
                    description: "An introduction to handlers".into(),
                    duration: "PT10M".into(),
                    position: i as u32,
                    transcript: (i % 2 == 0).then(|| "In this episode we write a handler".to_string()),
                    video_id: id,
                    ..VideoInfo::default()
                }
            })
            .collect();
        Ok(PlaylistData::new(info, videos))
    }
}

const URL: &str = "https://www.youtube.com/playlist?list=PLfake";

fn agent(dir: &TempDir, llm: Arc<MockLLM>, store: Arc<MemoryDocumentStore>, videos: usize) -> CourseAgent {
    let config = ConfigBuilder::new()
        .with_output_dir(dir.path().join("courses"))
        .with_formats(vec![ExportFormat::JSON, ExportFormat::HTML, ExportFormat::Markdown])
        .build();
    CourseAgent::new(config, Arc::new(FakePlaylist { videos }), llm, Some(store))
}

#[tokio::test]
async fn test_full_run_with_model_replies() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(MemoryDocumentStore::new());
    let llm = Arc::new(MockLLM::new(vec![
        Ok("```json\n{\"title\": \"Rust for the Web\", \"level\": \"Intermediate\", \"price\": \"49\", \"thumbnail\": \"placeholder\"}\n```".into()),
        Ok("{\"title\": \"Routing\", \"lessons\": [{\"type\": \"video\"}, {\"type\": \"video\"}, {\"type\": \"quiz\"}]}".into()),
        Ok("Module two: {\"title\": \"State\", \"lessons\": [{\"type\": \"video\"}]}".into()),
        Err("connection reset".into()),
        Ok("{\"title\": \"Write a router\"}".into()),
        Ok("{\"title\": \"Share state\"}".into()),
        Ok("not json at all".into()),
        Ok("{\"title\": \"Final\", \"questions\": [{\"id\": \"f1\", \"question\": \"What is a handler?\", \"type\": \"essay\"}]}".into()),
    ]));
    let agent = agent(&dir, llm.clone(), store.clone(), 6);

    let run = agent.process_playlist(URL, Some(6), false).await.unwrap();
    let doc = &run.document;

    assert!(!run.from_cache);
    assert_eq!(llm.remaining(), 0);
    assert_eq!(doc.course.title, "Rust for the Web");
    assert_eq!(doc.course.price, 49.0);
    assert_eq!(doc.course.thumbnail, "https://i.ytimg.com/fake.jpg");

    assert_eq!(doc.modules.len(), 3);
    assert_eq!(doc.modules[0].title, "Routing");
    assert_eq!(doc.modules[2].title, "Module 3");
    assert_eq!(doc.modules[2].lessons.last().map(|l| l.lesson_type), Some(LessonType::Quiz));
    assert_eq!(
        doc.video_ids(),
        vec!["web00000000", "web00000001", "web00000002", "web00000004", "web00000005"]
    );

    assert_eq!(doc.assignments.len(), 3);
    assert_eq!(doc.assignments[2].title, "Module 3 Assignment");
    assert_eq!(doc.final_exam.questions.len(), 1);

    // every prompt after the first carries the course title
    let prompts = llm.prompts();
    assert!(prompts[0].contains("Web Development with Rust"));
    assert!(prompts[1..].iter().all(|p| p.contains("Rust for the Web")));

    assert_eq!(run.outputs.len(), 3);
    for path in &run.outputs {
        assert!(path.exists(), "{} was not written", path.display());
    }

    let stored = records::load_playlist(store.as_ref(), "PLfake").await.unwrap().unwrap();
    assert_eq!(stored.video_count, 6);
    assert_eq!(records::load_course(store.as_ref(), "PLfake").await.unwrap().as_ref(), Some(doc));
}

#[tokio::test]
async fn test_unusable_model_still_produces_a_course() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(MemoryDocumentStore::new());
    let agent = agent(&dir, Arc::new(MockLLM::failing()), store.clone(), 2);

    let run = agent.process_playlist(URL, None, false).await.unwrap();
    let doc = &run.document;

    assert_eq!(doc.course.title, "Web Development with Rust");
    assert_eq!(doc.course.estimated_hours, 1.0);
    assert_eq!(doc.modules.len(), 2);
    assert_eq!(doc.assignments.len(), 2);
    assert_eq!(doc.final_exam.passing_score, 75);
    assert_eq!(doc.suggested_improvements.len(), 5);
    assert_eq!(store.list(Collection::Courses, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_stored_course_is_reused_until_forced() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(MemoryDocumentStore::new());
    let llm = Arc::new(MockLLM::failing());
    let agent = agent(&dir, llm.clone(), store, 3);

    agent.process_playlist(URL, None, false).await.unwrap();
    let calls_after_first = llm.prompts().len();

    let cached = agent.process_playlist(URL, None, false).await.unwrap();
    assert!(cached.from_cache);
    assert!(cached.outputs.is_empty());
    assert_eq!(llm.prompts().len(), calls_after_first);

    let forced = agent.process_playlist(URL, None, true).await.unwrap();
    assert!(!forced.from_cache);
    assert!(llm.prompts().len() > calls_after_first);
}
