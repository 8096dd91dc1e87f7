use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::llm::{LLMConfig, LLMProvider};

/// Configuration for the course agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// YouTube Data API and transcript settings
    pub youtube: YouTubeConfig,

    /// Generative model settings
    pub llm: LLMConfig,

    /// Course generation settings
    pub generation: GenerationConfig,

    /// Document store settings
    pub store: StoreConfig,

    /// Output and logging settings
    pub output: OutputConfig,

    /// HTTP server settings
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// YouTube Data API key
    pub api_key: Option<String>,

    /// Data API base URL
    pub api_base_url: String,

    /// Base URL for watch pages (caption track discovery)
    pub watch_base_url: String,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Fetch transcripts for playlist videos
    pub fetch_transcripts: bool,

    /// Preferred transcript languages, in order
    pub preferred_languages: Vec<String>,

    /// Transcripts longer than this are truncated
    pub max_transcript_chars: usize,

    /// Concurrent transcript downloads
    pub transcript_concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Videos fetched when the caller gives no limit
    pub default_max_videos: usize,

    /// Number of videos described in the content summary
    pub summary_video_limit: usize,

    /// Modules that get a generated assignment
    pub assignment_modules: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StoreBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Persist playlists and courses
    pub enabled: bool,

    pub backend: StoreBackend,

    /// Root directory for the file store
    pub dir: PathBuf,

    /// Reuse a stored course unless generation is forced
    pub reuse_cached_courses: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExportFormat {
    JSON,
    HTML,
    Markdown,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::JSON => "json",
            ExportFormat::HTML => "html",
            ExportFormat::Markdown => "md",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for generated course files
    pub base_dir: PathBuf,

    /// Formats written for every course
    pub formats: Vec<ExportFormat>,

    /// Log level
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            watch_base_url: "https://www.youtube.com".to_string(),
            request_timeout_seconds: 30,
            fetch_transcripts: true,
            preferred_languages: vec!["en".to_string()],
            max_transcript_chars: 2000,
            transcript_concurrency: num_cpus::get().min(8),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_max_videos: 20,
            summary_video_limit: 10,
            assignment_modules: 3,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: StoreBackend::File,
            dir: PathBuf::from("./data/store"),
            reuse_cached_courses: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./output"),
            formats: vec![ExportFormat::JSON, ExportFormat::HTML, ExportFormat::Markdown],
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            youtube: YouTubeConfig::default(),
            llm: LLMConfig::default(),
            generation: GenerationConfig::default(),
            store: StoreConfig::default(),
            output: OutputConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the first readable file, then apply `.env`
    /// and environment overrides
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config_paths = vec![
            PathBuf::from("course-agent.toml"),
            PathBuf::from("config/course-agent.toml"),
        ];
        if let Ok(home) = std::env::var("HOME") {
            config_paths.push(PathBuf::from(home).join(".config/course-agent/config.toml"));
        }

        let mut config = None;
        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(parsed) => {
                        tracing::info!("📄 Loaded configuration from: {}", path.display());
                        config = Some(parsed);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                    }
                }
            }
        }

        let mut config = config.unwrap_or_default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps variable names to values
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get("LLM_PROVIDER") {
            self.llm.provider = provider.parse()?;
        }

        if let Some(api_key) = get("YOUTUBE_API_KEY") {
            self.youtube.api_key = Some(api_key);
        }

        let llm_key = match self.llm.provider {
            LLMProvider::Gemini => get("GOOGLE_AI_API_KEY"),
            LLMProvider::OpenAI => get("OPENAI_API_KEY"),
            LLMProvider::LMStudio => None,
        };
        if llm_key.is_some() {
            self.llm.api_key = llm_key;
        }

        if let Some(model) = get("GEMINI_MODEL") {
            if self.llm.provider == LLMProvider::Gemini {
                self.llm.model = model;
            }
        }

        if let Some(endpoint) = get("LLM_ENDPOINT") {
            self.llm.endpoint = Some(endpoint);
        }

        if let Some(dir) = get("COURSE_STORE_DIR") {
            self.store.dir = PathBuf::from(dir);
        }

        if let Some(dir) = get("COURSE_OUTPUT_DIR") {
            self.output.base_dir = PathBuf::from(dir);
        }

        if let Some(port) = get("COURSE_AGENT_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| anyhow!("COURSE_AGENT_PORT is not a valid port: {}", port))?;
        }

        if let Some(log_level) = get("COURSE_AGENT_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration for course generation
    pub fn validate(&self) -> Result<()> {
        if self.youtube.api_key.is_none() {
            return Err(anyhow!("YOUTUBE_API_KEY is required"));
        }

        match self.llm.provider {
            LLMProvider::Gemini if self.llm.api_key.is_none() => {
                return Err(anyhow!("GOOGLE_AI_API_KEY is required for the Gemini provider"));
            }
            LLMProvider::OpenAI if self.llm.api_key.is_none() => {
                return Err(anyhow!("OPENAI_API_KEY is required for the OpenAI provider"));
            }
            _ => {}
        }

        if self.youtube.transcript_concurrency == 0 {
            return Err(anyhow!("transcript_concurrency must be greater than 0"));
        }

        if self.youtube.max_transcript_chars == 0 {
            return Err(anyhow!("max_transcript_chars must be greater than 0"));
        }

        if self.generation.default_max_videos == 0 {
            return Err(anyhow!("default_max_videos must be greater than 0"));
        }

        if self.llm.max_tokens == 0 {
            return Err(anyhow!("max_tokens must be greater than 0"));
        }

        if !self.output.base_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&self.output.base_dir) {
                return Err(anyhow!("Cannot create output directory: {}", e));
            }
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Course Agent Configuration:\n\
            - LLM Provider: {} ({})\n\
            - YouTube API Key: {}\n\
            - Transcripts: {} (max {} chars, {} concurrent)\n\
            - Store: {} ({:?} at {})\n\
            - Output Directory: {}\n\
            - Server Port: {}",
            self.llm.provider,
            self.llm.model,
            if self.youtube.api_key.is_some() { "set" } else { "missing" },
            if self.youtube.fetch_transcripts { "enabled" } else { "disabled" },
            self.youtube.max_transcript_chars,
            self.youtube.transcript_concurrency,
            if self.store.enabled { "enabled" } else { "disabled" },
            self.store.backend,
            self.store.dir.display(),
            self.output.base_dir.display(),
            self.server.port
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_youtube_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.youtube.api_key = Some(api_key.into());
        self
    }

    pub fn with_youtube_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.youtube.api_base_url = base_url.into();
        self
    }

    pub fn with_llm_provider(mut self, provider: LLMProvider) -> Self {
        self.config.llm.provider = provider;
        self
    }

    pub fn with_llm_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.llm.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.llm.model = model.into();
        self
    }

    pub fn fetch_transcripts(mut self, enable: bool) -> Self {
        self.config.youtube.fetch_transcripts = enable;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.base_dir = dir;
        self
    }

    pub fn with_formats(mut self, formats: Vec<ExportFormat>) -> Self {
        self.config.output.formats = formats;
        self
    }

    pub fn with_store(mut self, backend: StoreBackend, dir: PathBuf) -> Self {
        self.config.store.enabled = true;
        self.config.store.backend = backend;
        self.config.store.dir = dir;
        self
    }

    pub fn disable_store(mut self) -> Self {
        self.config.store.enabled = false;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
