use anyhow::Result;
use clap::{Parser, Subcommand};
use course_agent::course::course_summary;
use course_agent::{Config, CourseAgent};
use std::path::PathBuf;
#[cfg(feature = "api")]
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "course-agent")]
#[command(version, about = "Generate structured courses from YouTube playlists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a course from a playlist URL
    Generate {
        /// YouTube playlist URL
        url: String,

        /// Maximum number of videos to process
        #[arg(short, long)]
        max_videos: Option<usize>,

        /// Output directory for course files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Model name override
        #[arg(long)]
        model: Option<String>,

        /// Regenerate even when a stored course exists
        #[arg(short, long)]
        force: bool,
    },
    /// Check a playlist URL and show its metadata
    Validate {
        url: String,
    },
    /// Check that the model and the document store are reachable
    TestConnection,
    /// Run the JSON API server
    #[cfg(feature = "api")]
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn init_logging(verbose: bool, config_level: &str) {
    let filter = if verbose {
        "course_agent=debug,info".to_string()
    } else if config_level != "info" {
        format!("course_agent={},warn", config_level)
    } else {
        "course_agent=info,warn".to_string()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, load_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_logging(cli.verbose, &config.output.log_level);
    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {}", e);
    }

    match cli.command {
        Commands::Generate {
            url,
            max_videos,
            output,
            model,
            force,
        } => {
            if let Some(output) = output {
                config.output.base_dir = output;
            }
            if let Some(model) = model {
                config.llm.model = model;
            }
            config.validate()?;

            info!("🚀 Course agent starting...");
            info!("{}", config.summary());

            let agent = CourseAgent::from_config(config).await?;
            let run = match agent.process_playlist(&url, max_videos, force).await {
                Ok(run) => run,
                Err(e) => {
                    error!("❌ Course generation failed: {:#}", e);
                    return Err(e);
                }
            };

            println!("{}", course_summary(&run.document));
            if run.from_cache {
                println!("\n♻️ Served from the document store (use --force to regenerate)");
            }
            for path in &run.outputs {
                println!("💾 {}", path.display());
            }
        }

        Commands::Validate { url } => {
            let agent = CourseAgent::from_config(config).await?;
            let info = agent.validate_url(&url).await?;
            println!("✅ Valid playlist: {}", info.title);
            println!("📺 Channel: {}", info.channel_title);
            println!("🎬 Videos: {}", info.video_count);
        }

        Commands::TestConnection => {
            let agent = CourseAgent::from_config(config).await?;
            let report = agent.test_connections().await;
            let mark = |ok: bool| if ok { "✅" } else { "❌" };
            println!("{} LLM ({})", mark(report.llm_available), report.llm_provider);
            match report.store_backend {
                Some(backend) => println!("{} Document store ({})", mark(report.store_connected), backend),
                None => println!("➖ Document store disabled"),
            }
            if !report.llm_available {
                anyhow::bail!("LLM provider is not reachable");
            }
        }

        #[cfg(feature = "api")]
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;
            let agent = Arc::new(CourseAgent::from_config(config).await?);
            course_agent::api::ApiServer::new(agent).start().await?;
        }
    }

    Ok(())
}
