use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use course_agent::store::records;
use course_agent::store::{Collection, DocumentStore, FileDocumentStore};
use course_agent::Config;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "store-manager")]
#[command(about = "Document store management utility")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Store directory (defaults to the configured one)
    #[arg(long)]
    store_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored playlists
    List {
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
    /// Search playlists by title or description
    Search {
        query: String,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Show a stored playlist with its analysis
    Show {
        playlist_id: String,
    },
    /// Delete a playlist with its analysis and course
    Delete {
        playlist_id: String,
    },
    /// Document counts per collection
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    let store_dir = match cli.store_dir {
        Some(dir) => dir,
        None => Config::load()?.store.dir,
    };
    let store = FileDocumentStore::open(store_dir).await?;

    match cli.command {
        Commands::List { limit } => {
            let playlists = records::list_playlists(&store, limit).await?;
            if playlists.is_empty() {
                info!("📭 No stored playlists");
                return Ok(());
            }
            info!("📚 Found {} playlists:", playlists.len());
            for p in playlists {
                info!(
                    "  {} - {} ({} videos, {}), updated {}",
                    p.playlist_id,
                    p.title,
                    p.video_count,
                    p.channel_title,
                    p.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }

        Commands::Search { query, limit } => {
            let found = records::search_playlists(&store, &query, limit).await?;
            info!("🔍 {} playlists match \"{}\"", found.len(), query);
            for p in found {
                info!("  {} - {}", p.playlist_id, p.title);
            }
        }

        Commands::Show { playlist_id } => {
            let Some(playlist) = records::load_playlist(&store, &playlist_id).await? else {
                bail!("Playlist {} not found", playlist_id);
            };
            info!("📋 {} ({})", playlist.title, playlist.url);
            info!("  Channel: {}", playlist.channel_title);
            info!("  Videos: {}", playlist.video_count);
            for video in &playlist.videos {
                let transcript = if video.has_transcript { "📝" } else { "  " };
                info!("  {} {:>3}. {} [{}]", transcript, video.position + 1, video.title, video.duration);
            }
            if let Some(analysis) = records::load_analysis(&store, &playlist_id).await? {
                info!(
                    "  Analysis: {} (complexity {:.2}), {} of {} videos with transcripts",
                    analysis.difficulty,
                    analysis.complexity_score,
                    analysis.videos_with_transcripts,
                    analysis.total_videos
                );
            }
            let has_course = store.get(Collection::Courses, &playlist_id).await?.is_some();
            info!("  Course stored: {}", if has_course { "yes" } else { "no" });
        }

        Commands::Delete { playlist_id } => {
            if records::delete_playlist(&store, &playlist_id).await? {
                info!("✅ Deleted playlist {}", playlist_id);
            } else {
                warn!("⚠️ Playlist not found: {}", playlist_id);
            }
        }

        Commands::Stats => {
            info!("📊 Store statistics ({}):", store.root().display());
            for collection in Collection::ALL {
                let count = store.list(collection, usize::MAX).await?.len();
                info!("  {}: {}", collection, count);
            }
        }
    }

    Ok(())
}
