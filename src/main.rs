use anyhow::Result;
use clap::{Parser, Subcommand};
use healthy_feed::config::Config;
use healthy_feed::dataset::{load_dataset, write_dataset};
use healthy_feed::experiment::{self, ExperimentOptions};
use healthy_feed::server::{self, state::AppState};
use healthy_feed::youtube::api::YouTubeApi;
use healthy_feed::youtube::VideoSource;
use healthy_feed::evaluate;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "healthy-feed", version, about = "Healthy feed ranking: collection, evaluation, experiments, web app")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect public short-video metadata into a CSV dataset.
    Collect {
        #[arg(long, default_value = "datasets/shorts_dataset.csv")]
        out: PathBuf,
        /// Search query (defaults to the config value).
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        max_results: Option<u32>,
    },
    /// Check feeds against the design criteria across seeded sessions.
    Evaluate {
        #[arg(long, default_value = "datasets/shorts_dataset_tagged.csv")]
        dataset: PathBuf,
    },
    /// Run the prototype-vs-baseline experiment grid and save CSV results.
    Experiment {
        #[arg(long, default_value = "datasets/shorts_dataset_tagged.csv")]
        dataset: PathBuf,
        #[arg(long, default_value = "results/data")]
        outdir: PathBuf,
        /// Number of seeded sessions (seeds 0..n-1).
        #[arg(long, default_value_t = 10)]
        n_sessions: u64,
        #[arg(long, default_value_t = 10)]
        recent_window: usize,
        #[arg(long, default_value_t = 10)]
        overlap_topn: usize,
    },
    /// Serve the interactive web app.
    Serve {
        #[arg(long, default_value = "datasets/shorts_dataset_tagged.csv")]
        dataset: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("healthy_feed=info")),
        )
        .init();

    // Saved keys from .env (real env vars take precedence)
    Config::load_env_file();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Command::Collect { out, query, max_results } => {
            let api_key = Config::youtube_api_key()?;
            let source = YouTubeApi::new(api_key, &config.youtube);
            let query = query.unwrap_or_else(|| config.youtube.search_query.clone());
            let max_results = max_results.unwrap_or(config.youtube.max_results);

            let videos = source.collect(&query, max_results).await?;
            write_dataset(&out, &videos)?;
            tracing::info!(count = videos.len(), out = %out.display(), "dataset saved");
            println!("Saved {} videos to {}", videos.len(), out.display());
        }
        Command::Evaluate { dataset } => {
            let videos = load_dataset(&dataset)?;
            let results = evaluate::run(&videos, &config);
            evaluate::print_report(&results);
        }
        Command::Experiment { dataset, outdir, n_sessions, recent_window, overlap_topn } => {
            let videos = load_dataset(&dataset)?;
            let opts = ExperimentOptions { n_sessions, recent_window, overlap_topn };
            experiment::run_and_save(&videos, &config, &opts, &outdir)?;
        }
        Command::Serve { dataset: dataset_path } => {
            if !dataset_path.exists() {
                tracing::warn!(path = %dataset_path.display(), "default dataset missing; /api/run/local will 400 until one exists");
            }
            // Hosting platforms inject PORT; it overrides the config value.
            let port = std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(config.server.port);
            let host = config.server.host.clone();
            let state = AppState::new(Arc::new(config), dataset_path);
            server::serve(state, &host, port).await?;
        }
    }

    Ok(())
}
