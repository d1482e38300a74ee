//! # mobvoi-cli
//!
//! Binary entry point for calling the Mobvoi API from a shell.
//!
//! Each subcommand maps to one vendor operation. Credentials come from
//! `--app-key`/`--app-secret` or from `MOBVOI_APP_KEY`/`MOBVOI_APP_SECRET`
//! (a `.env` file in the working directory is honoured).

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{CloneArgs, DubArgs, PhotoAvatarArgs, QueryArgs, SpeakersArgs, TtsArgs};
use mobvoi_client::{Credentials, MobvoiApi, MobvoiConfig, Region};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "mobvoi", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API key (falls back to MOBVOI_APP_KEY)
    #[arg(long, global = true, requires = "app_secret")]
    app_key: Option<String>,

    /// API secret (falls back to MOBVOI_APP_SECRET)
    #[arg(long, global = true, requires = "app_key")]
    app_secret: Option<String>,

    /// Account region: mainland or global
    #[arg(long, global = true, env = "MOBVOI_APP_REGION", value_parser = parse_region)]
    region: Option<Region>,

    /// Override the text-to-speech host
    #[arg(long, global = true, env = "MOBVOI_TTS_HOST")]
    tts_host: Option<String>,

    /// Override the avatar host
    #[arg(long, global = true, env = "MOBVOI_AVATAR_HOST")]
    avatar_host: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available speakers
    Speakers(SpeakersArgs),

    /// Synthesize speech into an MP3 file
    Tts(TtsArgs),

    /// Clone a voice from a reference recording
    Clone(CloneArgs),

    /// Submit a photo-driven avatar video job
    PhotoAvatar(PhotoAvatarArgs),

    /// Poll a photo-driven avatar job, saving the video once it is ready
    QueryPhotoAvatar(QueryArgs),

    /// Submit a video dubbing job
    Dub(DubArgs),

    /// Poll a video dubbing job, saving the video once it is ready
    QueryDub(QueryArgs),
}

fn parse_region(value: &str) -> std::result::Result<Region, String> {
    value.parse().map_err(|e: mobvoi_client::MobvoiError| e.to_string())
}

impl Cli {
    fn config(&self) -> Result<MobvoiConfig> {
        let mut config = match (&self.app_key, &self.app_secret) {
            (Some(key), Some(secret)) => {
                MobvoiConfig::new(Credentials::new(key, secret, Region::default()))
            }
            _ => MobvoiConfig::from_env()?,
        };

        if let Some(region) = self.region {
            config = config.with_region(region);
        }
        if let Some(host) = &self.tts_host {
            config = config.with_tts_host(host);
        }
        if let Some(host) = &self.avatar_host {
            config = config.with_avatar_host(host);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads env fallbacks
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| if cli.verbose { "debug" } else { "info" }.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config()?;
    debug!("Using {:?}", config.credentials);
    let api = MobvoiApi::new(config).map_err(commands::describe)?;

    match cli.command {
        Commands::Speakers(args) => commands::speakers(&api, args).await,
        Commands::Tts(args) => commands::tts(&api, args).await,
        Commands::Clone(args) => commands::clone(&api, args).await,
        Commands::PhotoAvatar(args) => commands::photo_avatar(&api, args).await,
        Commands::QueryPhotoAvatar(args) => commands::query_photo_avatar(&api, args).await,
        Commands::Dub(args) => commands::dub(&api, args).await,
        Commands::QueryDub(args) => commands::query_dub(&api, args).await,
    }
}
