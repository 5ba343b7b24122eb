/// Ampache CLI - browse and play an Ampache catalog from the terminal
use ampache_catalog::{Catalog, SortOrder};
use ampache_cli::{AppSettings, Overrides, SimulatedBackend};
use ampache_client::{AmpacheClient, ClientConfig};
use ampache_playback::{PlaybackController, PlayerState, StatusEvent};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ampache-cli")]
#[command(about = "Browse and play an Ampache music catalog", long_about = None)]
struct Cli {
    /// Server credentials file (JSON, created on first run)
    #[arg(long, global = true, env = "AMPACHE_CONFIG", default_value = "configuration.json")]
    config: PathBuf,

    /// Optional TOML file with [catalog] and [player] settings
    #[arg(long, global = true, env = "AMPACHE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Server URL, overriding the configuration
    #[arg(long, global = true)]
    server_url: Option<String>,

    /// User name, overriding the configuration
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store server and login data
    Configure {
        #[arg(short, long)]
        server: String,
        #[arg(short, long)]
        user: String,
        /// Password (only its hash is stored)
        #[arg(short, long, env = "AMPACHE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List albums
    Albums {
        #[arg(short, long, value_enum, default_value_t = SortArg::Artist)]
        sort: SortArg,
        /// Show at most this many albums
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List the tracks of an album
    Tracks {
        /// Album position in artist order
        index: usize,
    },
    /// Play an album until its last track ends
    Play {
        /// Album position in artist order
        index: usize,
        /// Playback speed-up, overriding the settings
        #[arg(long)]
        time_scale: Option<f64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Artist,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortOrder::ByName,
            SortArg::Artist => SortOrder::ByArtist,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ampache_cli=info,ampache_catalog=info,ampache_playback=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Commands::Configure {
        server,
        user,
        password,
    } = &cli.command
    {
        return configure(&cli.config, server, user, password);
    }

    let settings = AppSettings::load(
        &cli.config,
        cli.settings.as_deref(),
        Overrides {
            server_url: cli.server_url.clone(),
            user: cli.user.clone(),
        },
    )?;

    match cli.command {
        Commands::Configure { .. } => {}
        Commands::Albums { sort, limit } => {
            list_albums(&settings, sort.into(), limit).await?;
        }
        Commands::Tracks { index } => {
            list_tracks(&settings, index).await?;
        }
        Commands::Play { index, time_scale } => {
            play_album(&settings, index, time_scale).await?;
        }
    }

    Ok(())
}

fn configure(path: &Path, server: &str, user: &str, password: &str) -> anyhow::Result<()> {
    let mut config = ClientConfig::load(path)?;
    config.server_url = server.to_string();
    config.user = user.to_string();
    config.set_password(password);
    config.validate()?;
    config.save(path)?;

    tracing::info!("Saved login data to {}", path.display());
    Ok(())
}

async fn connect(settings: &AppSettings) -> anyhow::Result<Catalog> {
    if !settings.client.login_data_available() {
        bail!("No login data; run `ampache-cli configure` first");
    }
    settings.client.validate()?;

    let client = AmpacheClient::new(settings.client.clone())?;
    let catalog = Catalog::new(Arc::new(client), settings.catalog.clone());

    let session = catalog
        .connect()
        .await
        .with_context(|| format!("Failed to connect to {}", settings.client.server_url))?;
    tracing::info!(
        albums = session.album_count,
        artists = session.artist_count,
        songs = session.song_count,
        "Connected"
    );

    Ok(catalog)
}

async fn list_albums(
    settings: &AppSettings,
    order: SortOrder,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let catalog = connect(settings).await?;
    catalog.set_sort_order(order);

    let count = limit.map_or(catalog.album_count(), |l| l.min(catalog.album_count()));
    for index in 0..count {
        let album = catalog.album_by_index(index).await?;
        println!(
            "{:>5}  {} - {} ({} tracks)",
            index, album.artist, album.name, album.track_count
        );
    }

    Ok(())
}

async fn list_tracks(settings: &AppSettings, index: usize) -> anyhow::Result<()> {
    let catalog = connect(settings).await?;
    let album = catalog.album_by_index(index).await?;
    println!("{} - {}", album.artist, album.name);

    for song in catalog.album_songs(album.id).await? {
        println!(
            "{:>3}. {} [{}]",
            song.track_number,
            song.title,
            format_duration(Duration::from_secs(u64::from(song.duration_seconds)))
        );
    }

    Ok(())
}

async fn play_album(
    settings: &AppSettings,
    index: usize,
    time_scale: Option<f64>,
) -> anyhow::Result<()> {
    let catalog = connect(settings).await?;
    let album = catalog.album_by_index(index).await?;
    let entries = catalog.album_playlist(album.id).await?;
    if entries.is_empty() {
        bail!("Album '{}' has no tracks", album.name);
    }

    let backend = SimulatedBackend::new(
        &entries,
        time_scale.unwrap_or(settings.player.time_scale),
    );
    let mut controller = PlaybackController::new(Box::new(backend))?;
    let events = controller.subscribe();

    println!("Playing {} - {}", album.artist, album.name);
    controller.start()?;
    controller.add_tracks(entries, true)?;
    controller.play()?;

    let finished = tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let mut shown_index = None;
        for event in events.iter() {
            if event.state_changed() || event.playlist_index != shown_index {
                print_status(&event);
                shown_index = event.playlist_index;
            }

            if let Some(error) = event.error {
                bail!("Playback failed: {}", error);
            }
            if event.new_state == PlayerState::Error {
                bail!("Playback entered the error state");
            }
            if event.new_state == PlayerState::Stopped
                && !matches!(event.old_state, PlayerState::Undefined | PlayerState::Stopped)
            {
                return Ok(());
            }
        }
        Ok(())
    })
    .await?;

    controller.shutdown();
    finished
}

fn print_status(event: &StatusEvent) {
    match event.playlist_index {
        Some(position) => println!(
            "[{:?}] {}/{} track {} ({})",
            event.new_state,
            position + 1,
            event.playlist_len,
            event.track_index,
            format_duration(Duration::from_secs(u64::from(event.duration_seconds)))
        ),
        None => println!("[{:?}]", event.new_state),
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
