#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::uninlined_format_args, clippy::module_name_repetitions)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use tgvault::client::GatewayClient;
use tgvault::config::Config;
use tgvault::filters::FilterKind;
use tgvault::namers::NamerKind;
use tgvault::report;
use tgvault::session::{DownloadSession, MediaArchiver};

#[derive(Parser, Debug)]
#[command(name = "tgvault", version, about = "Archive media from unread messages across your Telegram channels")]
struct Cli {
    /// Path to config.toml (default: ~/.tgvault/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download media from unread messages (the default)
    Run {
        /// Only process these channels (exact title match); repeatable
        #[arg(long = "channel")]
        channels: Vec<String>,

        /// Root directory for downloaded media
        #[arg(long)]
        download_path: Option<PathBuf>,

        /// Leave processed messages unread
        #[arg(long)]
        no_mark_read: bool,

        /// Abort after the first channel that reports an error
        #[arg(long)]
        fail_fast: bool,

        /// Which media to download
        #[arg(long, value_enum)]
        filter: Option<FilterKind>,

        /// Filename strategy
        #[arg(long, value_enum)]
        namer: Option<NamerKind>,

        /// Where to write the plain-text session summary
        #[arg(long)]
        summary_file: Option<PathBuf>,
    },
    /// List subscribed channels with their unread counts
    Channels,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging - respects RUST_LOG env var, defaults to WARN so the
    // summary output stays readable.
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run {
        channels: Vec::new(),
        download_path: None,
        no_mark_read: false,
        fail_fast: false,
        filter: None,
        namer: None,
        summary_file: None,
    }) {
        Commands::Run {
            channels,
            download_path,
            no_mark_read,
            fail_fast,
            filter,
            namer,
            summary_file,
        } => {
            if let Some(path) = download_path {
                config.download.path = path;
            }
            if no_mark_read {
                config.download.mark_as_read = false;
            }
            if fail_fast {
                config.download.fail_fast = true;
            }
            if let Some(filter) = filter {
                config.download.filter = filter;
            }
            if let Some(namer) = namer {
                config.download.namer = namer;
            }
            if let Some(path) = summary_file {
                config.download.summary_file = Some(path);
            }
            run_session(&config, &channels).await
        }
        Commands::Channels => list_channels(&config).await,
    }
}

fn ensure_valid(config: &Config) {
    let errors = config.validate();
    if errors.is_empty() {
        return;
    }

    eprintln!("❌ Configuration errors:");
    for error in &errors {
        eprintln!("   - {error}");
    }
    eprintln!("\n💡 Set the following environment variables or add them to config.toml:");
    eprintln!("   - TELEGRAM_API_ID (your API ID from https://my.telegram.org/apps)");
    eprintln!("   - TELEGRAM_API_HASH (your API hash from https://my.telegram.org/apps)");
    eprintln!("   - TELEGRAM_PHONE (your phone number with country code)");
    std::process::exit(1);
}

fn build_archiver(config: &Config) -> MediaArchiver {
    let client = Arc::new(
        GatewayClient::new(config.gateway_url.clone())
            .with_session_name(config.telegram.session_name.clone()),
    );
    MediaArchiver::new(client, config.download.path.clone())
        .with_media_filter(config.download.filter.instantiate())
        .with_file_namer(config.download.namer.instantiate())
        .with_fail_fast(config.download.fail_fast)
}

async fn run_session(config: &Config, channels: &[String]) -> Result<()> {
    ensure_valid(config);

    println!("🚀 tgvault");
    println!("{}", "=".repeat(50));
    println!("📱 Connecting with phone: {}", config.telegram.phone_number);
    println!(
        "📁 Downloads will be saved to: {}",
        config.download.path.display()
    );

    let archiver = build_archiver(config);
    archiver.connect().await?;

    println!("\n🔍 Scanning channels for unread media...");
    let mark_as_read = config.download.mark_as_read;
    let session: Option<DownloadSession> = tokio::select! {
        session = async {
            if channels.is_empty() {
                archiver.run_all(mark_as_read).await
            } else {
                archiver.run_subset(channels, mark_as_read).await
            }
        } => Some(session),
        _ = tokio::signal::ctrl_c() => None,
    };

    // The connection is released no matter how the run ended.
    archiver.disconnect().await;

    let Some(session) = session else {
        println!("\n⏹️  Download interrupted by user.");
        return Ok(());
    };

    print!("{}", report::render_summary(&session));

    let summary_path = config.summary_path();
    match report::write_summary_file(&session, &summary_path) {
        Ok(()) => println!("\n📋 Session summary saved to: {}", summary_path.display()),
        Err(e) => eprintln!("\n⚠ Could not save session summary: {e}"),
    }

    if session.total_downloaded > 0 {
        println!(
            "\n✅ Successfully downloaded {} files!",
            session.total_downloaded
        );
    } else {
        println!("\nℹ️  No new media files found to download.");
    }

    Ok(())
}

async fn list_channels(config: &Config) -> Result<()> {
    ensure_valid(config);

    let archiver = build_archiver(config);
    archiver.connect().await?;
    let channels = archiver.list_channels().await;
    archiver.disconnect().await;

    let channels = channels?;
    if channels.is_empty() {
        println!("No subscribed channels found.");
        return Ok(());
    }

    println!("{:<40} {:>8}", "Channel", "Unread");
    println!("{}", "-".repeat(50));
    for channel in channels {
        println!("{:<40} {:>8}", channel.title, channel.unread_count);
    }
    Ok(())
}
