use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use farmmate_infrastructure::FarmmatePaths;

mod commands;
mod context;
mod logging;
mod output;

use context::Context;

#[derive(Parser)]
#[command(name = "farmmate")]
#[command(about = "FarmMate - farming assistant client", long_about = None)]
struct Cli {
    /// Config directory (default: $FARMMATE_HOME, then the platform config dir)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Backend base URL, overriding config.toml and FARMMATE_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Also write logs to <home>/logs/
    #[arg(long, global = true)]
    log_file: bool,

    /// Debug logging for FarmMate components
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register this profile and fetch the crop catalog
    Init,
    /// List crops, synced with the backend
    Crops {
        /// Show the cached catalog without asking the backend
        #[arg(long)]
        offline: bool,
    },
    /// Create, modify, delete or select a crop thread
    Crop {
        #[command(subcommand)]
        action: CropAction,
    },
    /// Read or write a crop's chat thread
    Chat {
        #[command(subcommand)]
        action: ChatAction,
    },
    /// Bookmark answers and browse saved bookmarks
    Bookmark {
        #[command(subcommand)]
        action: BookmarkAction,
    },
    /// Weather at a crop's address
    Weather {
        /// Crop name (default: selected crop)
        crop: Option<String>,
        /// Show the short-term forecast instead of current weather
        #[arg(long)]
        short_term: bool,
    },
    /// Pest alerts for a crop
    Pests {
        /// Crop name (default: selected crop)
        crop: Option<String>,
    },
    /// Details of one pest or disease
    Pest {
        /// Pest name, as listed by `pests`
        name: String,
        /// Crop name (default: selected crop)
        #[arg(long)]
        crop: Option<String>,
    },
    /// Recommended actions for a crop
    Guidance {
        /// Crop name (default: selected crop)
        crop: Option<String>,
    },
    /// Forget the member id, crop catalog and selected crop
    Reset,
}

#[derive(Subcommand)]
pub(crate) enum CropAction {
    /// Start growing a crop
    Create {
        crop: String,
        #[arg(long)]
        address: String,
        /// Planting date, YYYY-MM-DD
        #[arg(long)]
        planted_at: String,
    },
    /// Change the address or planting date of a crop
    Modify {
        crop: String,
        #[arg(long)]
        address: String,
        /// Planting date, YYYY-MM-DD
        #[arg(long)]
        planted_at: String,
    },
    /// Stop growing a crop and delete its thread
    Delete { crop: String },
    /// Make a crop the default for other commands
    Select { crop: String },
}

#[derive(Subcommand)]
pub(crate) enum ChatAction {
    /// Print the thread with message numbers
    Show {
        /// Crop name (default: selected crop)
        crop: Option<String>,
    },
    /// Send a message and print the answer
    Send {
        message: String,
        /// Crop name (default: selected crop)
        #[arg(long)]
        crop: Option<String>,
    },
}

#[derive(Subcommand)]
pub(crate) enum BookmarkAction {
    /// Bookmark an answer, or remove its bookmark
    Toggle {
        /// Message number as printed by `chat show`
        index: usize,
        /// Crop name (default: selected crop)
        #[arg(long)]
        crop: Option<String>,
    },
    /// Saved bookmarks grouped by week
    List {
        /// Crop name (default: selected crop)
        crop: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let paths = FarmmatePaths::resolve(cli.home.as_deref())?;
    let _log_guard = logging::init(cli.verbose, cli.log_file.then(|| paths.logs_dir()))?;

    let ctx = Context::open(paths, cli.base_url)?;
    ctx.cancel_on_ctrl_c();

    match cli.command {
        Commands::Init => commands::setup::init(&ctx).await?,
        Commands::Reset => commands::setup::reset(&ctx)?,
        Commands::Crops { offline } => commands::crop::list(&ctx, offline).await?,
        Commands::Crop { action } => commands::crop::run(&ctx, action).await?,
        Commands::Chat { action } => commands::chat::run(&ctx, action).await?,
        Commands::Bookmark { action } => commands::chat::bookmark(&ctx, action).await?,
        Commands::Weather { crop, short_term } => {
            commands::dashboard::weather(&ctx, crop, short_term).await?
        }
        Commands::Pests { crop } => commands::dashboard::pests(&ctx, crop).await?,
        Commands::Pest { name, crop } => commands::dashboard::pest(&ctx, &name, crop).await?,
        Commands::Guidance { crop } => commands::dashboard::guidance(&ctx, crop).await?,
    }

    Ok(())
}
