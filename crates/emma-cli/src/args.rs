use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "emma-feed", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Store the Emma account ID and API keys
    Configure(ConfigureArgs),
    /// Check the stored credentials against Emma
    Check,
    /// List feeds with their Emma group
    Feeds(FeedsArgs),
    /// List the Emma groups a feed can target
    Groups,
    /// List the Emma custom fields a feed can map to
    Fields,
    /// Send one form entry through a feed
    Process(ProcessArgs),
    /// Create or update a feed from a settings file
    SaveFeed(SaveFeedArgs),
}

#[derive(Debug, Args)]
pub struct ConfigureArgs {
    #[arg(long)]
    pub account_id: String,

    #[arg(long)]
    pub public_key: String,

    #[arg(long)]
    pub private_key: String,
}

#[derive(Debug, Args)]
pub struct FeedsArgs {
    /// Only feeds of this form
    #[arg(long)]
    pub form_id: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Feed id
    #[arg(long)]
    pub feed: u64,

    /// Entry JSON file (field id -> submitted value)
    #[arg(long)]
    pub entry: PathBuf,

    /// Form JSON file, needed for multi-input fields and form_title
    #[arg(long)]
    pub form: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SaveFeedArgs {
    #[arg(long)]
    pub form_id: u64,

    /// Existing feed to update; a new feed is created when omitted
    #[arg(long)]
    pub feed_id: Option<u64>,

    /// Feed settings JSON file
    #[arg(long)]
    pub settings: PathBuf,
}
