//! Subcommand handlers
//!
//! Each handler builds what it needs from the store and the environment,
//! calls into emma-core, and prints the result.

use anyhow::{Context, Result};
use emma_api::EmmaClientFactory;
use emma_core::admin::{self, Choice};
use emma_core::traits::SettingsStore;
use emma_core::{
    ApiSession, CredentialValidator, Entry, FeedMeta, FeedProcessor, FeedSettingsSaver,
    FileSettingsStore, Form, PluginSettings,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::args::{Commands, ConfigureArgs, FeedsArgs, ProcessArgs, SaveFeedArgs};
use crate::{Config, FeedExitCode};

/// Everything a command may need
struct Host {
    store: FileSettingsStore,
    settings: PluginSettings,
    validator: CredentialValidator,
}

impl Host {
    async fn open(config: &Config) -> Result<Self> {
        let store = FileSettingsStore::new(&config.store_path)
            .await
            .with_context(|| format!("Failed to open settings store {}", config.store_path))?;

        let settings = match config.credential_override() {
            Some(settings) => {
                info!("Using Emma credentials from the environment");
                settings
            }
            None => store.plugin_settings().await?,
        };

        let factory = Arc::new(EmmaClientFactory::new(config.client_config()));

        Ok(Self {
            store,
            settings,
            validator: CredentialValidator::new(factory),
        })
    }

    async fn session(&self) -> ApiSession {
        self.validator.validate(&self.settings).await
    }
}

/// Run one subcommand
pub async fn run(command: Commands, config: &Config) -> Result<FeedExitCode> {
    let ctx = Host::open(config).await?;

    match command {
        Commands::Configure(args) => configure(&ctx, args).await,
        Commands::Check => check(&ctx).await,
        Commands::Feeds(args) => feeds(&ctx, args).await,
        Commands::Groups => {
            let session = ctx.session().await;
            print_choices(&admin::group_choices(&session).await);
            Ok(FeedExitCode::Success)
        }
        Commands::Fields => {
            let session = ctx.session().await;
            print_choices(&admin::custom_field_choices(&session, &[]).await);
            Ok(FeedExitCode::Success)
        }
        Commands::Process(args) => process(&ctx, args).await,
        Commands::SaveFeed(args) => save_feed(&ctx, args).await,
    }
}

async fn configure(ctx: &Host, args: ConfigureArgs) -> Result<FeedExitCode> {
    let settings = PluginSettings::new(
        args.account_id.trim(),
        args.public_key.trim(),
        args.private_key.trim(),
    );
    ctx.store.save_plugin_settings(&settings).await?;
    println!("Emma settings saved.");

    // Same feedback as the plugin settings page: re-check right away
    let session = ctx.validator.validate(&settings).await;
    println!("Credentials: {:?}", session.status());
    Ok(FeedExitCode::Success)
}

async fn check(ctx: &Host) -> Result<FeedExitCode> {
    let session = ctx.session().await;
    let account = session.account_check();

    println!("Credentials: {:?}", session.status());
    if let Some(reason) = session.invalid_reason() {
        println!("Reason: {:?}", reason);
    }

    if admin::can_create_feed(account) {
        println!("Account {}: ok", ctx.settings.account_id.trim());
        Ok(FeedExitCode::Success)
    } else {
        println!("{}", admin::configure_addon_message(account));
        Ok(FeedExitCode::RuntimeError)
    }
}

async fn feeds(ctx: &Host, args: FeedsArgs) -> Result<FeedExitCode> {
    let session = ctx.session().await;
    let account = session.account_check();
    if !admin::can_create_feed(account) {
        println!("{}", admin::configure_addon_message(account));
        return Ok(FeedExitCode::RuntimeError);
    }

    let columns = admin::feed_list_columns();
    let header: Vec<&str> = columns.iter().map(|(_, label)| *label).collect();
    println!("ID\tForm\tActive\t{}", header.join("\t"));

    for feed in ctx.store.list_feeds(args.form_id).await? {
        let group = admin::group_column_value(&session, &feed).await;
        println!(
            "{}\t{}\t{}\t{}\t{}",
            feed.id, feed.form_id, feed.is_active, feed.meta.feed_name, group
        );
    }

    Ok(FeedExitCode::Success)
}

async fn process(ctx: &Host, args: ProcessArgs) -> Result<FeedExitCode> {
    let feed = ctx
        .store
        .get_feed(args.feed)
        .await?
        .with_context(|| format!("Feed {} does not exist", args.feed))?;

    if !feed.is_active {
        warn!("Feed {} is inactive; entry not processed", feed.id);
        println!("Feed {} is inactive.", feed.id);
        return Ok(FeedExitCode::Success);
    }

    let entry: Entry = read_json(&args.entry).await?;
    let form = match args.form {
        Some(ref path) => read_json::<Form>(path).await?,
        None => Form {
            id: feed.form_id,
            ..Form::default()
        },
    };

    let session = ctx.session().await;
    let outcome = FeedProcessor::new().process(&session, &feed, &entry, &form).await;
    println!("{:?}", outcome);

    Ok(if outcome.is_success() {
        FeedExitCode::Success
    } else {
        FeedExitCode::RuntimeError
    })
}

async fn save_feed(ctx: &Host, args: SaveFeedArgs) -> Result<FeedExitCode> {
    let posted: FeedMeta = read_json(&args.settings).await?;
    let session = ctx.session().await;

    let report = FeedSettingsSaver::new()
        .save(&session, &ctx.store, args.feed_id, args.form_id, posted)
        .await?;

    println!("{}", report.message);
    for field in &report.created {
        println!("Created Emma field \"{}\" ({})", field.label, field.shortcut_name);
    }
    for error in &report.errors {
        println!("{}: {}", error.field, error.message);
    }

    match report.feed_id {
        Some(id) => {
            println!("Feed {} saved.", id);
            Ok(FeedExitCode::Success)
        }
        None => {
            // Echo the corrected settings so they can be fixed and re-posted
            println!("{}", serde_json::to_string_pretty(&report.posted)?);
            Ok(FeedExitCode::RuntimeError)
        }
    }
}

fn print_choices(choices: &[Choice]) {
    for choice in choices {
        println!("{}\t{}", choice.value, choice.label);
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
