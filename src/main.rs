use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use autowaifu::application::{
    BroadcastUseCase, FeedbackTracker, PrefetchCache, RefillUseCase, Scheduler, TargetRegistry,
};
use autowaifu::domain::entities::{BotToken, GroupId, TargetId};
use autowaifu::domain::ports::{DeliveryPort, ImageSourcePort, RegistryStorePort};
use autowaifu::infrastructure::{
    AppConfig, CliArgs, Command, DiscordRestClient, ImageApiClient, JsonRegistryStore,
    StorageManager,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let mut config = match StorageManager::new() {
        Ok(storage) => storage.load_config(args.config.as_deref())?,
        Err(e) => {
            eprintln!("Using default configuration: {e}");
            AppConfig::default()
        }
    };
    config.merge_with_args(args);
    Ok(config)
}

fn registry_path(config: &AppConfig) -> Result<PathBuf> {
    config
        .registry_path
        .clone()
        .or_else(JsonRegistryStore::default_path)
        .ok_or_else(|| eyre!("could not determine registry path, pass --registry-path"))
}

struct Services {
    discord: Arc<DiscordRestClient>,
    registry: Arc<TargetRegistry>,
}

fn build_services(args: &CliArgs, config: &AppConfig) -> Result<Services> {
    let raw_token = args
        .token
        .clone()
        .ok_or_else(|| eyre!("no bot token, set DISCORD_BOT_TOKEN or pass --token"))?;
    let token = BotToken::new(raw_token).ok_or_else(|| eyre!("bot token is malformed"))?;

    let discord = Arc::new(
        DiscordRestClient::with_base_url(token, config.discord.api_base_url.clone())
            .wrap_err("failed to create Discord client")?,
    );
    let store: Arc<dyn RegistryStorePort> =
        Arc::new(JsonRegistryStore::new(registry_path(config)?));
    let platform: Arc<dyn DeliveryPort> = discord.clone();
    let registry = Arc::new(TargetRegistry::new(store, platform));

    Ok(Services { discord, registry })
}

async fn run(config: &AppConfig, services: Services) -> Result<()> {
    let Services { discord, registry } = services;
    let platform: Arc<dyn DeliveryPort> = discord.clone();

    let source: Arc<dyn ImageSourcePort> = Arc::new(
        ImageApiClient::with_base_url(config.scheduler.api_base_url.clone())
            .with_rate_limit(config.scheduler.rate_limit)
            .with_timeout(config.scheduler.request_timeout()),
    );
    let cache = Arc::new(PrefetchCache::new(config.scheduler.cache_size));

    let refill = RefillUseCase::new(source.clone(), cache.clone())
        .with_max_batch(config.scheduler.refill_batch);
    let broadcast = BroadcastUseCase::new(source.clone(), cache, registry.clone(), platform.clone());
    let feedback = Arc::new(
        FeedbackTracker::new(platform)
            .with_threshold(config.feedback.reject_threshold)
            .with_notice(config.feedback.retraction_notice.clone())
            .with_memory(config.feedback.tracked_messages),
    );

    let scheduler = Scheduler::new(
        config.scheduler.intervals(),
        source,
        registry,
        refill,
        broadcast,
        feedback,
    );

    let (ready_tx, ready_rx) = watch::channel(false);
    scheduler.start(ready_rx).await?;

    match discord.validate_token().await {
        Ok(identity) => {
            info!(user_id = %identity.id, username = %identity.username, "Connected to Discord");
            let _ = ready_tx.send(true);
        }
        Err(e) => {
            error!(error = %e, "Discord rejected the bot token");
            scheduler.stop().await;
            return Err(eyre!("failed to connect to Discord: {e}"));
        }
    }

    tokio::signal::ctrl_c()
        .await
        .wrap_err("failed to listen for shutdown signal")?;
    info!("Shutdown requested");
    scheduler.stop().await;

    Ok(())
}

async fn register(registry: &TargetRegistry, group: String, target: String) -> String {
    registry.load().await;
    let target = TargetId::new(target);
    let mention = target.mention();
    match registry.register(GroupId::new(group), target).await {
        Ok(()) => format!("Added auto-waifu for this guild in {mention}."),
        Err(e) => e.user_message().to_string(),
    }
}

async fn unregister(registry: &TargetRegistry, group: String) -> String {
    registry.load().await;
    match registry.unregister(&GroupId::new(group)).await {
        Ok(target) => format!("Removed auto-waifu from {}.", target.mention()),
        Err(e) => e.user_message().to_string(),
    }
}

async fn describe(registry: &TargetRegistry, group: String) -> String {
    registry.load().await;
    registry.describe(&GroupId::new(group)).await.user_message()
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = dotenvy::dotenv();

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = autowaifu::VERSION, "Starting {}", autowaifu::NAME);

    let services = build_services(&args, &config)?;

    let message = match args.command() {
        Command::Run => return run(&config, services).await,
        Command::Register { group, target } => register(&services.registry, group, target).await,
        Command::Unregister { group } => unregister(&services.registry, group).await,
        Command::Describe { group } => describe(&services.registry, group).await,
    };

    println!("{message}");
    Ok(())
}
