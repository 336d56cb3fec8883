use std::sync::Arc;

use tracing::{error, info, warn};

use newsbridge::web::{AppState, WebServer};
use newsbridge::{
    start_news_updater, Config, GoogleTranslator, HttpFeedClient, NewsAggregator,
    RedisSnapshotStore,
};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = newsbridge::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        newsbridge::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> newsbridge::Result<()> {
    config.validate()?;

    info!("newsbridge - translated news relay");
    info!(
        "Translating feed into '{}' (cache TTL {}s)",
        config.translation.target_language, config.cache.duration_secs
    );

    let feed = HttpFeedClient::new(&config.feed)?;
    let translator = GoogleTranslator::new(&config.translation)?;

    let mut aggregator = NewsAggregator::new(
        Arc::new(feed),
        Arc::new(translator),
        &config.translation,
        &config.cache,
    );

    if let Some(url) = config.cache.redis_url.as_deref() {
        match RedisSnapshotStore::connect(url).await {
            Ok(store) => {
                info!("Writing results through to Redis");
                aggregator = aggregator.with_store(Arc::new(store));
            }
            Err(e) => warn!("Redis store disabled: {}", e),
        }
    }

    let aggregator = Arc::new(aggregator);

    if config.refresh.secret.is_empty() {
        warn!("No refresh secret configured; the refresh endpoint will reject all requests");
    }

    let _updater = start_news_updater(Arc::clone(&aggregator), config.refresh.interval_secs);

    let app_state = Arc::new(AppState::new(aggregator, &config.refresh));
    let server = WebServer::new(&config.server, app_state)?;
    info!("Server configured on {}", server.addr());

    server.run().await?;
    Ok(())
}
