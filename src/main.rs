use std::path::PathBuf;
use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

use mastermind::bot::{Composer, Incoming, Router, RouterConfig, SessionStore, TelegramClient};
use mastermind::config::{Config, RunMode};
use mastermind::providers::{GeminiClient, HackerGptClient, OpenAiClient, Provider, ProviderSelector};
use mastermind::webhook::{self, WorkerPool};

fn build_router(config: &Config, bot: Bot) -> Result<Router, String> {
    let openai = Arc::new(
        OpenAiClient::new(config.openai_api_key.clone(), config.openai.clone())
            .map_err(|e| format!("Failed to build OpenAI client: {e}"))?,
    );
    let gemini = GeminiClient::new(config.gemini_api_key.clone(), config.gemini.clone())
        .map_err(|e| format!("Failed to build Gemini client: {e}"))?;
    let hackergpt = HackerGptClient::new(config.hackergpt.clone())
        .map_err(|e| format!("Failed to build HackerGPT client: {e}"))?;

    let providers: Vec<Arc<dyn Provider>> = vec![openai.clone(), Arc::new(gemini), Arc::new(hackergpt)];
    let providers = ProviderSelector::new(providers).ok_or("No providers configured")?;
    info!("Providers: {:?}", providers.names());

    let composer: Arc<dyn Composer> = openai;
    let router_config = RouterConfig {
        chunk_chars: config.chunk_chars,
        summary_chars: config.summary_chars,
        max_document_bytes: config.max_document_bytes,
    };
    Ok(Router::new(
        router_config,
        Arc::new(TelegramClient::new(bot)),
        SessionStore::new(config.session_capacity, config.session_ttl),
        providers,
        composer,
    ))
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match Config::load(settings_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    std::fs::create_dir_all(&config.log_dir).ok();
    let file_appender = tracing_appender::rolling::never(&config.log_dir, "mastermind.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting Ultimate AI Mastermind Bot...");
    if let Some(path) = &settings_path {
        info!("Loaded settings from {}", path.display());
    }
    if config.mongo_uri.is_some() {
        info!("MONGO_URI is set but no database is used");
    }
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY not set; OpenAI research and writing will fail");
    }
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY not set; Gemini research will fail");
    }

    let bot = Bot::new(&config.telegram_bot_token);
    let router = match build_router(&config, bot.clone()) {
        Ok(router) => Arc::new(router),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    match config.mode.clone() {
        RunMode::Polling => run_polling(bot, router).await,
        RunMode::Webhook { url, port } => run_webhook(bot, router, &url, port, config.workers).await,
    }
}

async fn run_polling(bot: Bot, router: Arc<Router>) {
    info!("Running in polling mode...");
    if let Err(e) = bot.delete_webhook().await {
        warn!("Failed to remove webhook: {e}");
    }

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_message(msg: Message, router: Arc<Router>) -> ResponseResult<()> {
    router.handle(Incoming::from_telegram(&msg)).await;
    Ok(())
}

async fn run_webhook(bot: Bot, router: Arc<Router>, url: &str, port: u16, workers: usize) {
    let webhook_url = match reqwest::Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            error!("Invalid WEBHOOK_URL '{url}': {e}");
            std::process::exit(1);
        }
    };

    // Register in the background so the port is bound promptly
    tokio::spawn(async move {
        if let Err(e) = bot.delete_webhook().await {
            warn!("Failed to remove old webhook: {e}");
        }
        match bot.set_webhook(webhook_url.clone()).await {
            Ok(_) => info!("Bot is running in webhook mode at {webhook_url}"),
            Err(e) => error!("Failed to set webhook: {e}"),
        }
    });

    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind port {port}: {e}");
            std::process::exit(1);
        }
    };

    let pool = Arc::new(WorkerPool::new(router, workers));
    if let Err(e) = webhook::serve(listener, pool).await {
        error!("Webhook server stopped: {e}");
    }
}
