mod config;
mod error;
mod handlers;
mod models;
mod services;
mod state;

use actix_web::{App, HttpServer};
use std::sync::Arc;

use config::Config;
use error::BotError;
use handlers::intake::IntakeHandler;
use handlers::polling::{self, Poller};
use services::gemini::GeminiClient;
use services::reply::ReplyGenerator;
use services::telegram::TelegramBot;
use state::AppState;

#[actix_web::main]
async fn main() -> Result<(), BotError> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env()?;
    tracing::info!(
        model = %config.gemini_model,
        cooldown_secs = config.cooldown.as_secs(),
        memory_limit = config.memory_limit,
        "Funny Gemini Community Bot is starting"
    );

    let bot = Arc::new(TelegramBot::new(&config.telegram_api_url, &config.telegram_bot_token)?);

    let bot_username = polling::bootstrap(&bot).await;

    if let Some(port) = config.port {
        tracing::info!(port, "Starting health check server");
        let server = HttpServer::new(|| App::new().configure(handlers::configure_health))
            .workers(1)
            .bind(("0.0.0.0", port))?
            .run();
        actix_web::rt::spawn(async move {
            if let Err(e) = server.await {
                tracing::error!(error = %e, "Health server stopped");
            }
        });
    }

    let gemini = GeminiClient::new(&config.gemini_api_url, &config.gemini_api_key, &config.gemini_model)?;
    let replies = ReplyGenerator::new(Arc::new(gemini), config.persona.clone());
    let state = AppState::new(config.memory_limit, config.cooldown);
    let handler = IntakeHandler::new(state, replies, bot.clone(), config.think_delay, bot_username);

    tokio::select! {
        _ = Poller::new(bot, handler).run() => {}
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}
