mod config;
mod errors;
mod llm_client;
mod models;
mod reference;
mod session;
mod state;
mod suggestion;
mod ui;
mod voice;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::state::AppState;
use crate::suggestion::requester::SuggestionRequester;
use crate::voice::command::CommandSpeechHost;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr so they stay out of the interactive screen
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Verse Finder v{}", env!("CARGO_PKG_VERSION"));

    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; verse requests will fail until it is configured");
    }

    let gemini = Arc::new(GeminiClient::new(config.gemini_api_key.clone())?);
    info!(
        "Gemini client initialized (text: {}, image: {})",
        llm_client::TEXT_MODEL,
        llm_client::IMAGE_MODEL
    );
    let requester = Arc::new(SuggestionRequester::new(gemini.clone(), gemini));

    let (speech, events) = CommandSpeechHost::new(
        config.tts_command.clone(),
        config.stt_command.clone(),
        tokio::runtime::Handle::current(),
    );
    info!(
        tts = config.tts_command.is_some(),
        stt = config.stt_command.is_some(),
        "Speech host initialized"
    );

    let state = AppState {
        config,
        requester,
        speech: Arc::new(speech),
    };

    ui::run(state, events).await
}
