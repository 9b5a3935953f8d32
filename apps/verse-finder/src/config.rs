use anyhow::{Context, Result};

use crate::voice::command::CommandSpec;

/// Application configuration loaded from environment variables.
/// Nothing is required: a missing API key only fails requests later.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub tts_command: Option<CommandSpec>,
    pub stt_command: Option<CommandSpec>,
    pub generate_image: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY"));

        Ok(Config {
            gemini_api_key,
            tts_command: non_empty("TTS_COMMAND").and_then(|v| CommandSpec::parse(&v)),
            stt_command: non_empty("STT_COMMAND").and_then(|v| CommandSpec::parse(&v)),
            generate_image: match non_empty("GENERATE_IMAGE") {
                Some(v) => parse_flag(&v)
                    .with_context(|| format!("GENERATE_IMAGE must be true or false, got '{v}'"))?,
                None => true,
            },
            rust_log: non_empty("RUST_LOG").unwrap_or_else(|| "warn".to_string()),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
