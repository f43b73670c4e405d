use anyhow::Result;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub frontend_url: String,

    // Persistence (None = in-memory store)
    pub database_url: Option<String>,

    // Admin routes
    pub api_key: Option<String>,

    // Translation providers
    pub libretranslate_url: String,
    pub mymemory_url: String,
    pub translation_timeout: Duration,
    pub translation_pacing: Duration,
    pub translation_user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            frontend_url: std::env::var("FRONTEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            // Persistence
            database_url: non_empty_var("DATABASE_URL"),

            // Admin routes
            api_key: non_empty_var("API_KEY"),

            // Translation providers
            libretranslate_url: std::env::var("LIBRETRANSLATE_URL")
                .unwrap_or_else(|_| "https://libretranslate.de/translate".to_string()),
            mymemory_url: std::env::var("MYMEMORY_URL")
                .unwrap_or_else(|_| "https://api.mymemory.translated.net/get".to_string()),
            translation_timeout: Duration::from_secs(
                std::env::var("TRANSLATION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            translation_pacing: Duration::from_millis(
                std::env::var("TRANSLATION_PACING_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(100),
            ),
            translation_user_agent: std::env::var("TRANSLATION_USER_AGENT")
                .unwrap_or_else(|_| "InfoMed-QRSystem/1.0".to_string()),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
