use anyhow::{Context, Result};

/// Default Groq model used for refinement. Overridable via GROQ_MODEL.
pub const DEFAULT_GROQ_MODEL: &str = "meta-llama/llama-4-maverick-17b-128e-instruct";

/// Application configuration loaded from environment variables.
/// Fails fast at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub groq_model: String,
    pub upload_dir: String,
    pub processed_dir: String,
    pub template_path: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq_api_key: require_env("GROQ_API_KEY")?,
            groq_model: std::env::var("GROQ_MODEL")
                .unwrap_or_else(|_| DEFAULT_GROQ_MODEL.to_string()),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "data/uploads".to_string()),
            processed_dir: std::env::var("PROCESSED_DIR")
                .unwrap_or_else(|_| "data/processed".to_string()),
            template_path: std::env::var("TEMPLATE_PATH")
                .unwrap_or_else(|_| "templates/ppt_template.pptx".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
