/// Application-level constants
pub const APP_NAME: &str = "LedgerLens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default chunk size in characters. Statement text is split into pieces of
/// at most this many characters before extraction.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 4000;

/// Token ceiling for one extraction call.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Low sampling temperature favors deterministic extraction.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Default chat model used for extraction.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default base URL for the OpenAI-compatible extraction service.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default HTTP timeout for one extraction call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default port for the API server.
pub const DEFAULT_PORT: u16 = 8080;

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    "ledgerlens=info,tower_http=info".to_string()
}

/// Connection settings for the extraction service, read from the environment.
#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
    pub port: u16,
}

impl ExtractionSettings {
    pub fn from_env() -> Result<Self, String> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| "Missing OPENAI_API_KEY environment variable".to_string())?;

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var("LEDGERLENS_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("LEDGERLENS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let port = std::env::var("LEDGERLENS_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            base_url,
            api_key,
            model,
            timeout_secs,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }

    #[test]
    fn default_filter_covers_crate() {
        assert!(default_log_filter().contains("ledgerlens"));
    }

    #[test]
    fn chunk_default_is_four_thousand() {
        assert_eq!(DEFAULT_MAX_CHUNK_SIZE, 4000);
    }

    #[test]
    fn token_budget_default() {
        assert_eq!(DEFAULT_MAX_TOKENS, 2048);
        assert!(DEFAULT_TEMPERATURE < 0.5);
    }
}
