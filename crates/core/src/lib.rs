pub mod domain;
pub mod llm;
pub mod market;
pub mod social;
pub mod time;

pub mod config {
    use anyhow::Context;

    use crate::social::oauth::OauthCredentials;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub gemini_api_key: Option<String>,
        pub x_api_key: Option<String>,
        pub x_api_key_secret: Option<String>,
        pub x_access_token: Option<String>,
        pub x_access_token_secret: Option<String>,
        pub sentry_dsn: Option<String>,
        pub market_data_base_url: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
                x_api_key: std::env::var("X_API_KEY").ok(),
                x_api_key_secret: std::env::var("X_API_KEY_SECRET").ok(),
                x_access_token: std::env::var("X_ACCESS_TOKEN").ok(),
                x_access_token_secret: std::env::var("X_ACCESS_TOKEN_SECRET").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                market_data_base_url: std::env::var("MARKET_DATA_BASE_URL").ok(),
            })
        }

        pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
            self.gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY is required")
        }

        /// All four user-context credential components, or the first missing
        /// one as an error.
        pub fn require_x_credentials(&self) -> anyhow::Result<OauthCredentials> {
            Ok(OauthCredentials {
                consumer_key: self
                    .x_api_key
                    .as_deref()
                    .context("X_API_KEY is required")?
                    .to_string(),
                consumer_secret: self
                    .x_api_key_secret
                    .as_deref()
                    .context("X_API_KEY_SECRET is required")?
                    .to_string(),
                access_token: self
                    .x_access_token
                    .as_deref()
                    .context("X_ACCESS_TOKEN is required")?
                    .to_string(),
                access_token_secret: self
                    .x_access_token_secret
                    .as_deref()
                    .context("X_ACCESS_TOKEN_SECRET is required")?
                    .to_string(),
            })
        }
    }
}
