use crate::config::Settings;
use crate::domain::post::{GeneratedPost, PublishedPost};
use crate::social::oauth::{Oauth1Signer, OauthCredentials};
use crate::social::{PostPublisher, PublishError};
use anyhow::Context;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.twitter.com";
const UPDATE_STATUS_PATH: &str = "/1.1/statuses/update.json";
const POST_CHAR_LIMIT: usize = 280;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// X (Twitter) v1.1 `statuses/update` publisher with OAuth 1.0a user-context
/// authentication.
#[derive(Clone)]
pub struct XClient {
    http: reqwest::Client,
    base_url: String,
    signer: Oauth1Signer,
}

impl XClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let creds = settings.require_x_credentials()?;
        Self::new(creds)
    }

    pub fn new(creds: OauthCredentials) -> anyhow::Result<Self> {
        let base_url = std::env::var("X_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("X_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build social http client")?;

        Ok(Self {
            http,
            base_url,
            signer: Oauth1Signer::new(creds),
        })
    }

    fn update_status_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            UPDATE_STATUS_PATH
        )
    }
}

fn classify_status(status: StatusCode, detail: String) -> PublishError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => PublishError::RateLimited,
        StatusCode::FORBIDDEN => PublishError::Forbidden,
        StatusCode::UNAUTHORIZED => PublishError::Unauthorized,
        _ => PublishError::Provider(format!("HTTP {status}: {detail}")),
    }
}

#[async_trait::async_trait]
impl PostPublisher for XClient {
    fn provider_name(&self) -> &'static str {
        "x_v1"
    }

    fn character_limit(&self) -> usize {
        POST_CHAR_LIMIT
    }

    async fn publish(&self, post: &GeneratedPost) -> Result<PublishedPost, PublishError> {
        let chars = post.char_count();
        if chars > POST_CHAR_LIMIT {
            return Err(PublishError::TooLong {
                chars,
                limit: POST_CHAR_LIMIT,
            });
        }

        let url = self.update_status_url();
        let nonce = Oauth1Signer::generate_nonce();
        let timestamp = Oauth1Signer::timestamp();
        let authorization = self.signer.authorization_header(
            "POST",
            &url,
            &[("status", post.body.as_str())],
            &nonce,
            timestamp,
        );

        let res = self
            .http
            .post(&url)
            .header("Authorization", authorization)
            .form(&[("status", post.body.as_str())])
            .send()
            .await
            .map_err(|e| PublishError::Provider(format!("publish request failed: {e}")))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            PublishError::Provider(format!("failed to read publish response: {e}"))
        })?;
        if !status.is_success() {
            return Err(classify_status(status, text));
        }

        let body = serde_json::from_str::<UpdateStatusResponse>(&text)
            .map_err(|e| PublishError::Provider(format!("failed to decode publish response: {e}")))?;

        tracing::debug!(remote_id = %body.id_str, "status update accepted");
        Ok(PublishedPost {
            remote_id: body.id_str,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct UpdateStatusResponse {
    id_str: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn client() -> XClient {
        XClient::new(OauthCredentials {
            consumer_key: "ck".to_string(),
            consumer_secret: "cs".to_string(),
            access_token: "at".to_string(),
            access_token_secret: "ats".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn classifies_remote_errors_by_status() {
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            PublishError::RateLimited
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, String::new()),
            PublishError::Forbidden
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, String::new()),
            PublishError::Unauthorized
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()),
            PublishError::Provider(_)
        ));
    }

    #[tokio::test]
    async fn rejects_over_limit_body_without_network() {
        let post = GeneratedPost {
            body: "あ".repeat(281),
            generated_at: Utc::now(),
        };

        // A request that left the process would surface as a transport
        // error, not TooLong.
        let err = client().publish(&post).await.unwrap_err();
        assert!(matches!(
            err,
            PublishError::TooLong {
                chars: 281,
                limit: 280
            }
        ));
    }

    #[test]
    fn boundary_body_passes_local_gate() {
        let post = GeneratedPost {
            body: "あ".repeat(280),
            generated_at: Utc::now(),
        };
        assert_eq!(post.char_count(), client().character_limit());
    }

    #[test]
    fn parses_created_post_id() {
        let v = json!({"id": 1050118621198921700u64, "id_str": "1050118621198921728", "text": "..."});
        let parsed: UpdateStatusResponse = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.id_str, "1050118621198921728");
    }
}
