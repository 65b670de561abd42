use crate::config::Settings;
use crate::domain::post::GeneratedPost;
use crate::llm::error::GenerationError;
use crate::llm::{PostInput, TextGenerator};
use crate::time::jp_market;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_gemini_api_key()?.to_string();
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build gemini http client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn prompt(input: &PostInput) -> String {
        format!(
            "日経平均株価の変動についてツイートを作成してください。\n\
             現在の価格: {current:.2}円\n\
             変動額: {delta:.2}円\n\
             変動率: {percent:.2}%\n\
             変動方向: {direction}\n\
             \n\
             以下の要件を満たしてください:\n\
             - 簡潔にまとめる。\n\
             - 感情を示す絵文字を適切に使う。\n\
             - 関連するハッシュタグ（#日経平均 #株価変動 #投資）を含める。\n\
             - 例: 「日経平均株価が上昇しました📈 現在価格: 〇〇円 (前日比 +〇〇円, +〇〇%)。 #日経平均 #株価変動 #投資」",
            current = input.current,
            delta = input.delta,
            percent = input.percent,
            direction = input.direction.label_ja(),
        )
    }

    async fn generate_content(
        &self,
        req: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| GenerationError::Transport(format!("invalid api key header: {e}")))?,
        );

        let res = self
            .http
            .post(self.url())
            .headers(headers)
            .json(&req)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(format!("Gemini request failed: {e}")))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            GenerationError::Transport(format!("failed to read Gemini response body: {e}"))
        })?;
        if !status.is_success() {
            return Err(GenerationError::Http {
                status: status.as_u16(),
                detail: text,
            });
        }

        serde_json::from_str::<GenerateContentResponse>(&text)
            .map_err(|e| GenerationError::Transport(format!("failed to decode Gemini response: {e}")))
    }

    fn response_text(res: &GenerateContentResponse) -> Option<String> {
        let candidate = res.candidates.first()?;
        let mut out = String::new();
        for part in &candidate.content.parts {
            if let Some(text) = &part.text {
                out.push_str(text);
            }
        }
        if out.trim().is_empty() {
            None
        } else {
            Some(out)
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    async fn generate_post(&self, input: &PostInput) -> Result<GeneratedPost, GenerationError> {
        let req = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Self::prompt(input),
                }],
            }],
        };

        let res = self.generate_content(req).await?;

        if let Some(candidate) = res.candidates.first() {
            if matches!(candidate.finish_reason.as_deref(), Some("MAX_TOKENS")) {
                tracing::warn!(model = %self.model, "Gemini stopped at max tokens; post may be truncated");
            }
        }

        let text = Self::response_text(&res).ok_or(GenerationError::EmptyCompletion)?;

        let generated_at = chrono::Utc::now();
        let mut body = text.trim().to_string();
        body.push(' ');
        body.push_str(&jp_market::format_post_timestamp(generated_at));

        Ok(GeneratedPost { body, generated_at })
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: ResponseContent,

    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}
