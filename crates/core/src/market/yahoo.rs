use crate::config::Settings;
use crate::domain::market::{ClosingPrice, PriceObservation};
use crate::market::{FetchError, MarketDataClient};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Yahoo Finance v8 chart endpoint. One GET per run, daily interval; only
/// the close column is consumed.
#[derive(Debug, Clone)]
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings
            .market_data_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("MARKET_DATA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build market data http client")?;

        Ok(Self { http, base_url })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            symbol
        )
    }
}

#[async_trait::async_trait]
impl MarketDataClient for YahooChartClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_recent_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceObservation, FetchError> {
        let res = self
            .http
            .get(self.chart_url(symbol))
            .query(&[
                ("interval", "1d".to_string()),
                ("period1", start.timestamp().to_string()),
                ("period2", end.timestamp().to_string()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Failed(format!("chart request failed: {e}")))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| FetchError::Failed(format!("failed to read chart response: {e}")))?;
        if !status.is_success() {
            return Err(FetchError::Failed(format!("chart HTTP {status}: {text}")));
        }

        let body = serde_json::from_str::<ChartResponse>(&text)
            .map_err(|e| FetchError::Failed(format!("chart response is not valid JSON: {e}")))?;

        if let Some(err) = &body.chart.error {
            if !err.is_null() {
                return Err(FetchError::Failed(format!("chart error: {err}")));
            }
        }

        let result = body
            .chart
            .result
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| FetchError::NoData {
                symbol: symbol.to_string(),
            })?;

        let closes = collect_closes(&result);
        if closes.is_empty() {
            return Err(FetchError::NoData {
                symbol: symbol.to_string(),
            });
        }
        if closes.len() < 2 {
            return Err(FetchError::InsufficientHistory {
                symbol: symbol.to_string(),
                rows: closes.len(),
            });
        }

        tracing::debug!(symbol, rows = closes.len(), "fetched daily closes");

        Ok(PriceObservation {
            symbol: symbol.to_string(),
            closes,
        })
    }
}

fn collect_closes(result: &ChartResult) -> Vec<ClosingPrice> {
    let Some(quote) = result.indicators.quote.first() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for (ts, close) in result.timestamp.iter().zip(quote.close.iter()) {
        // Holiday rows come back with null closes; skip them.
        let Some(close) = close else { continue };
        let Some(dt) = DateTime::<Utc>::from_timestamp(*ts, 0) else {
            continue;
        };
        out.push(ClosingPrice {
            date: dt.date_naive(),
            close: *close,
        });
    }
    out
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}
