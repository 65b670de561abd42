use chrono::{DateTime, Utc};

use sokuho_core::domain::market::{evaluate, ChangeResult};
use sokuho_core::domain::post::PublishedPost;
use sokuho_core::llm::{GenerationError, PostInput, TextGenerator};
use sokuho_core::market::{FetchError, MarketDataClient};
use sokuho_core::social::{PostPublisher, PublishError};
use sokuho_core::time::jp_market;

const DEFAULT_SYMBOL: &str = "^N225";
const DEFAULT_THRESHOLD_PERCENT: f64 = 1.0;
const DEFAULT_LOOKBACK_DAYS: i64 = 5;

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Index symbol to watch.
    pub symbol: String,

    /// Minimum absolute percentage change that triggers a post.
    pub threshold_percent: f64,

    /// Calendar days of history to request. Five spans a weekend plus a
    /// holiday while still holding two trading-day rows.
    pub lookback_days: i64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl RunConfig {
    pub fn from_env() -> Self {
        let mut out = Self::default();

        if let Ok(s) = std::env::var("SOKUHO_SYMBOL") {
            if !s.trim().is_empty() {
                out.symbol = s;
            }
        }

        if let Ok(s) = std::env::var("SOKUHO_THRESHOLD_PERCENT") {
            if let Ok(n) = s.parse::<f64>() {
                out.threshold_percent = n;
            }
        }

        if let Ok(s) = std::env::var("SOKUHO_LOOKBACK_DAYS") {
            if let Ok(n) = s.parse::<i64>() {
                out.lookback_days = n;
            }
        }

        out
    }
}

/// Terminal states of one run. Exactly one is reached; no state is revisited.
#[derive(Debug)]
pub enum RunOutcome {
    Published(PublishedPost),
    Skipped(ChangeResult),
    FailedFetch(FetchError),
    FailedGeneration(GenerationError),
    FailedPublish(PublishError),
}

pub async fn run(
    market: &dyn MarketDataClient,
    generator: &dyn TextGenerator,
    publisher: &dyn PostPublisher,
    cfg: &RunConfig,
    now_utc: DateTime<Utc>,
) -> RunOutcome {
    let (start, end) = jp_market::lookback_window(now_utc, cfg.lookback_days);

    let observation = match market.fetch_recent_closes(&cfg.symbol, start, end).await {
        Ok(obs) => obs,
        Err(err) => {
            tracing::error!(
                symbol = %cfg.symbol,
                provider = market.provider_name(),
                error = %err,
                "market data fetch failed"
            );
            return RunOutcome::FailedFetch(err);
        }
    };

    let Some((previous, current)) = observation.latest_pair() else {
        let err = FetchError::InsufficientHistory {
            symbol: cfg.symbol.clone(),
            rows: observation.closes.len(),
        };
        tracing::error!(symbol = %cfg.symbol, error = %err, "market data fetch failed");
        return RunOutcome::FailedFetch(err);
    };

    let change = evaluate(current, previous);
    tracing::info!(
        symbol = %cfg.symbol,
        current = change.current,
        previous = change.previous,
        delta = change.delta,
        percent = change.percent,
        direction = %change.direction,
        "evaluated closing-price change"
    );

    if !change.exceeds_threshold(cfg.threshold_percent) {
        tracing::info!(
            percent = change.percent,
            threshold_percent = cfg.threshold_percent,
            "change below threshold; skipping post"
        );
        return RunOutcome::Skipped(change);
    }

    let input = PostInput::from_change(&change);
    let post = match generator.generate_post(&input).await {
        Ok(post) => post,
        Err(err) => {
            tracing::error!(
                provider = generator.provider_name(),
                error = %err,
                "post text generation failed"
            );
            return RunOutcome::FailedGeneration(err);
        }
    };

    // An over-limit body must never reach the provider.
    let limit = publisher.character_limit();
    let chars = post.char_count();
    if chars > limit {
        let err = PublishError::TooLong { chars, limit };
        tracing::error!(chars, limit, "generated post rejected before publish");
        return RunOutcome::FailedPublish(err);
    }

    match publisher.publish(&post).await {
        Ok(published) => {
            tracing::info!(
                provider = publisher.provider_name(),
                remote_id = %published.remote_id,
                body = %post.body,
                "post published"
            );
            RunOutcome::Published(published)
        }
        Err(err) => {
            tracing::error!(
                provider = publisher.provider_name(),
                error = %err,
                "publish failed"
            );
            RunOutcome::FailedPublish(err)
        }
    }
}
