use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sokuho_core::llm::gemini::GeminiClient;
use sokuho_core::market::yahoo::YahooChartClient;
use sokuho_core::social::x::XClient;

mod run;

use run::{RunConfig, RunOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = sokuho_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // Missing credentials are fatal before any network work; everything after
    // this point ends the run with a logged outcome and a clean exit.
    let (market, generator, publisher) = match build_clients(&settings) {
        Ok(clients) => clients,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "required configuration missing; aborting");
            return Err(err);
        }
    };

    let cfg = RunConfig::from_env();
    let now = chrono::Utc::now();

    tracing::info!(
        symbol = %cfg.symbol,
        threshold_percent = cfg.threshold_percent,
        lookback_days = cfg.lookback_days,
        "index post run starting"
    );

    let outcome = run::run(&market, &generator, &publisher, &cfg, now).await;

    match &outcome {
        RunOutcome::Published(post) => {
            tracing::info!(remote_id = %post.remote_id, "run finished: post published");
        }
        RunOutcome::Skipped(change) => {
            tracing::info!(
                percent = change.percent,
                threshold_percent = cfg.threshold_percent,
                "run finished: change below threshold, nothing posted"
            );
        }
        RunOutcome::FailedFetch(err) => {
            sentry::capture_error(err);
            tracing::error!(error = %err, "run finished: market data fetch failed");
        }
        RunOutcome::FailedGeneration(err) => {
            sentry::capture_error(err);
            tracing::error!(error = %err, "run finished: post text generation failed");
        }
        RunOutcome::FailedPublish(err) => {
            sentry::capture_error(err);
            tracing::error!(error = %err, "run finished: publish failed");
        }
    }

    Ok(())
}

fn build_clients(
    settings: &sokuho_core::config::Settings,
) -> anyhow::Result<(YahooChartClient, GeminiClient, XClient)> {
    let market = YahooChartClient::from_settings(settings)?;
    let generator = GeminiClient::from_settings(settings)?;
    let publisher = XClient::from_settings(settings)?;
    Ok((market, generator, publisher))
}

fn init_sentry(settings: &sokuho_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
