use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockpick_core::ingest::{AlphaVantageClient, QuoteProvider};
use stockpick_core::pipeline::RankingPipeline;
use stockpick_core::storage::{RecordSink, SqliteStore};

mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockpick_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let store = match SqliteStore::connect(&settings.database_url).await {
        Ok(store) => Some(store),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "db open failed; starting API in degraded mode");
            None
        }
    };

    let provider: Option<Arc<dyn QuoteProvider>> = match AlphaVantageClient::from_settings(&settings) {
        Ok(client) => Some(Arc::new(client) as Arc<dyn QuoteProvider>),
        Err(e) => {
            tracing::warn!(error = %e, "quote provider unavailable; ranking routes will report it");
            None
        }
    };

    let pipeline = provider.map(|provider| {
        let sink = store
            .clone()
            .map(|store| Arc::new(store) as Arc<dyn RecordSink>);
        Arc::new(RankingPipeline::new(provider, sink))
    });

    let port = settings.port;

    let state = routes::AppState {
        settings: Arc::new(settings),
        store,
        pipeline,
    };

    let app = routes::build_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &stockpick_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
