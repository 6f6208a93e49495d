use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockpick_core::ingest::AlphaVantageClient;
use stockpick_core::pipeline::RankingPipeline;
use stockpick_core::storage::{RecordSink, SqliteStore};

mod options;

use options::PolicyKind;

#[derive(Debug, Parser)]
#[command(name = "stockpick_worker")]
struct Args {
    /// Scoring and selection policy to run.
    #[arg(long, value_enum, default_value_t = PolicyKind::PennyStock)]
    policy: PolicyKind,

    /// Comma-separated symbols. Defaults to the configured list for the policy.
    #[arg(long)]
    symbols: Option<String>,

    /// Run date recorded with each row (YYYY-MM-DD). Defaults to today's local date.
    #[arg(long)]
    run_date: Option<String>,

    /// Do everything except writing to the database.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockpick_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let run_date = options::resolve_run_date(args.run_date.as_deref())?;
    let symbols = options::resolve_symbols(args.policy, args.symbols.as_deref(), &settings);
    let policy = args.policy.policy(&settings);

    let client = match AlphaVantageClient::from_settings(&settings) {
        Ok(client) => client,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            return Err(err);
        }
    };

    let sink: Option<Arc<dyn RecordSink>> = if args.dry_run {
        None
    } else {
        let store = SqliteStore::connect(&settings.database_url).await?;
        Some(Arc::new(store))
    };

    tracing::info!(
        %run_date,
        policy = policy.name(),
        symbols = symbols.len(),
        dry_run = args.dry_run,
        "starting ranking run"
    );

    let pipeline = RankingPipeline::new(Arc::new(client), sink);
    let result = pipeline.run(&symbols, &policy, run_date).await;

    let out = serde_json::to_string_pretty(&result).context("serialize ranking result failed")?;
    println!("{out}");

    Ok(())
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
