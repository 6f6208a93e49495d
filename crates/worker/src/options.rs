use chrono::NaiveDate;
use clap::ValueEnum;
use stockpick_core::config::{parse_symbols, Settings};
use stockpick_core::pipeline::PipelinePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    /// Price tiers over the large-cap list; best pick is the last Strong Buy.
    PriceTier,
    /// Additive penny score under the price ceiling; top N by score.
    PennyStock,
}

impl PolicyKind {
    pub fn policy(self, settings: &Settings) -> PipelinePolicy {
        match self {
            PolicyKind::PriceTier => PipelinePolicy::price_tier(),
            PolicyKind::PennyStock => PipelinePolicy::penny_stock(
                settings.penny_max_results,
                settings.penny_price_ceiling,
            ),
        }
    }

    pub fn default_symbols(self, settings: &Settings) -> Vec<String> {
        match self {
            PolicyKind::PriceTier => settings.stock_symbols.clone(),
            PolicyKind::PennyStock => settings.penny_stock_symbols.clone(),
        }
    }
}

/// `--symbols` overrides the configured list for the chosen policy.
pub fn resolve_symbols(
    kind: PolicyKind,
    symbols_arg: Option<&str>,
    settings: &Settings,
) -> Vec<String> {
    symbols_arg
        .map(parse_symbols)
        .unwrap_or_else(|| kind.default_symbols(settings))
}

pub fn resolve_run_date(run_date_arg: Option<&str>) -> anyhow::Result<NaiveDate> {
    if let Some(s) = run_date_arg {
        return Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?);
    }
    Ok(chrono::Local::now().date_naive())
}
