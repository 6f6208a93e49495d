pub mod domain;
pub mod ingest;
pub mod pipeline;
pub mod scoring;
pub mod storage;

pub mod config {
    use anyhow::Context;

    const DEFAULT_DATABASE_URL: &str = "sqlite://stocks.db";
    const DEFAULT_ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co";
    const DEFAULT_QUOTE_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_STOCK_SYMBOLS: &[&str] = &["AAPL", "TSLA", "AMZN"];
    const DEFAULT_PENNY_STOCK_SYMBOLS: &[&str] =
        &["SNDL", "NOK", "ZOM", "GNUS", "IDEX", "CTRM", "NAKD", "OCGN"];
    const DEFAULT_PENNY_MAX_RESULTS: usize = 5;
    const DEFAULT_PENNY_PRICE_CEILING: f64 = 5.0;
    const DEFAULT_PORT: u16 = 8000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: String,
        pub alpha_vantage_api_key: Option<String>,
        pub alpha_vantage_base_url: String,
        pub quote_timeout_secs: u64,
        pub stock_symbols: Vec<String>,
        pub penny_stock_symbols: Vec<String>,
        pub penny_max_results: usize,
        pub penny_price_ceiling: f64,
        pub sentry_dsn: Option<String>,
        pub port: u16,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                database_url: DEFAULT_DATABASE_URL.to_string(),
                alpha_vantage_api_key: None,
                alpha_vantage_base_url: DEFAULT_ALPHA_VANTAGE_BASE_URL.to_string(),
                quote_timeout_secs: DEFAULT_QUOTE_TIMEOUT_SECS,
                stock_symbols: owned(DEFAULT_STOCK_SYMBOLS),
                penny_stock_symbols: owned(DEFAULT_PENNY_STOCK_SYMBOLS),
                penny_max_results: DEFAULT_PENNY_MAX_RESULTS,
                penny_price_ceiling: DEFAULT_PENNY_PRICE_CEILING,
                sentry_dsn: None,
                port: DEFAULT_PORT,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();
            let settings = Self {
                database_url: non_empty_var("DATABASE_URL").unwrap_or(defaults.database_url),
                alpha_vantage_api_key: non_empty_var("ALPHA_VANTAGE_API_KEY"),
                alpha_vantage_base_url: non_empty_var("ALPHA_VANTAGE_BASE_URL")
                    .unwrap_or(defaults.alpha_vantage_base_url),
                quote_timeout_secs: parsed_var("ALPHA_VANTAGE_TIMEOUT_SECS")
                    .unwrap_or(defaults.quote_timeout_secs),
                stock_symbols: non_empty_var("STOCK_SYMBOLS")
                    .map(|s| parse_symbols(&s))
                    .filter(|v| !v.is_empty())
                    .unwrap_or(defaults.stock_symbols),
                penny_stock_symbols: non_empty_var("PENNY_STOCK_SYMBOLS")
                    .map(|s| parse_symbols(&s))
                    .filter(|v| !v.is_empty())
                    .unwrap_or(defaults.penny_stock_symbols),
                penny_max_results: parsed_var("PENNY_MAX_RESULTS")
                    .unwrap_or(defaults.penny_max_results),
                penny_price_ceiling: parsed_var("PENNY_PRICE_CEILING")
                    .unwrap_or(defaults.penny_price_ceiling),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                port: parsed_var("PORT").unwrap_or(defaults.port),
            };

            anyhow::ensure!(
                settings.penny_max_results >= 1,
                "PENNY_MAX_RESULTS must be >= 1"
            );
            Ok(settings)
        }

        pub fn require_alpha_vantage_api_key(&self) -> anyhow::Result<&str> {
            self.alpha_vantage_api_key
                .as_deref()
                .context("ALPHA_VANTAGE_API_KEY is required")
        }
    }

    /// Splits a comma-separated symbol list, trimming and upper-casing entries.
    pub fn parse_symbols(s: &str) -> Vec<String> {
        s.split(',')
            .map(|part| part.trim().to_ascii_uppercase())
            .filter(|part| !part.is_empty())
            .collect()
    }

    fn owned(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
        non_empty_var(key).and_then(|s| s.parse::<T>().ok())
    }

}
